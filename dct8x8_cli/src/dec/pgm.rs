// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Binary (`P5`) PGM with at most 8 bits per sample.

use color_eyre::eyre::{Result, eyre};
use dct8x8::image::Image;

use super::plane_from_rows;

struct HeaderReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl HeaderReader<'_> {
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&c) = self.data.get(self.pos) {
            if c == b'#' {
                while self.data.get(self.pos).is_some_and(|&c| c != b'\n') {
                    self.pos += 1;
                }
            } else if c.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, what: &str) -> Result<usize> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.data[start..self.pos])?
            .parse()
            .map_err(|_| eyre!("Invalid PGM {what}"))
    }
}

pub fn decode_pgm(data: &[u8]) -> Result<Image<u8>> {
    if !data.starts_with(b"P5") || !data.get(2).is_some_and(u8::is_ascii_whitespace) {
        return Err(eyre!("Not a binary PGM file"));
    }
    let mut header = HeaderReader { data, pos: 2 };
    let width = header.read_number("width")?;
    let height = header.read_number("height")?;
    let max_value = header.read_number("maximum value")?;
    if max_value == 0 || max_value > 255 {
        return Err(eyre!("Unsupported PGM maximum value {max_value}"));
    }
    // Exactly one whitespace character separates the header from the samples.
    if !data.get(header.pos).is_some_and(u8::is_ascii_whitespace) {
        return Err(eyre!("Malformed PGM header"));
    }
    let samples = &data[header.pos + 1..];
    let mut image = plane_from_rows((width, height), samples)?;
    if max_value != 255 {
        image.as_rect_mut().apply(|_, v| {
            *v = (((*v as usize).min(max_value) * 255 + max_value / 2) / max_value) as u8
        });
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode() -> Result<()> {
        let mut data = b"P5\n# made by hand\n3 2\n255\n".to_vec();
        data.extend_from_slice(&[0, 1, 2, 253, 254, 255]);
        let image = decode_pgm(&data)?;
        assert_eq!(image.size(), (3, 2));
        assert_eq!(image.as_rect().row(0), &[0, 1, 2]);
        assert_eq!(image.as_rect().row(1), &[253, 254, 255]);
        Ok(())
    }

    #[test]
    fn whitespace_sample_after_header() -> Result<()> {
        // The first sample has the value of an ASCII space.
        let mut data = b"P5 2 1 255 ".to_vec();
        data.extend_from_slice(&[b' ', 7]);
        let image = decode_pgm(&data)?;
        assert_eq!(image.as_rect().row(0), &[b' ', 7]);
        Ok(())
    }

    #[test]
    fn rescales_smaller_max_value() -> Result<()> {
        let mut data = b"P5\n4 1\n15\n".to_vec();
        data.extend_from_slice(&[0, 1, 8, 15]);
        let image = decode_pgm(&data)?;
        assert_eq!(image.as_rect().row(0), &[0, 17, 136, 255]);
        Ok(())
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(decode_pgm(b"P6\n1 1\n255\n\0\0\0").is_err());
        assert!(decode_pgm(b"P5\nx 1\n255\n\0").is_err());
        assert!(decode_pgm(b"P5\n1 1\n65535\n\0\0").is_err());
        assert!(decode_pgm(b"P5\n1 1\n255").is_err());
        assert!(decode_pgm(b"P5\n2 2\n255\n\0\0\0").is_err());
        assert!(decode_pgm(b"P5\n0 2\n255\n").is_err());
        assert!(decode_pgm(b"P5").is_err());
    }

    #[test]
    fn magic_must_be_followed_by_whitespace() {
        assert!(decode_pgm(b"P55 2 255 \0\0\0\0\0\0\0\0\0\0").is_err());
        assert!(decode_pgm(b"P5# 1 1 255 \0").is_err());
    }

    #[test]
    fn overflowing_dimensions() {
        assert!(decode_pgm(b"P5\n4294967296 4294967296\n255\n\0").is_err());
        assert!(decode_pgm(b"P5\n18446744073709551615 2\n255\n\0").is_err());
    }
}
