// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Cursor;

use color_eyre::eyre::{Result, eyre};
use dct8x8::image::Image;

use super::plane_from_rows;

/// Rec. 601 luma of an 8-bit RGB sample.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Decodes the first frame of a PNG to 8-bit gray. Color images are reduced
/// to their luma; alpha is dropped.
pub fn decode_png(data: &[u8]) -> Result<Image<u8>> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;
    let (width, height) = {
        let info = reader.info();
        (info.width as usize, info.height as usize)
    };
    let (color_type, _) = reader.output_color_type();
    let samples_per_pixel = color_type.samples();
    let mut buf = vec![0; width * height * samples_per_pixel];
    let frame = reader.next_frame(&mut buf)?;
    let buf = &buf[..frame.buffer_size()];

    let gray: Vec<u8> = match color_type {
        png::ColorType::Grayscale => buf.to_vec(),
        png::ColorType::GrayscaleAlpha => buf.chunks_exact(2).map(|p| p[0]).collect(),
        png::ColorType::Rgb | png::ColorType::Rgba => buf
            .chunks_exact(samples_per_pixel)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect(),
        png::ColorType::Indexed => {
            return Err(eyre!("Palette was not expanded"));
        }
    };
    plane_from_rows((width, height), &gray)
}
