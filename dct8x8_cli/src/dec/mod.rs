// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, eyre};
use dct8x8::image::Image;

pub mod pgm;
pub mod png;

/// Loads a grayscale image, picking the decoder from the file signature.
pub fn load_image(path: &Path) -> Result<Image<u8>> {
    let data =
        std::fs::read(path).wrap_err_with(|| format!("Cannot read {}", path.display()))?;
    decode_image(&data).wrap_err_with(|| format!("Cannot decode {}", path.display()))
}

pub fn decode_image(data: &[u8]) -> Result<Image<u8>> {
    if data.starts_with(b"P5") {
        pgm::decode_pgm(data)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        png::decode_png(data)
    } else {
        Err(eyre!("Unsupported input format, expected binary PGM or PNG"))
    }
}

/// Copies tightly packed rows into a new plane.
pub(crate) fn plane_from_rows(size: (usize, usize), samples: &[u8]) -> Result<Image<u8>> {
    let num_samples = size
        .0
        .checked_mul(size.1)
        .ok_or_else(|| eyre!("Image too large: {}x{}", size.0, size.1))?;
    if samples.len() < num_samples {
        return Err(eyre!(
            "Truncated image data: {} of {num_samples} samples",
            samples.len()
        ));
    }
    let mut image = Image::<u8>::new(size)?;
    let mut rect = image.as_rect_mut();
    for (y, row) in samples.chunks_exact(size.0).take(size.1).enumerate() {
        rect.row(y).copy_from_slice(row);
    }
    Ok(image)
}
