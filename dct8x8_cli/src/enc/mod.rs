// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, eyre};
use dct8x8::image::ImageRect;

pub mod pgm;
pub mod png;

/// Writes `image` as PGM or PNG depending on the extension of `path`.
pub fn save_image(image: ImageRect<'_, u8>, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let mut bytes = Vec::new();
    match extension.as_deref() {
        Some("pgm") => pgm::encode_pgm(image, &mut bytes)?,
        Some("png") => png::encode_png(image, &mut bytes)?,
        _ => {
            return Err(eyre!(
                "Output image file {} should end in .pgm or .png",
                path.display()
            ));
        }
    }
    std::fs::write(path, bytes).wrap_err_with(|| format!("Cannot write {}", path.display()))
}
