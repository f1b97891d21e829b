// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use color_eyre::eyre::Result;
use dct8x8::image::ImageRect;

/// Writes an 8-bit grayscale PNG.
pub fn encode_png<W: Write>(image: ImageRect<'_, u8>, buf: &mut W) -> Result<()> {
    let (width, height) = image.size();
    let mut encoder = png::Encoder::new(buf, width as u32, height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    let mut writer = encoder.write_header()?;
    {
        let mut stream = writer.stream_writer()?;
        for row in image.rows() {
            stream.write_all(row)?;
        }
        stream.finish()?;
    }
    writer.finish()?;
    Ok(())
}
