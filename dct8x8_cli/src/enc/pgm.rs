// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::io::Write;

use color_eyre::eyre::Result;
use dct8x8::image::ImageRect;

pub fn encode_pgm<W: Write>(image: ImageRect<'_, u8>, buf: &mut W) -> Result<()> {
    let (width, height) = image.size();
    write!(buf, "P5\n{width} {height}\n255\n")?;
    for row in image.rows() {
        buf.write_all(row)?;
    }
    Ok(())
}
