// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use dct8x8::{BLOCK_DIM, image::Rect};

pub mod dec;
pub mod enc;

/// Largest tile-aligned region anchored at the top-left corner of a plane.
pub fn tile_aligned_rect(size: (usize, usize)) -> Rect {
    Rect::from_size((
        size.0 / BLOCK_DIM * BLOCK_DIM,
        size.1 / BLOCK_DIM * BLOCK_DIM,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_rect() {
        assert_eq!(tile_aligned_rect((64, 64)), Rect::from_size((64, 64)));
        assert_eq!(tile_aligned_rect((65, 71)), Rect::from_size((64, 64)));
        assert_eq!(tile_aligned_rect((7, 9)), Rect::from_size((0, 8)));
    }
}
