// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    error::{Error, Result},
    image::{ImageDataType, ImageRect},
};

/// Reads samples of a plane with coordinates clamped to its edges, so that a
/// neighbourhood grazing the border repeats the outermost row or column.
#[derive(Clone, Copy, Debug)]
pub struct ClampedSampler<'a, T: ImageDataType> {
    plane: ImageRect<'a, T>,
    max_x: isize,
    max_y: isize,
}

impl<'a, T: ImageDataType> ClampedSampler<'a, T> {
    pub fn new(plane: ImageRect<'a, T>) -> Result<Self> {
        let (xsize, ysize) = plane.size();
        if xsize == 0 || ysize == 0 {
            return Err(Error::InvalidImageSize(xsize, ysize));
        }
        Ok(ClampedSampler {
            plane,
            max_x: xsize as isize - 1,
            max_y: ysize as isize - 1,
        })
    }

    #[inline(always)]
    pub fn sample(&self, x: isize, y: isize) -> T {
        let x = x.clamp(0, self.max_x) as usize;
        let y = y.clamp(0, self.max_y) as usize;
        self.plane.row(y)[x]
    }
}
