// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::{Error, Result};

/// Region of interest inside a plane. Does not own memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub origin: (usize, usize),
    // width, height
    pub size: (usize, usize),
}

impl Rect {
    pub const fn new(origin: (usize, usize), size: (usize, usize)) -> Rect {
        Rect { origin, size }
    }

    pub const fn from_size(size: (usize, usize)) -> Rect {
        Rect {
            origin: (0, 0),
            size,
        }
    }

    pub fn is_within(&self, size: (usize, usize)) -> Result<()> {
        if self
            .origin
            .0
            .checked_add(self.size.0)
            .ok_or(Error::ArithmeticOverflow)?
            > size.0
            || self
                .origin
                .1
                .checked_add(self.size.1)
                .ok_or(Error::ArithmeticOverflow)?
                > size.1
        {
            Err(Error::RectOutOfBounds(
                self.size.0,
                self.size.1,
                self.origin.0,
                self.origin.1,
                size.0,
                size.1,
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) const fn offset_by(self, origin: (usize, usize)) -> Rect {
        Rect {
            origin: (self.origin.0 + origin.0, self.origin.1 + origin.1),
            size: self.size,
        }
    }
}
