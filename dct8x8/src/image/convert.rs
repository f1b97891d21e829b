// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Sample type conversions between planes of equal size.

use crate::error::Result;

use super::{ImageDataType, ImageRect, ImageRectMut, check_same_size};

fn convert_rows<S: ImageDataType, D: ImageDataType>(
    src: ImageRect<'_, S>,
    mut dst: ImageRectMut<'_, D>,
    f: impl Fn(S) -> D,
) -> Result<()> {
    check_same_size(src.size(), dst.size())?;
    for (src_row, dst_row) in src.rows().zip(dst.rows_mut()) {
        for (s, d) in src_row.iter().zip(dst_row.iter_mut()) {
            *d = f(*s);
        }
    }
    Ok(())
}

pub fn copy_u8_to_f32(src: ImageRect<'_, u8>, dst: ImageRectMut<'_, f32>) -> Result<()> {
    convert_rows(src, dst, f32::from)
}

/// Rounds half away from zero and clamps to the 8-bit range.
pub fn copy_f32_to_u8(src: ImageRect<'_, f32>, dst: ImageRectMut<'_, u8>) -> Result<()> {
    convert_rows(src, dst, |v| v.round().clamp(0.0, 255.0) as u8)
}

/// Rounds half away from zero and saturates to the 16-bit range.
pub fn copy_f32_to_i16(src: ImageRect<'_, f32>, dst: ImageRectMut<'_, i16>) -> Result<()> {
    convert_rows(src, dst, |v| {
        v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
    })
}

pub fn copy_i16_to_f32(src: ImageRect<'_, i16>, dst: ImageRectMut<'_, f32>) -> Result<()> {
    convert_rows(src, dst, f32::from)
}

pub fn add_scalar(value: f32, mut plane: ImageRectMut<'_, f32>) {
    plane
        .rows_mut()
        .for_each(|row| row.iter_mut().for_each(|v| *v += value));
}
