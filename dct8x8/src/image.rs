// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    error::{Error, Result},
    util::tracing_wrappers::*,
};

mod convert;
mod rect;

pub use convert::*;
pub use rect::Rect;

mod private {
    pub trait Sealed {}
}

const CACHE_LINE_BYTE_SIZE: usize = 64;

/// Rounds `size` elements of `T` up to a whole number of pairs of cache lines.
pub fn round_up_size_to_two_cache_lines<T>(size: usize) -> usize {
    let elements_per_cache_line = CACHE_LINE_BYTE_SIZE / std::mem::size_of::<T>() * 2;
    size.div_ceil(elements_per_cache_line) * elements_per_cache_line
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DataTypeTag {
    U8,
    I16,
    F32,
}

pub trait ImageDataType:
    private::Sealed + Copy + Default + 'static + Debug + PartialEq + Send + Sync
{
    /// ID of this data type. Different types *must* have different values.
    const DATA_TYPE_ID: DataTypeTag;
}

macro_rules! impl_image_data_type {
    ($ty: ty, $id: ident) => {
        impl private::Sealed for $ty {}
        impl ImageDataType for $ty {
            const DATA_TYPE_ID: DataTypeTag = DataTypeTag::$id;
        }
    };
}

impl_image_data_type!(u8, U8);
impl_image_data_type!(i16, I16);
impl_image_data_type!(f32, F32);

/// A plane of samples stored row-major, `stride()` elements apart.
///
/// The stride is padded past the width so that rows start on cache line
/// boundaries relative to the buffer start; code must always address rows
/// through `row()` / `rows_mut()` and never assume `stride == width`.
pub struct Image<T: ImageDataType> {
    size: (usize, usize),
    stride: usize,
    data: Vec<T>,
}

#[derive(Clone, Copy)]
pub struct ImageRect<'a, T: ImageDataType> {
    rect: Rect,
    image: &'a Image<T>,
}

pub struct ImageRectMut<'a, T: ImageDataType> {
    rect: Rect,
    image: &'a mut Image<T>,
}

impl<T: ImageDataType> Debug for Image<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {}x{} stride {}",
            T::DATA_TYPE_ID,
            self.size.0,
            self.size.1,
            self.stride
        )
    }
}

impl<T: ImageDataType> Debug for ImageRect<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {}x{}+{}+{}",
            T::DATA_TYPE_ID,
            self.rect.size.0,
            self.rect.size.1,
            self.rect.origin.0,
            self.rect.origin.1
        )
    }
}

impl<T: ImageDataType> Debug for ImageRectMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mut {:?} {}x{}+{}+{}",
            T::DATA_TYPE_ID,
            self.rect.size.0,
            self.rect.size.1,
            self.rect.origin.0,
            self.rect.origin.1
        )
    }
}

impl<T: ImageDataType> Image<T> {
    #[instrument(err)]
    pub fn new(size: (usize, usize)) -> Result<Image<T>> {
        let (xsize, ysize) = size;
        // These limits let us not worry about overflows.
        if xsize as u64 >= i64::MAX as u64 / 4 || ysize as u64 >= i64::MAX as u64 / 4 {
            return Err(Error::ImageSizeTooLarge(xsize, ysize));
        }
        if xsize == 0 || ysize == 0 {
            return Err(Error::InvalidImageSize(xsize, ysize));
        }
        let stride = round_up_size_to_two_cache_lines::<T>(xsize);
        let total_size = stride
            .checked_mul(ysize)
            .ok_or(Error::ImageSizeTooLarge(xsize, ysize))?;
        debug!("allocating {total_size} samples for image");
        let mut data = vec![];
        data.try_reserve_exact(total_size)?;
        data.resize(total_size, T::default());
        Ok(Image {
            size: (xsize, ysize),
            stride,
            data,
        })
    }

    pub fn new_with_value(size: (usize, usize), value: T) -> Result<Image<T>> {
        let mut ret = Self::new(size)?;
        ret.fill(value);
        Ok(ret)
    }

    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    /// Distance, in elements, between the starts of two consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn fill(&mut self, v: T) {
        self.as_rect_mut().rows_mut().for_each(|row| row.fill(v));
    }

    pub fn try_clone(&self) -> Result<Self> {
        let mut data = vec![];
        data.try_reserve_exact(self.data.len())?;
        data.extend_from_slice(&self.data);
        Ok(Image {
            size: self.size,
            stride: self.stride,
            data,
        })
    }

    pub fn as_rect(&self) -> ImageRect<'_, T> {
        ImageRect {
            rect: Rect::from_size(self.size),
            image: self,
        }
    }

    pub fn as_rect_mut(&mut self) -> ImageRectMut<'_, T> {
        ImageRectMut {
            rect: Rect::from_size(self.size),
            image: self,
        }
    }
}

impl<'a, T: ImageDataType> ImageRect<'a, T> {
    /// Returns the sub-view at `rect`, whose origin is relative to this view.
    pub fn rect(self, rect: Rect) -> Result<ImageRect<'a, T>> {
        rect.is_within(self.rect.size)?;
        Ok(ImageRect {
            rect: rect.offset_by(self.rect.origin),
            image: self.image,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.rect.size
    }

    pub fn row(&self, row: usize) -> &'a [T] {
        debug_assert!(row < self.rect.size.1);
        let start = (row + self.rect.origin.1) * self.image.stride + self.rect.origin.0;
        &self.image.data[start..start + self.rect.size.0]
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + use<'a, T> {
        let this = *self;
        (0..self.rect.size.1).map(move |y| this.row(y))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + use<'a, T> {
        self.rows().flat_map(|row| row.iter().copied())
    }

    pub fn to_image(&self) -> Result<Image<T>> {
        let mut image = Image::new(self.rect.size)?;
        image.as_rect_mut().copy_from(*self)?;
        Ok(image)
    }
}

impl<'a, T: ImageDataType> ImageRectMut<'a, T> {
    pub fn rect(&mut self, rect: Rect) -> Result<ImageRectMut<'_, T>> {
        rect.is_within(self.rect.size)?;
        Ok(ImageRectMut {
            rect: rect.offset_by(self.rect.origin),
            image: &mut *self.image,
        })
    }

    pub fn into_rect(self, rect: Rect) -> Result<ImageRectMut<'a, T>> {
        rect.is_within(self.rect.size)?;
        Ok(ImageRectMut {
            rect: rect.offset_by(self.rect.origin),
            image: self.image,
        })
    }

    pub fn size(&self) -> (usize, usize) {
        self.rect.size
    }

    pub fn row(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.rect.size.1);
        let start = (row + self.rect.origin.1) * self.image.stride + self.rect.origin.0;
        trace!("{self:?} row {row} start {start}");
        &mut self.image.data[start..start + self.rect.size.0]
    }

    /// Iterates over the rows of this view; the rows are disjoint slices, so
    /// they can be handed out to independent workers.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [T]> + '_ {
        let (x0, y0) = self.rect.origin;
        let (xsize, ysize) = self.rect.size;
        let stride = self.image.stride;
        self.image.data[y0 * stride..]
            .chunks_mut(stride)
            .take(ysize)
            .map(move |row| &mut row[x0..x0 + xsize])
    }

    pub fn as_rect(&self) -> ImageRect<'_, T> {
        ImageRect {
            rect: self.rect,
            image: &*self.image,
        }
    }

    #[instrument(skip_all)]
    pub fn copy_from(&mut self, other: ImageRect<'_, T>) -> Result<()> {
        check_same_size(other.size(), self.size())?;
        for (dst, src) in self.rows_mut().zip(other.rows()) {
            dst.copy_from_slice(src);
        }
        Ok(())
    }

    /// Applies `f` to all the pixels in this rect. As side information, `f` is passed the
    /// coordinates of the pixel relative to the rect.
    pub fn apply<F>(&mut self, mut f: F)
    where
        F: FnMut((usize, usize), &mut T),
    {
        self.rows_mut().enumerate().for_each(|(y, row)| {
            row.iter_mut()
                .enumerate()
                .for_each(|(x, v)| f((x, y), v))
        });
    }
}

pub(crate) fn check_same_size(src: (usize, usize), dst: (usize, usize)) -> Result<()> {
    if src != dst {
        return Err(Error::SizeMismatch(src.0, src.1, dst.0, dst.1));
    }
    Ok(())
}
