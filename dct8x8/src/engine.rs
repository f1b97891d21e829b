// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Transform engines: DCT, quantization and inverse DCT over whole planes,
//! one independent 8x8 tile at a time.

use crate::{
    BLOCK_DIM,
    basis::Block,
    error::{Error, Result},
    image::{ImageDataType, ImageRect, ImageRectMut, check_same_size},
};

mod parallel;
mod sampler;
mod sequential;

pub use parallel::ParallelEngine;
pub use sampler::ClampedSampler;
pub use sequential::SequentialEngine;

/// The transform stage of the pipeline.
///
/// Every entry point validates its arguments before any tile is touched, so a
/// failed call leaves the destination untouched. No engine keeps state across
/// calls.
pub trait TransformEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Writes the 2D DCT-II of every tile of `src` into the same tile of `dst`.
    fn forward_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()>;

    /// Writes the 2D DCT-III of every tile of `src` into the same tile of `dst`.
    fn inverse_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()>;

    /// Quantizes coefficients in place with the step table.
    fn quantize(&self, plane: ImageRectMut<'_, f32>) -> Result<()>;

    /// Same as [`TransformEngine::quantize`], for 16-bit integer coefficients.
    fn quantize_short(&self, plane: ImageRectMut<'_, i16>) -> Result<()>;
}

pub fn check_tile_aligned(size: (usize, usize)) -> Result<()> {
    if !size.0.is_multiple_of(BLOCK_DIM) || !size.1.is_multiple_of(BLOCK_DIM) {
        return Err(Error::NotTileAligned(size.0, size.1));
    }
    Ok(())
}

pub(crate) fn check_transform_args(src: (usize, usize), dst: (usize, usize)) -> Result<()> {
    check_tile_aligned(src)?;
    check_same_size(src, dst)
}

/// Top-left corners of all tiles of a plane of the given size, in raster order.
pub fn tile_origins(size: (usize, usize)) -> impl Iterator<Item = (usize, usize)> {
    (0..size.1 / BLOCK_DIM).flat_map(move |ty| {
        (0..size.0 / BLOCK_DIM).map(move |tx| (tx * BLOCK_DIM, ty * BLOCK_DIM))
    })
}

pub(crate) fn load_block(src: &ImageRect<'_, f32>, origin: (usize, usize)) -> Block {
    std::array::from_fn(|y| {
        let row = &src.row(origin.1 + y)[origin.0..origin.0 + BLOCK_DIM];
        std::array::from_fn(|x| row[x])
    })
}

/// Exclusive access to the samples of one tile of a plane.
pub(crate) struct TileMut<'a, T: ImageDataType> {
    /// Position of the top-left sample in the plane.
    pub origin: (usize, usize),
    rows: Vec<&'a mut [T]>,
}

impl<T: ImageDataType> TileMut<'_, T> {
    /// Calls `f` on every sample with its position inside the tile.
    pub fn apply(&mut self, mut f: impl FnMut((usize, usize), &mut T)) {
        for (y, row) in self.rows.iter_mut().enumerate() {
            for (x, v) in row.iter_mut().enumerate() {
                f((x, y), v);
            }
        }
    }
}

impl TileMut<'_, f32> {
    pub fn store(&mut self, block: &Block) {
        for (row, values) in self.rows.iter_mut().zip(block.iter()) {
            row.copy_from_slice(values);
        }
    }
}

/// Splits a tile-aligned plane into disjoint tiles, in raster order.
pub(crate) fn split_into_tiles<'a, T: ImageDataType>(
    plane: &'a mut ImageRectMut<'_, T>,
) -> Vec<TileMut<'a, T>> {
    let (xsize, ysize) = plane.size();
    debug_assert!(check_tile_aligned((xsize, ysize)).is_ok());
    let tiles_x = xsize / BLOCK_DIM;
    let mut tiles: Vec<TileMut<'a, T>> = tile_origins((xsize, ysize))
        .map(|origin| TileMut {
            origin,
            rows: Vec::with_capacity(BLOCK_DIM),
        })
        .collect();
    for (y, row) in plane.rows_mut().enumerate() {
        let band = y / BLOCK_DIM;
        let band_tiles = &mut tiles[band * tiles_x..(band + 1) * tiles_x];
        for (tile, samples) in band_tiles.iter_mut().zip(row.chunks_exact_mut(BLOCK_DIM)) {
            tile.rows.push(samples);
        }
    }
    tiles
}
