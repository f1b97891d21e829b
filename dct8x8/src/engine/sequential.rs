// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    BLOCK_DIM,
    basis::{Block, forward_dct_block, inverse_dct_block},
    error::Result,
    image::{ImageRect, ImageRectMut},
    quant::{quant_step, quantize_f32, quantize_i16},
    util::tracing_wrappers::*,
};

use super::{
    TransformEngine, check_tile_aligned, check_transform_args, load_block, tile_origins,
};

/// Reference engine: walks the tiles in raster order on the calling thread and
/// transforms each one with separate row and column passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialEngine;

fn transform_tiles(
    src: ImageRect<'_, f32>,
    mut dst: ImageRectMut<'_, f32>,
    transform: fn(&Block) -> Block,
) -> Result<()> {
    check_transform_args(src.size(), dst.size())?;
    for origin in tile_origins(src.size()) {
        let block = transform(&load_block(&src, origin));
        for (y, values) in block.iter().enumerate() {
            dst.row(origin.1 + y)[origin.0..origin.0 + BLOCK_DIM].copy_from_slice(values);
        }
    }
    Ok(())
}

impl TransformEngine for SequentialEngine {
    fn name(&self) -> &'static str {
        "sequential"
    }

    #[instrument(skip_all, err)]
    fn forward_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()> {
        trace!("forward DCT of {src:?}");
        transform_tiles(src, dst, forward_dct_block)
    }

    #[instrument(skip_all, err)]
    fn inverse_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()> {
        trace!("inverse DCT of {src:?}");
        transform_tiles(src, dst, inverse_dct_block)
    }

    #[instrument(skip_all, err)]
    fn quantize(&self, mut plane: ImageRectMut<'_, f32>) -> Result<()> {
        check_tile_aligned(plane.size())?;
        plane.apply(|(x, y), v| *v = quantize_f32(*v, quant_step(x, y)));
        Ok(())
    }

    #[instrument(skip_all, err)]
    fn quantize_short(&self, mut plane: ImageRectMut<'_, i16>) -> Result<()> {
        check_tile_aligned(plane.size())?;
        plane.apply(|(x, y), v| *v = quantize_i16(*v, quant_step(x, y)));
        Ok(())
    }
}
