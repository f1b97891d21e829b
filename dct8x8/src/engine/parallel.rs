// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Data-parallel engine.
//!
//! The plane is cut into one work-group per tile. Work-groups share nothing
//! and run in any order (on the rayon pool when the `parallel` feature is
//! enabled). Inside a work-group, each of the 64 lanes owns one output sample;
//! the transform is expressed as two constant-matrix products, `D * T` and
//! then `(D * T) * D^t`, with a barrier between them.
//!
//! Lanes are a CPU model of the per-sample threads of a GPU kernel: the lanes
//! of one work-group run one after another on the thread that owns the tile,
//! and the barrier is the point where a phase returns its finished block.
//! Only work-groups run concurrently.

#[cfg(feature = "parallel")]
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    BLOCK_DIM,
    basis::{Block, DCT_BASIS},
    error::Result,
    image::{ImageDataType, ImageRect, ImageRectMut},
    quant::{QUANT_TABLE, quantize_f32, quantize_i16},
    util::tracing_wrappers::*,
};

use super::{
    ClampedSampler, TileMut, TransformEngine, check_tile_aligned, check_transform_args,
    split_into_tiles,
};

/// One execution thread of a work-group, responsible for output sample `(x, y)`.
#[derive(Clone, Copy, Debug)]
struct Lane {
    x: usize,
    y: usize,
}

/// Runs `kernel` once for every lane of a work-group, sequentially, and
/// gathers the per-lane results. The block is only returned once every lane
/// has finished, which makes the return the barrier between consecutive
/// phases.
#[inline(always)]
fn run_phase(kernel: impl Fn(Lane) -> f32) -> Block {
    std::array::from_fn(|y| std::array::from_fn(|x| kernel(Lane { x, y })))
}

/// State of the work-group processing one tile.
struct WorkGroup {
    /// Tile-local copy of the source block, read once from the plane.
    cache: Block,
    /// Intermediate product written by the first phase and read by the second.
    shared: Block,
}

impl WorkGroup {
    fn load(sampler: &ClampedSampler<'_, f32>, origin: (usize, usize)) -> WorkGroup {
        let (x0, y0) = (origin.0 as isize, origin.1 as isize);
        WorkGroup {
            cache: run_phase(|lane| sampler.sample(x0 + lane.x as isize, y0 + lane.y as isize)),
            shared: [[0.0; BLOCK_DIM]; BLOCK_DIM],
        }
    }

    /// `D * T * D^t`.
    fn forward(&mut self) -> Block {
        let cache = &self.cache;
        self.shared = run_phase(|lane| {
            let mut sum = 0.0;
            for k in 0..BLOCK_DIM {
                sum += DCT_BASIS[lane.y][k] * cache[k][lane.x];
            }
            sum
        });
        let shared = &self.shared;
        run_phase(|lane| {
            let mut sum = 0.0;
            for k in 0..BLOCK_DIM {
                sum += shared[lane.y][k] * DCT_BASIS[lane.x][k];
            }
            sum
        })
    }

    /// `D^t * T * D`.
    fn inverse(&mut self) -> Block {
        let cache = &self.cache;
        self.shared = run_phase(|lane| {
            let mut sum = 0.0;
            for k in 0..BLOCK_DIM {
                sum += DCT_BASIS[k][lane.y] * cache[k][lane.x];
            }
            sum
        });
        let shared = &self.shared;
        run_phase(|lane| {
            let mut sum = 0.0;
            for k in 0..BLOCK_DIM {
                sum += shared[lane.y][k] * DCT_BASIS[k][lane.x];
            }
            sum
        })
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Forward,
    Inverse,
}

/// Engine running each tile as an independent work-group.
#[derive(Clone, Debug, Default)]
pub struct ParallelEngine {
    #[cfg(feature = "parallel")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ParallelEngine {
    /// Runs work-groups on the global rayon pool, or inline when the
    /// `parallel` feature is disabled.
    pub fn new() -> ParallelEngine {
        ParallelEngine::default()
    }

    /// Runs work-groups on `pool` instead of the global pool.
    #[cfg(feature = "parallel")]
    pub fn with_thread_pool(pool: Arc<rayon::ThreadPool>) -> ParallelEngine {
        ParallelEngine { pool: Some(pool) }
    }

    /// Launches one work-group per tile and waits for all of them.
    fn dispatch<'a, T: ImageDataType>(
        &self,
        tiles: Vec<TileMut<'a, T>>,
        kernel: impl Fn(TileMut<'a, T>) + Send + Sync,
    ) {
        trace!("dispatching {} work-groups", tiles.len());
        #[cfg(feature = "parallel")]
        match &self.pool {
            Some(pool) => pool.install(|| tiles.into_par_iter().for_each(kernel)),
            None => tiles.into_par_iter().for_each(kernel),
        }
        #[cfg(not(feature = "parallel"))]
        tiles.into_iter().for_each(kernel);
    }

    fn transform(
        &self,
        src: ImageRect<'_, f32>,
        mut dst: ImageRectMut<'_, f32>,
        direction: Direction,
    ) -> Result<()> {
        check_transform_args(src.size(), dst.size())?;
        let num_tiles = src.size().0 / BLOCK_DIM * (src.size().1 / BLOCK_DIM);
        if num_tiles == 0 {
            return Ok(());
        }
        debug!("{direction:?} transform of {src:?}: {num_tiles} work-groups");
        let sampler = ClampedSampler::new(src)?;
        self.dispatch(split_into_tiles(&mut dst), |mut tile| {
            let mut group = WorkGroup::load(&sampler, tile.origin);
            let block = match direction {
                Direction::Forward => group.forward(),
                Direction::Inverse => group.inverse(),
            };
            tile.store(&block);
        });
        Ok(())
    }
}

impl TransformEngine for ParallelEngine {
    fn name(&self) -> &'static str {
        "parallel"
    }

    #[instrument(skip_all, err)]
    fn forward_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()> {
        self.transform(src, dst, Direction::Forward)
    }

    #[instrument(skip_all, err)]
    fn inverse_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()> {
        self.transform(src, dst, Direction::Inverse)
    }

    // One lane per coefficient, no communication between lanes.
    #[instrument(skip_all, err)]
    fn quantize(&self, mut plane: ImageRectMut<'_, f32>) -> Result<()> {
        check_tile_aligned(plane.size())?;
        self.dispatch(split_into_tiles(&mut plane), |mut tile| {
            tile.apply(|(x, y), v| *v = quantize_f32(*v, QUANT_TABLE[y][x]));
        });
        Ok(())
    }

    #[instrument(skip_all, err)]
    fn quantize_short(&self, mut plane: ImageRectMut<'_, i16>) -> Result<()> {
        check_tile_aligned(plane.size())?;
        self.dispatch(split_into_tiles(&mut plane), |mut tile| {
            tile.apply(|(x, y), v| *v = quantize_i16(*v, QUANT_TABLE[y][x]));
        });
        Ok(())
    }
}
