// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The 8-point DCT-II basis and the separable row/column transforms built on it.

use std::array;

use crate::BLOCK_DIM;

/// One 8x8 tile worth of samples or coefficients, indexed `[y][x]`.
pub type Block = [[f32; BLOCK_DIM]; BLOCK_DIM];

// c(u) * cos(k * pi / 16), with c(0) = sqrt(1/8) and c(u) = sqrt(2/8) otherwise.
#[allow(clippy::excessive_precision)]
const C_NORM: f32 = 0.353553390593273762;
#[allow(clippy::excessive_precision)]
const C1: f32 = 0.490392640201615225;
#[allow(clippy::excessive_precision)]
const C2: f32 = 0.461939766255643378;
#[allow(clippy::excessive_precision)]
const C3: f32 = 0.415734806151272619;
#[allow(clippy::excessive_precision)]
const C5: f32 = 0.277785116509801112;
#[allow(clippy::excessive_precision)]
const C6: f32 = 0.191341716182544886;
#[allow(clippy::excessive_precision)]
const C7: f32 = 0.097545161008064133;

/// Orthonormal DCT-II basis: `DCT_BASIS[u][x]` is the weight of sample `x` in
/// frequency `u`. Forward transform of a tile `T` is `D * T * D^t`, inverse is
/// `D^t * T * D`. Both engines read this table and nothing else.
#[rustfmt::skip]
pub const DCT_BASIS: Block = [
    [C_NORM,  C_NORM,  C_NORM,  C_NORM,  C_NORM,  C_NORM,  C_NORM,  C_NORM],
    [C1,      C3,      C5,      C7,     -C7,     -C5,     -C3,     -C1],
    [C2,      C6,     -C6,     -C2,     -C2,     -C6,      C6,      C2],
    [C3,     -C7,     -C1,     -C5,      C5,      C1,      C7,     -C3],
    [C_NORM, -C_NORM, -C_NORM,  C_NORM,  C_NORM, -C_NORM, -C_NORM,  C_NORM],
    [C5,     -C1,      C7,      C3,     -C3,     -C7,      C1,     -C5],
    [C6,     -C2,      C2,     -C6,     -C6,      C2,     -C2,      C6],
    [C7,     -C5,      C3,     -C1,      C1,     -C3,      C5,     -C7],
];

/// 8-point DCT-II.
#[inline(always)]
pub fn dct_1d(input: &[f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    array::from_fn(|u| {
        let mut sum = 0.0;
        for x in 0..BLOCK_DIM {
            sum += DCT_BASIS[u][x] * input[x];
        }
        sum
    })
}

/// 8-point DCT-III, the inverse of [`dct_1d`].
#[inline(always)]
pub fn idct_1d(input: &[f32; BLOCK_DIM]) -> [f32; BLOCK_DIM] {
    array::from_fn(|x| {
        let mut sum = 0.0;
        for u in 0..BLOCK_DIM {
            sum += DCT_BASIS[u][x] * input[u];
        }
        sum
    })
}

pub fn transpose(block: &Block) -> Block {
    array::from_fn(|y| array::from_fn(|x| block[x][y]))
}

fn rows_then_columns(block: &Block, transform: fn(&[f32; BLOCK_DIM]) -> [f32; BLOCK_DIM]) -> Block {
    let rows: Block = array::from_fn(|y| transform(&block[y]));
    let columns = transpose(&rows);
    let columns: Block = array::from_fn(|x| transform(&columns[x]));
    transpose(&columns)
}

/// 2D DCT-II of a tile: 1D transform of every row, then of every column.
pub fn forward_dct_block(block: &Block) -> Block {
    rows_then_columns(block, dct_1d)
}

/// 2D DCT-III of a tile, in the same row then column order as [`forward_dct_block`].
pub fn inverse_dct_block(block: &Block) -> Block {
    rows_then_columns(block, idct_1d)
}
