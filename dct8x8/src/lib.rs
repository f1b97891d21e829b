// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![deny(unsafe_code)]
pub mod basis;
pub mod engine;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod psnr;
pub mod quant;
pub mod util;

/// Side of a tile, in samples.
pub const BLOCK_DIM: usize = 8;
pub const BLOCK_SIZE: usize = BLOCK_DIM * BLOCK_DIM;
