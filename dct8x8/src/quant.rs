// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Per-position scalar quantization of DCT coefficients.
//!
//! Quantization here simulates a lossy encode/decode round trip in a single
//! step: every coefficient is snapped to the nearest multiple of the step for
//! its intra-tile position. There is no separate encoded representation.

use crate::BLOCK_DIM;

/// Quantization step for each intra-tile position, indexed `[v][u]`.
#[rustfmt::skip]
pub const QUANT_TABLE: [[u16; BLOCK_DIM]; BLOCK_DIM] = [
    [32, 33, 51, 81, 66, 39, 34, 17],
    [33, 36, 48, 47, 28, 23, 12, 12],
    [51, 48, 47, 28, 23, 12, 12, 12],
    [81, 47, 28, 23, 12, 12, 12, 12],
    [66, 28, 23, 12, 12, 12, 12, 12],
    [39, 23, 12, 12, 12, 12, 12, 12],
    [34, 12, 12, 12, 12, 12, 12, 12],
    [17, 12, 12, 12, 12, 12, 12, 12],
];

/// Step for the coefficient at column `x`, row `y` of a plane; the position
/// inside the tile is what matters.
#[inline(always)]
pub fn quant_step(x: usize, y: usize) -> u16 {
    QUANT_TABLE[y % BLOCK_DIM][x % BLOCK_DIM]
}

/// Rounds `coefficient / step` half away from zero and scales it back.
#[inline(always)]
pub fn quantize_f32(coefficient: f32, step: u16) -> f32 {
    let step = step as f32;
    (coefficient / step).round() * step
}

/// Integer counterpart of [`quantize_f32`]; results outside the 16-bit range
/// saturate.
#[inline(always)]
pub fn quantize_i16(coefficient: i16, step: u16) -> i16 {
    let step = step as i32;
    let magnitude = (coefficient as i32).abs();
    let magnitude = (magnitude + (step >> 1)) / step * step;
    let quantized = if coefficient < 0 {
        -magnitude
    } else {
        magnitude
    };
    quantized.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn table_is_positive() {
        assert!(QUANT_TABLE.iter().flatten().all(|&q| q > 0));
    }

    #[test]
    fn step_wraps_per_tile() {
        assert_eq!(quant_step(0, 0), 32);
        assert_eq!(quant_step(3, 0), 81);
        assert_eq!(quant_step(11, 8), 81);
        assert_eq!(quant_step(8, 11), 81);
        assert_eq!(quant_step(15, 15), 12);
    }

    #[test]
    fn float_rounding() {
        assert_eq!(quantize_f32(0.0, 32), 0.0);
        assert_eq!(quantize_f32(15.9, 32), 0.0);
        assert_eq!(quantize_f32(16.0, 32), 32.0);
        assert_eq!(quantize_f32(-16.0, 32), -32.0);
        assert_eq!(quantize_f32(-15.9, 32), 0.0);
        assert_eq!(quantize_f32(100.0, 12), 96.0);
        assert_eq!(quantize_f32(-103.0, 12), -108.0);
    }

    #[test]
    fn integer_rounding() {
        assert_eq!(quantize_i16(0, 32), 0);
        assert_eq!(quantize_i16(15, 32), 0);
        assert_eq!(quantize_i16(16, 32), 32);
        assert_eq!(quantize_i16(-16, 32), -32);
        assert_eq!(quantize_i16(16, 33), 0);
        assert_eq!(quantize_i16(17, 33), 33);
        assert_eq!(quantize_i16(-103, 12), -108);
        assert_eq!(quantize_i16(i16::MAX, 81), i16::MAX);
        assert_eq!(quantize_i16(i16::MIN, 81), i16::MIN);
    }

    #[test]
    fn float_and_integer_agree() {
        arbtest::arbtest(|u| {
            let coefficient = u.int_in_range(-20000i16..=20000)?;
            let step = QUANT_TABLE[u.choose_index(BLOCK_DIM)?][u.choose_index(BLOCK_DIM)?];
            assert_eq!(
                quantize_f32(coefficient as f32, step),
                quantize_i16(coefficient, step) as f32
            );
            Ok(())
        });
    }

    #[test]
    fn float_idempotent() {
        arbtest::arbtest(|u| {
            let coefficient = u.int_in_range(-40000i32..=40000)? as f32 / 16.0;
            let step = QUANT_TABLE[u.choose_index(BLOCK_DIM)?][u.choose_index(BLOCK_DIM)?];
            let once = quantize_f32(coefficient, step);
            assert_eq!(quantize_f32(once, step), once);
            Ok(())
        });
    }

    #[test]
    fn integer_idempotent() {
        arbtest::arbtest(|u| {
            let coefficient = u.arbitrary::<i16>()?;
            let step = QUANT_TABLE[u.choose_index(BLOCK_DIM)?][u.choose_index(BLOCK_DIM)?];
            let once = quantize_i16(coefficient, step);
            assert_eq!(quantize_i16(once, step), once);
            Ok(())
        });
    }
}
