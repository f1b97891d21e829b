// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Peak signal-to-noise ratio between 8-bit planes, and the verdict derived
//! from it when comparing two engines.

use crate::{
    error::Result,
    image::{ImageRect, check_same_size},
};

pub const MAX_SAMPLE_VALUE: f64 = 255.0;

/// Near-identity floor for reconstructions of the same input by two engines.
pub const EQUIVALENCE_MIN_PSNR: f32 = 40.0;

/// Mean squared error over all samples of two views of the same size. Empty
/// views have an error of zero.
pub fn mse(a: ImageRect<'_, u8>, b: ImageRect<'_, u8>) -> Result<f64> {
    check_same_size(a.size(), b.size())?;
    let (xsize, ysize) = a.size();
    let num_samples = xsize * ysize;
    if num_samples == 0 {
        return Ok(0.0);
    }
    let sum: u64 = a
        .rows()
        .zip(b.rows())
        .map(|(row_a, row_b)| {
            row_a
                .iter()
                .zip(row_b)
                .map(|(&x, &y)| {
                    let d = x.abs_diff(y) as u64;
                    d * d
                })
                .sum::<u64>()
        })
        .sum();
    Ok(sum as f64 / num_samples as f64)
}

/// `10 * log10(255^2 / MSE)`, or `f32::INFINITY` when the views are identical.
pub fn psnr(a: ImageRect<'_, u8>, b: ImageRect<'_, u8>) -> Result<f32> {
    let mse = mse(a, b)?;
    if mse == 0.0 {
        return Ok(f32::INFINITY);
    }
    Ok((10.0 * (MAX_SAMPLE_VALUE * MAX_SAMPLE_VALUE / mse).log10()) as f32)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    Diverged,
}

impl Verdict {
    pub fn is_equivalent(self) -> bool {
        self == Verdict::Equivalent
    }
}

/// Decides whether two reconstructions are close enough to come from the
/// same transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquivalenceCheck {
    /// PSNR in dB that must be strictly exceeded.
    pub min_psnr: f32,
}

impl Default for EquivalenceCheck {
    fn default() -> Self {
        Self {
            min_psnr: EQUIVALENCE_MIN_PSNR,
        }
    }
}

impl EquivalenceCheck {
    pub fn verdict(&self, psnr: f32) -> Verdict {
        if psnr > self.min_psnr {
            Verdict::Equivalent
        } else {
            Verdict::Diverged
        }
    }

    pub fn check(&self, a: ImageRect<'_, u8>, b: ImageRect<'_, u8>) -> Result<(f32, Verdict)> {
        let psnr = psnr(a, b)?;
        Ok((psnr, self.verdict(psnr)))
    }
}
