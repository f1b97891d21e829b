// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

#[macro_export]
macro_rules! assert_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                let diff = if *left_val > *right_val {
                    *left_val - *right_val
                } else {
                    *right_val - *left_val
                };
                if !(diff <= $max_error) {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`",
                        left_val, right_val, $max_error
                    );
                }
            }
        }
    };
}

#[macro_export]
macro_rules! assert_all_almost_eq {
    ($left:expr, $right:expr, $max_error:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                if left_val.len() != right_val.len() {
                    panic!(
                        "assertion failed: `(left ≈ right)`\n left.len(): `{}`,\n right.len(): `{}`",
                        left_val.len(),
                        right_val.len()
                    );
                }
                for index in 0..left_val.len() {
                    let (l, r) = (left_val[index], right_val[index]);
                    let diff = if l > r { l - r } else { r - l };
                    if !(diff <= $max_error) {
                        panic!(
                            "assertion failed: `(left ≈ right)`\n left: `{:?}`,\n right: `{:?}`,\n max_error: `{:?}`,\n left[{}]: `{:?}`,\n right[{}]: `{:?}`",
                            left_val, right_val, $max_error, index, l, index, r
                        );
                    }
                }
            }
        }
    };
}

/// Uniformly distributed 8-bit samples, `width * height` of them in row-major order.
pub fn random_samples(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..width * height).map(|_| rng.random()).collect()
}

/// A smooth sinusoidal pattern with a little noise on top, closer to natural
/// image content than [`random_samples`].
pub fn smooth_samples(width: usize, height: usize, seed: u64) -> Vec<u8> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| {
            let base = 128.0 + 60.0 * (x as f32 / 7.0).sin() + 50.0 * (y as f32 / 5.0).cos();
            let noise = rng.random_range(-4.0..=4.0);
            (base + noise).round().clamp(0.0, 255.0) as u8
        })
        .collect()
}
