// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Runs a byte plane through level shift, forward DCT, quantization, inverse
//! DCT and back, timing each transform stage.

use std::time::{Duration, Instant};

use crate::{
    engine::{TransformEngine, check_tile_aligned},
    error::Result,
    image::{
        Image, ImageRect, ImageRectMut, add_scalar, check_same_size, copy_f32_to_i16,
        copy_f32_to_u8, copy_i16_to_f32, copy_u8_to_f32,
    },
    psnr::{EquivalenceCheck, Verdict, psnr},
    util::tracing_wrappers::*,
};

/// Representation of the coefficients while they are being quantized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuantizerKind {
    #[default]
    Float,
    /// Coefficients are rounded to 16-bit integers, quantized, and converted
    /// back to floats for the inverse transform.
    Short,
}

#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Number of timed repetitions of the transform stages. Zero is treated
    /// as one.
    pub iterations: usize,
    pub quantizer: QuantizerKind,
    /// Subtracted before the forward transform and added back after the
    /// inverse one.
    pub level_shift: f32,
    /// Used by [`compare_engines`] to judge the cross-engine PSNR.
    pub equivalence: EquivalenceCheck,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            quantizer: QuantizerKind::Float,
            level_shift: 128.0,
            equivalence: EquivalenceCheck::default(),
        }
    }
}

/// Wall-clock time spent in each transform stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub forward: Duration,
    pub quantize: Duration,
    pub inverse: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.forward + self.quantize + self.inverse
    }

    fn averaged(&self, iterations: usize) -> StageTimings {
        let n = iterations as f64;
        StageTimings {
            forward: self.forward.div_f64(n),
            quantize: self.quantize.div_f64(n),
            inverse: self.inverse.div_f64(n),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub engine: &'static str,
    /// Average over all iterations.
    pub timings: StageTimings,
    pub iterations: usize,
}

/// Working planes of one pipeline run. Allocated before anything is timed.
struct Planes {
    shifted: Image<f32>,
    coefficients: Image<f32>,
    reconstructed: Image<f32>,
    shorts: Option<Image<i16>>,
}

impl Planes {
    fn new(size: (usize, usize), quantizer: QuantizerKind) -> Result<Planes> {
        Ok(Planes {
            shifted: Image::new(size)?,
            coefficients: Image::new(size)?,
            reconstructed: Image::new(size)?,
            shorts: match quantizer {
                QuantizerKind::Float => None,
                QuantizerKind::Short => Some(Image::new(size)?),
            },
        })
    }
}

fn timed(total: &mut Duration, stage: impl FnOnce() -> Result<()>) -> Result<()> {
    let start = Instant::now();
    stage()?;
    *total += start.elapsed();
    Ok(())
}

/// Reconstructs `src` into `dst` with `engine`.
///
/// Both views must have the same tile-aligned size. Every iteration starts
/// from the same level-shifted input, so the output does not depend on the
/// number of iterations.
#[instrument(skip_all, err)]
pub fn run_pipeline(
    engine: &dyn TransformEngine,
    src: ImageRect<'_, u8>,
    dst: ImageRectMut<'_, u8>,
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    check_tile_aligned(src.size())?;
    check_same_size(src.size(), dst.size())?;
    let iterations = options.iterations.max(1);
    debug!(
        "{} pipeline on {src:?}: {iterations} iterations, {:?} quantizer",
        engine.name(),
        options.quantizer
    );

    let mut planes = Planes::new(src.size(), options.quantizer)?;
    copy_u8_to_f32(src, planes.shifted.as_rect_mut())?;
    add_scalar(-options.level_shift, planes.shifted.as_rect_mut());

    let mut timings = StageTimings::default();
    for _ in 0..iterations {
        timed(&mut timings.forward, || {
            engine.forward_dct(planes.shifted.as_rect(), planes.coefficients.as_rect_mut())
        })?;
        timed(&mut timings.quantize, || match planes.shorts.as_mut() {
            None => engine.quantize(planes.coefficients.as_rect_mut()),
            Some(shorts) => {
                copy_f32_to_i16(planes.coefficients.as_rect(), shorts.as_rect_mut())?;
                engine.quantize_short(shorts.as_rect_mut())?;
                copy_i16_to_f32(shorts.as_rect(), planes.coefficients.as_rect_mut())
            }
        })?;
        timed(&mut timings.inverse, || {
            engine.inverse_dct(
                planes.coefficients.as_rect(),
                planes.reconstructed.as_rect_mut(),
            )
        })?;
    }

    add_scalar(options.level_shift, planes.reconstructed.as_rect_mut());
    copy_f32_to_u8(planes.reconstructed.as_rect(), dst)?;

    let timings = timings.averaged(iterations);
    trace!("{} stage timings: {timings:?}", engine.name());
    Ok(PipelineReport {
        engine: engine.name(),
        timings,
        iterations,
    })
}

/// Outcome of running the same input through two engines.
#[derive(Debug)]
pub struct EngineComparison {
    pub reference: Image<u8>,
    pub candidate: Image<u8>,
    pub reference_report: PipelineReport,
    pub candidate_report: PipelineReport,
    /// Reference reconstruction against the input.
    pub reference_psnr: f32,
    /// Candidate reconstruction against the input.
    pub candidate_psnr: f32,
    /// Reference reconstruction against the candidate one.
    pub cross_psnr: f32,
    pub verdict: Verdict,
}

/// Reconstructs `src` with both engines and judges whether they agree.
///
/// Disagreement is reported through [`EngineComparison::verdict`]; only
/// invalid input and allocation failures are errors.
#[instrument(skip_all, err)]
pub fn compare_engines(
    reference: &dyn TransformEngine,
    candidate: &dyn TransformEngine,
    src: ImageRect<'_, u8>,
    options: &PipelineOptions,
) -> Result<EngineComparison> {
    check_tile_aligned(src.size())?;
    let mut reference_out = Image::<u8>::new(src.size())?;
    let mut candidate_out = Image::<u8>::new(src.size())?;
    let reference_report = run_pipeline(reference, src, reference_out.as_rect_mut(), options)?;
    let candidate_report = run_pipeline(candidate, src, candidate_out.as_rect_mut(), options)?;

    let reference_psnr = psnr(src, reference_out.as_rect())?;
    let candidate_psnr = psnr(src, candidate_out.as_rect())?;
    let (cross_psnr, verdict) = options
        .equivalence
        .check(reference_out.as_rect(), candidate_out.as_rect())?;
    info!(
        "{} vs {}: {cross_psnr:.2} dB ({verdict:?})",
        reference.name(),
        candidate.name()
    );

    Ok(EngineComparison {
        reference: reference_out,
        candidate: candidate_out,
        reference_report,
        candidate_report,
        reference_psnr,
        candidate_psnr,
        cross_psnr,
        verdict,
    })
}

#[cfg(test)]
mod test {
    use dct8x8_test_utils::smooth_samples;
    use test_log::test;

    use super::*;
    use crate::{
        engine::{ParallelEngine, SequentialEngine},
        error::Error,
        image::Rect,
    };

    fn plane_from(samples: &[u8], size: (usize, usize)) -> Result<Image<u8>> {
        let mut image = Image::<u8>::new(size)?;
        image
            .as_rect_mut()
            .apply(|(x, y), v| *v = samples[y * size.0 + x]);
        Ok(image)
    }

    #[test]
    fn default_options() {
        let options = PipelineOptions::default();
        assert_eq!(options.iterations, 1);
        assert_eq!(options.quantizer, QuantizerKind::Float);
        assert_eq!(options.level_shift, 128.0);
        assert_eq!(options.equivalence.min_psnr, 40.0);
    }

    #[test]
    fn timings_total_and_average() {
        let timings = StageTimings {
            forward: Duration::from_millis(30),
            quantize: Duration::from_millis(6),
            inverse: Duration::from_millis(24),
        };
        assert_eq!(timings.total(), Duration::from_millis(60));
        let averaged = timings.averaged(3);
        assert_eq!(averaged.forward, Duration::from_millis(10));
        assert_eq!(averaged.quantize, Duration::from_millis(2));
        assert_eq!(averaged.inverse, Duration::from_millis(8));
    }

    #[test]
    fn uniform_plane_is_exact() -> Result<()> {
        // The DC coefficient of a uniform tile is 8 times the shifted value,
        // which for these values is a multiple of the DC step.
        for value in [0u8, 124, 128, 132] {
            let src = Image::<u8>::new_with_value((16, 16), value)?;
            for engine in [&SequentialEngine as &dyn TransformEngine, &ParallelEngine::new()] {
                let mut dst = Image::<u8>::new((16, 16))?;
                run_pipeline(
                    engine,
                    src.as_rect(),
                    dst.as_rect_mut(),
                    &PipelineOptions::default(),
                )?;
                assert!(dst.as_rect().iter().all(|v| v == value));
            }
        }
        Ok(())
    }

    #[test]
    fn report_describes_run() -> Result<()> {
        let src = Image::<u8>::new_with_value((8, 8), 90)?;
        let mut dst = Image::<u8>::new((8, 8))?;
        let options = PipelineOptions {
            iterations: 4,
            ..Default::default()
        };
        let report = run_pipeline(&SequentialEngine, src.as_rect(), dst.as_rect_mut(), &options)?;
        assert_eq!(report.engine, "sequential");
        assert_eq!(report.iterations, 4);
        Ok(())
    }

    #[test]
    fn zero_iterations_runs_once() -> Result<()> {
        let samples = smooth_samples(16, 16, 2);
        let src = plane_from(&samples, (16, 16))?;
        let mut dst = Image::<u8>::new_with_value((16, 16), 0)?;
        let options = PipelineOptions {
            iterations: 0,
            ..Default::default()
        };
        let report = run_pipeline(&SequentialEngine, src.as_rect(), dst.as_rect_mut(), &options)?;
        assert_eq!(report.iterations, 1);
        assert!(psnr(src.as_rect(), dst.as_rect())? > 25.0);
        Ok(())
    }

    #[test]
    fn rejects_bad_planes_before_writing() -> Result<()> {
        let src = Image::<u8>::new((24, 20))?;
        let mut dst = Image::<u8>::new_with_value((24, 20), 9)?;
        assert!(matches!(
            run_pipeline(
                &SequentialEngine,
                src.as_rect(),
                dst.as_rect_mut(),
                &PipelineOptions::default()
            ),
            Err(Error::NotTileAligned(24, 20))
        ));
        assert!(dst.as_rect().iter().all(|v| v == 9));

        let src = Image::<u8>::new((16, 16))?;
        let mut dst = Image::<u8>::new((16, 8))?;
        assert!(matches!(
            run_pipeline(
                &SequentialEngine,
                src.as_rect(),
                dst.as_rect_mut(),
                &PipelineOptions::default()
            ),
            Err(Error::SizeMismatch(16, 16, 16, 8))
        ));
        Ok(())
    }

    #[test]
    fn writes_only_the_roi() -> Result<()> {
        let samples = smooth_samples(32, 32, 8);
        let src = plane_from(&samples, (32, 32))?;
        let mut dst = Image::<u8>::new_with_value((32, 32), 1)?;
        let roi = Rect::new((8, 16), (16, 8));
        run_pipeline(
            &ParallelEngine::new(),
            src.as_rect().rect(roi)?,
            dst.as_rect_mut().into_rect(roi)?,
            &PipelineOptions::default(),
        )?;
        for y in 0..32 {
            for x in 0..32 {
                if !(8..24).contains(&x) || !(16..24).contains(&y) {
                    assert_eq!(dst.as_rect().row(y)[x], 1);
                }
            }
        }
        assert!(psnr(src.as_rect().rect(roi)?, dst.as_rect().rect(roi)?)? > 25.0);
        Ok(())
    }

    #[test]
    fn compare_keeps_both_outputs() -> Result<()> {
        let samples = smooth_samples(32, 16, 4);
        let src = plane_from(&samples, (32, 16))?;
        let comparison = compare_engines(
            &SequentialEngine,
            &ParallelEngine::new(),
            src.as_rect(),
            &PipelineOptions::default(),
        )?;
        assert_eq!(comparison.reference.size(), (32, 16));
        assert_eq!(comparison.candidate.size(), (32, 16));
        assert_eq!(comparison.reference_report.engine, "sequential");
        assert_eq!(comparison.candidate_report.engine, "parallel");
        assert_eq!(
            comparison.reference_psnr,
            psnr(src.as_rect(), comparison.reference.as_rect())?
        );
        assert!(comparison.cross_psnr > 40.0);
        assert_eq!(comparison.verdict, Verdict::Equivalent);
        Ok(())
    }

    #[test]
    fn divergence_is_a_verdict() -> Result<()> {
        let samples = smooth_samples(16, 16, 6);
        let src = plane_from(&samples, (16, 16))?;
        // Negates the reconstructed samples.
        struct Inverted;
        impl TransformEngine for Inverted {
            fn name(&self) -> &'static str {
                "inverted"
            }
            fn forward_dct(&self, src: ImageRect<'_, f32>, dst: ImageRectMut<'_, f32>) -> Result<()> {
                SequentialEngine.forward_dct(src, dst)
            }
            fn inverse_dct(
                &self,
                src: ImageRect<'_, f32>,
                mut dst: ImageRectMut<'_, f32>,
            ) -> Result<()> {
                SequentialEngine.inverse_dct(src, dst.rect(Rect::from_size(src.size()))?)?;
                dst.apply(|_, v| *v = -*v);
                Ok(())
            }
            fn quantize(&self, plane: ImageRectMut<'_, f32>) -> Result<()> {
                SequentialEngine.quantize(plane)
            }
            fn quantize_short(&self, plane: ImageRectMut<'_, i16>) -> Result<()> {
                SequentialEngine.quantize_short(plane)
            }
        }
        let comparison = compare_engines(
            &SequentialEngine,
            &Inverted,
            src.as_rect(),
            &PipelineOptions::default(),
        )?;
        assert_eq!(comparison.verdict, Verdict::Diverged);
        assert!(comparison.cross_psnr < 40.0);
        Ok(())
    }
}
