// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, eyre};
use dct8x8::engine::{ParallelEngine, SequentialEngine};
use dct8x8::image::Rect;
use dct8x8::pipeline::{PipelineOptions, PipelineReport, QuantizerKind, compare_engines};
use dct8x8::psnr::EquivalenceCheck;
use dct8x8_cli::{dec::load_image, enc::save_image, tile_aligned_rect};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Quantizer {
    /// Quantize 32-bit float coefficients
    Float,
    /// Round coefficients to 16-bit integers before quantizing
    Short,
}

impl From<Quantizer> for QuantizerKind {
    fn from(quantizer: Quantizer) -> Self {
        match quantizer {
            Quantizer::Float => QuantizerKind::Float,
            Quantizer::Short => QuantizerKind::Short,
        }
    }
}

#[derive(Parser)]
#[command(version, about = "Reconstructs a grayscale image through an 8x8 DCT pipeline with two engines and compares them")]
struct Opt {
    /// Input grayscale image, binary PGM or PNG
    input: PathBuf,

    /// If specified, writes the reconstruction of the sequential engine (.pgm or .png)
    #[clap(long)]
    reference_out: Option<PathBuf>,

    /// If specified, writes the reconstruction of the parallel engine (.pgm or .png)
    #[clap(long)]
    accelerated_out: Option<PathBuf>,

    /// Number of timed repetitions of the transform stages
    #[clap(long, default_value_t = 1)]
    iterations: usize,

    #[clap(long, value_enum, default_value_t = Quantizer::Float)]
    quantizer: Quantizer,

    /// Cross-engine PSNR in dB that must be exceeded
    #[clap(long, default_value_t = 40.0)]
    min_psnr: f32,

    /// Number of threads for the parallel engine; defaults to the number of CPUs
    #[clap(long)]
    num_threads: Option<usize>,

    /// Process only the largest tile-aligned region instead of rejecting
    /// images whose sides are not multiples of 8
    #[clap(long)]
    crop: bool,
}

fn parallel_engine(num_threads: Option<usize>) -> Result<ParallelEngine> {
    let Some(num_threads) = num_threads else {
        return Ok(ParallelEngine::new());
    };
    #[cfg(feature = "parallel")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()?;
        Ok(ParallelEngine::with_thread_pool(std::sync::Arc::new(pool)))
    }
    #[cfg(not(feature = "parallel"))]
    {
        eprintln!("Warning: built without the parallel feature, ignoring {num_threads} threads");
        Ok(ParallelEngine::new())
    }
}

fn ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

fn print_report(report: &PipelineReport, num_samples: usize) {
    let timings = &report.timings;
    let total = timings.total();
    println!(
        "{:>10}: forward {:.3} ms, quantize {:.3} ms, inverse {:.3} ms, total {:.3} ms ({:.2} MP/s, {} iterations)",
        report.engine,
        ms(timings.forward),
        ms(timings.quantize),
        ms(timings.inverse),
        ms(total),
        num_samples as f64 / total.as_secs_f64().max(f64::MIN_POSITIVE) * 1e-6,
        report.iterations,
    );
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    let image = load_image(&opt.input)?;
    println!("Image size: {} x {}", image.size().0, image.size().1);

    let rect = if opt.crop {
        let rect = tile_aligned_rect(image.size());
        if rect.size.0 == 0 || rect.size.1 == 0 {
            return Err(eyre!("Image is smaller than a single 8x8 tile"));
        }
        rect
    } else {
        Rect::from_size(image.size())
    };
    let src = image.as_rect().rect(rect)?;

    let options = PipelineOptions {
        iterations: opt.iterations,
        quantizer: opt.quantizer.into(),
        equivalence: EquivalenceCheck {
            min_psnr: opt.min_psnr,
        },
        ..Default::default()
    };
    let comparison = compare_engines(
        &SequentialEngine,
        &parallel_engine(opt.num_threads)?,
        src,
        &options,
    )?;

    let num_samples = src.size().0 * src.size().1;
    print_report(&comparison.reference_report, num_samples);
    print_report(&comparison.candidate_report, num_samples);
    println!(
        "PSNR {} vs input: {:.2} dB",
        comparison.reference_report.engine, comparison.reference_psnr
    );
    println!(
        "PSNR {} vs input: {:.2} dB",
        comparison.candidate_report.engine, comparison.candidate_psnr
    );
    println!(
        "PSNR {} vs {}: {:.2} dB",
        comparison.reference_report.engine,
        comparison.candidate_report.engine,
        comparison.cross_psnr
    );

    if let Some(path) = &opt.reference_out {
        save_image(comparison.reference.as_rect(), path)?;
    }
    if let Some(path) = &opt.accelerated_out {
        save_image(comparison.candidate.as_rect(), path)?;
    }

    if comparison.verdict.is_equivalent() {
        println!("Engines agree (above {:.2} dB)", opt.min_psnr);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Engines diverge (at or below {:.2} dB)", opt.min_psnr);
        Ok(ExitCode::FAILURE)
    }
}
