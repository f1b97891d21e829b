// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::path::PathBuf;
use std::process::{Command, Output};

use dct8x8::image::Image;
use dct8x8_cli::{dec::load_image, enc::save_image};
use dct8x8_test_utils::random_samples;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dct8x8_cli_{}_{name}", std::process::id()))
}

fn write_input(name: &str, size: (usize, usize)) -> PathBuf {
    let samples = random_samples(size.0, size.1, 42);
    let mut image = Image::<u8>::new(size).unwrap();
    image
        .as_rect_mut()
        .apply(|(x, y), v| *v = samples[y * size.0 + x]);
    let path = temp_path(name);
    save_image(image.as_rect(), &path).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dct8x8"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn reconstructs_with_both_engines() {
    let input = write_input("input.pgm", (64, 64));
    let reference = temp_path("reference.pgm");
    let accelerated = temp_path("accelerated.png");
    let output = run(&[
        input.to_str().unwrap(),
        "--reference-out",
        reference.to_str().unwrap(),
        "--accelerated-out",
        accelerated.to_str().unwrap(),
        "--iterations",
        "3",
        "--num-threads",
        "2",
    ]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sequential"));
    assert!(stdout.contains("parallel"));
    assert!(stdout.contains("Engines agree"));

    let reference_image = load_image(&reference).unwrap();
    let accelerated_image = load_image(&accelerated).unwrap();
    assert_eq!(reference_image.size(), (64, 64));
    assert_eq!(accelerated_image.size(), (64, 64));
    for path in [input, reference, accelerated] {
        std::fs::remove_file(path).unwrap();
    }
}

#[test]
fn short_quantizer() {
    let input = write_input("short.png", (32, 16));
    let output = run(&[input.to_str().unwrap(), "--quantizer", "short"]);
    assert!(output.status.success(), "{output:?}");
    std::fs::remove_file(input).unwrap();
}

#[test]
fn unreachable_floor_fails() {
    let input = write_input("floor.pgm", (16, 16));
    // No PSNR exceeds infinity.
    let output = run(&[input.to_str().unwrap(), "--min-psnr", "inf"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Engines diverge"));
    std::fs::remove_file(input).unwrap();
}

#[test]
fn unaligned_input() {
    let input = write_input("unaligned.pgm", (65, 64));
    let output = run(&[input.to_str().unwrap()]);
    assert!(!output.status.success());
    let output = run(&[input.to_str().unwrap(), "--crop"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Image size: 65 x 64"));
    std::fs::remove_file(input).unwrap();
}

#[test]
fn missing_input() {
    let output = run(&[temp_path("does_not_exist.pgm").to_str().unwrap()]);
    assert!(!output.status.success());
}
