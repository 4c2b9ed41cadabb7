use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::process::Command;

fn mandel() -> Command {
    Command::cargo_bin("mandel").unwrap()
}

#[test]
fn renders_a_png_of_the_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("plane.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "40x30", "-c", "lch", "-i", "60"])
        .assert()
        .success();
    let img = image::open(&out).unwrap();
    assert_eq!(img.dimensions(), (40, 30));
    let rgba = img.to_rgba();
    // 40x30 with the default view puts a pixel center inside the main
    // cardioid at (23, 15).
    assert_eq!(rgba.get_pixel(23, 15).0, [0, 0, 0, 255]);
}

#[test]
fn explicit_viewport_and_threads() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("zoom.png");
    mandel()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "-s",
            "16x16",
            "--leftlower=-0.5,-0.25",
            "--rightupper=0.0,0.25",
            "-t",
            "1",
        ])
        .assert()
        .success();
    // The whole region sits inside the cardioid.
    let img = image::open(&out).unwrap().to_rgba();
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn rejects_an_unknown_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nope.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-c", "ultraviolet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown color scheme"));
    assert!(!out.exists());
}

#[test]
fn rejects_zero_dimensions() {
    mandel()
        .args(&["-o", "never.png", "-s", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn rejects_sizes_the_encoder_cannot_hold() {
    mandel()
        .args(&["-o", "never.png", "-s", "5000000000x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn one_corner_is_not_enough() {
    mandel()
        .args(&["-o", "never.png", "--leftlower=-1.0,-1.0"])
        .assert()
        .failure();
}

#[test]
fn reports_write_failures() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("plane.png");
    mandel()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Render failure"));
}
