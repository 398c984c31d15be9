//! Edge case integration tests for the logic-vision binary.

use std::path::Path;
use std::process::{Command, Output};

use image::{Rgb, RgbImage};
use serde_json::Value;

// ─────────────────────── helpers ───────────────────────

fn logic_vision(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logic-vision"))
        .args(args)
        .env_remove("LOGIC_VISION_MODE")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch logic-vision")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// 2x2: black, white on top; red, blue below.
fn write_quad(path: &Path) {
    let mut img = RgbImage::new(2, 2);
    img.put_pixel(1, 0, Rgb([255, 255, 255]));
    img.put_pixel(0, 1, Rgb([255, 0, 0]));
    img.put_pixel(1, 1, Rgb([0, 0, 255]));
    img.save(path).unwrap();
}

// ─────────────────────── tests ───────────────────────

#[test]
fn run_defaults_to_reconstruct() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quad.png");
    let output = dir.path().join("out.png");
    write_quad(&input);

    let out = logic_vision(&["run", path_str(&input), path_str(&output)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("reconstruct"));
    assert_eq!(
        image::open(&input).unwrap().to_rgb8(),
        image::open(&output).unwrap().to_rgb8()
    );
}

#[test]
fn unknown_mode_is_rejected_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quad.png");
    let output = dir.path().join("out.png");
    write_quad(&input);

    let out = logic_vision(&[
        "run",
        path_str(&input),
        path_str(&output),
        "--mode",
        "edge_glow",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("edge_glow"));
    assert!(!output.exists());
}

#[test]
fn missing_input_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.png");
    let out = logic_vision(&["run", "/nonexistent/in.png", path_str(&output)]);
    assert!(!out.status.success());
    assert!(!output.exists());
}

#[test]
fn inspect_prints_atom_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quad.png");
    write_quad(&input);

    let out = logic_vision(&["inspect", path_str(&input), "--x", "1", "--y", "0"]);
    assert!(out.status.success());
    let atom: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(atom["coordinate"], serde_json::json!([1, 0]));
    assert!((atom["energy_val"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    assert!(atom["logic_flow"][0].as_f64().unwrap() > 0.0);
}

#[test]
fn inspect_out_of_bounds_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quad.png");
    write_quad(&input);

    let out = logic_vision(&["inspect", path_str(&input), "--x", "2", "--y", "0"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn text_roundtrip_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("quad.png");
    let json = dir.path().join("quad.json");
    let output = dir.path().join("reborn.png");
    write_quad(&input);

    let out = logic_vision(&["to-text", path_str(&input), path_str(&json)]);
    assert!(out.status.success());
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(doc["dimensions"], serde_json::json!([2, 2, 3]));

    let out = logic_vision(&["from-text", path_str(&json), path_str(&output)]);
    assert!(out.status.success());
    assert_eq!(
        image::open(&input).unwrap().to_rgb8(),
        image::open(&output).unwrap().to_rgb8()
    );
}

#[test]
fn malformed_text_fails() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("bad.json");
    let output = dir.path().join("out.png");
    std::fs::write(&json, r#"{"dimensions": [1, 2, 3], "atoms": [[[0, 0, 0]]]}"#).unwrap();

    let out = logic_vision(&["from-text", path_str(&json), path_str(&output)]);
    assert!(!out.status.success());
    assert!(!output.exists());
}
