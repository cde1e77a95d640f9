//! Generated recordings shared by the unit tests.
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use ndarray::{Array, Array3};

use crate::codec::{write_stream, Recording, DEFAULT_ARRAY_SIZE};

/// Deterministic frames with centi-degree resolution,
/// computed the way the text reader computes them.
pub fn frames(n: usize, side: usize) -> Array3<f32> {
    Array::from_iter((0..n * side * side).map(|v| (2000 + (v * 37) % 1500) as f32 * 1e-2))
        .into_shape((n, side, side))
        .unwrap()
}

/// Frames where every pixel of frame `i` reads `i` °C.
pub fn numbered_frames(n: usize, side: usize) -> Array3<f32> {
    Array3::from_shape_fn((n, side, side), |(i, _, _)| (i * 100) as f32 * 1e-2)
}

/// Write a text recording `dir/{name}` with one numbered
/// frame per timestamp.
pub fn write_recording(dir: &Path, name: &str, timestamps: &[f64]) -> PathBuf {
    let path = dir.join(name);
    let frames = numbered_frames(timestamps.len(), DEFAULT_ARRAY_SIZE);
    let recording = Recording::new(frames, timestamps.to_vec())
        .with_header(Some(format!("header of {}", name)));
    write_stream(&path, &recording).unwrap();
    path
}

/// Write one small jpeg per timestamp, named after the
/// webcam convention (`1.52` -> `1-52.jpg`).
pub fn write_images(dir: &Path, timestamps: &[&str]) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    timestamps
        .iter()
        .map(|t| {
            let path = dir.join(format!("{}.jpg", t.replace('.', "-")));
            RgbImage::from_pixel(4, 3, Rgb([10, 200, 30])).save(&path).unwrap();
            path
        })
        .collect()
}
