//! Native text format of the HTPA acquisition software.
//!
//! # Layout
//!
//! - line 1: free-text header
//! - one line per frame: `size * size` integer readings in
//!   hundredths of °C, separated by whitespace, optionally
//!   followed by other fields; the last token is the
//!   timestamp in seconds.
//!
//! Readings are stored column-major and the sensor is
//! mounted rotated: after reading, frame row `i` is the
//! `i`-th block of `size` readings in reverse order.
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use ndarray::Array3;

use super::{load_err, Recording, DEFAULT_ARRAY_SIZE, DEFAULT_HEADER};
use crate::error::{Error, Result};

const SCALE: f32 = 1e-2;

/// Read a 32x32 recording.
pub fn read_txt(path: &Path) -> Result<Recording> {
    read_txt_with_size(path, DEFAULT_ARRAY_SIZE)
}

/// Read a recording whose frames are `size` x `size`.
///
/// Only the first `size * size` readings of every line are
/// used, so a smaller `size` reads a prefix of each frame.
pub fn read_txt_with_size(path: &Path, size: usize) -> Result<Recording> {
    let contents = fs::read_to_string(path).map_err(load_err(path))?;
    let mut lines = contents.lines();
    let header = lines.next().map(|l| l.trim_end().to_string());

    let pixels = size * size;
    let mut values: Vec<f32> = vec![];
    let mut timestamps = vec![];
    for (lineno, line) in lines.enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() <= pixels {
            return Err(Error::data_load(
                path,
                format!(
                    "line {}: expected more than {} fields, found {}",
                    lineno + 2,
                    pixels,
                    tokens.len()
                ),
            ));
        }

        let readings = tokens[..pixels]
            .iter()
            .map(|t| t.parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::data_load(path, format!("line {}: {}", lineno + 2, e)))?;
        for row in 0..size {
            for col in 0..size {
                values.push(readings[row * size + (size - 1 - col)] as f32 * SCALE);
            }
        }

        let timestamp = tokens[tokens.len() - 1]
            .parse::<f64>()
            .map_err(|e| Error::data_load(path, format!("line {}: timestamp: {}", lineno + 2, e)))?;
        timestamps.push(timestamp);
    }

    let frames = Array3::from_shape_vec((timestamps.len(), size, size), values)
        .map_err(load_err(path))?;
    Ok(Recording {
        frames,
        timestamps,
        header,
    })
}

/// First line of a text recording.
pub fn read_txt_header(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path).map_err(load_err(path))?;
    Ok(contents
        .lines()
        .next()
        .map(|l| l.trim_end().to_string())
        .unwrap_or_default())
}

/// Write a recording with square frames.
pub fn write_txt(path: &Path, recording: &Recording) -> Result<()> {
    let (_, height, width) = recording.frames.dim();
    if height != width {
        return Err(Error::alignment(format!(
            "text format needs square frames, got {}x{}",
            height, width
        )));
    }
    let size = height;

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "{}",
        recording.header.as_deref().unwrap_or(DEFAULT_HEADER)
    )?;

    for (frame, timestamp) in recording.frames.outer_iter().zip(recording.timestamps.iter()) {
        // invert the rotation applied by the reader
        let readings = (0..size * size).map(|k| {
            let (row, col) = (k / size, size - 1 - k % size);
            (frame[(row, col)] / SCALE).round() as i64
        });
        writeln!(writer, "{} t: {}", readings.format(" "), timestamp)?;
    }
    writer.flush()?;
    Ok(())
}
