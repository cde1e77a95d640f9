//! On-disk formats of thermopile recordings.
//!
//! Three formats are supported, selected by the file
//! extension (case-insensitive):
//!
//! - `txt`: the native text format written by the Heimann
//!   acquisition tools. See [`txt`].
//! - `csv`: one row per frame, flattened temperatures. See
//!   [`csv`].
//! - `bin`: a bincode serialized record, the fastest to
//!   load. See [`bin`].
//!
//! All readers return a [`Recording`]; errors while reading
//! are reported as [`Error::DataLoad`].
use std::path::Path;

use ndarray::{Array3, Axis};

use crate::error::{Error, Result};

pub mod bin;
pub mod csv;
pub mod txt;

pub use self::txt::{read_txt_header, read_txt_with_size};

/// Header used when a recording carries none.
pub const DEFAULT_HEADER: &str = "HTPA32x32d";

/// Frame side of the HTPA 32x32d sensor.
pub const DEFAULT_ARRAY_SIZE: usize = 32;

/// A sequence of temperature frames with one timestamp per
/// frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Temperatures in °C, shaped `[frames, height, width]`.
    pub frames: Array3<f32>,
    pub timestamps: Vec<f64>,
    pub header: Option<String>,
}

impl Recording {
    pub fn new(frames: Array3<f32>, timestamps: Vec<f64>) -> Self {
        Recording {
            frames,
            timestamps,
            header: None,
        }
    }

    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Txt,
    Csv,
    Bin,
}

impl Format {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Format::Txt),
            "csv" => Some(Format::Csv),
            "bin" => Some(Format::Bin),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
            .ok_or_else(|| Error::data_load(path, "unsupported file extension"))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Txt => "txt",
            Format::Csv => "csv",
            Format::Bin => "bin",
        }
    }
}

/// Read a recording, choosing the codec from the extension.
pub fn read_stream(path: &Path) -> Result<Recording> {
    match Format::from_path(path)? {
        Format::Txt => txt::read_txt(path),
        Format::Csv => csv::read_csv(path),
        Format::Bin => bin::read_bin(path),
    }
}

/// Write a recording, choosing the codec from the extension.
///
/// The CSV format has no room for a header; it is dropped.
pub fn write_stream(path: &Path, recording: &Recording) -> Result<()> {
    let format = Format::from_path(path)?;
    if recording.timestamps.len() != recording.len() {
        return Err(Error::alignment(format!(
            "{} frames but {} timestamps",
            recording.len(),
            recording.timestamps.len()
        )));
    }
    match format {
        Format::Txt => txt::write_txt(path, recording),
        Format::Csv => csv::write_csv(path, recording),
        Format::Bin => bin::write_bin(path, recording),
    }
}

/// Map any error raised while reading `path` to
/// [`Error::DataLoad`].
pub(crate) fn load_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> Error + '_ {
    move |e| Error::data_load(path, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use anyhow::Result;

    #[test]
    fn round_trip_all_formats() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let recording = Recording::new(fixtures::frames(3, 32), vec![170.093, 170.218, 170.343]);
        for name in ["file.TXT", "file.csv", "file.bin"].iter() {
            let path = dir.path().join(name);
            write_stream(&path, &recording)?;
            let read = read_stream(&path)?;
            assert_eq!(read.frames, recording.frames, "{}", name);
            assert_eq!(read.timestamps, recording.timestamps, "{}", name);
        }
        Ok(())
    }

    #[test]
    fn unknown_extension() {
        let err = read_stream(Path::new("recording.xyz")).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn missing_file() {
        let err = read_stream(Path::new("does/not/exist.TXT")).unwrap_err();
        assert!(matches!(err, Error::DataLoad { .. }));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let recording = Recording::new(fixtures::frames(3, 4), vec![1.0]);
        assert!(write_stream(Path::new("never-written.bin"), &recording).is_err());
    }
}
