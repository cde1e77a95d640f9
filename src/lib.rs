//! Library to synchronize recordings of Heimann HTPA 32x32d
//! thermopile sensors, optionally paired with a webcam.
//!
//! Several sensors observing the same event each run on
//! their own clock, drop frames and start at slightly
//! different times. This crate provides:
//!
//! 1. [Codecs](codec) for the recordings: the native text
//! format of the acquisition tools, CSV and a bincode
//! serialized format.
//!
//! 2. A [nearest-neighbour matcher](matching) for timestamp
//! sequences and a [resampler](resample) applying its
//! output to frames and timestamps.
//!
//! 3. [`Sample`], a set of [streams](stream) of the same
//! event that can be checked for synchronization, aligned
//! onto a common timeline and written back.
//!
//! # Usage
//!
//! ```rust
//! # fn test_compile() -> htpa_sync::Result<()> {
//! use std::path::Path;
//! use htpa_sync::Sample;
//!
//! let mut sample = Sample::from_paths(
//!     &["20200415_1438_ID121.TXT", "20200415_1438_ID122.TXT"],
//!     Some(Path::new("20200415_1438_IDRGB")),
//! )?;
//! if sample.test_synchronization(0.5) {
//!     sample.align_timesteps(true)?;
//!     sample.make_paths(Path::new("aligned"), "", "TXT");
//!     sample.write()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Frames can also be pseudocolored and exported as GIFs
//! with the [`heatmap`] module.

pub mod error;

pub mod codec;
pub mod frames;
pub mod heatmap;

pub mod matching;
pub mod resample;

pub mod sample;
pub mod stream;

pub mod cli;
pub mod config;

#[cfg(test)]
mod fixtures;

pub use crate::error::{Error, Result};
pub use crate::matching::{match_timestamps, Reference};
pub use crate::resample::{resample_arrays, resample_timestamps, Sampling};
pub use crate::sample::Sample;
pub use crate::stream::{ImageStream, Stream, ThermalStream, Timeline};
