//! Description of an alignment job, read from JSON.
//!
//! ```json
//! {
//!   "tpa_files": ["20200415_1438_ID121.TXT", "20200415_1438_ID122.TXT"],
//!   "rgb_dir": "20200415_1438_IDRGB",
//!   "output_dir": "aligned",
//!   "prefix": "aligned_",
//!   "reset_t0": true
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the
//! config file.
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde_derive::*;
use tracing::info;

use crate::{
    codec::Format,
    error::{Error, Result},
    matching::Reference,
    sample::Sample,
    stream::Timeline,
};

/// Default bound, in seconds, on the mean matching error
/// between two streams.
pub const DEFAULT_MAX_SYNC_ERROR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignConfig {
    /// Thermal recordings, in order. The first one drives
    /// the alignment unless `reference` says otherwise.
    pub tpa_files: Vec<PathBuf>,

    /// Directory of webcam images.
    #[serde(default)]
    pub rgb_dir: Option<PathBuf>,

    pub output_dir: PathBuf,

    #[serde(default)]
    pub prefix: String,

    /// Extension of the written thermal recordings.
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_max_sync_error")]
    pub max_sync_error: f64,

    #[serde(default)]
    pub reset_t0: bool,

    /// Replaces the headers of the written recordings.
    #[serde(default)]
    pub header: Option<String>,

    #[serde(default)]
    pub reference: Reference,
}

fn default_format() -> String {
    Format::Txt.extension().to_string()
}

fn default_max_sync_error() -> f64 {
    DEFAULT_MAX_SYNC_ERROR
}

impl AlignConfig {
    /// A filled example, meant to be edited by users.
    pub fn template() -> Self {
        AlignConfig {
            tpa_files: ["121", "122", "123"]
                .iter()
                .map(|id| PathBuf::from(format!("20200415_1438_ID{}.TXT", id)))
                .collect(),
            rgb_dir: Some("20200415_1438_IDRGB".into()),
            output_dir: "aligned".into(),
            prefix: "aligned_".into(),
            format: default_format(),
            max_sync_error: DEFAULT_MAX_SYNC_ERROR,
            reset_t0: true,
            header: None,
            reference: Reference::First,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::data_load(path, e.to_string()))?;
        let config: AlignConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::data_load(path, e.to_string()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve(base))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Make relative paths relative to `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        for path in &mut self.tpa_files {
            *path = base.join(&*path);
        }
        self.rgb_dir = self.rgb_dir.take().map(|dir| base.join(dir));
        self.output_dir = base.join(&self.output_dir);
        self
    }

    pub fn output_format(&self) -> Result<Format> {
        Format::from_extension(&self.format)
            .ok_or_else(|| Error::not_configured(format!("unknown output format `{}`", self.format)))
    }

    /// Load the streams described by the config.
    pub fn load(&self) -> Result<Sample> {
        let mut sample = Sample::from_paths(&self.tpa_files, self.rgb_dir.as_deref())?
            .with_reference(self.reference);
        if self.header.is_some() {
            sample = sample.with_header(self.header.clone());
        }
        Ok(sample)
    }

    /// Load, check synchronization, align and write.
    ///
    /// Nothing is written when the streams are not
    /// synchronized within `max_sync_error`.
    pub fn run(&self) -> Result<Sample> {
        let format = self.output_format()?;
        let mut sample = self.load()?;

        if !sample.test_synchronization(self.max_sync_error) {
            return Err(Error::alignment(format!(
                "streams {} are not synchronized within {} s",
                sample.ids().join(", "),
                self.max_sync_error
            )));
        }
        sample.align_timesteps(self.reset_t0)?;

        fs::create_dir_all(&self.output_dir)?;
        sample.make_paths(&self.output_dir, &self.prefix, format.extension());
        sample.write()?;
        info!(
            streams = sample.len(),
            frames = sample.streams().first().map(|s| s.len()).unwrap_or(0),
            output = %self.output_dir.display(),
            "aligned sample written"
        );
        Ok(sample)
    }
}
