//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
pub use clap::{App, Arg};
use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{once, Either, IntoParallelIterator, ParallelIterator};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::codec::{read_stream, Recording};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()
        .context("could not initialize logging")
}

pub struct RecordingInput {
    pub path: PathBuf,
    pub recording: Recording,
}

impl RecordingInput {
    fn try_from_path(path: PathBuf) -> Result<Self> {
        let recording =
            read_stream(&path).with_context(|| format!("could not read {}", path.display()))?;
        Ok(RecordingInput { path, recording })
    }
}

/// Text recordings (`*.txt`, any case) directly inside
/// `dir`, sorted by name.
pub fn recordings_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut opts = MatchOptions::new();
    opts.case_sensitive = false;
    let pattern = Path::new(&Pattern::escape(&dir.to_string_lossy())).join("*.txt");
    let mut paths = glob_with(&pattern.to_string_lossy(), opts)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("could not list {}", dir.display()))?;
    paths.sort();
    Ok(paths)
}

/// Load recordings in parallel. Directories are expanded
/// to the text recordings they contain.
pub fn process_paths_par(
    paths: Vec<String>,
) -> impl IntoParallelIterator<Item = Result<RecordingInput>> {
    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );
    let bar_dup = bar.clone();

    paths
        .into_par_iter()
        .map(move |p| {
            let path = PathBuf::from(p);
            if path.is_dir() {
                match recordings_in_dir(&path) {
                    Ok(vec) => {
                        if vec.is_empty() {
                            bar.inc(1);
                        } else {
                            bar.inc_length(vec.len() as u64 - 1);
                        }
                        Either::Left(vec.into_par_iter().map(RecordingInput::try_from_path))
                    }
                    Err(e) => Either::Right(once(Err(e))),
                }
            } else {
                Either::Right(once(RecordingInput::try_from_path(path)))
            }
        })
        .flatten()
        .inspect(move |_| bar_dup.inc(1))
}
