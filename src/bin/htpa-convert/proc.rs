use anyhow::{Context, Result};
use htpa_sync::{
    cli::RecordingInput,
    codec::{write_stream, Format},
    frames::timestamps_to_frame_durations,
    heatmap::{apply_heatmap, write_gif, GifOptions},
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Args;

pub struct ConvertArgs {
    pub formats: Vec<Format>,
    pub gif: bool,
    pub overwrite: bool,
}

impl ConvertArgs {
    pub fn from_args(args: &Args) -> Self {
        let formats = [(args.csv, Format::Csv), (args.bin, Format::Bin)]
            .iter()
            .filter(|(wanted, _)| *wanted)
            .map(|&(_, format)| format)
            .collect();
        ConvertArgs {
            formats,
            gif: args.gif,
            overwrite: args.overwrite,
        }
    }

    fn target(&self, path: &Path, ext: &str) -> Option<PathBuf> {
        let target = path.with_extension(ext);
        if !self.overwrite && target.exists() {
            debug!(path = %target.display(), "exists, skipped");
            None
        } else {
            Some(target)
        }
    }
}

/// Write the requested outputs of one recording; returns
/// how many files were written.
pub fn convert(inp: &RecordingInput, args: &ConvertArgs) -> Result<usize> {
    let mut written = 0;
    for format in &args.formats {
        if let Some(target) = args.target(&inp.path, format.extension()) {
            write_stream(&target, &inp.recording)
                .with_context(|| format!("could not write {}", target.display()))?;
            written += 1;
        }
    }

    if args.gif {
        if let Some(target) = args.target(&inp.path, "gif") {
            let images = apply_heatmap(inp.recording.frames.view());
            let opts = if inp.recording.len() > 1 {
                GifOptions::with_durations(timestamps_to_frame_durations(
                    &inp.recording.timestamps,
                    None,
                ))
            } else {
                GifOptions::default()
            };
            write_gif(&images, &target, &opts)
                .with_context(|| format!("could not write {}", target.display()))?;
            written += 1;
        }
    }
    Ok(written)
}
