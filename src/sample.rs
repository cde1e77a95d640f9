//! A set of streams recorded concurrently and aligned onto
//! a common timeline.
//!
//! Every operation logs inside the span carried by the
//! sample (see [`Sample::with_span`]); there is no global
//! verbosity switch.
use std::path::{Path, PathBuf};

use itertools::Itertools;
use ndarray::Array3;
use rayon::prelude::*;
use tracing::{debug, debug_span, warn, Span};

use crate::{
    codec::DEFAULT_HEADER,
    error::{Error, Result},
    matching::{match_timestamps_with, mean_match_error, nearest_index, Reference},
    stream::{ImageStream, Stream, ThermalStream, Timeline},
};

#[derive(Debug, Clone)]
pub struct Sample {
    streams: Vec<Stream>,
    reference: Reference,
    // member that drove the last alignment
    aligned_ref: Option<usize>,
    span: Span,
}

impl Sample {
    /// Group streams into a sample. Thermal members must
    /// share the same frame shape.
    pub fn new(streams: Vec<Stream>) -> Result<Self> {
        let shapes: Vec<_> = streams
            .iter()
            .filter_map(Stream::as_thermal)
            .map(|s| (s.id().to_string(), s.frame_shape()))
            .collect();
        if let Some(((id_a, a), (id_b, b))) = shapes
            .iter()
            .tuple_windows()
            .find(|((_, a), (_, b))| a != b)
        {
            return Err(Error::alignment(format!(
                "stream `{}` has {}x{} frames but `{}` has {}x{}",
                id_a, a.0, a.1, id_b, b.0, b.1
            )));
        }

        let span = debug_span!("sample", ids = %streams.iter().map(|s| s.id()).join(","));
        Ok(Sample {
            streams,
            reference: Reference::default(),
            aligned_ref: None,
            span,
        })
    }

    /// Load thermal recordings (in parallel, keeping the
    /// order of `tpa_paths`) and optionally the webcam
    /// images of `rgb_dir`, which becomes the last member.
    pub fn from_paths<P>(tpa_paths: &[P], rgb_dir: Option<&Path>) -> Result<Self>
    where
        P: AsRef<Path> + Sync,
    {
        let mut streams = tpa_paths
            .par_iter()
            .map(|p| ThermalStream::from_path(p.as_ref()).map(Stream::from))
            .collect::<Result<Vec<_>>>()?;
        if let Some(dir) = rgb_dir {
            streams.push(ImageStream::from_dir(dir)?.into());
        }
        Self::new(streams)
    }

    /// Build a sample from in-memory recordings given as
    /// `(frames, timestamps, id)`. No output paths are
    /// assigned; see [`make_paths`](Self::make_paths).
    pub fn from_data<I>(recordings: I, images: Option<ImageStream>) -> Result<Self>
    where
        I: IntoIterator<Item = (Array3<f32>, Vec<f64>, String)>,
    {
        let mut streams = recordings
            .into_iter()
            .map(|(frames, timestamps, id)| {
                ThermalStream::from_data(frames, timestamps, id).map(Stream::from)
            })
            .collect::<Result<Vec<_>>>()?;
        streams.extend(images.map(Stream::from));
        Self::new(streams)
    }

    /// Log the operations of this sample inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Select which member drives the alignment. Defaults
    /// to the first one.
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = reference;
        self.aligned_ref = None;
        self
    }

    /// Header written with every thermal member.
    pub fn with_header(mut self, header: Option<String>) -> Self {
        for stream in &mut self.streams {
            if let Stream::Thermal(s) = stream {
                s.set_header(header.clone());
            }
        }
        self
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn into_streams(self) -> Vec<Stream> {
        self.streams
    }

    pub fn thermal(&self) -> impl Iterator<Item = &ThermalStream> {
        self.streams.iter().filter_map(Stream::as_thermal)
    }

    pub fn images(&self) -> Option<&ImageStream> {
        self.streams.iter().find_map(Stream::as_images)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.id()).collect()
    }

    pub fn timestamps(&self) -> Vec<&[f64]> {
        self.streams.iter().map(|s| s.timestamps()).collect()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Assign `dir/{prefix}ID{id}.{ext}` to every thermal
    /// member and `dir/{prefix}ID{id}` to the image member.
    pub fn make_paths(&mut self, dir: &Path, prefix: &str, ext: &str) -> Vec<PathBuf> {
        let _enter = self.span.enter();
        self.streams
            .iter_mut()
            .map(|stream| {
                let path = match stream {
                    Stream::Thermal(s) => s.make_path(dir, prefix, ext).to_path_buf(),
                    Stream::Images(s) => s.make_path(dir, prefix).to_path_buf(),
                };
                debug!(path = %path.display(), "output assigned");
                path
            })
            .collect()
    }

    /// Whether every pair of members agrees within
    /// `max_error` seconds.
    ///
    /// For each pair `(a, b)`, `b` is matched against `a` and
    /// the mean absolute difference of matched timestamps is
    /// compared to the bound. A negative bound or an empty
    /// member never passes.
    pub fn test_synchronization(&self, max_error: f64) -> bool {
        let _enter = self.span.enter();
        if !(max_error >= 0.) {
            warn!(max_error, "invalid synchronization bound");
            return false;
        }

        for (a, b) in self.streams.iter().tuple_combinations() {
            match mean_match_error(a.timestamps(), b.timestamps()) {
                Ok(error) if error <= max_error => {
                    debug!(a = a.id(), b = b.id(), error, "synchronized");
                }
                Ok(error) => {
                    warn!(a = a.id(), b = b.id(), error, max_error, "out of sync");
                    return false;
                }
                Err(e) => {
                    warn!(a = a.id(), b = b.id(), "cannot match: {}", e);
                    return false;
                }
            }
        }
        true
    }

    /// Whether all members have the same length and element
    /// `i` of every member is the one closest in time to
    /// element `i` of the reference member.
    ///
    /// This holds after [`align_timesteps`](Self::align_timesteps)
    /// whatever the clocks of the members.
    pub fn test_alignment(&self) -> bool {
        let sequences = self.timestamps();
        if !sequences.iter().map(|s| s.len()).all_equal() {
            return false;
        }
        let reference = match sequences.get(self.reference_position(&sequences)) {
            Some(reference) => reference,
            None => return true,
        };
        sequences.iter().all(|seq| {
            reference
                .iter()
                .zip(seq.iter())
                .all(|(&t, &own)| seq[nearest_index(seq, t)] == own)
        })
    }

    fn reference_position(&self, sequences: &[&[f64]]) -> usize {
        self.aligned_ref
            .filter(|&idx| idx < sequences.len())
            .unwrap_or_else(|| self.reference.position(sequences))
    }

    /// Resample every member in place so that element `i` of
    /// each stream is the frame closest in time to element
    /// `i` of the reference member.
    ///
    /// With `reset_t0`, the first aligned timestamp of the
    /// reference is subtracted from every member. Samples
    /// with fewer than two members are left untouched.
    pub fn align_timesteps(&mut self, reset_t0: bool) -> Result<()> {
        let _enter = self.span.enter();
        if self.streams.len() < 2 {
            debug!(members = self.streams.len(), "nothing to align");
            return Ok(());
        }

        let ref_idx = {
            let sequences: Vec<&[f64]> = self.streams.iter().map(|s| s.timestamps()).collect();
            let ref_idx = self.reference_position(&sequences);
            // once aligned, lengths tie; keep matching against
            // the member that drove the first alignment
            let indices = match self.aligned_ref {
                Some(_) => {
                    let mut reordered = sequences.clone();
                    reordered.swap(0, ref_idx);
                    let mut indices = match_timestamps_with(&reordered, Reference::First)?;
                    indices.swap(0, ref_idx);
                    indices
                }
                None => match_timestamps_with(&sequences, self.reference)?,
            };
            debug!(
                reference = self.streams[ref_idx].id(),
                before = ?sequences.iter().map(|s| s.len()).collect::<Vec<_>>(),
                "aligning"
            );

            // indices are in bounds by construction, but check
            // before touching any member
            for (stream, idx) in self.streams.iter().zip(indices.iter()) {
                if let Some(&bad) = idx.iter().find(|&&i| i >= stream.len()) {
                    return Err(Error::alignment(format!(
                        "index {} out of {} for stream `{}`",
                        bad,
                        stream.len(),
                        stream.id()
                    )));
                }
            }
            for (stream, idx) in self.streams.iter_mut().zip(indices.iter()) {
                stream.gather(idx)?;
            }
            ref_idx
        };
        self.aligned_ref = Some(ref_idx);

        if reset_t0 {
            let t0 = self.streams[ref_idx].timestamps()[0];
            for stream in &mut self.streams {
                stream.shift_timestamps(t0);
            }
            debug!(t0, "timeline reset");
        }
        debug!(len = self.streams[ref_idx].len(), "aligned");
        Ok(())
    }

    /// Persist every member to its assigned output.
    ///
    /// Fails with [`Error::NotConfigured`] before writing
    /// anything if a member has no output.
    pub fn write(&self) -> Result<()> {
        let _enter = self.span.enter();
        if let Some(stream) = self.streams.iter().find(|s| !s.has_output()) {
            return Err(Error::not_configured(format!(
                "no output assigned to stream `{}`",
                stream.id()
            )));
        }
        for stream in &self.streams {
            stream.persist()?;
            debug!(id = stream.id(), len = stream.len(), "written");
        }
        Ok(())
    }

    /// Header of the first thermal member, or
    /// [`DEFAULT_HEADER`] when it has none.
    pub fn get_header(&self) -> &str {
        self.thermal()
            .next()
            .and_then(ThermalStream::header)
            .unwrap_or(DEFAULT_HEADER)
    }
}
