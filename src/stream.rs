//! Recording streams: one timestamp per frame, frames held
//! either in memory (thermal) or as image files (webcam).
//!
//! Both variants implement [`Timeline`], which is all the
//! alignment in [`sample`][crate::sample] needs.
use std::{
    cmp::Ordering,
    collections::HashSet,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use glob::{glob_with, MatchOptions, Pattern};
use image::RgbImage;
use lazy_static::lazy_static;
use ndarray::{Array3, ArrayView3};
use regex::Regex;

use crate::{
    codec::{read_stream, write_stream, Recording},
    error::{Error, Result},
    resample::gather_checked,
};

/// Extension of the webcam images.
pub const IMAGE_EXT: &str = "jpg";

/// Identifier of the webcam stream.
pub const IMAGE_STREAM_ID: &str = "RGB";

/// File stem of the manifests written next to copied
/// images.
pub const MANIFEST_STEM: &str = "timesteps";

/// Common interface of the stream variants.
pub trait Timeline {
    fn id(&self) -> &str;

    fn timestamps(&self) -> &[f64];

    fn len(&self) -> usize {
        self.timestamps().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace frames and timestamps by the elements at
    /// `indices`. Nothing changes on error.
    fn gather(&mut self, indices: &[usize]) -> Result<()>;

    /// Subtract `offset` from every timestamp.
    fn shift_timestamps(&mut self, offset: f64);

    /// Whether an output location has been assigned.
    fn has_output(&self) -> bool;

    /// Write the current state to the assigned output
    /// location.
    fn persist(&self) -> Result<()>;
}

/// Identifier from the `YYYYMMDD_HHmm_ID{id}.ext` naming
/// convention, or the file stem when it does not apply.
pub fn id_from_path(path: &Path) -> String {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"_ID(.+)$").unwrap();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    RE.captures(&stem)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or(stem)
}

/// Timestamp encoded in an image file name: `1-52.jpg` is
/// `1.52` seconds.
pub fn timestamp_from_image_path(path: &Path) -> Result<f64> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::data_load(path, "no file name"))?;
    stem.replace('-', ".")
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| Error::data_load(path, "file name does not encode a timestamp"))
}

/// A thermopile array recording held in memory.
#[derive(Debug, Clone)]
pub struct ThermalStream {
    id: String,
    recording: Recording,
    path: Option<PathBuf>,
}

impl ThermalStream {
    /// Load a recording; its identifier is derived from the
    /// file name, and the stream persists back to `path`
    /// unless another path is assigned.
    pub fn from_path(path: &Path) -> Result<Self> {
        let recording = read_stream(path)?;
        Ok(ThermalStream {
            id: id_from_path(path),
            recording,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap in-memory frames. No output path is assigned.
    pub fn from_data(frames: Array3<f32>, timestamps: Vec<f64>, id: impl Into<String>) -> Result<Self> {
        Self::from_recording(Recording::new(frames, timestamps), id)
    }

    pub fn from_recording(recording: Recording, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if recording.len() != recording.timestamps.len() {
            return Err(Error::alignment(format!(
                "stream `{}`: {} frames but {} timestamps",
                id,
                recording.len(),
                recording.timestamps.len()
            )));
        }
        Ok(ThermalStream {
            id,
            recording,
            path: None,
        })
    }

    pub fn frames(&self) -> ArrayView3<'_, f32> {
        self.recording.frames.view()
    }

    /// `(height, width)` of a frame.
    pub fn frame_shape(&self) -> (usize, usize) {
        let (_, height, width) = self.recording.frames.dim();
        (height, width)
    }

    pub fn header(&self) -> Option<&str> {
        self.recording.header.as_deref()
    }

    pub fn set_header(&mut self, header: Option<String>) {
        self.recording.header = header;
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn into_recording(self) -> Recording {
        self.recording
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Assign `dir/{prefix}ID{id}.{ext}` as output path.
    pub fn make_path(&mut self, dir: &Path, prefix: &str, ext: &str) -> &Path {
        let path = dir.join(format!("{}ID{}.{}", prefix, self.id, ext));
        self.path.insert(path)
    }
}

impl Timeline for ThermalStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamps(&self) -> &[f64] {
        &self.recording.timestamps
    }

    fn gather(&mut self, indices: &[usize]) -> Result<()> {
        let frames = gather_checked(&self.recording.frames, indices)?;
        let timestamps = gather_checked(&self.recording.timestamps, indices)?;
        self.recording.frames = frames;
        self.recording.timestamps = timestamps;
        Ok(())
    }

    fn shift_timestamps(&mut self, offset: f64) {
        self.recording.timestamps.iter_mut().for_each(|t| *t -= offset);
    }

    fn has_output(&self) -> bool {
        self.path.is_some()
    }

    fn persist(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            Error::not_configured(format!("no output path for stream `{}`", self.id))
        })?;
        write_stream(path, &self.recording)
    }
}

/// Webcam frames referenced by file path.
#[derive(Debug, Clone)]
pub struct ImageStream {
    id: String,
    source_dir: PathBuf,
    files: Vec<PathBuf>,
    timestamps: Vec<f64>,
    output_dir: Option<PathBuf>,
}

impl ImageStream {
    /// List `*.jpg` images of a directory, ordered by the
    /// timestamps encoded in their names.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::data_load(dir, "not a directory"));
        }
        let mut opts = MatchOptions::new();
        opts.case_sensitive = false;
        let pattern = Path::new(&Pattern::escape(&dir.to_string_lossy()))
            .join(format!("*.{}", IMAGE_EXT));
        let files = glob_with(&pattern.to_string_lossy(), opts)
            .map_err(|e| Error::data_load(dir, e.to_string()))?
            .map(|entry| entry.map_err(|e| Error::data_load(dir, e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let mut stream = Self::from_files(files)?;
        stream.source_dir = dir.to_path_buf();
        Ok(stream)
    }

    /// Build from image paths, parsing timestamps from the
    /// file names and sorting by them.
    pub fn from_files(files: Vec<PathBuf>) -> Result<Self> {
        let mut entries = files
            .into_iter()
            .map(|f| Ok((timestamp_from_image_path(&f)?, f)))
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let (timestamps, files) = entries.into_iter().unzip();
        Self::from_data(files, timestamps)
    }

    /// Wrap paths with explicit timestamps, kept in the
    /// given order.
    pub fn from_data(files: Vec<PathBuf>, timestamps: Vec<f64>) -> Result<Self> {
        if files.len() != timestamps.len() {
            return Err(Error::alignment(format!(
                "{} images but {} timestamps",
                files.len(),
                timestamps.len()
            )));
        }
        let source_dir = files
            .first()
            .and_then(|f| f.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(ImageStream {
            id: IMAGE_STREAM_ID.to_string(),
            source_dir,
            files,
            timestamps,
            output_dir: None,
        })
    }

    /// Rebuild a stream from a manifest written by
    /// [`persist`](Timeline::persist), resolving names
    /// against `source_dir`.
    pub fn from_manifest(source_dir: &Path, manifest: &Path) -> Result<Self> {
        let names = read_manifest(manifest)?;
        let files: Vec<PathBuf> = names.iter().map(|n| source_dir.join(n)).collect();
        let timestamps = files
            .iter()
            .map(|f| timestamp_from_image_path(f))
            .collect::<Result<Vec<_>>>()?;
        let mut stream = Self::from_data(files, timestamps)?;
        stream.source_dir = source_dir.to_path_buf();
        Ok(stream)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.output_dir = Some(dir.into());
    }

    /// Assign `dir/{prefix}ID{id}` as output directory.
    pub fn make_path(&mut self, dir: &Path, prefix: &str) -> &Path {
        let path = dir.join(format!("{}ID{}", prefix, self.id));
        self.output_dir.insert(path)
    }

    /// Decode the image at `idx`.
    pub fn read_frame(&self, idx: usize) -> Result<RgbImage> {
        let path = self.files.get(idx).ok_or_else(|| {
            Error::alignment(format!("frame {} out of {}", idx, self.files.len()))
        })?;
        let img = image::open(path).map_err(|e| Error::data_load(path, e.to_string()))?;
        Ok(img.to_rgb8())
    }

    /// File names of the selected images, in order.
    pub fn manifest(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| {
                f.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Whether persisting copies files away from the source
    /// directory (and hence needs a manifest).
    pub fn is_relocated(&self) -> bool {
        match &self.output_dir {
            Some(out) => !same_dir(out, &self.source_dir),
            None => false,
        }
    }

    fn write_manifest(&self, dir: &Path) -> Result<()> {
        let names = self.manifest();

        let json = BufWriter::new(File::create(dir.join(format!("{}.json", MANIFEST_STEM)))?);
        serde_json::to_writer(json, &names)?;

        let mut txt = BufWriter::new(File::create(dir.join(format!("{}.txt", MANIFEST_STEM)))?);
        for name in &names {
            writeln!(txt, "{}", name)?;
        }
        txt.flush()?;
        Ok(())
    }
}

impl Timeline for ImageStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    fn gather(&mut self, indices: &[usize]) -> Result<()> {
        let files = gather_checked(&self.files, indices)?;
        let timestamps = gather_checked(&self.timestamps, indices)?;
        self.files = files;
        self.timestamps = timestamps;
        Ok(())
    }

    fn shift_timestamps(&mut self, offset: f64) {
        self.timestamps.iter_mut().for_each(|t| *t -= offset);
    }

    fn has_output(&self) -> bool {
        self.output_dir.is_some()
    }

    /// Copy the selected images into the output directory
    /// and write the manifest there. Images repeated by the
    /// alignment are copied once; the manifest keeps the
    /// repetitions.
    fn persist(&self) -> Result<()> {
        let out = self.output_dir.as_deref().ok_or_else(|| {
            Error::not_configured(format!("no output directory for stream `{}`", self.id))
        })?;
        if !self.is_relocated() {
            return Ok(());
        }

        fs::create_dir_all(out)?;
        let mut copied = HashSet::new();
        for src in &self.files {
            let name = src
                .file_name()
                .ok_or_else(|| Error::data_load(src, "no file name"))?;
            if !copied.insert(name.to_os_string()) {
                continue;
            }
            fs::copy(src, out.join(name)).map_err(|e| Error::data_load(src, e.to_string()))?;
        }
        self.write_manifest(out)
    }
}

/// Read the JSON manifest written next to copied images.
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| Error::data_load(path, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::data_load(path, e.to_string()))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// A member of a [`Sample`][crate::sample::Sample].
#[derive(Debug, Clone)]
pub enum Stream {
    Thermal(ThermalStream),
    Images(ImageStream),
}

impl Stream {
    pub fn as_thermal(&self) -> Option<&ThermalStream> {
        match self {
            Stream::Thermal(s) => Some(s),
            Stream::Images(_) => None,
        }
    }

    pub fn as_images(&self) -> Option<&ImageStream> {
        match self {
            Stream::Images(s) => Some(s),
            Stream::Thermal(_) => None,
        }
    }

    fn inner(&self) -> &dyn Timeline {
        match self {
            Stream::Thermal(s) => s,
            Stream::Images(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Timeline {
        match self {
            Stream::Thermal(s) => s,
            Stream::Images(s) => s,
        }
    }
}

impl Timeline for Stream {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn timestamps(&self) -> &[f64] {
        self.inner().timestamps()
    }

    fn gather(&mut self, indices: &[usize]) -> Result<()> {
        self.inner_mut().gather(indices)
    }

    fn shift_timestamps(&mut self, offset: f64) {
        self.inner_mut().shift_timestamps(offset)
    }

    fn has_output(&self) -> bool {
        self.inner().has_output()
    }

    fn persist(&self) -> Result<()> {
        self.inner().persist()
    }
}

impl From<ThermalStream> for Stream {
    fn from(s: ThermalStream) -> Self {
        Stream::Thermal(s)
    }
}

impl From<ImageStream> for Stream {
    fn from(s: ImageStream) -> Self {
        Stream::Images(s)
    }
}
