//! Bincode serialized recordings.
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use ndarray::Array3;
use serde_derive::*;

use super::{load_err, Recording};
use crate::error::Result;

#[derive(Serialize, Deserialize)]
struct BinRecord {
    shape: (usize, usize, usize),
    data: Vec<f32>,
    timestamps: Vec<f64>,
    header: Option<String>,
}

pub fn write_bin(path: &Path, recording: &Recording) -> Result<()> {
    let record = BinRecord {
        shape: recording.frames.dim(),
        data: recording.frames.iter().copied().collect(),
        timestamps: recording.timestamps.clone(),
        header: recording.header.clone(),
    };
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &record)?;
    writer.flush()?;
    Ok(())
}

pub fn read_bin(path: &Path) -> Result<Recording> {
    let reader = BufReader::new(File::open(path).map_err(load_err(path))?);
    let record: BinRecord = bincode::deserialize_from(reader).map_err(load_err(path))?;
    let frames = Array3::from_shape_vec(record.shape, record.data).map_err(load_err(path))?;
    Ok(Recording {
        frames,
        timestamps: record.timestamps,
        header: record.header,
    })
}
