//! CSV export of a recording.
//!
//! The first line is a legacy marker (`HTPA 32x32d`),
//! followed by a header row `Time (sec),PTAT,P0000,…` and
//! one row per frame. The PTAT column is not recorded and
//! is filled with `inf`. Frames are flattened row-major and
//! must be square.
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use itertools::Itertools;
use ndarray::Array2;

use super::{load_err, Recording};
use crate::{
    error::{Error, Result},
    frames::{flatten_frames, reshape_flattened_frames},
};

const MARKER: &str = "HTPA 32x32d";
const TIME_COL: &str = "Time (sec)";
const PTAT_COL: &str = "PTAT";

pub fn write_csv(path: &Path, recording: &Recording) -> Result<()> {
    let flat = flatten_frames(recording.frames.view());
    let pixels = flat.ncols();

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", MARKER)?;
    writeln!(
        writer,
        "{},{},{}",
        TIME_COL,
        PTAT_COL,
        (0..pixels).map(|idx| format!("P{:04}", idx)).format(",")
    )?;
    for (row, timestamp) in flat.outer_iter().zip(recording.timestamps.iter()) {
        writeln!(writer, "{},inf,{}", timestamp, row.iter().format(","))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Recording> {
    let contents = fs::read_to_string(path).map_err(load_err(path))?;
    let mut lines = contents.lines().skip(1);

    let columns = lines
        .next()
        .ok_or_else(|| Error::data_load(path, "missing header row"))?
        .split(',')
        .count();
    if columns < 2 {
        return Err(Error::data_load(path, "header row has no pixel columns"));
    }
    let pixels = columns - 2;

    let mut values = vec![];
    let mut timestamps = vec![];
    for (lineno, line) in lines.enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns {
            return Err(Error::data_load(
                path,
                format!(
                    "row {}: expected {} fields, found {}",
                    lineno + 3,
                    columns,
                    fields.len()
                ),
            ));
        }
        let timestamp = fields[0].parse::<f64>().map_err(load_err(path))?;
        timestamps.push(timestamp);
        for field in &fields[2..] {
            values.push(field.parse::<f32>().map_err(load_err(path))?);
        }
    }

    let flat = Array2::from_shape_vec((timestamps.len(), pixels), values).map_err(load_err(path))?;
    let frames = reshape_flattened_frames(flat).map_err(load_err(path))?;
    Ok(Recording::new(frames, timestamps))
}
