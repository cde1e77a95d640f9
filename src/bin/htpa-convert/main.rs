mod args;
mod proc;

use anyhow::Result;
use htpa_sync::cli::{init_logging, process_paths_par};
use tracing::info;

use crate::{
    args::Args,
    proc::{convert, ConvertArgs},
};

fn main() -> Result<()> {
    init_logging()?;
    let args = Args::from_cmd_line()?;
    let c_args = ConvertArgs::from_args(&args);

    use rayon::prelude::*;
    let (count, written) = process_paths_par(args.paths)
        .into_par_iter()
        .map(|p| -> Result<usize> { convert(&p?, &c_args) })
        .try_fold(
            || (0usize, 0usize),
            |(count, written), res| -> Result<_> { Ok((count + 1, written + res?)) },
        )
        .try_reduce(|| (0, 0), |a, b| Ok((a.0 + b.0, a.1 + b.1)))?;

    info!(recordings = count, files = written, "conversion done");
    Ok(())
}
