use anyhow::{ensure, Result};
use htpa_sync::{arg, args_parser, opt};

pub struct Args {
    pub paths: Vec<String>,
    pub csv: bool,
    pub gif: bool,
    pub bin: bool,
    pub overwrite: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("htpa-convert")
            .about("Convert HTPA text recordings to other formats.")
            .arg(
                opt!("csv")
                    .takes_value(false)
                    .help("Write a CSV file next to each recording"),
            )
            .arg(
                opt!("gif")
                    .takes_value(false)
                    .help("Write a pseudocolored GIF next to each recording"),
            )
            .arg(
                opt!("bin")
                    .takes_value(false)
                    .help("Write a binary file next to each recording (fastest to load)"),
            )
            .arg(
                opt!("overwrite")
                    .short("f")
                    .takes_value(false)
                    .help("Replace outputs that already exist (default: skip them)"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("Recordings, or directories of recordings"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .unwrap()
            .map(|f| f.into())
            .collect();
        let csv = matches.is_present("csv");
        let gif = matches.is_present("gif");
        let bin = matches.is_present("bin");
        ensure!(csv || gif || bin, "nothing to do: pass --csv, --gif or --bin");

        Ok(Args {
            paths,
            csv,
            gif,
            bin,
            overwrite: matches.is_present("overwrite"),
        })
    }
}
