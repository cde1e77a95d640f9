use anyhow::Result;
use clap::value_t_or_exit;
use htpa_sync::{args_parser, opt};
use std::path::PathBuf;

pub enum Args {
    /// Print an example config and exit.
    Template,
    Run { config: PathBuf },
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("htpa-align")
            .about("Align synchronized HTPA recordings (and webcam images) onto one timeline.")
            .arg(
                opt!("config")
                    .short("c")
                    .required_unless("template")
                    .help("JSON job description"),
            )
            .arg(
                opt!("template")
                    .takes_value(false)
                    .conflicts_with("config")
                    .help("Print an example job description"),
            )
            .get_matches();

        if matches.is_present("template") {
            return Ok(Args::Template);
        }
        let config = value_t_or_exit!(matches, "config", PathBuf);
        Ok(Args::Run { config })
    }
}
