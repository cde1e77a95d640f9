mod args;

use anyhow::{Context, Result};
use htpa_sync::{cli::init_logging, config::AlignConfig, Timeline};
use tracing::{info, info_span};

use args::Args;

fn main() -> Result<()> {
    init_logging()?;
    let config_path = match Args::from_cmd_line()? {
        Args::Template => {
            println!("{}", serde_json::to_string_pretty(&AlignConfig::template())?);
            return Ok(());
        }
        Args::Run { config } => config,
    };

    let config = AlignConfig::from_path(&config_path)?;
    let span = info_span!("align", config = %config_path.display());
    let _enter = span.enter();

    let sample = config
        .run()
        .with_context(|| format!("could not align {}", config_path.display()))?;
    for stream in sample.streams() {
        info!(id = stream.id(), frames = stream.len(), "stream aligned");
    }
    Ok(())
}
