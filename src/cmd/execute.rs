//! Execute command

use std::path::Path;

use anyhow::Result;
use tagstamp::{gate, GateConfig};

/// Probe the repository and re-render the output file.
pub fn run(config_path: &Path) -> Result<()> {
    let config = GateConfig::load(config_path)?;
    let outcome = gate::execute(&config)?;

    if outcome.wrote {
        println!("{} <- {}", config.output.display(), outcome.raw);
    } else {
        tracing::debug!(raw = %outcome.raw, "output unchanged");
    }
    Ok(())
}
