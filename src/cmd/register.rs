//! Register command

use std::path::{Path, PathBuf};

use anyhow::Result;
use tagstamp::{gate, GateOptions};

/// Validate the render configuration and record it for the execution hook.
pub fn run(
    template: Option<PathBuf>,
    output: Option<PathBuf>,
    workdir: Option<PathBuf>,
    git: Option<PathBuf>,
    config_path: &Path,
) -> Result<()> {
    let config = gate::register(
        GateOptions {
            template,
            output,
            workdir,
            git,
        },
        config_path,
    )?;

    println!("Registered {}", config_path.display());
    println!(
        "Hook `tagstamp execute --config {}` before every build action to refresh {}",
        config_path.display(),
        config.output.display()
    );
    Ok(())
}
