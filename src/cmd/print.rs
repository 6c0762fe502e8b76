//! Print command - inspect field values without rendering

use std::path::PathBuf;

use anyhow::Result;
use tagstamp::{field_values, Description, Probe};

/// Probe, parse, and print the name/value pairs a template would see.
pub fn run(workdir: Option<PathBuf>, git: Option<PathBuf>) -> Result<()> {
    let workdir = match workdir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let git = git.unwrap_or_else(|| PathBuf::from("git"));

    let raw = Probe::new(git, workdir).describe()?;
    let desc = Description::parse(&raw)?;

    println!("# {raw}");
    for (name, value) in field_values(&desc) {
        println!("{name}={value}");
    }
    Ok(())
}
