//! tagstamp CLI

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "tagstamp")]
#[command(author, about = "Render git tag version fields into a generated source file")]
#[command(version = env!("TAGSTAMP_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and validate the render configuration (once per build configuration)
    Register {
        /// Template the output file is rendered from
        #[arg(long)]
        template: Option<PathBuf>,
        /// Rendered output path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Repository to probe (defaults to the current directory)
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// git executable (defaults to `git` on PATH)
        #[arg(long)]
        git: Option<PathBuf>,
        /// Where to record the registration
        #[arg(long)]
        config: PathBuf,
    },
    /// Probe, parse, and re-render the output (before every build action)
    Execute {
        /// Registration file written by `register`
        #[arg(long)]
        config: PathBuf,
    },
    /// Probe and print the field values without rendering anything
    Print {
        /// Repository to probe (defaults to the current directory)
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// git executable (defaults to `git` on PATH)
        #[arg(long)]
        git: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Register {
            template,
            output,
            workdir,
            git,
            config,
        } => cmd::register::run(template, output, workdir, git, &config),
        Commands::Execute { config } => cmd::execute::run(&config),
        Commands::Print { workdir, git } => cmd::print::run(workdir, git),
    }
}
