//! Two-phase render gate.
//!
//! *Registration* runs once per build configuration: it validates the
//! settings, normalizes every path to absolute form, and records them in
//! a small TOML file. The host build system then re-invokes *execution*
//! before every build action, pointing it at that file.
//!
//! Execution always re-renders; idempotency comes entirely from the
//! content-equality check in [`crate::template::write_if_changed`]. No
//! state is diffed between runs and the probe is never skipped.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::describe::{DescribeError, Description};
use crate::fields::field_values;
use crate::probe::{Probe, ProbeError};
use crate::template;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("missing required setting: --{0}")]
    MissingConfig(&'static str),

    #[error("cannot resolve {what} {path:?}: {source}")]
    BadPath {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("probe executable {name:?} not found on PATH: {source}")]
    GitNotFound {
        name: String,
        source: which::Error,
    },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Describe(#[from] DescribeError),

    #[error("registration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("registration serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings as supplied by the caller; `None` means never provided.
#[derive(Debug, Clone, Default)]
pub struct GateOptions {
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub git: Option<PathBuf>,
}

/// Validated, absolute paths recorded at registration and consumed on
/// every execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub template: PathBuf,
    pub output: PathBuf,
    pub workdir: PathBuf,
    pub git: PathBuf,
}

impl GateConfig {
    /// Load a registration file written by [`register`].
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Persist this registration to `path`.
    pub fn save(&self, path: &Path) -> Result<(), GateError> {
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// What one execution produced. Returned to the caller instead of being
/// smuggled through process-wide state.
#[derive(Debug)]
pub struct RenderOutcome {
    /// Raw describe output the fields were parsed from.
    pub raw: String,
    /// The parsed fields.
    pub description: Description,
    /// Whether the output file actually changed on disk.
    pub wrote: bool,
}

/// Registration phase: validate settings, normalize paths, and record
/// them at `config_path` for the recurring execution hook.
///
/// `template` and `output` are required; `workdir` defaults to the
/// current directory and `git` to `git` resolved on `PATH`.
pub fn register(opts: GateOptions, config_path: &Path) -> Result<GateConfig, GateError> {
    let config = validate(opts)?;
    config.save(config_path)?;
    tracing::info!(
        template = %config.template.display(),
        output = %config.output.display(),
        "registered render gate"
    );
    Ok(config)
}

/// Execution phase: probe, parse, format, render, and write the output
/// if its content changed.
///
/// A probe or parse failure aborts before any file is touched.
pub fn execute(config: &GateConfig) -> Result<RenderOutcome, GateError> {
    let probe = Probe::new(config.git.clone(), config.workdir.clone());
    let raw = probe.describe()?;
    let description = Description::parse(&raw)?;

    let fields = field_values(&description);
    let template_text = fs::read_to_string(&config.template)?;
    let rendered = template::render(&template_text, &fields);
    let wrote = template::write_if_changed(&config.output, &rendered)?;

    tracing::debug!(%raw, output = %config.output.display(), wrote, "render gate executed");
    Ok(RenderOutcome {
        raw,
        description,
        wrote,
    })
}

fn validate(opts: GateOptions) -> Result<GateConfig, GateError> {
    let template = opts.template.ok_or(GateError::MissingConfig("template"))?;
    let output = opts.output.ok_or(GateError::MissingConfig("output"))?;
    let workdir = opts.workdir.unwrap_or_else(|| PathBuf::from("."));

    Ok(GateConfig {
        template: canonical(template, "template")?,
        output: canonical_output(output)?,
        workdir: canonical(workdir, "workdir")?,
        git: resolve_git(opts.git)?,
    })
}

fn canonical(path: PathBuf, what: &'static str) -> Result<PathBuf, GateError> {
    fs::canonicalize(&path).map_err(|source| GateError::BadPath { what, path, source })
}

/// The output file may not exist yet, so only its directory is
/// canonicalized.
fn canonical_output(path: PathBuf) -> Result<PathBuf, GateError> {
    let Some(name) = path.file_name().map(ToOwned::to_owned) else {
        return Err(GateError::BadPath {
            what: "output",
            path,
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        });
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(canonical(parent, "output directory")?.join(name))
}

fn resolve_git(git: Option<PathBuf>) -> Result<PathBuf, GateError> {
    let git = git.unwrap_or_else(|| PathBuf::from("git"));
    if git.components().count() > 1 {
        // An explicit path was given; pin it down.
        canonical(git, "git executable")
    } else {
        let name = git.display().to_string();
        which::which(&git).map_err(|source| GateError::GitNotFound { name, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_requires_template_and_output() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("stamp.toml");

        let err = register(GateOptions::default(), &config_path).unwrap_err();
        assert!(matches!(err, GateError::MissingConfig("template")));

        let err = register(
            GateOptions {
                template: Some(dir.path().join("in.h")),
                ..GateOptions::default()
            },
            &config_path,
        )
        .unwrap_err();
        assert!(matches!(err, GateError::MissingConfig("output")));

        assert!(!config_path.exists(), "nothing should be recorded on failure");
    }

    #[test]
    fn test_register_normalizes_and_roundtrips() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("version.h.in");
        std::fs::write(&template, "@FULL@").unwrap();
        let config_path = dir.path().join("stamp.toml");

        let config = register(
            GateOptions {
                template: Some(template),
                output: Some(dir.path().join("version.h")),
                workdir: Some(dir.path().to_path_buf()),
                git: None,
            },
            &config_path,
        )
        .unwrap();

        assert!(config.template.is_absolute());
        assert!(config.output.is_absolute());
        assert!(config.workdir.is_absolute());
        assert!(config.git.is_absolute());

        let loaded = GateConfig::load(&config_path).unwrap();
        assert_eq!(loaded.template, config.template);
        assert_eq!(loaded.output, config.output);
    }

    #[test]
    fn test_register_rejects_missing_template_file() {
        let dir = TempDir::new().unwrap();
        let err = register(
            GateOptions {
                template: Some(dir.path().join("no-such.in")),
                output: Some(dir.path().join("out.h")),
                workdir: Some(dir.path().to_path_buf()),
                git: None,
            },
            &dir.path().join("stamp.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, GateError::BadPath { what: "template", .. }));
    }
}
