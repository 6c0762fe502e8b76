//! `git describe` subprocess wrapper.
//!
//! Synchronous, bounded by a timeout. Any failure is surfaced as a typed
//! error; the caller never receives defaulted output.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use wait_timeout::ChildExt;

/// Default deadline for one describe call. Probing a repository is local
/// work; anything slower than this indicates a wedged git process.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("git executable {git:?} could not be run: {source}")]
    Unavailable {
        git: PathBuf,
        source: std::io::Error,
    },

    #[error("git describe exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("git describe timed out after {0:?}")]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One repository probe: a git executable pointed at a working directory.
#[derive(Debug, Clone)]
pub struct Probe {
    git: PathBuf,
    workdir: PathBuf,
    timeout: Duration,
}

impl Probe {
    pub fn new(git: PathBuf, workdir: PathBuf) -> Self {
        Self::with_timeout(git, workdir, DEFAULT_PROBE_TIMEOUT)
    }

    /// Same probe with an explicit deadline.
    pub fn with_timeout(git: PathBuf, workdir: PathBuf, timeout: Duration) -> Self {
        Self {
            git,
            workdir,
            timeout,
        }
    }

    /// Run `git describe --tags --dirty --always` and return its trimmed
    /// single-line output.
    pub fn describe(&self) -> Result<String, ProbeError> {
        let mut child = Command::new(&self.git)
            .args(["describe", "--tags", "--dirty", "--always"])
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProbeError::Unavailable {
                git: self.git.clone(),
                source,
            })?;

        // Drain both pipes off-thread: a child emitting more than a pipe
        // buffer must not stall behind the deadline below.
        let stdout = reader(child.stdout.take());
        let stderr = reader(child.stderr.take());

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                child.kill()?;
                child.wait()?;
                return Err(ProbeError::TimedOut(self.timeout));
            }
        };

        let stdout = join(stdout)?;
        let stderr = join(stderr)?;

        if !status.success() {
            return Err(ProbeError::Failed {
                status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout.trim().to_string())
    }
}

fn reader(pipe: Option<impl Read + Send + 'static>) -> JoinHandle<std::io::Result<String>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join(handle: JoinHandle<std::io::Result<String>>) -> std::io::Result<String> {
    handle
        .join()
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "pipe reader panicked"))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_unavailable() {
        let probe = Probe::new(
            PathBuf::from("/nonexistent/definitely-not-git"),
            std::env::temp_dir(),
        );
        match probe.describe() {
            Err(ProbeError::Unavailable { git, .. }) => {
                assert_eq!(git, PathBuf::from("/nonexistent/definitely-not-git"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[cfg(unix)]
    fn stub_git(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-git");
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    #[cfg(unix)]
    fn test_slow_probe_times_out() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = stub_git(dir.path(), "#!/bin/sh\nsleep 5\n");
        let probe = Probe::with_timeout(
            git,
            dir.path().to_path_buf(),
            Duration::from_millis(100),
        );
        match probe.describe() {
            Err(ProbeError::TimedOut(deadline)) => {
                assert_eq!(deadline, Duration::from_millis(100));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_chatty_probe_does_not_stall() {
        // Well past the 64 KiB pipe buffer.
        let dir = tempfile::TempDir::new().unwrap();
        let git = stub_git(
            dir.path(),
            "#!/bin/sh\nhead -c 200000 /dev/zero | tr '\\0' 'a'\n",
        );
        let probe = Probe::with_timeout(git, dir.path().to_path_buf(), Duration::from_secs(5));
        let out = probe.describe().unwrap();
        assert_eq!(out.len(), 200_000);
    }

    #[test]
    #[cfg(unix)]
    fn test_nonzero_exit_is_failed_with_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = stub_git(
            dir.path(),
            "#!/bin/sh\necho 'fatal: not a git repository' >&2\nexit 128\n",
        );
        let probe = Probe::new(git, dir.path().to_path_buf());
        match probe.describe() {
            Err(ProbeError::Failed { stderr, .. }) => {
                assert_eq!(stderr, "fatal: not a git repository");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
