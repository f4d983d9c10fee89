//! Concrete health probes bound from the graph definition file.
//!
//! These are the only place the CLI touches the outside world on behalf of
//! the engine. I/O failures other than "not found" are returned as errors and
//! surface as `probe error: ...` issues.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tangle_core::{HealthProbe, HealthResult};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A probe declaration with paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundProbe {
    Static {
        healthy: bool,
        issues: Vec<String>,
    },
    PathExists(PathBuf),
    FileNonempty(PathBuf),
    DirNotEmpty(PathBuf),
    EnvVar(String),
    Command {
        program: String,
        args: Vec<String>,
        timeout_ms: u64,
        working_dir: PathBuf,
    },
}

impl HealthProbe for BoundProbe {
    fn check(&self) -> Result<HealthResult> {
        match self {
            Self::Static { healthy, issues } => Ok(if *healthy {
                HealthResult::healthy()
            } else {
                HealthResult::unhealthy(issues.iter().cloned())
            }),
            Self::PathExists(path) => Ok(HealthResult::from_check(
                path.exists(),
                format!("path not found: {}", path.display()),
            )),
            Self::FileNonempty(path) => check_file_nonempty(path),
            Self::DirNotEmpty(path) => check_dir_not_empty(path),
            Self::EnvVar(name) => Ok(HealthResult::from_check(
                std::env::var_os(name).is_some_and(|v| !v.is_empty()),
                format!("environment variable {name} is not set"),
            )),
            Self::Command {
                program,
                args,
                timeout_ms,
                working_dir,
            } => check_command(program, args, Duration::from_millis(*timeout_ms), working_dir),
        }
    }
}

fn check_file_nonempty(path: &Path) -> Result<HealthResult> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Ok(HealthResult::unhealthy([format!(
                "file not found: {}",
                path.display()
            )]));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to stat {}", path.display()));
        }
    };

    if !meta.is_file() {
        return Ok(HealthResult::unhealthy([format!(
            "not a regular file: {}",
            path.display()
        )]));
    }
    Ok(HealthResult::from_check(
        meta.len() > 0,
        format!("file is empty: {}", path.display()),
    ))
}

fn check_dir_not_empty(path: &Path) -> Result<HealthResult> {
    let mut entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Ok(HealthResult::unhealthy([format!(
                "directory not found: {}",
                path.display()
            )]));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    Ok(HealthResult::from_check(
        entries.next().is_some(),
        format!("directory is empty: {}", path.display()),
    ))
}

/// Run `program` and wait up to `timeout`. A timeout kills the child and is
/// reported as unhealthy, not as an error.
fn check_command(
    program: &str,
    args: &[String],
    timeout: Duration,
    working_dir: &Path,
) -> Result<HealthResult> {
    let mut child = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to spawn {program}"))?;

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("Failed to poll child process")? {
            debug!(program, %status, elapsed_ms = started.elapsed().as_millis(), "command probe finished");
            return Ok(HealthResult::from_check(
                status.success(),
                format!("{program} exited with {status}"),
            ));
        }
        if started.elapsed() >= timeout {
            // Already-exited races are fine; kill only fails if the child is gone.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(HealthResult::unhealthy([format!(
                "{program} timed out after {}ms",
                timeout.as_millis()
            )]));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangle_core::HealthStatus;
    use tempfile::TempDir;

    #[test]
    fn static_probe_reports_declared_issues() {
        let probe = BoundProbe::Static {
            healthy: false,
            issues: vec!["maintenance".to_string()],
        };
        let result = probe.check().expect("static");
        assert_eq!(result.status, HealthStatus::Unhealthy);
        assert_eq!(result.issues, vec!["maintenance".to_string()]);
    }

    #[test]
    fn path_exists_probe() {
        let dir = TempDir::new().expect("tempdir");
        let present = BoundProbe::PathExists(dir.path().to_path_buf());
        assert!(present.check().expect("check").is_healthy());

        let missing = BoundProbe::PathExists(dir.path().join("nope"));
        let result = missing.check().expect("check");
        assert!(!result.is_healthy());
        assert!(result.issues[0].starts_with("path not found"));
    }

    #[test]
    fn file_nonempty_probe() {
        let dir = TempDir::new().expect("tempdir");
        let empty = dir.path().join("empty.txt");
        let full = dir.path().join("full.txt");
        fs::write(&empty, "").expect("write");
        fs::write(&full, "data").expect("write");

        assert!(!BoundProbe::FileNonempty(empty).check().expect("check").is_healthy());
        assert!(BoundProbe::FileNonempty(full).check().expect("check").is_healthy());

        let result = BoundProbe::FileNonempty(dir.path().join("missing"))
            .check()
            .expect("check");
        assert!(result.issues[0].starts_with("file not found"));

        let result = BoundProbe::FileNonempty(dir.path().to_path_buf())
            .check()
            .expect("check");
        assert!(result.issues[0].starts_with("not a regular file"));
    }

    #[test]
    fn dir_not_empty_probe() {
        let dir = TempDir::new().expect("tempdir");
        let probe = BoundProbe::DirNotEmpty(dir.path().to_path_buf());
        assert!(!probe.check().expect("check").is_healthy());

        fs::write(dir.path().join("x"), "1").expect("write");
        assert!(probe.check().expect("check").is_healthy());

        let missing = BoundProbe::DirNotEmpty(dir.path().join("gone"));
        assert!(missing.check().expect("check").issues[0].starts_with("directory not found"));
    }

    #[test]
    fn env_var_probe_requires_non_empty_value() {
        let probe = BoundProbe::EnvVar("TANGLE_TEST_SURELY_UNSET_VARIABLE".to_string());
        let result = probe.check().expect("check");
        assert!(!result.is_healthy());
        assert!(result.issues[0].contains("TANGLE_TEST_SURELY_UNSET_VARIABLE"));
    }

    #[cfg(unix)]
    #[test]
    fn command_probe_uses_exit_status() {
        let cwd = std::env::temp_dir();
        let ok = BoundProbe::Command {
            program: "true".to_string(),
            args: Vec::new(),
            timeout_ms: 5000,
            working_dir: cwd.clone(),
        };
        assert!(ok.check().expect("check").is_healthy());

        let failing = BoundProbe::Command {
            program: "false".to_string(),
            args: Vec::new(),
            timeout_ms: 5000,
            working_dir: cwd,
        };
        assert!(!failing.check().expect("check").is_healthy());
    }

    #[cfg(unix)]
    #[test]
    fn command_probe_times_out_as_unhealthy() {
        let probe = BoundProbe::Command {
            program: "sleep".to_string(),
            args: vec!["5".to_string()],
            timeout_ms: 50,
            working_dir: std::env::temp_dir(),
        };
        let started = Instant::now();
        let result = probe.check().expect("check");
        assert!(!result.is_healthy());
        assert!(result.issues[0].contains("timed out after 50ms"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_an_error() {
        let probe = BoundProbe::Command {
            program: "tangle-definitely-not-a-real-program".to_string(),
            args: Vec::new(),
            timeout_ms: 1000,
            working_dir: std::env::temp_dir(),
        };
        let err = probe.check().expect_err("spawn fails");
        assert!(format!("{err:#}").contains("Failed to spawn"));
    }
}
