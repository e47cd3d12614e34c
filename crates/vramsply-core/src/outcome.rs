//! Post-install checks: is the binary reachable, and does it run?
//!
//! Nothing here modifies the user's environment. The PATH check only reads the
//! `PATH` value it is given and produces a command for the user to run.

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

/// Whether the installed binary will be found by the user's shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStatus {
    /// The install directory is on `PATH` and nothing earlier shadows it.
    OnPath,
    /// The install directory is on `PATH` but an earlier entry wins.
    Shadowed {
        /// The file the shell would run instead.
        by: PathBuf,
    },
    /// The install directory is not on `PATH`.
    Missing {
        /// Command that adds it for the current shell session.
        remediation: String,
    },
}

/// Shell command that prepends `dir` to `PATH`.
///
/// `shell` is the value of `$SHELL`; fish gets `fish_add_path`, everything
/// else the POSIX `export` form.
pub fn remediation_command(dir: &Path, shell: Option<&str>) -> String {
    let is_fish = shell
        .and_then(|s| Path::new(s).file_name())
        .is_some_and(|name| name == "fish");
    if is_fish {
        format!("fish_add_path {}", dir.display())
    } else {
        format!("export PATH=\"{}:$PATH\"", dir.display())
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if normalize(a) == normalize(b) {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => normalize(a) == normalize(b),
    }
}

/// Check `install_dir` against the `PATH` value `path_var`.
///
/// Directory entries are compared after lexical normalization (and, when both
/// exist, after resolving symlinks). When the directory is present, the first
/// `binary_name` on `PATH` must be the installed one or it is reported as
/// shadowed.
pub fn check_path(
    install_dir: &Path,
    binary_name: &str,
    path_var: Option<&OsStr>,
    shell: Option<&str>,
) -> PathStatus {
    let on_path = path_var
        .is_some_and(|p| std::env::split_paths(p).any(|entry| same_dir(&entry, install_dir)));

    if !on_path {
        return PathStatus::Missing {
            remediation: remediation_command(install_dir, shell),
        };
    }

    let installed = install_dir.join(binary_name);
    match which::which_in(binary_name, path_var, install_dir) {
        Ok(found) if !same_file(&found, &installed) => {
            tracing::debug!(found = %found.display(), "installed binary is shadowed");
            PathStatus::Shadowed { by: found }
        }
        _ => PathStatus::OnPath,
    }
}

/// Result of running the installed binary with `--version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmokeTest {
    /// Exit status zero; first line of stdout.
    Passed {
        /// Trimmed first line of output.
        output: String,
    },
    /// Spawn error, non-zero exit or timeout.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

/// Run `<binary> --version`, killing it after `timeout`.
///
/// Blocking; call from a blocking context.
pub fn smoke_test(binary: &Path, timeout: Duration) -> SmokeTest {
    let failed = |reason: String| SmokeTest::Failed { reason };

    let mut child = match Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return failed(format!("could not run {}: {e}", binary.display())),
    };

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            child.kill().ok();
            child.wait().ok();
            return failed(format!("timed out after {}s", timeout.as_secs()));
        }
        Err(e) => {
            child.kill().ok();
            return failed(format!("could not wait for {}: {e}", binary.display()));
        }
    };

    if !status.success() {
        return failed(format!("`{} --version` exited with {status}", binary.display()));
    }

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_string(&mut stdout).ok();
    }
    SmokeTest::Passed {
        output: stdout.lines().next().unwrap_or_default().trim().to_string(),
    }
}
