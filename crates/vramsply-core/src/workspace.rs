//! Ephemeral per-run download directory.
//!
//! The directory is owned by a [`Workspace`] value and removed when that value
//! is dropped. Because cancellation drops the in-flight run future, the same
//! mechanism covers success, `?` error returns and interrupts.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{InstallError, Result};
use crate::paths::WORKSPACE_PREFIX;

/// Scoped temporary directory holding one run's downloads.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under `root`, or the system temp dir.
    ///
    /// `root` is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Workspace`] if the directory cannot be created.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(InstallError::Workspace)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(InstallError::Workspace)?;

        tracing::debug!(path = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file named `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the workspace now, surfacing any cleanup error.
    ///
    /// Dropping the value also removes it, silently.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from removing the directory tree.
    pub fn close(self) -> std::io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!(path = %path.display(), "workspace removed");
        Ok(())
    }
}
