//! Placing a verified binary into the install directory.

use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::paths::{install_path, staging_path};
use crate::verify::VerifiedArtifact;

/// Move `artifact` to `<install_dir>/<binary_name>` and mark it executable.
///
/// The file is renamed into place, replacing any existing binary. When the
/// workspace and install directory are on different filesystems the bytes are
/// copied next to the destination first (`<name>.new`) and that copy is
/// renamed, so the final path never holds a partial file. `install_dir` and
/// its parents are created when missing.
///
/// # Errors
///
/// Returns [`InstallError::InstallFailed`] naming the path that could not be
/// created, written or renamed. The staging file is removed on failure.
pub fn place(artifact: VerifiedArtifact, install_dir: &Path, binary_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(install_dir).map_err(|e| InstallError::install(install_dir, e))?;

    let src = artifact.path();
    let dest = install_path(install_dir, binary_name);
    set_executable(src).map_err(|e| InstallError::install(src, e))?;

    if let Err(e) = std::fs::rename(src, &dest) {
        tracing::debug!(error = %e, "direct rename failed, staging a copy");
        replace_via_copy(src, &dest)?;
    }

    tracing::debug!(
        artifact = artifact.artifact(),
        dest = %dest.display(),
        "binary placed"
    );
    Ok(dest)
}

/// Copy `src` to `<dest>.new`, mark it executable and rename it over `dest`.
///
/// Used when `src` cannot be renamed into place (different filesystems).
/// `src` is left for the workspace to clean up. The staging file never
/// outlives a failure.
fn replace_via_copy(src: &Path, dest: &Path) -> Result<()> {
    let staged = staging_path(dest);
    if let Err(e) = stage(src, &staged) {
        std::fs::remove_file(&staged).ok();
        return Err(InstallError::install(&staged, e));
    }
    if let Err(e) = std::fs::rename(&staged, dest) {
        std::fs::remove_file(&staged).ok();
        return Err(InstallError::install(dest, e));
    }
    Ok(())
}

fn stage(src: &Path, staged: &Path) -> std::io::Result<()> {
    std::fs::copy(src, staged)?;
    set_executable(staged)
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_: &Path) -> std::io::Result<()> {
    Ok(())
}
