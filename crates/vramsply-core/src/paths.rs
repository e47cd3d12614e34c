use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Default install directory (`~/.local/bin`), or None if the user's home cannot be resolved.
pub fn try_default_install_dir() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".local").join("bin"))
}

/// Final location of the installed binary: `<install_dir>/<binary_name>`
pub fn install_path(install_dir: &Path, binary_name: &str) -> PathBuf {
    install_dir.join(binary_name)
}

/// Staging path next to `dest` (`<dest>.new`), guaranteed same volume as the install dir
pub fn staging_path(dest: &Path) -> PathBuf {
    let mut staged = dest.as_os_str().to_os_string();
    staged.push(".new");
    PathBuf::from(staged)
}

/// Workspace directory name prefix, so stray directories are recognizable.
pub const WORKSPACE_PREFIX: &str = "vramsply-install-";
