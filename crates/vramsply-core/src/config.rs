//! Explicit run configuration.
//!
//! Every stage reads its inputs from an [`InstallConfig`] handed to it; nothing
//! consults process-wide environment state after the CLI has built the config.

use std::path::PathBuf;
use std::time::Duration;

use vramsply_schema::DEFAULT_BINARY_NAME;

use crate::paths;

/// Base URL under which `{version}/{file}` release assets live.
pub const DEFAULT_RELEASE_BASE_URL: &str =
    "https://github.com/vram-supply/vramsply/releases/download";

/// Endpoint returning the latest release document (with `tag_name`).
pub const DEFAULT_LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/vram-supply/vramsply/releases/latest";

/// Per-request timeout applied to every release channel call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// How long the post-install `--version` smoke test may run.
pub const SMOKE_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw OS and architecture names, before resolution into a target triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlatform {
    /// OS name, e.g. `Linux` or `Darwin`.
    pub os: String,
    /// Machine architecture, e.g. `x86_64` or `arm64`.
    pub arch: String,
}

impl RawPlatform {
    /// The running process's platform as reported by `std::env::consts`.
    pub fn host() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    /// Explicit values, e.g. from `--os` / `--arch`.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

/// Everything one installer run needs to know.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Name of the program being installed; also the artifact prefix.
    pub binary_name: String,
    /// Pinned release tag. `None` (or empty) means "latest".
    pub version_override: Option<String>,
    /// Base URL for `{version}/{file}` downloads.
    pub release_base_url: String,
    /// Latest-release metadata endpoint.
    pub latest_release_url: String,
    /// Optional bearer token for the latest-release API.
    pub github_token: Option<String>,
    /// Directory the binary is placed in.
    pub install_dir: PathBuf,
    /// Parent directory for the ephemeral workspace; system temp when `None`.
    pub workspace_root: Option<PathBuf>,
    /// Raw platform identifiers to resolve.
    pub platform: RawPlatform,
    /// Per-request network timeout.
    pub timeout: Duration,
}

impl InstallConfig {
    /// Defaults for everything except the install directory.
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            version_override: None,
            release_base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
            latest_release_url: DEFAULT_LATEST_RELEASE_URL.to_string(),
            github_token: None,
            install_dir: install_dir.into(),
            workspace_root: None,
            platform: RawPlatform::host(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The pinned version, treating an empty override as absent.
    pub fn version_override(&self) -> Option<&str> {
        self.version_override.as_deref().filter(|v| !v.is_empty())
    }

    /// Where the binary ends up.
    pub fn install_path(&self) -> PathBuf {
        paths::install_path(&self.install_dir, &self.binary_name)
    }
}
