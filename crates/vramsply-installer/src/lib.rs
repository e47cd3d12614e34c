//! vramsply-install - verified bootstrap installer for the vramsply CLI
//!
//! Detects the host platform, picks a release, downloads the matching binary
//! and the release's `SHA256SUMS.txt`, verifies the digest and places the
//! binary in the install directory (default `~/.local/bin`).
//!
//! Every option can also be set from the environment, so the usual
//! `curl ... | sh`-style one-liners translate to:
//!
//! ```text
//! VRAMSPLY_VERSION=v0.1.0 VRAMSPLY_INSTALL_DIR=/opt/bin vramsply-install
//! ```

pub mod cmd;
pub mod ui;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use vramsply_core::config::{
    DEFAULT_LATEST_RELEASE_URL, DEFAULT_RELEASE_BASE_URL, DEFAULT_TIMEOUT,
};
use vramsply_core::paths::try_default_install_dir;
use vramsply_core::{InstallConfig, RawPlatform};
use vramsply_schema::DEFAULT_BINARY_NAME;

/// Command-line interface of `vramsply-install`.
#[derive(Debug, Parser)]
#[command(name = "vramsply-install")]
#[command(author, version, about = "Install the vramsply CLI from a verified release")]
pub struct Cli {
    /// Release tag to install (default: latest release)
    #[arg(long = "version-tag", env = "VRAMSPLY_VERSION", value_name = "TAG")]
    pub version_tag: Option<String>,

    /// Directory the binary is installed into [default: ~/.local/bin]
    #[arg(long, env = "VRAMSPLY_INSTALL_DIR", value_name = "DIR")]
    pub install_dir: Option<PathBuf>,

    /// Base URL of per-version release assets
    #[arg(
        long,
        env = "VRAMSPLY_RELEASE_BASE_URL",
        value_name = "URL",
        default_value = DEFAULT_RELEASE_BASE_URL
    )]
    pub release_base_url: String,

    /// Endpoint returning the latest release document
    #[arg(
        long,
        env = "VRAMSPLY_LATEST_URL",
        value_name = "URL",
        default_value = DEFAULT_LATEST_RELEASE_URL
    )]
    pub latest_url: String,

    /// Token for the release API, to lift anonymous rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Where the temporary download directory is created [default: system temp]
    #[arg(long, env = "VRAMSPLY_WORKSPACE_ROOT", value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// Per-request network timeout in seconds
    #[arg(
        long,
        env = "VRAMSPLY_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs()
    )]
    pub timeout: u64,

    /// Operating system to install for (default: this host)
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// Architecture to install for (default: this host)
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Name of the installed program and artifact prefix
    #[arg(long, hide = true, default_value = DEFAULT_BINARY_NAME)]
    pub binary_name: String,

    /// Show what would be installed without downloading anything
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not run the installed binary with `--version` afterwards
    #[arg(long)]
    pub skip_smoke_test: bool,
}

impl Cli {
    /// Build the run configuration from parsed flags.
    ///
    /// # Errors
    ///
    /// Fails when no install directory was given and the home directory
    /// cannot be determined.
    pub fn install_config(&self) -> anyhow::Result<InstallConfig> {
        let install_dir = match non_empty_path(self.install_dir.as_ref()) {
            Some(dir) => dir,
            None => try_default_install_dir()
                .context("could not determine the home directory; pass --install-dir")?,
        };

        let host = RawPlatform::host();
        let platform = RawPlatform::new(
            self.os.clone().unwrap_or(host.os),
            self.arch.clone().unwrap_or(host.arch),
        );

        let mut config = InstallConfig::new(install_dir);
        config.binary_name.clone_from(&self.binary_name);
        config.version_override.clone_from(&self.version_tag);
        config.release_base_url.clone_from(&self.release_base_url);
        config.latest_release_url.clone_from(&self.latest_url);
        config.github_token.clone_from(&self.github_token);
        config.workspace_root = non_empty_path(self.workspace_root.as_ref());
        config.platform = platform;
        config.timeout = Duration::from_secs(self.timeout);
        Ok(config)
    }
}

fn non_empty_path(path: Option<&PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty()).cloned()
}
