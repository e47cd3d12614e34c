//! The install pipeline, stage by stage.
//!
//! [`InstallFlow::plan`] resolves what to install without touching the
//! filesystem; [`InstallFlow::execute`] downloads, verifies and places it.
//! [`InstallFlow::run_until`] wraps both in a race against a shutdown signal.

use std::future::Future;
use std::path::PathBuf;

use vramsply_schema::{
    ChecksumManifest, MANIFEST_FILE_NAME, ReleaseVersion, Sha256Digest, TargetTriple,
    artifact_name,
};

use crate::channel::ReleaseChannel;
use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::install::place;
use crate::reporter::Reporter;
use crate::resolver::{ResolvedVersion, VersionSource, resolve_version};
use crate::verify::verify_artifact;
use crate::workspace::Workspace;

/// Everything decided before the first byte is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Platform the binary is built for.
    pub target: TargetTriple,
    /// Release being installed.
    pub version: ResolvedVersion,
    /// Artifact file name, `{binary}-{triple}`.
    pub artifact: String,
    /// Where the binary is downloaded from.
    pub binary_url: String,
    /// Where the checksum manifest is downloaded from.
    pub manifest_url: String,
    /// Final location of the binary.
    pub install_path: PathBuf,
}

/// A successfully installed binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    /// Where it was placed.
    pub path: PathBuf,
    /// Installed release.
    pub version: ReleaseVersion,
    /// Platform of the binary.
    pub target: TargetTriple,
    /// Verified SHA-256 of the installed bytes.
    pub digest: Sha256Digest,
    /// Size in bytes.
    pub size: u64,
}

/// One installer run over a release channel, narrated through a reporter.
pub struct InstallFlow<C, R> {
    config: InstallConfig,
    channel: C,
    reporter: R,
}

impl<C: ReleaseChannel, R: Reporter> InstallFlow<C, R> {
    /// Assemble a run.
    pub fn new(config: InstallConfig, channel: C, reporter: R) -> Self {
        Self {
            config,
            channel,
            reporter,
        }
    }

    /// The configuration this run uses.
    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Resolve the platform, then the version, and derive every URL and path.
    ///
    /// The platform is checked first, so an unsupported host fails without any
    /// network traffic. With a pinned version this makes no requests at all.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnsupportedPlatform`] or
    /// [`InstallError::VersionResolutionFailed`].
    pub async fn plan(&self) -> Result<ReleasePlan> {
        let platform = &self.config.platform;
        let target = TargetTriple::from_raw(&platform.os, &platform.arch)?;
        self.reporter.info(&format!("Platform: {target}"));

        let version = resolve_version(self.config.version_override(), &self.channel).await?;
        let provenance = match version.source {
            VersionSource::Override => "pinned",
            VersionSource::Latest => "latest",
        };
        self.reporter
            .info(&format!("Version: {} ({provenance})", version.version));

        let artifact = artifact_name(&self.config.binary_name, target);
        let binary_url = self.channel.asset_url(&version.version, &artifact);
        let manifest_url = self.channel.asset_url(&version.version, MANIFEST_FILE_NAME);

        Ok(ReleasePlan {
            target,
            version,
            artifact,
            binary_url,
            manifest_url,
            install_path: self.config.install_path(),
        })
    }

    /// Download, verify and install the release described by `plan`.
    ///
    /// All downloads land in a fresh [`Workspace`] that is removed on every
    /// exit path, including when this future is dropped mid-download.
    ///
    /// # Errors
    ///
    /// Any fetch, manifest, checksum, install or workspace error.
    pub async fn execute(&self, plan: &ReleasePlan) -> Result<InstalledBinary> {
        let workspace = Workspace::create(self.config.workspace_root.as_deref())?;
        let version = &plan.version.version;

        self.reporter.section("Downloading");
        let binary = workspace.file(&plan.artifact);
        let size = self
            .channel
            .fetch_asset(version, &plan.artifact, &binary, &self.reporter)
            .await?;

        let manifest_path = workspace.file(MANIFEST_FILE_NAME);
        self.channel
            .fetch_asset(version, MANIFEST_FILE_NAME, &manifest_path, &self.reporter)
            .await?;

        self.reporter.section("Verifying");
        let raw = tokio::fs::read(&manifest_path)
            .await
            .map_err(InstallError::Workspace)?;
        let manifest = ChecksumManifest::parse(&String::from_utf8_lossy(&raw)).map_err(|source| {
            InstallError::InvalidManifest {
                version: version.clone(),
                source,
            }
        })?;
        tracing::debug!(entries = manifest.len(), "manifest parsed");

        let verified = verify_artifact(binary, &plan.artifact, version, &manifest).await?;
        let digest = verified.digest().clone();
        self.reporter
            .success(&format!("Checksum verified ({digest})"));

        self.reporter.section("Installing");
        let path = place(verified, &self.config.install_dir, &self.config.binary_name)?;

        if let Err(e) = workspace.close() {
            tracing::warn!(error = %e, "failed to remove workspace");
        }

        Ok(InstalledBinary {
            path,
            version: version.clone(),
            target: plan.target,
            digest,
            size,
        })
    }

    /// [`plan`](Self::plan) then [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// Any error from either stage.
    pub async fn run(&self) -> Result<InstalledBinary> {
        let plan = self.plan().await?;
        self.execute(&plan).await
    }

    /// [`run`](Self::run), abandoned as soon as `shutdown` completes.
    ///
    /// Abandoning drops the in-flight run, which removes its workspace.
    ///
    /// # Errors
    ///
    /// [`InstallError::Interrupted`] when `shutdown` wins, otherwise the
    /// run's own error.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<InstalledBinary>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run() => result,
            () = shutdown => {
                tracing::debug!("shutdown requested, abandoning run");
                Err(InstallError::Interrupted)
            }
        }
    }
}
