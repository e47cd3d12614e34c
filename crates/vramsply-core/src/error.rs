//! Installer error taxonomy.
//!
//! Every variant is fatal. Messages carry the concrete values involved
//! (platform string, version, URL, digests, paths) so the user can diagnose
//! the failure from the message alone.

use std::path::PathBuf;

use thiserror::Error;
use vramsply_schema::{ManifestError, PlatformError, ReleaseVersion, Sha256Digest};

/// Convenient result alias for installer operations.
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

/// Errors that abort an installer run.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The host OS or architecture has no published binary.
    #[error(transparent)]
    UnsupportedPlatform(#[from] PlatformError),

    /// No usable version: no override and the latest-release lookup failed.
    #[error("could not resolve the version to install: {reason}")]
    VersionResolutionFailed {
        /// What went wrong with the lookup.
        reason: String,
    },

    /// A release asset could not be fetched or written to the workspace.
    #[error("download failed for {url}: {source}")]
    DownloadFailed {
        /// The asset URL.
        url: String,
        /// Transport, HTTP status or local write error.
        #[source]
        source: std::io::Error,
    },

    /// The checksum manifest is unparseable.
    #[error("checksum manifest for release {version} is invalid: {source}")]
    InvalidManifest {
        /// Release the manifest belongs to.
        version: ReleaseVersion,
        /// First parse problem.
        #[source]
        source: ManifestError,
    },

    /// The manifest has no record for this platform's artifact.
    #[error("checksum not found: the manifest for release {version} has no entry for {artifact}")]
    ChecksumNotFound {
        /// Expected artifact file name.
        artifact: String,
        /// Release being installed.
        version: ReleaseVersion,
    },

    /// The downloaded bytes do not hash to the manifest's digest.
    #[error(
        "checksum mismatch for {artifact}: expected {expected}, got {actual}; \
         the download may be corrupted or tampered with"
    )]
    ChecksumMismatch {
        /// Artifact file name.
        artifact: String,
        /// Digest listed in the manifest.
        expected: Sha256Digest,
        /// Digest of the downloaded file.
        actual: Sha256Digest,
    },

    /// Creating the install directory or placing the binary failed.
    #[error("install failed at {}: {source}", path.display())]
    InstallFailed {
        /// The path being created or written.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The ephemeral workspace could not be created or read.
    #[error("workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    /// The run was cancelled before it finished.
    #[error("installation interrupted")]
    Interrupted,
}

impl InstallError {
    /// Wrap a transport or HTTP status error for `url`.
    pub fn download(url: impl Into<String>, err: reqwest::Error) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            source: std::io::Error::other(err),
        }
    }

    /// Wrap a local I/O error that happened while saving `url`.
    pub fn download_io(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            source,
        }
    }

    /// Wrap a filesystem error at `path` during placement.
    pub fn install(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InstallFailed {
            path: path.into(),
            source,
        }
    }

    /// Whether simply rerunning the installer may succeed.
    ///
    /// Network-facing failures are transient; platform, manifest and
    /// checksum failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::VersionResolutionFailed { .. } | Self::DownloadFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_values() {
        let err = InstallError::ChecksumNotFound {
            artifact: "vramsply-x86_64-unknown-linux-gnu".into(),
            version: ReleaseVersion::new("v0.1.0"),
        };
        let msg = err.to_string();
        assert!(msg.contains("vramsply-x86_64-unknown-linux-gnu"));
        assert!(msg.contains("v0.1.0"));

        let err = InstallError::download_io(
            "https://example.com/v1/SHA256SUMS.txt",
            std::io::Error::other("disk full"),
        );
        assert!(err.to_string().contains("https://example.com/v1/SHA256SUMS.txt"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn platform_error_is_transparent() {
        let err: InstallError = PlatformError::UnsupportedArch("riscv64".into()).into();
        assert!(err.to_string().contains("riscv64"));
        assert!(!err.is_transient());
    }

    #[test]
    fn only_network_failures_are_transient() {
        assert!(
            InstallError::VersionResolutionFailed {
                reason: "HTTP 502".into()
            }
            .is_transient()
        );
        assert!(!InstallError::Interrupted.is_transient());
        assert!(
            !InstallError::install("/nope", std::io::Error::other("denied")).is_transient()
        );
    }
}
