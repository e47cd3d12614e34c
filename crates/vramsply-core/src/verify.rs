//! Integrity verification against the release checksum manifest.

use std::path::{Path, PathBuf};

use vramsply_schema::{ChecksumManifest, ReleaseVersion, Sha256Digest};

use crate::error::{InstallError, Result};
use crate::io::hashing::sha256_file_async;

/// A downloaded binary whose SHA-256 matched the manifest.
///
/// Only [`verify_artifact`] constructs this type.
#[derive(Debug)]
pub struct VerifiedArtifact {
    path: PathBuf,
    artifact: String,
    digest: Sha256Digest,
}

impl VerifiedArtifact {
    /// Location of the verified file inside the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Published artifact file name.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// The digest that matched.
    pub fn digest(&self) -> &Sha256Digest {
        &self.digest
    }
}

/// Compare a computed digest with the manifest's entry for `artifact`.
///
/// The lookup is by exact filename; equality of the (lowercase-normalized)
/// digests is the only pass condition.
///
/// # Errors
///
/// [`InstallError::ChecksumNotFound`] when the manifest has no entry for
/// `artifact`, [`InstallError::ChecksumMismatch`] when the digests differ.
pub fn check_digest(
    manifest: &ChecksumManifest,
    artifact: &str,
    version: &ReleaseVersion,
    actual: &Sha256Digest,
) -> Result<()> {
    let expected = manifest
        .get(artifact)
        .ok_or_else(|| InstallError::ChecksumNotFound {
            artifact: artifact.to_string(),
            version: version.clone(),
        })?;

    if expected != actual {
        return Err(InstallError::ChecksumMismatch {
            artifact: artifact.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }

    Ok(())
}

/// Hash the file at `path` and check it against `manifest`.
///
/// The manifest entry is looked up before hashing, so a release that does
/// not list this artifact fails without reading the download.
///
/// # Errors
///
/// See [`check_digest`]; also [`InstallError::Workspace`] if the downloaded
/// file cannot be read.
pub async fn verify_artifact(
    path: PathBuf,
    artifact: &str,
    version: &ReleaseVersion,
    manifest: &ChecksumManifest,
) -> Result<VerifiedArtifact> {
    if manifest.get(artifact).is_none() {
        return Err(InstallError::ChecksumNotFound {
            artifact: artifact.to_string(),
            version: version.clone(),
        });
    }

    let actual = sha256_file_async(path.clone())
        .await
        .map_err(InstallError::Workspace)?;
    check_digest(manifest, artifact, version, &actual)?;

    tracing::debug!(artifact, digest = %actual, "checksum verified");
    Ok(VerifiedArtifact {
        path,
        artifact: artifact.to_string(),
        digest: actual,
    })
}
