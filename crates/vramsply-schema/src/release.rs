//! Release naming: version tags and artifact file names.

use serde::{Deserialize, Serialize};

use crate::TargetTriple;

/// Name of the per-release checksum manifest.
pub const MANIFEST_FILE_NAME: &str = "SHA256SUMS.txt";

/// Name of the installed program.
pub const DEFAULT_BINARY_NAME: &str = "vramsply";

/// Newtype for a release tag (e.g. `v0.1.0`).
///
/// The tag is opaque: it is placed verbatim into download URLs and never
/// parsed or compared semantically, so new tag schemes keep working.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Wrap a tag exactly as given.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Return the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReleaseVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReleaseVersion {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ReleaseVersion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// File name of the binary published for `target`: `{binary_name}-{target}`.
///
/// ```
/// use vramsply_schema::{artifact_name, TargetTriple};
///
/// let target = TargetTriple::from_raw("Darwin", "arm64").unwrap();
/// assert_eq!(artifact_name("vramsply", target), "vramsply-aarch64-apple-darwin");
/// ```
pub fn artifact_name(binary_name: &str, target: TargetTriple) -> String {
    format!("{binary_name}-{target}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_kept_verbatim() {
        for tag in ["v0.1.0", "0.1.0", "nightly-2026-10-01", "v1.0.0-rc.1+build.5"] {
            assert_eq!(ReleaseVersion::new(tag).as_str(), tag);
            assert_eq!(ReleaseVersion::from(tag).to_string(), tag);
        }
    }

    #[test]
    fn artifact_names_are_unique_per_target() {
        let names: Vec<String> = TargetTriple::ALL
            .iter()
            .map(|t| artifact_name(DEFAULT_BINARY_NAME, *t))
            .collect();
        assert!(names.contains(&"vramsply-x86_64-unknown-linux-gnu".to_string()));
        assert!(names.contains(&"vramsply-aarch64-apple-darwin".to_string()));
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }
}
