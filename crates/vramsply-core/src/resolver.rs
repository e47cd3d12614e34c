//! Version resolution: a pinned override wins; otherwise ask the channel.

use vramsply_schema::ReleaseVersion;

use crate::channel::ReleaseChannel;
use crate::error::{InstallError, Result};

/// Where the resolved version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Supplied by the caller; no network call was made.
    Override,
    /// Discovered through the channel's latest-release endpoint.
    Latest,
}

/// A version tag plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// The opaque tag.
    pub version: ReleaseVersion,
    /// How it was chosen.
    pub source: VersionSource,
}

/// Decide which release to install.
///
/// A non-empty `override_tag` is returned verbatim without touching
/// `channel`. Otherwise the latest-release document's `tag_name` is used; the
/// tag's format is never validated.
///
/// # Errors
///
/// Returns [`InstallError::VersionResolutionFailed`] when the lookup fails or
/// yields no tag (absent, empty or whitespace-only).
pub async fn resolve_version<C>(override_tag: Option<&str>, channel: &C) -> Result<ResolvedVersion>
where
    C: ReleaseChannel + ?Sized,
{
    if let Some(tag) = override_tag.filter(|t| !t.is_empty()) {
        tracing::debug!(tag, "using pinned version");
        return Ok(ResolvedVersion {
            version: ReleaseVersion::new(tag),
            source: VersionSource::Override,
        });
    }

    let release = channel.latest_release().await?;
    match release.tag_name {
        Some(tag) if !tag.trim().is_empty() => {
            tracing::debug!(tag = %tag, "resolved latest release");
            Ok(ResolvedVersion {
                version: ReleaseVersion::new(tag),
                source: VersionSource::Latest,
            })
        }
        _ => Err(InstallError::VersionResolutionFailed {
            reason: "latest release response has no tag_name".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reporter;
    use crate::channel::LatestRelease;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Channel that counts every call and answers with a fixed tag.
    struct CountingChannel {
        tag: Option<String>,
        calls: AtomicUsize,
    }

    impl CountingChannel {
        fn new(tag: Option<&str>) -> Self {
            Self {
                tag: tag.map(str::to_string),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReleaseChannel for CountingChannel {
        async fn latest_release(&self) -> Result<LatestRelease> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LatestRelease {
                tag_name: self.tag.clone(),
            })
        }

        fn asset_url(&self, version: &ReleaseVersion, file_name: &str) -> String {
            format!("stub://{version}/{file_name}")
        }

        async fn fetch_asset(
            &self,
            _: &ReleaseVersion,
            _: &str,
            _: &Path,
            _: &dyn Reporter,
        ) -> Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn override_is_verbatim_and_offline() {
        let channel = CountingChannel::new(Some("v9.9.9"));
        for tag in ["v0.1.0", " spaced ", "not-a-semver"] {
            let resolved = resolve_version(Some(tag), &channel).await.unwrap();
            assert_eq!(resolved.version.as_str(), tag);
            assert_eq!(resolved.source, VersionSource::Override);
        }
        assert_eq!(channel.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_override_falls_back_to_latest() {
        let channel = CountingChannel::new(Some("v0.2.0"));
        let resolved = resolve_version(Some(""), &channel).await.unwrap();
        assert_eq!(resolved.version.as_str(), "v0.2.0");
        assert_eq!(resolved.source, VersionSource::Latest);
        assert_eq!(channel.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn latest_tag_is_used_verbatim() {
        let channel = CountingChannel::new(Some("release-2026.10"));
        let resolved = resolve_version(None, &channel).await.unwrap();
        assert_eq!(resolved.version.as_str(), "release-2026.10");
    }

    #[tokio::test]
    async fn absent_or_blank_tag_fails() {
        for tag in [None, Some(""), Some("   ")] {
            let channel = CountingChannel::new(tag);
            let err = resolve_version(None, &channel).await.unwrap_err();
            assert!(
                matches!(err, InstallError::VersionResolutionFailed { .. }),
                "{tag:?}"
            );
        }
    }
}
