//! Release channel: where versions and assets come from.
//!
//! [`ReleaseChannel`] is the seam between the pipeline and the network. The
//! production implementation talks to GitHub releases; tests substitute stubs
//! that count calls or never answer.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use vramsply_schema::ReleaseVersion;

use crate::Reporter;
use crate::config::InstallConfig;
use crate::error::{InstallError, Result};
use crate::io::download::download_to_file;

/// The subset of a latest-release document the installer reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestRelease {
    /// Release tag, e.g. `v0.1.0`. Absent in malformed responses.
    #[serde(default)]
    pub tag_name: Option<String>,
}

/// Source of release metadata and assets.
#[async_trait]
pub trait ReleaseChannel: Send + Sync {
    /// Fetch the latest-release document.
    async fn latest_release(&self) -> Result<LatestRelease>;

    /// URL of `file_name` within release `version`.
    fn asset_url(&self, version: &ReleaseVersion, file_name: &str) -> String;

    /// Download `file_name` of release `version` into `dest`.
    ///
    /// Returns the number of bytes written.
    async fn fetch_asset(
        &self,
        version: &ReleaseVersion,
        file_name: &str,
        dest: &Path,
        reporter: &dyn Reporter,
    ) -> Result<u64>;
}

/// GitHub-style release channel over HTTP.
#[derive(Debug, Clone)]
pub struct GithubReleaseChannel {
    client: Client,
    base_url: String,
    latest_url: String,
    token: Option<String>,
}

impl GithubReleaseChannel {
    /// Build a channel from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns the client construction error (TLS backend initialization).
    pub fn new(config: &InstallConfig) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a channel around an existing client.
    pub fn with_client(client: Client, config: &InstallConfig) -> Self {
        Self {
            client,
            base_url: config.release_base_url.trim_end_matches('/').to_string(),
            latest_url: config.latest_release_url.clone(),
            token: config.github_token.clone().filter(|t| !t.is_empty()),
        }
    }
}

fn resolution_failed(reason: impl Into<String>) -> InstallError {
    InstallError::VersionResolutionFailed {
        reason: reason.into(),
    }
}

#[async_trait]
impl ReleaseChannel for GithubReleaseChannel {
    async fn latest_release(&self) -> Result<LatestRelease> {
        let url = self.latest_url.as_str();
        tracing::debug!(url, "querying latest release");

        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| resolution_failed(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
                || (status == StatusCode::FORBIDDEN
                    && response
                        .headers()
                        .get("x-ratelimit-remaining")
                        .is_some_and(|v| v == "0"));
            let reason = if rate_limited {
                format!(
                    "{url} returned HTTP {status}: API rate limit exceeded \
                     (set GITHUB_TOKEN or pin a version with VRAMSPLY_VERSION)"
                )
            } else {
                format!("{url} returned HTTP {status}")
            };
            return Err(resolution_failed(reason));
        }

        response
            .json::<LatestRelease>()
            .await
            .map_err(|e| resolution_failed(format!("malformed response from {url}: {e}")))
    }

    fn asset_url(&self, version: &ReleaseVersion, file_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, version, file_name)
    }

    async fn fetch_asset(
        &self,
        version: &ReleaseVersion,
        file_name: &str,
        dest: &Path,
        reporter: &dyn Reporter,
    ) -> Result<u64> {
        let url = self.asset_url(version, file_name);
        download_to_file(&self.client, &url, dest, file_name, reporter).await
    }
}
