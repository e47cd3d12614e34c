//! Streaming download of a single release asset.
//!
//! One blocking-in-sequence GET per asset, written to disk as it arrives.
//! No retries: a failure is reported once, with the URL.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;
use crate::error::{InstallError, Result};

/// Download `url` into `dest`, reporting progress under `label`.
///
/// Returns the number of bytes written. On any failure the partial file is
/// removed before the error is returned.
///
/// # Errors
///
/// Returns [`InstallError::DownloadFailed`] for transport errors, non-success
/// HTTP statuses, truncated bodies and local write errors.
pub async fn download_to_file(
    client: &Client,
    url: &str,
    dest: &Path,
    label: &str,
    reporter: &dyn Reporter,
) -> Result<u64> {
    match stream_to_file(client, url, dest, label, reporter).await {
        Ok(bytes) => {
            reporter.downloaded(label, bytes);
            tracing::debug!(url, bytes, dest = %dest.display(), "download complete");
            Ok(bytes)
        }
        Err(e) => {
            tokio::fs::remove_file(dest).await.ok();
            Err(e)
        }
    }
}

async fn stream_to_file(
    client: &Client,
    url: &str,
    dest: &Path,
    label: &str,
    reporter: &dyn Reporter,
) -> Result<u64> {
    tracing::debug!(url, "GET");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| InstallError::download(url, e))?;

    let total_size = response.content_length();
    reporter.downloading(label, 0, total_size);

    let mut file = File::create(dest)
        .await
        .map_err(|e| InstallError::download_io(url, e))?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| InstallError::download(url, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| InstallError::download_io(url, e))?;
        downloaded += chunk.len() as u64;
        reporter.downloading(label, downloaded, total_size);
    }

    file.flush()
        .await
        .map_err(|e| InstallError::download_io(url, e))?;

    if let Some(expected) = total_size {
        if downloaded != expected {
            return Err(InstallError::download_io(
                url,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("body truncated: received {downloaded} of {expected} bytes"),
                ),
            ));
        }
    }

    Ok(downloaded)
}
