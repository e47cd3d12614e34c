//! Checksum manifest (`SHA256SUMS.txt`) parsing.
//!
//! The format is what `sha256sum` emits: one `<hex digest>  <filename>` record
//! per line, separated by two spaces or a tab. A leading `*` on the filename
//! (binary-mode marker) is dropped. Blank lines and `#` comments are skipped.
//!
//! Lookups are by exact filename. A manifest listing
//! `vramsply-x86_64-unknown-linux-gnu.sig` does not satisfy a lookup for
//! `vramsply-x86_64-unknown-linux-gnu`.
//!
//! Parsing is all-or-nothing: one malformed record anywhere rejects the whole
//! file, even when the record for the artifact being installed is well formed.
//! A damaged manifest says nothing trustworthy about any of its lines.

use std::collections::HashMap;
use std::str::FromStr;

use crate::hash::{DigestError, Sha256Digest};

/// Errors raised while parsing a checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    /// A non-comment line did not have a digest and a filename.
    #[error("line {line}: expected '<sha256>  <filename>', got '{content}'")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },

    /// The digest field is not a valid SHA-256 hex string.
    #[error("line {line}: {source}")]
    InvalidDigest {
        /// 1-based line number.
        line: usize,
        /// Why the digest was rejected.
        #[source]
        source: DigestError,
    },

    /// The same filename appears twice.
    #[error("line {line}: duplicate entry for '{filename}'")]
    DuplicateEntry {
        /// 1-based line number of the second occurrence.
        line: usize,
        /// The repeated filename.
        filename: String,
    },
}

/// One `(filename, digest)` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Artifact file name, exactly as published.
    pub filename: String,
    /// Expected SHA-256 of the artifact.
    pub digest: Sha256Digest,
}

/// Ordered collection of checksum records covering one release.
#[derive(Debug, Clone, Default)]
pub struct ChecksumManifest {
    entries: Vec<ManifestEntry>,
    by_name: HashMap<String, usize>,
}

impl ChecksumManifest {
    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] for the first malformed line, invalid digest
    /// or duplicate filename.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut manifest = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = || ManifestError::MalformedLine {
                line: line_no,
                content: line.to_string(),
            };

            let (digest, rest) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
            let rest = rest.trim_start();
            let filename = rest.strip_prefix('*').unwrap_or(rest);
            if filename.is_empty() {
                return Err(malformed());
            }

            let digest = Sha256Digest::new(digest).map_err(|source| ManifestError::InvalidDigest {
                line: line_no,
                source,
            })?;

            if manifest.by_name.contains_key(filename) {
                return Err(ManifestError::DuplicateEntry {
                    line: line_no,
                    filename: filename.to_string(),
                });
            }

            manifest
                .by_name
                .insert(filename.to_string(), manifest.entries.len());
            manifest.entries.push(ManifestEntry {
                filename: filename.to_string(),
                digest,
            });
        }

        Ok(manifest)
    }

    /// Expected digest for `filename`, if the manifest lists it.
    pub fn get(&self, filename: &str) -> Option<&Sha256Digest> {
        self.by_name
            .get(filename)
            .map(|&idx| &self.entries[idx].digest)
    }

    /// Records in file order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest lists nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for ChecksumManifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
