//! Shared types for the vramsply installer.
//!
//! Everything here is pure: no network, no filesystem. The core crate builds
//! the side-effecting stages on top of these types.

pub mod hash;
pub mod manifest;
pub mod platform;
pub mod release;

// Re-exports
pub use hash::{DigestError, Sha256Digest};
pub use manifest::{ChecksumManifest, ManifestEntry, ManifestError};
pub use platform::{Arch, OsFamily, PlatformError, TargetTriple};
pub use release::{DEFAULT_BINARY_NAME, MANIFEST_FILE_NAME, ReleaseVersion, artifact_name};
