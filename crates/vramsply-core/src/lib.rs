//! Core library for the vramsply installer.
//!
//! The installer is a strictly sequential pipeline:
//!
//! ```text
//! platform -> version -> fetch -> verify -> install -> outcome
//! ```
//!
//! - **Typestate**: the verifier is the only producer of
//!   [`verify::VerifiedArtifact`], and [`install::place`] only accepts that
//!   type, so an unverified download cannot reach the install directory.
//! - **Scoped workspace**: downloads live in a [`workspace::Workspace`] that
//!   is deleted when dropped, which covers errors and cancellation alike.
//! - **Seams**: network access goes through [`channel::ReleaseChannel`] and
//!   narration through [`Reporter`], so each stage is testable without a
//!   real release server or terminal.

pub mod channel;
pub mod config;
pub mod error;
pub mod flow;
pub mod install;
pub mod io;
pub mod outcome;
pub mod paths;
pub mod reporter;
pub mod resolver;
pub mod verify;
pub mod workspace;

pub use channel::{GithubReleaseChannel, LatestRelease, ReleaseChannel};
pub use config::{InstallConfig, RawPlatform};
pub use error::{InstallError, Result};
pub use flow::{InstallFlow, InstalledBinary, ReleasePlan};
pub use reporter::{NullReporter, Reporter};
pub use resolver::{ResolvedVersion, VersionSource};

/// User Agent string for release channel requests
pub const USER_AGENT: &str = concat!("vramsply-install/", env!("CARGO_PKG_VERSION"));
