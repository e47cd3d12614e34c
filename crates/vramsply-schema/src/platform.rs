//! Target triple resolution.
//!
//! Release binaries are published once per supported target triple. The raw
//! names a host reports (`uname -s` / `uname -m`, or Rust's own
//! `std::env::consts`) map onto a closed set of variants; anything else is an
//! [`PlatformError`] and there is no fallback target.
//!
//! # Example
//!
//! ```
//! use vramsply_schema::TargetTriple;
//!
//! let triple = TargetTriple::from_raw("Linux", "amd64").unwrap();
//! assert_eq!(triple.to_string(), "x86_64-unknown-linux-gnu");
//! ```

use std::fmt;
use std::str::FromStr;

/// The host reported an OS or architecture we do not publish binaries for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// Operating system name outside the supported set.
    #[error("unsupported platform: operating system '{0}' (supported: Linux, Darwin)")]
    UnsupportedOs(String),
    /// Machine architecture outside the supported set.
    #[error("unsupported platform: architecture '{0}' (supported: x86_64, amd64, aarch64, arm64)")]
    UnsupportedArch(String),
}

impl PlatformError {
    /// The raw value that was rejected.
    pub fn value(&self) -> &str {
        match self {
            Self::UnsupportedOs(v) | Self::UnsupportedArch(v) => v,
        }
    }
}

/// CPU architecture of a release binary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Intel/AMD 64-bit (`x86_64`, `amd64`).
    X86_64,
    /// ARM 64-bit (`aarch64`, `arm64`).
    Aarch64,
}

impl Arch {
    /// Rust-convention architecture name, as used in target triples.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            _ => Err(PlatformError::UnsupportedArch(s.trim().to_string())),
        }
    }
}

/// Operating system family (vendor + ABI half of the triple).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum OsFamily {
    /// GNU/Linux.
    LinuxGnu,
    /// macOS.
    Darwin,
}

impl OsFamily {
    /// Short family name (`linux-gnu`, `darwin`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxGnu => "linux-gnu",
            Self::Darwin => "darwin",
        }
    }

    /// The vendor-qualified suffix that follows the architecture in a triple.
    pub fn triple_suffix(self) -> &'static str {
        match self {
            Self::LinuxGnu => "unknown-linux-gnu",
            Self::Darwin => "apple-darwin",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsFamily {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::LinuxGnu),
            // `macos` is what `std::env::consts::OS` reports
            "darwin" | "macos" => Ok(Self::Darwin),
            _ => Err(PlatformError::UnsupportedOs(s.trim().to_string())),
        }
    }
}

/// Canonical (architecture, OS family) pair selecting one release binary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TargetTriple {
    arch: Arch,
    os: OsFamily,
}

impl TargetTriple {
    /// Every triple a release is expected to publish.
    pub const ALL: [Self; 4] = [
        Self::new(Arch::X86_64, OsFamily::LinuxGnu),
        Self::new(Arch::Aarch64, OsFamily::LinuxGnu),
        Self::new(Arch::X86_64, OsFamily::Darwin),
        Self::new(Arch::Aarch64, OsFamily::Darwin),
    ];

    /// Build a triple from already-resolved parts.
    pub const fn new(arch: Arch, os: OsFamily) -> Self {
        Self { arch, os }
    }

    /// Resolve raw host identifiers (`Linux`/`Darwin`, `x86_64`/`arm64`, ...).
    ///
    /// The OS is checked first, so a host that is wrong on both counts
    /// reports the OS.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] naming the first unsupported value.
    pub fn from_raw(os: &str, arch: &str) -> Result<Self, PlatformError> {
        let os = os.parse::<OsFamily>()?;
        let arch = arch.parse::<Arch>()?;
        Ok(Self::new(arch, os))
    }

    /// Resolve the triple of the running process.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when this build runs on an unsupported host.
    pub fn host() -> Result<Self, PlatformError> {
        Self::from_raw(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Architecture half of the triple.
    pub fn arch(self) -> Arch {
        self.arch
    }

    /// OS family half of the triple.
    pub fn os(self) -> OsFamily {
        self.os
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch, self.os.triple_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_pairs_resolve() {
        let cases = [
            ("Linux", "x86_64", "x86_64-unknown-linux-gnu"),
            ("Linux", "amd64", "x86_64-unknown-linux-gnu"),
            ("Linux", "aarch64", "aarch64-unknown-linux-gnu"),
            ("Linux", "arm64", "aarch64-unknown-linux-gnu"),
            ("Darwin", "x86_64", "x86_64-apple-darwin"),
            ("Darwin", "amd64", "x86_64-apple-darwin"),
            ("Darwin", "arm64", "aarch64-apple-darwin"),
            ("Darwin", "aarch64", "aarch64-apple-darwin"),
        ];
        for (os, arch, expected) in cases {
            let triple = TargetTriple::from_raw(os, arch).unwrap();
            assert_eq!(triple.to_string(), expected, "{os}/{arch}");
            // deterministic
            assert_eq!(TargetTriple::from_raw(os, arch).unwrap(), triple);
        }
    }

    #[test]
    fn raw_values_are_case_and_whitespace_tolerant() {
        let triple = TargetTriple::from_raw("linux\n", "X86_64\n").unwrap();
        assert_eq!(triple, TargetTriple::new(Arch::X86_64, OsFamily::LinuxGnu));
        let mac = TargetTriple::from_raw("macos", "aarch64").unwrap();
        assert_eq!(mac.os(), OsFamily::Darwin);
    }

    #[test]
    fn unsupported_arch_names_the_value() {
        let err = TargetTriple::from_raw("Linux", "riscv64").unwrap_err();
        assert_eq!(err, PlatformError::UnsupportedArch("riscv64".into()));
        assert_eq!(err.value(), "riscv64");
        assert!(err.to_string().contains("riscv64"));
    }

    #[test]
    fn unsupported_os_names_the_value() {
        for os in ["FreeBSD", "Windows_NT", "MINGW64_NT-10.0", ""] {
            let err = TargetTriple::from_raw(os, "x86_64").unwrap_err();
            assert!(matches!(err, PlatformError::UnsupportedOs(_)), "{os}");
        }
    }

    #[test]
    fn os_is_checked_before_arch() {
        let err = TargetTriple::from_raw("SunOS", "sparc64").unwrap_err();
        assert_eq!(err, PlatformError::UnsupportedOs("SunOS".into()));
    }

    #[test]
    fn all_triples_are_distinct() {
        let names: std::collections::HashSet<String> =
            TargetTriple::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names.len(), TargetTriple::ALL.len());
    }

    #[test]
    fn host_matches_build_target() {
        let result = TargetTriple::host();
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        assert!(matches!(result, Ok(t) if t.to_string() == "x86_64-unknown-linux-gnu"));
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        assert!(matches!(result, Ok(t) if t.to_string() == "aarch64-apple-darwin"));
        let _ = result;
    }
}
