//! Host platform in Go's release vocabulary.
//!
//! Go names its release archives after `GOOS`/`GOARCH` values, which differ
//! from Rust's `target_os`/`target_arch` names (`darwin` vs `macos`, `amd64`
//! vs `x86_64`). Only combinations of the operating systems and
//! architectures listed here are accepted.

use std::fmt;

use super::error::{ArtefactError, Result};

/// Operating systems Go publishes archives for, as `(rust, go)` pairs.
const OPERATING_SYSTEMS: &[(&str, &str)] = &[
    ("linux", "linux"),
    ("macos", "darwin"),
    ("windows", "windows"),
    ("freebsd", "freebsd"),
];

/// Architectures Go publishes archives for, as `(rust, go)` pairs.
const ARCHITECTURES: &[(&str, &str)] = &[
    ("x86_64", "amd64"),
    ("aarch64", "arm64"),
    ("x86", "386"),
    ("arm", "armv6l"),
    ("powerpc64", "ppc64le"),
    ("s390x", "s390x"),
    ("riscv64", "riscv64"),
    ("loongarch64", "loong64"),
];

/// An operating system and architecture pair in Go's vocabulary.
///
/// # Examples
///
/// ```
/// use gosdk::artefact::platform::Platform;
///
/// let platform = Platform::new("linux", "amd64").expect("known platform");
/// assert_eq!(platform.to_string(), "linux-amd64");
/// assert!(Platform::new("plan9", "amd64").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Build a platform from Go `GOOS`/`GOARCH` names.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] when either name is not
    /// one Go publishes archives for.
    pub fn new(os: &str, arch: &str) -> Result<Self> {
        let known_os = OPERATING_SYSTEMS.iter().any(|(_, go)| *go == os);
        let known_arch = ARCHITECTURES.iter().any(|(_, go)| *go == arch);
        if known_os && known_arch {
            Ok(Self {
                os: os.to_owned(),
                arch: arch.to_owned(),
            })
        } else {
            Err(unsupported(os, arch))
        }
    }

    /// Map the platform this binary was compiled for onto Go's names.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] on hosts Go does not
    /// publish archives for, including big-endian PowerPC.
    pub fn detect() -> Result<Self> {
        if cfg!(all(target_arch = "powerpc64", target_endian = "big")) {
            return Err(unsupported(std::env::consts::OS, "powerpc64 (big-endian)"));
        }
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Combine explicit Go names with the detected host for whichever is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] if an explicit name is
    /// unknown, or if detection is needed and the host is unsupported.
    pub fn resolve(os: Option<&str>, arch: Option<&str>) -> Result<Self> {
        match (os, arch) {
            (Some(os), Some(arch)) => Self::new(os, arch),
            _ => {
                let host = Self::detect()?;
                Self::new(os.unwrap_or(host.os()), arch.unwrap_or(host.arch()))
            }
        }
    }

    /// Map Rust `target_os`/`target_arch` names onto Go's names.
    fn from_rust(os: &str, arch: &str) -> Result<Self> {
        let go_os = lookup(OPERATING_SYSTEMS, os);
        let go_arch = lookup(ARCHITECTURES, arch);
        match (go_os, go_arch) {
            (Some(go_os), Some(go_arch)) => Ok(Self {
                os: go_os.to_owned(),
                arch: go_arch.to_owned(),
            }),
            _ => Err(unsupported(os, arch)),
        }
    }

    /// Return the Go operating system name.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Return the Go architecture name.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

fn lookup(table: &[(&str, &'static str)], rust_name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(rust, _)| *rust == rust_name)
        .map(|(_, go)| *go)
}

fn unsupported(os: &str, arch: &str) -> ArtefactError {
    ArtefactError::UnsupportedPlatform {
        os: os.to_owned(),
        arch: arch.to_owned(),
    }
}
