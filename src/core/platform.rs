//! Host platform and target identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating systems depwright knows how to bootstrap dependencies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux distributions
    Linux,
    /// macOS
    #[serde(alias = "macos")]
    Darwin,
    /// Windows
    Windows,
}

impl Platform {
    /// The platform this binary runs on, if supported.
    #[must_use]
    pub fn current() -> Option<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to a platform.
    #[must_use]
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Self::Linux),
            "macos" | "darwin" => Some(Self::Darwin),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Lowercase identifier used in paths and metadata keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform/architecture pair naming the per-target build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Operating system
    pub platform: Platform,
    /// CPU architecture as reported by `std::env::consts::ARCH`
    pub arch: String,
}

impl Target {
    /// Creates a target from its parts.
    pub fn new(platform: Platform, arch: impl Into<String>) -> Self {
        Self {
            platform,
            arch: arch.into(),
        }
    }

    /// The host target, if the host platform is supported.
    #[must_use]
    pub fn host() -> Option<Self> {
        Platform::current().map(|platform| Self::new(platform, std::env::consts::ARCH))
    }

    /// Architecture directory name used by MSVC distributions (`x64`, `x86`, `arm64`).
    #[must_use]
    pub fn msvc_arch(&self) -> &str {
        match self.arch.as_str() {
            "x86_64" => "x64",
            "x86" => "x86",
            "aarch64" => "arm64",
            other => other,
        }
    }

    /// Directory name for this target, e.g. `linux-x86_64`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}-{}", self.platform, self.arch)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.platform, self.arch)
    }
}
