//! Install strategy descriptions as they appear in project metadata.
//!
//! ```json
//! "install": {
//!     "strategy": "platform_branch",
//!     "platform": "windows",
//!     "prebuilt": {
//!         "source": { "from": "url", "url": "https://www.libsdl.org/release/SDL2-devel-{version}-VC.zip", "root": "SDL2-{version}" },
//!         "copy": [
//!             { "kind": "directory", "from": "include", "to": "include/SDL2" },
//!             { "kind": "contents", "from": "lib/{msvc_arch}", "to": "lib", "replace": "SDL" }
//!         ]
//!     },
//!     "otherwise": {
//!         "source": { "from": "url", "url": "https://www.libsdl.org/release/SDL2-{version}.tar.gz", "root": "SDL2-{version}" }
//!     }
//! }
//! ```
//!
//! String fields marked as templates substitute `{key}`, `{version}`, `{commit}`,
//! `{platform}`, `{arch}` and `{msvc_arch}`.

use serde::Deserialize;

use crate::core::{Platform, Target};

/// How a dependency gets materialized in the install prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "strategy")]
pub enum InstallStrategy {
    /// Configure, build and install the sources with CMake
    #[serde(rename = "cmake_build")]
    CMakeBuild(CMakeBuild),
    /// Copy prebuilt files out of the fetched sources
    #[serde(rename = "asset_copy")]
    AssetCopy(AssetCopy),
    /// Prebuilt copy on one platform, CMake build everywhere else
    #[serde(rename = "platform_branch")]
    PlatformBranch(PlatformBranch),
}

impl InstallStrategy {
    /// Every source the strategy may fetch, on any platform.
    #[must_use]
    pub fn sources(&self) -> Vec<&SourceSpec> {
        match self {
            Self::CMakeBuild(build) => vec![&build.source],
            Self::AssetCopy(copy) => vec![&copy.source],
            Self::PlatformBranch(branch) => vec![&branch.prebuilt.source, &branch.otherwise.source],
        }
    }

    /// Short label for status output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CMakeBuild(_) => "cmake",
            Self::AssetCopy(_) => "copy",
            Self::PlatformBranch(_) => "platform",
        }
    }
}

/// Source build through CMake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CMakeBuild {
    /// Where the sources come from
    #[serde(default)]
    pub source: SourceSpec,
}

/// Copy of files from fetched sources into the install prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetCopy {
    /// Where the files come from
    #[serde(default)]
    pub source: SourceSpec,
    /// Copy operations, applied in order
    pub copy: Vec<CopyRule>,
}

/// Platform-dependent choice between a prebuilt copy and a source build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformBranch {
    /// Platform that uses `prebuilt`
    pub platform: Platform,
    /// Strategy on `platform`
    pub prebuilt: AssetCopy,
    /// Strategy on every other platform
    #[serde(default)]
    pub otherwise: CMakeBuild,
}

/// Origin of a dependency's sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum SourceSpec {
    /// Tarball of a tag of the dependency's GitHub repository
    Tag {
        /// Tag template, `v{version}` when absent
        #[serde(default)]
        tag: Option<String>,
    },
    /// Asset attached to a GitHub release
    Release {
        /// Tag template, `v{version}` when absent
        #[serde(default)]
        tag: Option<String>,
        /// Asset name template, the dependency's `asset_name` when absent
        #[serde(default)]
        asset: Option<String>,
        /// Directory inside the archive holding the sources
        #[serde(default)]
        root: Option<String>,
    },
    /// `git clone` of the repository at the dependency's commit
    Commit,
    /// Archive at an arbitrary URL
    Url {
        /// URL template
        url: String,
        /// Directory inside the archive holding the sources
        #[serde(default)]
        root: Option<String>,
    },
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self::Tag { tag: None }
    }
}

impl SourceSpec {
    /// Whether the source needs the dependency's `repository`.
    #[must_use]
    pub const fn needs_repository(&self) -> bool {
        matches!(self, Self::Tag { .. } | Self::Release { .. } | Self::Commit)
    }
}

/// One copy operation, paths relative to the source root (`from`) and the
/// install prefix (`to`). Both are templates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CopyRule {
    /// Copy one file into the directory `to`, replacing a same-named file
    File {
        /// Source file
        from: String,
        /// Destination directory
        to: String,
    },
    /// Replace the directory `to` with a copy of `from`
    Directory {
        /// Source directory
        from: String,
        /// Destination directory
        to: String,
    },
    /// Copy every entry of `from` into `to`, first removing files of `to` whose
    /// name contains `replace`
    Contents {
        /// Source directory
        from: String,
        /// Destination directory
        to: String,
        /// Substring identifying stale files
        #[serde(default)]
        replace: Option<String>,
    },
}

/// Values substituted into templates.
#[derive(Debug, Clone)]
pub struct TemplateVars<'a> {
    /// Dependency key
    pub key: &'a str,
    /// Required version
    pub version: &'a str,
    /// Required commit, empty when none
    pub commit: &'a str,
    /// Install target
    pub target: &'a Target,
}

impl TemplateVars<'_> {
    /// Replaces every known `{placeholder}` in `template`.
    #[must_use]
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{key}", self.key)
            .replace("{version}", self.version)
            .replace("{commit}", self.commit)
            .replace("{platform}", self.target.platform.as_str())
            .replace("{msvc_arch}", self.target.msvc_arch())
            .replace("{arch}", &self.target.arch)
    }
}
