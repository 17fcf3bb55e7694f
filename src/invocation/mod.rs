//! Run-wide settings shared by every install.
//!
//! An [`Invocation`] is assembled once by the CLI from flags, the global config and
//! host detection, then only read.

pub mod toolchain;

pub use toolchain::Toolchain;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::{Platform, Target};
use crate::fetch::GitHubSettings;

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildVariant {
    /// `Debug`
    Debug,
    /// `Release`
    #[default]
    Release,
    /// `RelWithDebInfo`
    RelWithDebInfo,
    /// `MinSizeRel`
    MinSizeRel,
}

impl BuildVariant {
    /// Value of `CMAKE_BUILD_TYPE`.
    #[must_use]
    pub const fn cmake_name(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmake_name())
    }
}

/// CMake generator used for source builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CMakeGenerator {
    /// `Ninja`, driven by `ninja`
    Ninja,
    /// `Unix Makefiles`, driven by `make`
    Make,
    /// `Visual Studio 17 2022`, driven by `cmake --build`
    VisualStudio,
}

impl CMakeGenerator {
    /// Name passed to `cmake -G`.
    #[must_use]
    pub const fn cmake_name(self) -> &'static str {
        match self {
            Self::Ninja => "Ninja",
            Self::Make => "Unix Makefiles",
            Self::VisualStudio => "Visual Studio 17 2022",
        }
    }

    /// Ninja when available, otherwise the platform's native generator.
    #[must_use]
    pub fn default_for(platform: Platform, toolchain: &Toolchain) -> Self {
        if toolchain.ninja.is_some() {
            Self::Ninja
        } else if platform == Platform::Windows {
            Self::VisualStudio
        } else {
            Self::Make
        }
    }
}

impl fmt::Display for CMakeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmake_name())
    }
}

/// Compiler family handed to CMake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerToolchain {
    /// `clang` / `clang++`
    Clang,
    /// `gcc` / `g++`
    Gcc,
}

impl CompilerToolchain {
    /// C and C++ compiler program names.
    #[must_use]
    pub const fn program_names(self) -> (&'static str, &'static str) {
        match self {
            Self::Clang => ("clang", "clang++"),
            Self::Gcc => ("gcc", "g++"),
        }
    }
}

/// Settings of one bootstrap run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Root of the project being bootstrapped
    pub source_root: PathBuf,
    /// Target dependencies are installed for
    pub target: Target,
    /// CMake build type
    pub build_variant: BuildVariant,
    /// CMake generator
    pub generator: CMakeGenerator,
    /// Parallel build jobs passed to the generator driver
    pub jobs: Option<usize>,
    /// Located build tools
    pub toolchain: Toolchain,
    /// GitHub endpoint and credentials
    pub github: GitHubSettings,
}

impl Invocation {
    /// An invocation for `target` with default settings and no tools located.
    pub fn new(source_root: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            source_root: source_root.into(),
            target,
            build_variant: BuildVariant::default(),
            generator: CMakeGenerator::Ninja,
            jobs: None,
            toolchain: Toolchain::default(),
            github: GitHubSettings::default(),
        }
    }

    /// Platform of the target.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.target.platform
    }
}
