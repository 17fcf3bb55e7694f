use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use super::library_files::LibraryFiles;
use crate::core::Target;
use crate::fetch::GitHubRepo;
use crate::installer::strategy::{InstallStrategy, TemplateVars};

/// Value of an extra CMake cache option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Rendered as `ON` / `OFF`
    Bool(bool),
    /// Rendered as a decimal number
    Integer(i64),
    /// Rendered verbatim
    String(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("ON"),
            Self::Bool(false) => f.write_str("OFF"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// A third-party native library the project needs installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Unique identifier, also the ledger key
    pub key: String,
    /// Human readable name
    pub name: String,
    /// Required version
    pub version: String,
    /// Required commit, for commit-pinned sources
    pub commit: Option<String>,
    /// Files proving the dependency is installed
    pub library_files: Option<LibraryFiles>,
    /// Only needed when building tests
    pub test_only: bool,
    /// Only needed when building benchmarks
    pub benchmark_only: bool,
    /// Default release asset name
    pub asset_name: Option<String>,
    /// GitHub repository hosting the sources
    pub repository: Option<GitHubRepo>,
    /// Extra `-D` options for CMake builds
    pub cmake_options: BTreeMap<String, OptionValue>,
    /// Expected SHA-256 of downloaded archives
    pub sha256: Option<String>,
    /// Keys of dependencies that must be installed first
    pub requires: Vec<String>,
    /// How to install it
    pub strategy: InstallStrategy,
}

impl Dependency {
    /// Creates a dependency with a CMake build from its GitHub tag and no other
    /// settings.
    pub fn new(key: impl Into<String>, version: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            version: version.into(),
            commit: None,
            library_files: None,
            test_only: false,
            benchmark_only: false,
            asset_name: None,
            repository: None,
            cmake_options: BTreeMap::new(),
            sha256: None,
            requires: Vec::new(),
            strategy: InstallStrategy::CMakeBuild(Default::default()),
        }
    }

    /// Template values for this dependency on `target`.
    #[must_use]
    pub fn template_vars<'a>(&'a self, target: &'a Target) -> TemplateVars<'a> {
        TemplateVars {
            key: &self.key,
            version: &self.version,
            commit: self.commit.as_deref().unwrap_or_default(),
            target,
        }
    }

    /// Whether the dependency is selected for a run with the given options.
    #[must_use]
    pub const fn is_selected(&self, build_tests: bool, build_benchmarks: bool) -> bool {
        (!self.test_only || build_tests) && (!self.benchmark_only || build_benchmarks)
    }
}
