//! Loading the dependency registry from the project's JSON metadata.
//!
//! ```json
//! {
//!     "version": "0.3.0",
//!     "dependencies": {
//!         "cxxopts": {
//!             "name": "cxxopts",
//!             "version": "2.2.0",
//!             "repository": "jarro2783/cxxopts",
//!             "files": "include/cxxopts.hpp"
//!         },
//!         "sdl": {
//!             "name": "SDL",
//!             "version": "2.0.10",
//!             "files": { "windows": "lib/SDL2.lib", "linux": "lib/libSDL2.a", "darwin": "lib/libSDL2.a" },
//!             "cmake_options": { "SDL_SHARED": false }
//!         }
//!     }
//! }
//! ```
//!
//! Entries keep the order they are declared in.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::builtin;
use super::dependency::{Dependency, OptionValue};
use super::library_files::LibraryFiles;
use super::Registry;
use crate::core::DepwrightError;
use crate::fetch::GitHubRepo;
use crate::installer::strategy::InstallStrategy;

#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DependencyEntry {
    #[serde(default)]
    name: Option<String>,
    version: String,
    #[serde(default)]
    commit: Option<String>,
    #[serde(default, alias = "files")]
    library_files: Option<LibraryFiles>,
    #[serde(default)]
    test_only: bool,
    #[serde(default)]
    benchmark_only: bool,
    #[serde(default)]
    asset_name: Option<String>,
    #[serde(default)]
    repository: Option<GitHubRepo>,
    #[serde(default)]
    cmake_options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    sha256: Option<String>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    install: Option<InstallStrategy>,
}

impl DependencyEntry {
    fn into_dependency(self, key: String) -> Dependency {
        let strategy = self.install.unwrap_or_else(|| builtin::default_strategy(&key));
        Dependency {
            name: self.name.unwrap_or_else(|| key.clone()),
            key,
            version: self.version,
            commit: self.commit,
            library_files: self.library_files,
            test_only: self.test_only,
            benchmark_only: self.benchmark_only,
            asset_name: self.asset_name,
            repository: self.repository,
            cmake_options: self.cmake_options,
            sha256: self.sha256.map(|sum| sum.to_ascii_lowercase()),
            requires: self.requires,
            strategy,
        }
    }
}

/// The parsed project metadata.
#[derive(Debug, Clone)]
pub struct ProjectMetadata {
    /// Version of the project itself
    pub version: Option<String>,
    /// Dependencies in declaration order
    pub registry: Registry,
}

impl ProjectMetadata {
    /// Parses metadata from a JSON string. `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let project_error = |reason: String| DepwrightError::ProjectFileError {
            path: origin.to_string(),
            reason,
        };

        let file: ProjectFile =
            serde_json::from_str(content).map_err(|e| project_error(e.to_string()))?;

        let mut dependencies = Vec::with_capacity(file.dependencies.len());
        for (key, value) in file.dependencies {
            let entry: DependencyEntry = serde_json::from_value(value)
                .map_err(|e| project_error(format!("dependency '{key}': {e}")))?;
            dependencies.push(entry.into_dependency(key));
        }

        let registry = Registry::new(dependencies)?;
        debug!("Loaded {} dependencies from {}", registry.len(), origin);

        Ok(Self {
            version: file.version,
            registry,
        })
    }

    /// Reads and parses the metadata file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DepwrightError::ProjectFileError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }
}
