//! Locating and loading the project a command works on.

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::build_dir::BuildDirectory;
use crate::config::GlobalConfig;
use crate::core::{DepwrightError, Target};
use crate::registry::{ProjectMetadata, Registry};
use crate::utils::platform::absolute;

/// Project metadata path relative to the source root.
pub const PROJECT_FILE: &str = "util/project.json";

/// Build root relative to the source root.
pub const BUILD_DIR: &str = "build";

/// Where the project and its build directory are.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Root of the project [default: current directory]
    #[arg(long, env = "DEPWRIGHT_SOURCE_ROOT", value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Build root [default: <source root>/build]
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<PathBuf>,

    /// Project metadata [default: <source root>/util/project.json]
    #[arg(long, value_name = "FILE")]
    pub project_file: Option<PathBuf>,
}

/// A loaded project.
#[derive(Debug)]
pub struct Project {
    /// Absolute source root
    pub source_root: PathBuf,
    /// Host target
    pub target: Target,
    /// Build directory layout for `target`
    pub build_dir: BuildDirectory,
    /// Declared dependencies
    pub registry: Registry,
}

impl ProjectArgs {
    /// Absolute source root.
    pub fn source_root(&self) -> Result<PathBuf> {
        match &self.source_root {
            Some(root) => absolute(root),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Build root: the flag, then the global config, then `<source root>/build`.
    pub fn build_root(&self, source_root: &Path, config: &GlobalConfig) -> Result<PathBuf> {
        if let Some(root) = &self.build_root {
            return absolute(root);
        }
        if let Some(root) = config.build_root()? {
            return absolute(&root);
        }
        Ok(source_root.join(BUILD_DIR))
    }

    /// Project metadata file.
    #[must_use]
    pub fn project_file(&self, source_root: &Path) -> PathBuf {
        self.project_file.clone().unwrap_or_else(|| source_root.join(PROJECT_FILE))
    }

    /// Resolves the paths and loads the project metadata.
    pub fn load(&self, config: &GlobalConfig) -> Result<Project> {
        let source_root = self.source_root()?;
        let target = Target::host().ok_or_else(|| DepwrightError::ConfigError {
            message: format!("unsupported host platform '{}'", std::env::consts::OS),
        })?;
        let build_dir = BuildDirectory::new(self.build_root(&source_root, config)?, &target);
        let metadata = ProjectMetadata::load(&self.project_file(&source_root))?;

        debug!(
            "Project at {} for {}, building in {}",
            source_root.display(),
            target,
            build_dir.root.display()
        );

        Ok(Project {
            source_root,
            target,
            build_dir,
            registry: metadata.registry,
        })
    }
}
