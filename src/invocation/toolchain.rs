//! Locating the external build tools.

use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::CompilerToolchain;
use crate::core::DepwrightError;

/// Paths of the programs depwright drives. A `None` entry was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    /// `cmake`
    pub cmake: Option<PathBuf>,
    /// `ninja`
    pub ninja: Option<PathBuf>,
    /// `make`
    pub make: Option<PathBuf>,
    /// `git`
    pub git: Option<PathBuf>,
    /// C compiler passed to CMake, when a compiler toolchain was requested
    pub cc: Option<PathBuf>,
    /// C++ compiler passed to CMake, when a compiler toolchain was requested
    pub cxx: Option<PathBuf>,
}

fn locate(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    match which::which_in(name, search_path, ".") {
        Ok(path) => {
            debug!("Found {} at {}", name, path.display());
            Some(path)
        }
        Err(_) => {
            debug!("'{}' not found on PATH", name);
            None
        }
    }
}

/// A located tool, or its bare name when only rendering a dry-run command.
fn required<'a>(tool: &'a Option<PathBuf>, name: &'static str, dry_run: bool) -> Result<&'a Path> {
    match tool {
        Some(path) => Ok(path),
        None if dry_run => Ok(Path::new(name)),
        None => Err(DepwrightError::ToolNotFound {
            tool: name.to_string(),
        }
        .into()),
    }
}

impl Toolchain {
    /// Searches PATH for every tool.
    #[must_use]
    pub fn detect(compiler: Option<CompilerToolchain>) -> Self {
        Self::detect_in(compiler, std::env::var_os("PATH"))
    }

    /// Searches `search_path`, a PATH-style list of directories, for every tool.
    #[must_use]
    pub fn detect_in(compiler: Option<CompilerToolchain>, search_path: Option<OsString>) -> Self {
        let search_path = search_path.as_deref();
        let (cc, cxx) = match compiler {
            Some(compiler) => {
                let (cc, cxx) = compiler.program_names();
                (locate(cc, search_path), locate(cxx, search_path))
            }
            None => (None, None),
        };
        Self {
            cmake: locate("cmake", search_path),
            ninja: locate("ninja", search_path),
            make: locate("make", search_path),
            git: locate("git", search_path),
            cc,
            cxx,
        }
    }

    /// Names of the build tools that were not found.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("cmake", &self.cmake),
            ("ninja", &self.ninja),
            ("make", &self.make),
            ("git", &self.git),
        ]
        .into_iter()
        .filter(|(_, path)| path.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Path of `cmake`.
    pub fn cmake(&self, dry_run: bool) -> Result<&Path> {
        required(&self.cmake, "cmake", dry_run)
    }

    /// Path of `ninja`.
    pub fn ninja(&self, dry_run: bool) -> Result<&Path> {
        required(&self.ninja, "ninja", dry_run)
    }

    /// Path of `make`.
    pub fn make(&self, dry_run: bool) -> Result<&Path> {
        required(&self.make, "make", dry_run)
    }

    /// Path of `git`.
    pub fn git(&self, dry_run: bool) -> Result<&Path> {
        required(&self.git, "git", dry_run)
    }
}
