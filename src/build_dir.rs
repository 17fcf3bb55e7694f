//! Layout of the build directory.
//!
//! ```text
//! <root>/
//! ├── tmp/                      scratch space, one directory per dependency
//! └── linux-x86_64/             one directory per target
//!     ├── dependencies/         install prefix (include/, lib/, ...)
//!     └── versions.json         installed-versions ledger
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::Target;
use crate::shell::Shell;

/// Ledger file name inside the target directory.
pub const LEDGER_FILE: &str = "versions.json";

/// Paths of one target's build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirectory {
    /// Build root shared by all targets
    pub root: PathBuf,
    /// Scratch root
    pub temporary: PathBuf,
    /// Per-target directory
    pub target_dir: PathBuf,
    /// Dependency install prefix
    pub dependencies: PathBuf,
    /// Installed-versions ledger
    pub ledger: PathBuf,
}

impl BuildDirectory {
    /// Computes the layout under `root` for `target`.
    pub fn new(root: impl Into<PathBuf>, target: &Target) -> Self {
        let root = root.into();
        let target_dir = root.join(target.name());
        Self {
            temporary: root.join("tmp"),
            dependencies: target_dir.join("dependencies"),
            ledger: target_dir.join(LEDGER_FILE),
            target_dir,
            root,
        }
    }

    /// Scratch directory of one dependency.
    #[must_use]
    pub fn scratch_for(&self, key: &str) -> PathBuf {
        self.temporary.join(key)
    }

    /// Install prefix.
    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.dependencies
    }

    /// Creates the scratch root and install prefix.
    pub fn ensure(&self, shell: &Shell) -> Result<()> {
        shell.makedirs(&self.temporary)?;
        shell.makedirs(&self.dependencies)
    }

    /// Removes everything built for this target, plus the scratch root.
    pub fn clean(&self, shell: &Shell) -> Result<()> {
        tracing::info!("Cleaning {}", self.target_dir.display());
        shell.rmtree(&self.target_dir)?;
        shell.rmtree(&self.temporary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Platform;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let dirs = BuildDirectory::new("/work/build", &Target::new(Platform::Linux, "x86_64"));
        assert_eq!(dirs.temporary, PathBuf::from("/work/build/tmp"));
        assert_eq!(dirs.dependencies, PathBuf::from("/work/build/linux-x86_64/dependencies"));
        assert_eq!(dirs.ledger, PathBuf::from("/work/build/linux-x86_64/versions.json"));
        assert_eq!(dirs.scratch_for("sdl"), PathBuf::from("/work/build/tmp/sdl"));
    }

    #[test]
    fn test_ensure_and_clean() {
        let temp = TempDir::new().unwrap();
        let dirs = BuildDirectory::new(temp.path(), &Target::new(Platform::Darwin, "aarch64"));
        let shell = Shell::new(false, false);

        dirs.ensure(&shell).unwrap();
        assert!(dirs.dependencies.is_dir());
        assert!(dirs.temporary.is_dir());

        dirs.clean(&shell).unwrap();
        assert!(!dirs.target_dir.exists());
        assert!(!dirs.temporary.exists());
    }

    #[test]
    fn test_dry_run_ensure_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let dirs = BuildDirectory::new(temp.path().join("build"), &Target::new(Platform::Linux, "x86_64"));
        dirs.ensure(&Shell::new(true, false)).unwrap();
        assert!(!dirs.root.exists());
    }
}
