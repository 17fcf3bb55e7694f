//! Scratch directories for downloads and builds.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::shell::Shell;

/// Per-dependency scratch directory, removed when dropped.
///
/// Removal happens on success and on failure alike and never fails the install;
/// a directory that cannot be removed is only reported.
#[derive(Debug)]
pub struct ScratchDir<'a> {
    path: PathBuf,
    shell: &'a Shell,
}

impl<'a> ScratchDir<'a> {
    /// Creates an empty directory at `path`, replacing leftovers of earlier runs.
    pub fn create(shell: &'a Shell, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        shell.rmtree(&path)?;
        shell.makedirs(&path)?;
        Ok(Self {
            path,
            shell,
        })
    }

    /// Location of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.shell.rmtree(&self.path) {
            warn!("Failed to remove scratch directory {}: {e:#}", self.path.display());
        }
    }
}
