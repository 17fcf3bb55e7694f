//! The installed-versions ledger.
//!
//! A small JSON object recording which version of each dependency is installed in
//! the target's prefix:
//!
//! ```json
//! {
//!   "cxxopts": "2.2.0",
//!   "sdl": "2.0.10"
//! }
//! ```
//!
//! The ledger is read once per run. A missing or unreadable file is treated as an
//! empty ledger, which makes every dependency look uninstalled and forces a
//! reinstall rather than a crash. After each successful install the entry is
//! recorded and the file rewritten atomically, so an interrupted run never leaves
//! an entry for a dependency that did not finish installing.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::shell::Shell;
use crate::utils::atomic_write;

/// Installed dependency versions, keyed by dependency key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledVersions {
    path: PathBuf,
    versions: BTreeMap<String, String>,
}

impl InstalledVersions {
    /// An empty ledger that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            versions: BTreeMap::new(),
        }
    }

    /// Loads the ledger at `path`.
    ///
    /// Never fails: missing files yield an empty ledger silently, malformed ones
    /// with a warning.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", path.display());
                return Self::empty(path);
            }
            Err(e) => {
                warn!("Could not read ledger {}: {e}. Treating all dependencies as not installed", path.display());
                return Self::empty(path);
            }
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(versions) => Self {
                path: path.to_path_buf(),
                versions,
            },
            Err(e) => {
                warn!("Ignoring malformed ledger {}: {e}", path.display());
                Self::empty(path)
            }
        }
    }

    /// Location of the ledger file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded version of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.versions.get(key).map(String::as_str)
    }

    /// Records `version` as installed for `key`.
    pub fn record(&mut self, key: impl Into<String>, version: impl Into<String>) {
        self.versions.insert(key.into(), version.into());
    }

    /// Recorded entries, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.versions.iter().map(|(key, version)| (key.as_str(), version.as_str()))
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Writes the ledger atomically. Skipped in dry-run mode.
    pub fn save(&self, shell: &Shell) -> Result<()> {
        if shell.is_dry_run() {
            debug!("Dry run, not writing ledger {}", self.path.display());
            return Ok(());
        }
        let mut content = serde_json::to_string_pretty(&self.versions)
            .context("Failed to serialize installed versions")?;
        content.push('\n');
        atomic_write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write ledger {}", self.path.display()))
    }
}
