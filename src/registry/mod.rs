//! The dependency registry.
//!
//! A [`Registry`] owns every [`Dependency`] of the project in declaration order and
//! indexes them by key. It is built once from the project metadata
//! ([`ProjectMetadata`]) and never mutated afterwards; the graph walker refers to
//! entries by their arena index.
//!
//! Construction validates what can be checked without touching the network:
//!
//! - keys are unique;
//! - GitHub-backed sources (`tag`, `release`, `commit`) have a `repository`;
//! - `commit` sources have a `commit`;
//! - `release` sources can name their asset.
//!
//! Prerequisite keys are checked by the walker when it reaches them.

pub mod builtin;
pub mod dependency;
pub mod library_files;
pub mod project;

pub use dependency::{Dependency, OptionValue};
pub use library_files::{Candidates, FileSet, LibraryFiles};
pub use project::ProjectMetadata;

use anyhow::Result;
use std::collections::HashMap;

use crate::core::DepwrightError;
use crate::installer::strategy::SourceSpec;

/// Dependencies in declaration order, indexed by key.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<Dependency>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Builds and validates a registry.
    pub fn new(dependencies: Vec<Dependency>) -> Result<Self> {
        let mut index = HashMap::with_capacity(dependencies.len());
        for (position, dependency) in dependencies.iter().enumerate() {
            if index.insert(dependency.key.clone(), position).is_some() {
                return Err(DepwrightError::DuplicateDependency {
                    key: dependency.key.clone(),
                }
                .into());
            }
            validate(dependency)?;
        }
        Ok(Self {
            entries: dependencies,
            index,
        })
    }

    /// Number of dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arena index of `key`.
    #[must_use]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Arena index and dependency of `key`.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<(usize, &Dependency)> {
        let index = self.index_of(key)?;
        self.entries.get(index).map(|dependency| (index, dependency))
    }

    /// Dependency named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Dependency> {
        self.entry(key).map(|(_, dependency)| dependency)
    }

    /// Dependencies in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn validate(dependency: &Dependency) -> Result<()> {
    let config_error = |message: String| DepwrightError::ConfigError {
        message: format!("dependency '{}': {message}", dependency.key),
    };

    for source in dependency.strategy.sources() {
        if source.needs_repository() && dependency.repository.is_none() {
            return Err(config_error("source requires a 'repository' (owner/repo)".into()).into());
        }
        match source {
            SourceSpec::Commit if dependency.commit.is_none() => {
                return Err(config_error("commit source requires a 'commit'".into()).into());
            }
            SourceSpec::Release { asset: None, .. } if dependency.asset_name.is_none() => {
                return Err(
                    config_error("release source requires an 'asset' or 'asset_name'".into()).into()
                );
            }
            _ => {}
        }
    }
    Ok(())
}
