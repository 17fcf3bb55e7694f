//! Expected installed library files of a dependency.
//!
//! Project metadata may give a single path, a list of alternative paths, or a map
//! from platform to either of those:
//!
//! ```json
//! "library_files": "include/cxxopts.hpp"
//! "library_files": ["lib/lua.lib", "lib/liblua.a"]
//! "library_files": { "windows": "lib/SDL2.lib", "linux": "lib/libSDL2.a", "darwin": "lib/libSDL2.a" }
//! ```
//!
//! Paths are relative to the dependency install prefix.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::core::Platform;

/// One path or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileSet {
    /// A single expected file
    Single(String),
    /// Any one of these files
    AnyOf(Vec<String>),
}

impl FileSet {
    fn paths(&self) -> Vec<&str> {
        match self {
            Self::Single(path) => vec![path.as_str()],
            Self::AnyOf(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Library-file expectation of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LibraryFiles {
    /// A single expected file
    Single(String),
    /// Any one of these files
    AnyOf(Vec<String>),
    /// Expectations per platform. Keys outside [`Platform`] fail to deserialize.
    PerPlatform(BTreeMap<Platform, FileSet>),
}

/// The files to look for on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates<'a> {
    /// Nothing was declared at all
    Undeclared,
    /// A per-platform map lacks an entry for the platform
    Unmapped,
    /// At least one of these must exist
    AnyOf(Vec<&'a str>),
}

impl LibraryFiles {
    /// Candidate paths for `platform`.
    #[must_use]
    pub fn candidates(&self, platform: Platform) -> Candidates<'_> {
        let paths = match self {
            Self::Single(path) => vec![path.as_str()],
            Self::AnyOf(paths) => paths.iter().map(String::as_str).collect(),
            Self::PerPlatform(map) => match map.get(&platform) {
                Some(set) => set.paths(),
                None => return Candidates::Unmapped,
            },
        };
        if paths.is_empty() {
            Candidates::Undeclared
        } else {
            Candidates::AnyOf(paths)
        }
    }
}

/// Candidates of an optional expectation.
#[must_use]
pub fn candidates(files: Option<&LibraryFiles>, platform: Platform) -> Candidates<'_> {
    files.map_or(Candidates::Undeclared, |files| files.candidates(platform))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_shapes() {
        let single: LibraryFiles = serde_json::from_str(r#""include/cxxopts.hpp""#).unwrap();
        assert_eq!(single, LibraryFiles::Single("include/cxxopts.hpp".into()));

        let list: LibraryFiles = serde_json::from_str(r#"["a.lib", "b.lib"]"#).unwrap();
        assert_eq!(list.candidates(Platform::Linux), Candidates::AnyOf(vec!["a.lib", "b.lib"]));

        let map: LibraryFiles = serde_json::from_str(
            r#"{"windows": "lib/SDL2.lib", "linux": ["lib/libSDL2.a", "lib64/libSDL2.a"]}"#,
        )
        .unwrap();
        assert_eq!(map.candidates(Platform::Windows), Candidates::AnyOf(vec!["lib/SDL2.lib"]));
        assert_eq!(
            map.candidates(Platform::Linux),
            Candidates::AnyOf(vec!["lib/libSDL2.a", "lib64/libSDL2.a"])
        );
        assert_eq!(map.candidates(Platform::Darwin), Candidates::Unmapped);
    }

    #[test]
    fn test_unknown_platform_key_rejected() {
        assert!(serde_json::from_str::<LibraryFiles>(r#"{"beos": "lib/x.a"}"#).is_err());
    }

    #[test]
    fn test_empty_list_is_undeclared() {
        assert_eq!(LibraryFiles::AnyOf(vec![]).candidates(Platform::Linux), Candidates::Undeclared);
        assert_eq!(candidates(None, Platform::Linux), Candidates::Undeclared);
    }
}
