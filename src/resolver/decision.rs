//! Deciding whether a dependency must be (re)installed.

use std::fmt;
use std::path::Path;
use tracing::warn;

use crate::core::Platform;
use crate::registry::{Candidates, Dependency, library_files};

/// Why a dependency is being installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallReason {
    /// The ledger has no entry for it
    NotInstalled,
    /// The ledger records another version
    VersionChanged {
        /// Version in the ledger
        installed: String,
        /// Version the project requires
        required: String,
    },
    /// No library files are declared, so presence cannot be checked
    NoLibraryFiles,
    /// Library files are declared per platform but not for this one
    PlatformUnmapped,
    /// None of the expected library files exist
    FilesMissing,
}

impl fmt::Display for InstallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled => f.write_str("not installed"),
            Self::VersionChanged {
                installed,
                required,
            } => write!(f, "installed {installed}, requires {required}"),
            Self::NoLibraryFiles => f.write_str("no library files declared"),
            Self::PlatformUnmapped => f.write_str("no library files declared for this platform"),
            Self::FilesMissing => f.write_str("library files missing"),
        }
    }
}

/// Returns why `dependency` must be installed, or `None` when the installed copy
/// is current.
///
/// `installed` is the ledger's recorded version and `prefix` the install prefix
/// that library-file paths are relative to.
pub fn install_reason(
    dependency: &Dependency,
    installed: Option<&str>,
    prefix: &Path,
    platform: Platform,
) -> Option<InstallReason> {
    let Some(installed) = installed else {
        return Some(InstallReason::NotInstalled);
    };
    if installed != dependency.version {
        return Some(InstallReason::VersionChanged {
            installed: installed.to_string(),
            required: dependency.version.clone(),
        });
    }

    match library_files::candidates(dependency.library_files.as_ref(), platform) {
        Candidates::Undeclared => Some(InstallReason::NoLibraryFiles),
        Candidates::Unmapped => {
            warn!(
                "'{}' declares no library files for {platform}, reinstalling",
                dependency.key
            );
            Some(InstallReason::PlatformUnmapped)
        }
        Candidates::AnyOf(paths) => {
            if paths.iter().any(|path| prefix.join(path).exists()) {
                None
            } else {
                Some(InstallReason::FilesMissing)
            }
        }
    }
}

/// Whether `dependency` must be installed. See [`install_reason`].
pub fn should_install(
    dependency: &Dependency,
    installed: Option<&str>,
    prefix: &Path,
    platform: Platform,
) -> bool {
    install_reason(dependency, installed, prefix, platform).is_some()
}

/// Whether an install produced its library files.
///
/// Returns `None` when there is nothing to check on `platform`.
pub fn library_files_present(dependency: &Dependency, prefix: &Path, platform: Platform) -> Option<bool> {
    match library_files::candidates(dependency.library_files.as_ref(), platform) {
        Candidates::AnyOf(paths) => Some(paths.iter().any(|path| prefix.join(path).exists())),
        Candidates::Undeclared | Candidates::Unmapped => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::LibraryFiles;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn touch(prefix: &Path, relative: &str) {
        let path = prefix.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn sdl() -> Dependency {
        let mut dep = Dependency::new("sdl", "2.0.10");
        let mut map = BTreeMap::new();
        map.insert(Platform::Windows, crate::registry::FileSet::Single("lib/SDL2.lib".into()));
        map.insert(Platform::Linux, crate::registry::FileSet::Single("lib/libSDL2.a".into()));
        dep.library_files = Some(LibraryFiles::PerPlatform(map));
        dep
    }

    #[test]
    fn test_no_ledger_entry_always_installs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib/libSDL2.a");
        assert_eq!(
            install_reason(&sdl(), None, temp.path(), Platform::Linux),
            Some(InstallReason::NotInstalled)
        );
    }

    #[test]
    fn test_version_mismatch_installs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib/libSDL2.a");
        let reason = install_reason(&sdl(), Some("2.0.8"), temp.path(), Platform::Linux);
        assert_eq!(
            reason,
            Some(InstallReason::VersionChanged {
                installed: "2.0.8".into(),
                required: "2.0.10".into()
            })
        );
    }

    #[test]
    fn test_sdl_present_on_linux_is_current() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib/libSDL2.a");
        assert!(!should_install(&sdl(), Some("2.0.10"), temp.path(), Platform::Linux));
    }

    #[test]
    fn test_unmapped_platform_installs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "lib/libSDL2.a");
        assert_eq!(
            install_reason(&sdl(), Some("2.0.10"), temp.path(), Platform::Darwin),
            Some(InstallReason::PlatformUnmapped)
        );
        assert_eq!(library_files_present(&sdl(), temp.path(), Platform::Darwin), None);
    }

    #[test]
    fn test_any_of_list() {
        let temp = TempDir::new().unwrap();
        let mut dep = Dependency::new("lua", "5.3.5");
        dep.library_files = Some(LibraryFiles::AnyOf(vec!["a.lib".into(), "b.lib".into()]));

        assert_eq!(
            install_reason(&dep, Some("5.3.5"), temp.path(), Platform::Windows),
            Some(InstallReason::FilesMissing)
        );

        touch(temp.path(), "b.lib");
        assert!(!should_install(&dep, Some("5.3.5"), temp.path(), Platform::Windows));
        assert_eq!(library_files_present(&dep, temp.path(), Platform::Windows), Some(true));
    }

    #[test]
    fn test_no_library_files_installs() {
        let temp = TempDir::new().unwrap();
        let dep = Dependency::new("glm", "0.9.9");
        assert_eq!(
            install_reason(&dep, Some("0.9.9"), temp.path(), Platform::Linux),
            Some(InstallReason::NoLibraryFiles)
        );
    }
}
