//! Platform helpers: home directory, path expansion, tool lookup.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Returns `true` on Windows hosts.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// The user's home directory.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Expands `~` and `$VARS` in a user-supplied path.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Absolute form of `path`, relative paths being taken from the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_resolve_path_expands_env() {
        unsafe { std::env::set_var("DEPWRIGHT_TEST_DIR", "/opt/deps") };
        let resolved = resolve_path("$DEPWRIGHT_TEST_DIR/token").unwrap();
        unsafe { std::env::remove_var("DEPWRIGHT_TEST_DIR") };
        assert_eq!(resolved, PathBuf::from("/opt/deps/token"));
    }

    #[test]
    fn test_resolve_path_plain() {
        assert_eq!(resolve_path("build/out").unwrap(), PathBuf::from("build/out"));
    }

    #[test]
    fn test_absolute_keeps_absolute_paths() {
        let path = if is_windows() { Path::new("C:\\deps") } else { Path::new("/deps") };
        assert_eq!(absolute(path).unwrap(), path);
    }
}
