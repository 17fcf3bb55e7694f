//! Cross-platform utilities
//!
//! - [`fs`] - directory creation, atomic writes, tree copies and checksums
//! - [`platform`] - home directory and path expansion

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, copy_dir, ensure_dir, sha256_file};
pub use platform::{get_home_dir, is_windows, resolve_path};
