//! Test utilities for depwright
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests:
//!
//! - [`MockFetcher`] serves sources from local fixtures
//! - [`init_test_logging`] routes `tracing` output to the test harness
//! - [`sandbox`] builds an [`Invocation`] and [`BuildDirectory`] under a temporary root
//!
//! # Example
//!
//! ```rust,no_run
//! use depwright::core::{Platform, Target};
//! use depwright::test_utils::{init_test_logging, sandbox};
//!
//! init_test_logging(None);
//! let (invocation, build_dir) = sandbox("/tmp/work".as_ref(), Target::new(Platform::Linux, "x86_64"));
//! assert_eq!(invocation.source_root, std::path::Path::new("/tmp/work/src"));
//! ```

pub mod fetcher;

pub use fetcher::MockFetcher;

use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::build_dir::BuildDirectory;
use crate::core::Target;
use crate::invocation::{CMakeGenerator, Invocation};

static INIT_LOGGING: Once = Once::new();

/// Initializes logging for tests, once per process.
///
/// Uses `level` when given, else `RUST_LOG`; with neither, logging stays off.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// An invocation with bare tool names and a Ninja generator, sources at
/// `<root>/src` and the build directory at `<root>/build`.
pub fn sandbox(root: &Path, target: Target) -> (Invocation, BuildDirectory) {
    let build_dir = BuildDirectory::new(root.join("build"), &target);
    let mut invocation = Invocation::new(root.join("src"), target);
    invocation.generator = CMakeGenerator::Ninja;
    invocation.toolchain.cmake = Some(PathBuf::from("cmake"));
    invocation.toolchain.ninja = Some(PathBuf::from("ninja"));
    invocation.toolchain.make = Some(PathBuf::from("make"));
    invocation.toolchain.git = Some(PathBuf::from("git"));
    (invocation, build_dir)
}
