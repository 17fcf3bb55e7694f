//! depwright - build bootstrapper for native dependencies
//!
//! depwright downloads the third-party libraries a CMake project needs, builds or
//! copies them into a per-target install prefix and records what it installed,
//! so that later runs only redo the dependencies whose version changed or whose
//! files went missing.
//!
//! # Architecture Overview
//!
//! A run of `depwright configure` goes through these steps:
//!
//! 1. [`cli`] parses the flags and loads the global [`config`]
//! 2. [`registry`] loads the project metadata (`util/project.json`) into an arena of
//!    [`registry::Dependency`] values
//! 3. [`build_dir`] lays out `<build root>/<platform>-<arch>/dependencies` and
//!    [`ledger`] reads `versions.json` next to it
//! 4. [`resolver`] walks the prerequisite graph depth-first and asks, per
//!    dependency, whether an install is needed
//! 5. [`installer`] runs the dependency's strategy: a CMake source build, a copy of
//!    prebuilt files, or one of the two depending on the platform
//! 6. the ledger records the version once the library files are in place
//!
//! Every filesystem change and external command goes through a [`shell::Shell`],
//! which prints instead of acting in dry-run mode. Sources are obtained through
//! the [`fetch::Fetch`] trait.
//!
//! # Project metadata
//!
//! ```json
//! {
//!     "version": "0.1.0",
//!     "dependencies": {
//!         "cxxopts": {
//!             "name": "cxxopts",
//!             "version": "2.2.0",
//!             "repository": "jarro2783/cxxopts",
//!             "library_files": "include/cxxopts.hpp"
//!         },
//!         "sdl": {
//!             "name": "SDL",
//!             "version": "2.0.10",
//!             "library_files": {
//!                 "windows": "lib/SDL2.lib",
//!                 "linux": ["lib/libSDL2.a", "lib/libSDL2d.a"],
//!                 "darwin": "lib/libSDL2.a"
//!             },
//!             "cmake_options": { "SDL_SHARED": false }
//!         }
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`build_dir`] - build directory layout
//! - [`cli`] - `configure`, `preset` and `status` commands
//! - [`config`] - `~/.depwright/config.toml`
//! - [`core`] - errors and platform detection
//! - [`fetch`] - GitHub and URL downloads, archive extraction
//! - [`installer`] - install strategies and the per-dependency installer
//! - [`invocation`] - run-wide settings and tool discovery
//! - [`ledger`] - installed-versions file
//! - [`preset`] - named flag sets
//! - [`registry`] - project metadata and the dependency arena
//! - [`resolver`] - install decisions and the dependency walk
//! - [`shell`] - dry-run aware command and filesystem execution
//! - [`utils`] - filesystem and platform helpers

pub mod build_dir;
pub mod cli;
pub mod config;
pub mod core;
pub mod fetch;
pub mod installer;
pub mod invocation;
pub mod ledger;
pub mod preset;
pub mod registry;
pub mod resolver;
pub mod shell;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
