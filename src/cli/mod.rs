//! Command-line interface.
//!
//! ```bash
//! # Install every dependency the project declares
//! depwright configure
//!
//! # Show what would run, without touching the filesystem
//! depwright configure --dry-run --build-tests
//!
//! # Expand and run a preset from util/build-presets.toml
//! depwright preset --preset dev
//!
//! # Compare the ledger with the project's requirements
//! depwright status --tree
//! ```
//!
//! # Global options
//!
//! - `--verbose` logs at debug level and echoes every command as it runs
//! - `--quiet` only logs errors and hides download progress
//! - `--config` reads another global config file than `~/.depwright/config.toml`
//!
//! `RUST_LOG`, when set, overrides the level chosen by `--verbose`/`--quiet`.

pub mod common;
mod configure;
mod preset;
mod status;

pub use configure::ConfigureCommand;
pub use preset::PresetCommand;
pub use status::StatusCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Options every subcommand sees.
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    /// `--verbose`
    pub verbose: bool,
    /// `--quiet`
    pub quiet: bool,
    /// `--config`
    pub config_path: Option<PathBuf>,
}

/// Bootstraps the native dependencies of a CMake project.
#[derive(Parser, Debug)]
#[command(
    name = "depwright",
    about = "Download, build and install the native dependencies of a project",
    version,
    long_about = "depwright fetches third-party libraries from GitHub or plain URLs, builds them with \
                  CMake or copies prebuilt files, and records what is installed so later runs only \
                  redo what changed."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output and echo commands
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Global config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the project's dependencies
    #[command(visible_aliases = ["bootstrap", "boot"])]
    Configure(ConfigureCommand),

    /// List presets, or expand one into a `configure` invocation and run it
    Preset(PresetCommand),

    /// Show required and installed versions
    Status(StatusCommand),
}

impl Cli {
    /// Options shared by the subcommands.
    #[must_use]
    pub fn context(&self) -> CliContext {
        CliContext {
            verbose: self.verbose,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Installs the log subscriber. `RUST_LOG` wins over the flags.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::new("info")
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(self.verbose)
            .without_time()
            .try_init();
    }

    /// Runs the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        let context = self.context();
        match self.command {
            Commands::Configure(command) => command.execute(&context).await,
            Commands::Preset(command) => command.execute(&context).await,
            Commands::Status(command) => command.execute(&context).await,
        }
    }
}
