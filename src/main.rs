//! depwright CLI entry point
//!
//! Parses the command line, sets up logging, runs the command and turns any
//! error into a colored diagnostic with exit status 1.

use anyhow::Result;
use clap::Parser;
use depwright::cli;
use depwright::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
