//! `depwright configure`: install the project's dependencies.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::CliContext;
use super::common::ProjectArgs;
use crate::config::{GitHubOverrides, GlobalConfig};
use crate::fetch::GitHubFetcher;
use crate::installer::{InstallContext, Selection, install_selected};
use crate::invocation::{BuildVariant, CMakeGenerator, CompilerToolchain, Invocation, Toolchain};
use crate::ledger::InstalledVersions;
use crate::resolver::{DependencyGraph, InstallOutcome};
use crate::shell::Shell;

/// Install the project's dependencies.
#[derive(Args, Debug, Clone)]
pub struct ConfigureCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Remove the target's build directory first
    #[arg(long)]
    pub clean: bool,

    /// Parallel build jobs
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// CMake build type
    #[arg(long, value_enum, default_value_t = BuildVariant::Release)]
    pub build_variant: BuildVariant,

    /// CMake generator [default: visual-studio on Windows, ninja when found, else make]
    #[arg(long, value_enum)]
    pub cmake_generator: Option<CMakeGenerator>,

    /// C and C++ compilers passed to CMake
    #[arg(long, value_enum)]
    pub compiler_toolchain: Option<CompilerToolchain>,

    /// Include test-only dependencies
    #[arg(long)]
    pub build_tests: bool,

    /// Include benchmark-only dependencies
    #[arg(long)]
    pub build_benchmarks: bool,

    /// Only install these dependencies and their prerequisites
    #[arg(long, value_name = "KEY", num_args = 1..)]
    pub only: Vec<String>,

    /// GitHub token
    #[arg(long, value_name = "TOKEN", conflicts_with = "auth_token_file")]
    pub auth_token: Option<String>,

    /// File holding a GitHub token
    #[arg(long, value_name = "FILE")]
    pub auth_token_file: Option<PathBuf>,

    /// `User-Agent` for GitHub requests
    #[arg(long, value_name = "AGENT")]
    pub github_user_agent: Option<String>,
}

impl ConfigureCommand {
    /// Runs the bootstrap.
    pub async fn execute(self, cli: &CliContext) -> Result<()> {
        let config = GlobalConfig::load_with_optional(cli.config_path.clone()).await?;
        let project = self.project.load(&config)?;
        let shell = Shell::new(self.dry_run, cli.verbose);

        let toolchain = Toolchain::detect(self.compiler_toolchain);
        if self.dry_run {
            for tool in toolchain.missing() {
                warn!("'{tool}' not found on PATH, the dry run prints its bare name");
            }
        }
        let generator = self
            .cmake_generator
            .or(config.cmake_generator)
            .unwrap_or_else(|| CMakeGenerator::default_for(project.target.platform, &toolchain));
        let overrides = GitHubOverrides {
            token: self.auth_token.clone(),
            token_file: self.auth_token_file.clone(),
            user_agent: self.github_user_agent.clone(),
        };

        let mut invocation = Invocation::new(&project.source_root, project.target.clone());
        invocation.build_variant = self.build_variant;
        invocation.generator = generator;
        invocation.jobs = self.jobs.or(config.jobs);
        invocation.toolchain = toolchain;
        invocation.github = config.github_settings(&overrides).await?;

        info!(
            "Bootstrapping {} dependencies for {} ({}, {})",
            project.registry.len(),
            invocation.target,
            invocation.build_variant,
            invocation.generator
        );
        if let Ok(order) = DependencyGraph::from_registry(&project.registry).and_then(|graph| graph.install_order()) {
            debug!("Planned order: {}", order.join(", "));
        }

        let build_dir = &project.build_dir;
        if self.clean {
            build_dir.clean(&shell)?;
        }
        build_dir.ensure(&shell)?;
        let mut ledger = InstalledVersions::load(&build_dir.ledger);

        let git = invocation.toolchain.git.clone().unwrap_or_else(|| PathBuf::from("git"));
        let fetcher = GitHubFetcher::new(invocation.github.clone(), git, shell.clone(), !cli.quiet)
            .context("Failed to set up the downloader")?;
        let selection = Selection {
            only: self.only.clone(),
            build_tests: self.build_tests,
            build_benchmarks: self.build_benchmarks,
        };

        let context = InstallContext::new(&invocation, build_dir, &shell, &fetcher);
        let outcomes = install_selected(&project.registry, &selection, context, &mut ledger).await?;

        if !cli.quiet {
            print_summary(&outcomes, self.dry_run);
        }
        Ok(())
    }
}

fn print_summary(outcomes: &[(String, InstallOutcome)], dry_run: bool) {
    let installed = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, InstallOutcome::Installed(_)))
        .count();
    let up_to_date = outcomes.len() - installed;

    if dry_run {
        println!(
            "{} Dry run: {} would be installed, {} up to date",
            "✓".green(),
            installed,
            up_to_date
        );
    } else {
        println!("{} {} installed, {} up to date", "✓".green(), installed, up_to_date);
    }
}
