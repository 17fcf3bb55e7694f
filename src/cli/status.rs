//! `depwright status`: what is installed and what the next run would do.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliContext;
use super::common::{Project, ProjectArgs};
use crate::config::GlobalConfig;
use crate::ledger::InstalledVersions;
use crate::resolver::{DependencyGraph, install_reason};

/// Show required and installed versions.
#[derive(Args, Debug, Clone, Default)]
pub struct StatusCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Show the prerequisite tree instead of the table
    #[arg(long)]
    pub tree: bool,
}

/// One row of the status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// Dependency key
    pub key: String,
    /// Version the project requires
    pub required: String,
    /// Version in the ledger
    pub installed: Option<String>,
    /// Install strategy label
    pub strategy: &'static str,
    /// Why the next run installs it, `None` when up to date
    pub pending: Option<String>,
}

/// Status of every dependency of `project`, in declaration order.
#[must_use]
pub fn status_rows(project: &Project, ledger: &InstalledVersions) -> Vec<StatusRow> {
    project
        .registry
        .iter()
        .map(|dependency| {
            let installed = ledger.get(&dependency.key);
            StatusRow {
                key: dependency.key.clone(),
                required: dependency.version.clone(),
                installed: installed.map(str::to_string),
                strategy: dependency.strategy.label(),
                pending: install_reason(
                    dependency,
                    installed,
                    project.build_dir.prefix(),
                    project.target.platform,
                )
                .map(|reason| reason.to_string()),
            }
        })
        .collect()
}

impl StatusCommand {
    /// Prints the table or the tree.
    pub async fn execute(self, cli: &CliContext) -> Result<()> {
        let config = GlobalConfig::load_with_optional(cli.config_path.clone()).await?;
        let project = self.project.load(&config)?;

        if self.tree {
            let graph = DependencyGraph::from_registry(&project.registry)?;
            graph.detect_cycles()?;
            for root in graph.roots() {
                print!("{}", graph.to_tree_string(&root));
            }
            return Ok(());
        }

        let ledger = InstalledVersions::load(&project.build_dir.ledger);
        let rows = status_rows(&project, &ledger);
        let width = rows.iter().map(|row| row.key.len()).max().unwrap_or(0);

        println!("{} ({})", project.target.to_string().bold(), project.build_dir.prefix().display());
        for row in &rows {
            let installed = row.installed.as_deref().unwrap_or("-");
            let state = match &row.pending {
                None => "up to date".green(),
                Some(reason) => reason.as_str().yellow(),
            };
            println!(
                "  {:width$}  {:>10}  {:>10}  {:8}  {}",
                row.key, row.required, installed, row.strategy, state
            );
        }

        let pending = rows.iter().filter(|row| row.pending.is_some()).count();
        if pending == 0 {
            println!("{} All {} dependencies are up to date", "✓".green(), rows.len());
        } else {
            println!("{} {} of {} dependencies need installing", "!".yellow(), pending, rows.len());
        }
        Ok(())
    }
}
