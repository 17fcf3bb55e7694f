//! Installing dependencies into the prefix.
//!
//! Each dependency carries an [`InstallStrategy`] that is dispatched once:
//!
//! - [`CMakeBuild`] fetches sources, then configures, builds and installs them;
//! - [`AssetCopy`] fetches an archive or checkout and copies files out of it;
//! - [`PlatformBranch`] picks one of the two depending on the target platform.
//!
//! Every strategy works inside a [`ScratchDir`] under `<build root>/tmp/<key>` that
//! is removed when the strategy returns, successfully or not.
//!
//! [`Installer`] is the [`NodeInstaller`] the dependency walker drives. For each
//! node it asks [`install_reason`] whether anything needs doing, runs the
//! strategy, checks that the declared library files appeared and only then
//! records the version in the ledger.
//!
//! # Example
//!
//! ```rust,no_run
//! use depwright::build_dir::BuildDirectory;
//! use depwright::core::{Platform, Target};
//! use depwright::fetch::{GitHubFetcher, GitHubSettings};
//! use depwright::installer::{InstallContext, Selection, install_selected};
//! use depwright::invocation::Invocation;
//! use depwright::ledger::InstalledVersions;
//! use depwright::registry::{Dependency, Registry};
//! use depwright::shell::Shell;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let target = Target::new(Platform::Linux, "x86_64");
//! let invocation = Invocation::new(".", target.clone());
//! let build_dir = BuildDirectory::new("build", &target);
//! let shell = Shell::new(true, false);
//! let fetcher = GitHubFetcher::new(GitHubSettings::default(), "git".into(), shell.clone(), false)?;
//! let registry = Registry::new(vec![Dependency::new("glm", "0.9.9.8")])?;
//! let mut ledger = InstalledVersions::load(&build_dir.ledger);
//!
//! let context = InstallContext::new(&invocation, &build_dir, &shell, &fetcher);
//! let outcomes = install_selected(&registry, &Selection::default(), context, &mut ledger).await?;
//! # Ok(())
//! # }
//! ```

pub mod branch;
pub mod cmake;
pub mod context;
pub mod copy;
pub mod scratch;
pub mod strategy;

pub use context::{DEFAULT_TAG, InstallContext};
pub use scratch::ScratchDir;
pub use strategy::{
    AssetCopy, CMakeBuild, CopyRule, InstallStrategy, PlatformBranch, SourceSpec, TemplateVars,
};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::DepwrightError;
use crate::fetch::Fetch;
use crate::ledger::InstalledVersions;
use crate::registry::{Dependency, Registry};
use crate::resolver::decision::library_files_present;
use crate::resolver::{BuildState, DependencyWalker, InstallOutcome, NodeInstaller, install_reason};

impl InstallStrategy {
    /// Runs the strategy for `dependency`.
    pub async fn install<F: Fetch>(&self, dependency: &Dependency, context: &InstallContext<'_, F>) -> Result<()> {
        match self {
            Self::CMakeBuild(build) => build.install(dependency, context).await,
            Self::AssetCopy(copy) => copy.install(dependency, context).await,
            Self::PlatformBranch(branch) => branch.install(dependency, context).await,
        }
    }
}

/// Installs dependencies whose installed copy is missing or stale.
pub struct Installer<'a, F> {
    context: InstallContext<'a, F>,
    ledger: &'a mut InstalledVersions,
}

impl<'a, F: Fetch> Installer<'a, F> {
    /// Creates an installer recording into `ledger`.
    pub fn new(context: InstallContext<'a, F>, ledger: &'a mut InstalledVersions) -> Self {
        Self {
            context,
            ledger,
        }
    }
}

impl<F: Fetch> NodeInstaller for Installer<'_, F> {
    async fn install(&mut self, dependency: &Dependency) -> Result<InstallOutcome> {
        let platform = self.context.invocation.platform();
        let prefix = self.context.prefix();

        let Some(reason) = install_reason(dependency, self.ledger.get(&dependency.key), prefix, platform)
        else {
            info!("{} {} is up to date", dependency.name, dependency.version);
            return Ok(InstallOutcome::UpToDate);
        };

        info!("Installing {} {} ({})", dependency.name, dependency.version, reason);
        dependency
            .strategy
            .install(dependency, &self.context)
            .await
            .with_context(|| format!("Failed to install '{}'", dependency.key))?;

        if !self.context.shell.is_dry_run() && library_files_present(dependency, prefix, platform) == Some(false) {
            return Err(DepwrightError::InstallVerificationFailed {
                dependency: dependency.key.clone(),
            }
            .into());
        }

        self.ledger.record(&dependency.key, &dependency.version);
        self.ledger.save(self.context.shell)?;
        Ok(InstallOutcome::Installed(reason))
    }
}

/// Which registry entries a run builds.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Explicit keys; when non-empty the flags below are ignored
    pub only: Vec<String>,
    /// Include test-only dependencies
    pub build_tests: bool,
    /// Include benchmark-only dependencies
    pub build_benchmarks: bool,
}

/// Installs the selected entries of `registry` and their prerequisites, returning
/// the outcome of every visited dependency in execution order.
pub async fn install_selected<F: Fetch>(
    registry: &Registry,
    selection: &Selection,
    context: InstallContext<'_, F>,
    ledger: &mut InstalledVersions,
) -> Result<Vec<(String, InstallOutcome)>> {
    let walker = DependencyWalker::new(registry);
    let mut state = BuildState::new(registry);
    let mut installer = Installer::new(context, ledger);

    if selection.only.is_empty() {
        walker
            .build_where(
                |dependency| dependency.is_selected(selection.build_tests, selection.build_benchmarks),
                &mut state,
                &mut installer,
            )
            .await?;
    } else {
        for key in &selection.only {
            walker.ensure_built(key, &mut state, &mut installer).await?;
        }
    }

    Ok(state.outcomes().to_vec())
}
