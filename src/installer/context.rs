//! Everything an install strategy needs, bundled for one run.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::scratch::ScratchDir;
use super::strategy::{SourceSpec, TemplateVars};
use crate::build_dir::BuildDirectory;
use crate::core::DepwrightError;
use crate::fetch::archive::{self, ArchiveFormat};
use crate::fetch::github::clone_commands;
use crate::fetch::{Fetch, GitHubRepo};
use crate::invocation::Invocation;
use crate::registry::Dependency;
use crate::shell::Shell;
use crate::utils::sha256_file;

/// Tag template used when a source does not name one.
pub const DEFAULT_TAG: &str = "v{version}";

/// Shared state of the install strategies.
///
/// In dry-run mode [`acquire`](Self::acquire) never reaches the fetcher: it
/// announces the download, clone and extraction commands and returns the path the
/// sources would have been unpacked to.
#[derive(Debug)]
pub struct InstallContext<'a, F> {
    /// Run-wide settings
    pub invocation: &'a Invocation,
    /// Build directory layout
    pub build_dir: &'a BuildDirectory,
    /// Dry-run aware executor
    pub shell: &'a Shell,
    /// Source fetcher
    pub fetcher: &'a F,
}

impl<'a, F: Fetch> InstallContext<'a, F> {
    /// Bundles the run state.
    pub const fn new(
        invocation: &'a Invocation,
        build_dir: &'a BuildDirectory,
        shell: &'a Shell,
        fetcher: &'a F,
    ) -> Self {
        Self {
            invocation,
            build_dir,
            shell,
            fetcher,
        }
    }

    /// Install prefix.
    #[must_use]
    pub fn prefix(&self) -> &'a Path {
        self.build_dir.prefix()
    }

    /// Template values of `dependency` for this run's target.
    #[must_use]
    pub fn vars<'d>(&'d self, dependency: &'d Dependency) -> TemplateVars<'d> {
        dependency.template_vars(&self.invocation.target)
    }

    /// Fresh scratch directory for `dependency`, removed when dropped.
    pub fn scratch(&self, dependency: &Dependency) -> Result<ScratchDir<'a>> {
        ScratchDir::create(self.shell, self.build_dir.scratch_for(&dependency.key))
    }

    fn announce_download(&self, url: &str, file: &Path) {
        self.shell.announce(&["curl", "-fL", "-o", &file.display().to_string(), url]);
    }

    /// Fetches the sources described by `source` into `scratch` and returns the
    /// directory holding them.
    pub async fn acquire(&self, dependency: &Dependency, source: &SourceSpec, scratch: &Path) -> Result<PathBuf> {
        let vars = self.vars(dependency);
        let dry_run = self.shell.is_dry_run();

        match source {
            SourceSpec::Tag { tag } => {
                let repo = repository(dependency)?;
                let tag = vars.expand(tag.as_deref().unwrap_or(DEFAULT_TAG));
                debug!("Fetching {} at tag {}", repo, tag);
                if dry_run {
                    let file = scratch.join(format!("{}-{}.tar.gz", repo.name, tag));
                    let extracted = scratch.join(&repo.name);
                    self.announce_download(&self.invocation.github.tarball_url(repo, &tag), &file);
                    self.shell.extract(&file, &extracted).await?;
                    return Ok(extracted);
                }
                self.fetcher.download_tag(repo, &tag, scratch).await
            }
            SourceSpec::Release { tag, asset, root } => {
                let repo = repository(dependency)?;
                let tag = vars.expand(tag.as_deref().unwrap_or(DEFAULT_TAG));
                let asset = asset
                    .as_deref()
                    .or(dependency.asset_name.as_deref())
                    .map(|asset| vars.expand(asset))
                    .ok_or_else(|| config_error(dependency, "release source names no asset"))?;
                let file = if dry_run {
                    let file = scratch.join(&asset);
                    self.announce_download(
                        &self.invocation.github.release_download_url(repo, &tag, &asset),
                        &file,
                    );
                    file
                } else {
                    self.fetcher.download_asset(repo, &tag, &asset, scratch).await?
                };
                self.unpack(dependency, &file, scratch, root.as_deref(), &vars).await
            }
            SourceSpec::Commit => {
                let repo = repository(dependency)?;
                let commit = dependency
                    .commit
                    .as_deref()
                    .ok_or_else(|| config_error(dependency, "commit source without 'commit'"))?;
                if dry_run {
                    let checkout = scratch.join(&repo.name);
                    let git = self.invocation.toolchain.git(dry_run)?;
                    for command in clone_commands(git, &self.invocation.github, repo, commit, &checkout) {
                        self.shell.run(command).await?;
                    }
                    return Ok(checkout);
                }
                self.fetcher.clone_commit(repo, commit, scratch).await
            }
            SourceSpec::Url { url, root } => {
                let url = vars.expand(url);
                let file_name = url
                    .split(['?', '#'])
                    .next()
                    .and_then(|path| path.rsplit('/').next())
                    .filter(|name| !name.is_empty())
                    .unwrap_or("download");
                let file = scratch.join(file_name);
                if dry_run {
                    self.announce_download(&url, &file);
                } else {
                    self.fetcher.stream(&url, &file).await?;
                }
                self.unpack(dependency, &file, scratch, root.as_deref(), &vars).await
            }
        }
    }

    async fn unpack(
        &self,
        dependency: &Dependency,
        file: &Path,
        scratch: &Path,
        root: Option<&str>,
        vars: &TemplateVars<'_>,
    ) -> Result<PathBuf> {
        if let Some(expected) = &dependency.sha256
            && !self.shell.is_dry_run()
        {
            let actual = sha256_file(file)?;
            if &actual != expected {
                return Err(DepwrightError::ChecksumMismatch {
                    path: file.display().to_string(),
                    expected: expected.clone(),
                    actual,
                }
                .into());
            }
            debug!("Checksum of {} verified", file.display());
        }

        if ArchiveFormat::detect(file).is_none() {
            // Plain files are used where they were downloaded
            return Ok(scratch.to_path_buf());
        }

        let extracted = scratch.join("src");
        self.shell.extract(file, &extracted).await?;
        let root = root.map(|root| vars.expand(root));

        if self.shell.is_dry_run() {
            return Ok(match root {
                Some(root) => extracted.join(root),
                None => extracted,
            });
        }
        archive::locate_root(&extracted, root.as_deref())
    }
}

fn config_error(dependency: &Dependency, message: &str) -> DepwrightError {
    DepwrightError::ConfigError {
        message: format!("dependency '{}': {message}", dependency.key),
    }
}

fn repository(dependency: &Dependency) -> Result<&GitHubRepo> {
    dependency
        .repository
        .as_ref()
        .ok_or_else(|| config_error(dependency, "source requires a 'repository'").into())
}
