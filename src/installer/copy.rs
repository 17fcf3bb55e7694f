//! Prebuilt installs: files copied out of fetched sources.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::context::InstallContext;
use super::strategy::{AssetCopy, CopyRule, TemplateVars};
use crate::core::DepwrightError;
use crate::fetch::Fetch;
use crate::registry::Dependency;
use crate::shell::Shell;

impl AssetCopy {
    /// Fetches the sources and applies the copy rules in order.
    pub async fn install<F: Fetch>(&self, dependency: &Dependency, context: &InstallContext<'_, F>) -> Result<()> {
        let scratch = context.scratch(dependency)?;
        let source = context.acquire(dependency, &self.source, scratch.path()).await?;
        let vars = context.vars(dependency);

        for rule in &self.copy {
            rule.apply(context.shell, &source, context.prefix(), &vars)?;
        }
        Ok(())
    }
}

impl CopyRule {
    /// Copies from `source` into `prefix`, replacing what a previous install left.
    pub fn apply(&self, shell: &Shell, source: &Path, prefix: &Path, vars: &TemplateVars<'_>) -> Result<()> {
        match self {
            Self::File { from, to } => {
                let file = source.join(vars.expand(from));
                let file_name = file.file_name().ok_or_else(|| DepwrightError::ConfigError {
                    message: format!("copy rule source '{from}' names no file"),
                })?;
                let dest_dir = prefix.join(vars.expand(to));
                let dest = dest_dir.join(file_name);
                shell.makedirs(&dest_dir)?;
                shell.rm(&dest)?;
                shell.copy(&file, &dest)
            }
            Self::Directory { from, to } => {
                let dest = prefix.join(vars.expand(to));
                shell.rmtree(&dest)?;
                shell.copytree(&source.join(vars.expand(from)), &dest)
            }
            Self::Contents { from, to, replace } => {
                let dir = source.join(vars.expand(from));
                let dest = prefix.join(vars.expand(to));
                shell.makedirs(&dest)?;
                if let Some(pattern) = replace {
                    remove_matching(shell, &dest, &vars.expand(pattern))?;
                }
                copy_contents(shell, &dir, &dest)
            }
        }
    }
}

/// Removes the files of `dir` whose name contains `pattern`.
fn remove_matching(shell: &Shell, dir: &Path, pattern: &str) -> Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };
    for entry in entries {
        let entry = entry.map_err(|e| DepwrightError::filesystem("read directory", dir, e))?;
        if entry.file_name().to_string_lossy().contains(pattern) && entry.path().is_file() {
            debug!("Removing stale {}", entry.path().display());
            shell.rm(&entry.path())?;
        }
    }
    Ok(())
}

fn copy_contents(shell: &Shell, dir: &Path, dest: &Path) -> Result<()> {
    if shell.is_dry_run() && !dir.is_dir() {
        // Nothing was fetched, so the entries are unknown
        shell.announce(&["cp", "-R", &format!("{}/*", dir.display()), &dest.display().to_string()]);
        return Ok(());
    }

    let entries = fs::read_dir(dir).map_err(|e| DepwrightError::filesystem("read directory", dir, e))?;
    let mut paths = entries
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DepwrightError::filesystem("read directory", dir, e))?;
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);
        if path.is_dir() {
            shell.copytree(&path, &target)?;
        } else {
            shell.copy(&path, &target)?;
        }
    }
    Ok(())
}
