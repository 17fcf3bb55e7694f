//! `depwright preset`: expand a named preset into a `configure` run.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::CliContext;
use crate::core::{DepwrightError, Platform};
use crate::preset::{self, ForwardedFlags, PresetSet};
use crate::shell::{Shell, ToolCommand, quote_command};
use crate::utils::platform::absolute;
use crate::utils::resolve_path;

/// Expand a preset and run it.
#[derive(Args, Debug, Clone, Default)]
pub struct PresetCommand {
    /// Preset to expand
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Preset files to read instead of the default ones
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub preset_file: Vec<String>,

    /// List the available presets
    #[arg(long)]
    pub show_presets: bool,

    /// Print the expanded invocation without running it
    #[arg(long)]
    pub expand_invocation: bool,

    /// Forwarded to `configure`
    #[arg(long)]
    pub dry_run: bool,

    /// Forwarded to `configure`
    #[arg(long)]
    pub clean: bool,

    /// Forwarded to `configure`
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Forwarded to `configure`
    #[arg(long, value_name = "TOKEN", conflicts_with = "auth_token_file")]
    pub auth_token: Option<String>,

    /// Forwarded to `configure`
    #[arg(long, value_name = "FILE")]
    pub auth_token_file: Option<PathBuf>,

    /// Root of the project, for `util/build-presets.toml` [default: current directory]
    #[arg(long, env = "DEPWRIGHT_SOURCE_ROOT", value_name = "DIR")]
    pub source_root: Option<PathBuf>,
}

impl PresetCommand {
    fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.preset_file.is_empty() {
            return self.preset_file.iter().map(|file| resolve_path(file)).collect();
        }
        let source_root = match &self.source_root {
            Some(root) => absolute(root)?,
            None => std::env::current_dir()?,
        };
        Ok(preset::default_files(&source_root))
    }

    /// The `configure` command line `name` expands to.
    pub fn expansion(&self, presets: &PresetSet, name: &str, executable: &str, verbose: bool) -> Result<Vec<String>> {
        let options = presets.expand(name)?;
        let flags = ForwardedFlags {
            dry_run: self.dry_run,
            clean: self.clean,
            jobs: self.jobs,
            auth_token_file: self.auth_token_file.clone(),
            auth_token: self.auth_token.clone(),
            verbose,
        };
        Ok(preset::compose_invocation(executable, &flags, &options))
    }

    /// Lists, expands or runs a preset.
    pub async fn execute(self, cli: &CliContext) -> Result<()> {
        let presets = PresetSet::load(&self.files()?)?;

        if self.show_presets {
            info!("The available presets are:");
            for name in presets.names() {
                println!("{name}");
            }
            return Ok(());
        }

        let name = self.preset.as_deref().ok_or(DepwrightError::MissingPreset)?;
        let executable = std::env::current_exe().context("Failed to locate the depwright executable")?;
        let argv = self.expansion(&presets, name, &executable.display().to_string(), cli.verbose)?;

        println!("Using preset '{name}', which expands to\n\n{}\n", quote_command(&argv));
        if self.expand_invocation {
            return Ok(());
        }

        let command = match Platform::current() {
            Some(Platform::Darwin) => ToolCommand::new("caffeinate").args(&argv),
            _ => ToolCommand::new(&executable).args(&argv[1..]),
        };
        Shell::new(false, false)
            .run(command.inherit_stdio().with_context(format!("preset '{name}'")))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_expansion_forwards_flags() {
        let mut presets = PresetSet::default();
        presets
            .add_file("[preset.ci]\nbuild-tests = true\n", Path::new("p.toml"))
            .unwrap();
        let command = PresetCommand {
            clean: true,
            jobs: Some(2),
            auth_token_file: Some(PathBuf::from("/etc/token")),
            ..PresetCommand::default()
        };

        let argv = command.expansion(&presets, "ci", "depwright", false).unwrap();
        assert_eq!(
            argv,
            vec![
                "depwright",
                "configure",
                "--clean",
                "--jobs",
                "2",
                "--auth-token-file",
                "/etc/token",
                "--build-tests"
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_preset_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let command = PresetCommand {
            preset_file: vec![temp.path().join("none.toml").display().to_string()],
            ..PresetCommand::default()
        };
        let err = command.execute(&CliContext::default()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DepwrightError>(), Some(DepwrightError::MissingPreset)));
    }
}
