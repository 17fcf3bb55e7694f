//! Named, pre-recorded sets of `configure` flags.
//!
//! Preset files are TOML with one `[preset.<name>]` table per preset:
//!
//! ```toml
//! [preset.base]
//! build-variant = "debug"
//! cmake-generator = "ninja"
//!
//! [preset.dev]
//! mixins = ["base"]
//! build-tests = true
//! jobs = 8
//! ```
//!
//! Expanding `dev` yields `--build-variant=debug --cmake-generator=ninja
//! --build-tests --jobs=8`. Mixins are expanded first, in order, and a later
//! value for the same key replaces the earlier one in place. `true` renders as a
//! bare flag, `false` drops the key and arrays repeat it once per element.
//!
//! Presets are read from `~/.depwright-presets.toml` and
//! `<source root>/util/build-presets.toml`; files that do not exist are skipped
//! and a preset defined in a later file replaces one of the same name.

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::DepwrightError;
use crate::utils::get_home_dir;

/// Preset file in the user's home directory.
pub const USER_PRESET_FILE: &str = ".depwright-presets.toml";

/// Preset file relative to the source root.
pub const PROJECT_PRESET_FILE: &str = "util/build-presets.toml";

const MIXINS_KEY: &str = "mixins";

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    preset: BTreeMap<String, toml::Table>,
}

/// One preset and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Defining file
    pub origin: PathBuf,
    /// Presets expanded before this one
    pub mixins: Vec<String>,
    /// Option values, without `mixins`
    pub options: toml::Table,
}

/// Every preset found in a list of files.
#[derive(Debug, Clone, Default)]
pub struct PresetSet {
    presets: BTreeMap<String, Preset>,
}

/// Default preset files for `source_root`, in load order.
pub fn default_files(source_root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::with_capacity(2);
    match get_home_dir() {
        Ok(home) => files.push(home.join(USER_PRESET_FILE)),
        Err(e) => debug!("Skipping user preset file: {e:#}"),
    }
    files.push(source_root.join(PROJECT_PRESET_FILE));
    files
}

fn parse_error(file: &Path, reason: impl std::fmt::Display) -> DepwrightError {
    DepwrightError::PresetParseError {
        file: file.display().to_string(),
        reason: reason.to_string(),
    }
}

impl PresetSet {
    /// Loads `files` in order; missing files are skipped.
    pub fn load(files: &[PathBuf]) -> Result<Self> {
        let mut set = Self::default();
        for file in files {
            if !file.is_file() {
                debug!("Preset file {} does not exist", file.display());
                continue;
            }
            let content = fs::read_to_string(file)
                .map_err(|e| DepwrightError::filesystem("read preset file", file, e))?;
            set.add_file(&content, file)?;
        }
        Ok(set)
    }

    /// Adds the presets of one file's `content`.
    pub fn add_file(&mut self, content: &str, origin: &Path) -> Result<()> {
        let parsed: PresetFile = toml::from_str(content).map_err(|e| parse_error(origin, e))?;
        for (name, mut options) in parsed.preset {
            let mixins = match options.remove(MIXINS_KEY) {
                None => Vec::new(),
                Some(toml::Value::Array(values)) => values
                    .into_iter()
                    .map(|value| match value {
                        toml::Value::String(mixin) => Ok(mixin),
                        other => Err(parse_error(
                            origin,
                            format!("preset '{name}': mixin {other} is not a string"),
                        )),
                    })
                    .collect::<Result<Vec<String>, _>>()?,
                Some(other) => {
                    return Err(parse_error(origin, format!("preset '{name}': mixins must be a list, got {other}")).into());
                }
            };
            debug!("Preset '{}' defined in {}", name, origin.display());
            self.presets.insert(
                name,
                Preset {
                    origin: origin.to_path_buf(),
                    mixins,
                    options,
                },
            );
        }
        Ok(())
    }

    /// Whether no preset was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Looks up a preset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Preset names, sorted case-insensitively.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    /// Command-line options of `name` with its mixins applied.
    pub fn expand(&self, name: &str) -> Result<Vec<String>> {
        let mut merged = Vec::new();
        let mut chain = Vec::new();
        self.collect(name, &mut chain, &mut merged)?;

        let mut arguments = Vec::new();
        for (key, value) in &merged {
            render(key, value, &mut arguments).map_err(|reason| {
                let origin = self.presets.get(name).map(|preset| preset.origin.as_path()).unwrap_or(Path::new(""));
                parse_error(origin, reason)
            })?;
        }
        Ok(arguments)
    }

    fn collect(&self, name: &str, chain: &mut Vec<String>, merged: &mut Vec<(String, toml::Value)>) -> Result<()> {
        let preset = self.presets.get(name).ok_or_else(|| DepwrightError::PresetNotFound {
            name: name.to_string(),
        })?;

        if chain.iter().any(|seen| seen == name) {
            chain.push(name.to_string());
            return Err(parse_error(&preset.origin, format!("mixin cycle {}", chain.join(" → "))).into());
        }

        chain.push(name.to_string());
        for mixin in &preset.mixins {
            self.collect(mixin, chain, merged)?;
        }
        chain.pop();

        for (key, value) in &preset.options {
            match merged.iter_mut().find(|(existing, _)| existing == key) {
                Some(slot) => slot.1 = value.clone(),
                None => merged.push((key.clone(), value.clone())),
            }
        }
        Ok(())
    }
}

fn render(key: &str, value: &toml::Value, arguments: &mut Vec<String>) -> Result<(), String> {
    match value {
        toml::Value::String(text) => arguments.push(format!("--{key}={text}")),
        toml::Value::Integer(number) => arguments.push(format!("--{key}={number}")),
        toml::Value::Float(number) => arguments.push(format!("--{key}={number}")),
        toml::Value::Boolean(true) => arguments.push(format!("--{key}")),
        toml::Value::Boolean(false) => {}
        toml::Value::Array(values) => {
            for value in values {
                if value.is_array() {
                    return Err(format!("option '{key}' nests a list"));
                }
                render(key, value, arguments)?;
            }
        }
        other => return Err(format!("option '{key}' has unsupported value {other}")),
    }
    Ok(())
}

/// Flags of the `preset` command forwarded to the expanded invocation.
#[derive(Debug, Clone, Default)]
pub struct ForwardedFlags {
    /// `--dry-run`
    pub dry_run: bool,
    /// `--clean`
    pub clean: bool,
    /// `--jobs`
    pub jobs: Option<usize>,
    /// `--auth-token-file`
    pub auth_token_file: Option<PathBuf>,
    /// `--auth-token`
    pub auth_token: Option<String>,
    /// `--verbose`
    pub verbose: bool,
}

/// Full `configure` command line: the program, forwarded flags, then the
/// preset's options.
#[must_use]
pub fn compose_invocation(executable: &str, flags: &ForwardedFlags, preset_options: &[String]) -> Vec<String> {
    let mut argv = vec![executable.to_string(), "configure".to_string()];
    if flags.dry_run {
        argv.push("--dry-run".to_string());
    }
    if flags.clean {
        argv.push("--clean".to_string());
    }
    if let Some(jobs) = flags.jobs {
        argv.extend(["--jobs".to_string(), jobs.to_string()]);
    }
    if let Some(file) = &flags.auth_token_file {
        argv.extend(["--auth-token-file".to_string(), file.display().to_string()]);
    }
    if let Some(token) = &flags.auth_token {
        argv.extend(["--auth-token".to_string(), token.clone()]);
    }
    if flags.verbose {
        argv.push("--verbose".to_string());
    }
    argv.extend(preset_options.iter().cloned());
    argv
}
