//! User-wide settings in `~/.depwright/config.toml`.
//!
//! ```toml
//! github_token = "ghp_xxxxxxxxxxxx"
//! github_user_agent = "my-team-bootstrap"
//! github_api_url = "https://github.example.com/api/v3"
//! build_root = "~/builds/engine"
//! cmake_generator = "ninja"
//! jobs = 8
//! ```
//!
//! Every key is optional. Command-line flags win over the file; the file wins
//! over the `GITHUB_TOKEN` environment variable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::core::DepwrightError;
use crate::fetch::GitHubSettings;
use crate::invocation::CMakeGenerator;
use crate::utils::{get_home_dir, resolve_path};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "DEPWRIGHT_CONFIG";

/// Environment variable consulted for a GitHub token last.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Contents of the global config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Token sent with GitHub API requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    /// `User-Agent` for GitHub requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_user_agent: Option<String>,
    /// GitHub REST API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,
    /// Build root used when `--build-root` is absent; `~` is expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_root: Option<String>,
    /// Generator used when `--cmake-generator` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_generator: Option<CMakeGenerator>,
    /// Parallel jobs used when `--jobs` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// GitHub values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct GitHubOverrides {
    /// `--auth-token`
    pub token: Option<String>,
    /// `--auth-token-file`
    pub token_file: Option<PathBuf>,
    /// `--github-user-agent`
    pub user_agent: Option<String>,
}

impl GlobalConfig {
    /// `~/.depwright/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(get_home_dir()?.join(".depwright").join("config.toml"))
    }

    /// Loads `path`, or the file named by `DEPWRIGHT_CONFIG`, or the default file.
    /// A missing file yields the defaults.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => PathBuf::from(path),
                None => Self::default_path()?,
            },
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No global config at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Loads a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            DepwrightError::ConfigError {
                message: format!("invalid global config {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Build root from the config, tilde-expanded.
    pub fn build_root(&self) -> Result<Option<PathBuf>> {
        self.build_root.as_deref().map(resolve_path).transpose()
    }

    /// GitHub settings after applying command-line `overrides`, this config and
    /// the environment, in that order.
    pub async fn github_settings(&self, overrides: &GitHubOverrides) -> Result<GitHubSettings> {
        let defaults = GitHubSettings::default();

        let token = match (&overrides.token, &overrides.token_file) {
            (Some(token), _) => Some(token.clone()),
            (None, Some(file)) => Some(read_token_file(file).await?),
            (None, None) => self
                .github_token
                .clone()
                .or_else(|| std::env::var(TOKEN_ENV).ok().filter(|token| !token.is_empty())),
        };

        Ok(GitHubSettings {
            api_url: self.github_api_url.clone().unwrap_or(defaults.api_url),
            user_agent: overrides
                .user_agent
                .clone()
                .or_else(|| self.github_user_agent.clone())
                .unwrap_or(defaults.user_agent),
            token,
        })
    }
}

/// Reads a token from a file, trimming surrounding whitespace. `~` is expanded.
pub async fn read_token_file(path: &Path) -> Result<String> {
    let path = resolve_path(&path.to_string_lossy())?;
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| DepwrightError::filesystem("read token file", &path, e))?;
    let token = content.trim();
    if token.is_empty() {
        return Err(DepwrightError::InvalidArgument {
            message: format!("token file {} is empty", path.display()),
        }
        .into());
    }
    Ok(token.to_string())
}
