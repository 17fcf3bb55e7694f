//! GitHub-backed implementation of [`Fetch`].

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use super::http::{GITHUB_JSON, HttpClient};
use super::{Fetch, archive};
use crate::core::DepwrightError;
use crate::shell::{Shell, ToolCommand};

/// Default REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// A repository given as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    /// Account or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl FromStr for GitHubRepo {
    type Err = DepwrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.trim_end_matches(".git").to_string(),
                })
            }
            _ => Err(DepwrightError::ConfigError {
                message: format!("repository '{s}' is not of the form 'owner/repo'"),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for GitHubRepo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Endpoint and credentials used for GitHub requests.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// REST API base URL, without trailing slash
    pub api_url: String,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Personal access token
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("depwright/{}", env!("CARGO_PKG_VERSION")),
            token: None,
        }
    }
}

impl GitHubSettings {
    /// Tarball URL of a tag.
    #[must_use]
    pub fn tarball_url(&self, repo: &GitHubRepo, tag: &str) -> String {
        format!(
            "{}/repos/{}/{}/tarball/refs/tags/{}",
            self.api_url.trim_end_matches('/'),
            repo.owner,
            repo.name,
            tag
        )
    }

    /// API URL of the release published for a tag.
    #[must_use]
    pub fn release_url(&self, repo: &GitHubRepo, tag: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.api_url.trim_end_matches('/'),
            repo.owner,
            repo.name,
            tag
        )
    }

    /// Public download URL of a release asset.
    #[must_use]
    pub fn release_download_url(&self, repo: &GitHubRepo, tag: &str, asset: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/download/{}/{}",
            repo.owner, repo.name, tag, asset
        )
    }

    /// HTTPS clone URL.
    #[must_use]
    pub fn clone_url(&self, repo: &GitHubRepo) -> String {
        format!("https://github.com/{}/{}.git", repo.owner, repo.name)
    }
}

/// `git clone` and `git checkout` commands materializing `commit` at `checkout`.
pub fn clone_commands(
    git: &Path,
    settings: &GitHubSettings,
    repo: &GitHubRepo,
    commit: &str,
    checkout: &Path,
) -> [ToolCommand; 2] {
    [
        ToolCommand::new(git)
            .args(["clone", "--quiet"])
            .arg(settings.clone_url(repo))
            .path_arg(checkout)
            .with_context(repo.to_string()),
        ToolCommand::new(git)
            .arg("-C")
            .path_arg(checkout)
            .args(["checkout", "--quiet", commit])
            .with_context(repo.to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
struct ReleaseAsset {
    name: String,
    browser_download_url: String,
}

/// Fetches sources from GitHub over HTTPS and with `git`.
#[derive(Debug, Clone)]
pub struct GitHubFetcher {
    http: HttpClient,
    settings: GitHubSettings,
    git: PathBuf,
    shell: Shell,
}

impl GitHubFetcher {
    /// Creates a fetcher. `git` is the program used for commit checkouts.
    pub fn new(settings: GitHubSettings, git: PathBuf, shell: Shell, show_progress: bool) -> Result<Self> {
        let http = HttpClient::new(settings.user_agent.clone(), settings.token.clone(), show_progress)?;
        Ok(Self {
            http,
            settings,
            git,
            shell,
        })
    }
}

impl Fetch for GitHubFetcher {
    async fn download_tag(&self, repo: &GitHubRepo, tag: &str, dest: &Path) -> Result<PathBuf> {
        let url = self.settings.tarball_url(repo, tag);
        let archive_path = dest.join(format!("{}-{}.tar.gz", repo.name, tag));
        self.http.download(&url, &archive_path, Some(GITHUB_JSON), true).await?;

        let extracted = dest.join(&repo.name);
        self.shell.extract(&archive_path, &extracted).await?;
        archive::locate_root(&extracted, None)
    }

    async fn download_asset(
        &self,
        repo: &GitHubRepo,
        tag: &str,
        asset: &str,
        dest: &Path,
    ) -> Result<PathBuf> {
        let release: Release = self.http.get_json(&self.settings.release_url(repo, tag), true).await?;
        let found = release.assets.into_iter().find(|candidate| candidate.name == asset).ok_or_else(|| {
            DepwrightError::AssetNotFound {
                repository: repo.to_string(),
                tag: tag.to_string(),
                asset: asset.to_string(),
            }
        })?;
        debug!("Release asset {} resolved to {}", asset, found.browser_download_url);

        let target = dest.join(&found.name);
        self.http
            .download(&found.browser_download_url, &target, Some("application/octet-stream"), true)
            .await?;
        Ok(target)
    }

    async fn clone_commit(&self, repo: &GitHubRepo, commit: &str, dest: &Path) -> Result<PathBuf> {
        let checkout = dest.join(&repo.name);
        info!("Cloning {} at {}", repo, commit);

        for command in clone_commands(&self.git, &self.settings, repo, commit, &checkout) {
            self.shell.run(command).await?;
        }

        Ok(checkout)
    }

    async fn stream(&self, url: &str, dest: &Path) -> Result<()> {
        self.http.download(url, dest, None, false).await?;
        Ok(())
    }
}
