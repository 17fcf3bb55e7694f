//! Fixture-backed [`Fetch`] implementation.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::DepwrightError;
use crate::fetch::{Fetch, GitHubRepo};
use crate::utils::copy_dir;

/// Serves sources from local directories and files instead of the network.
///
/// Every call is recorded, including failing ones, so tests can assert that a
/// dependency was, or was not, fetched. A release asset without a fixture fails
/// with [`DepwrightError::AssetNotFound`], anything else with a 404.
///
/// ```rust,no_run
/// use depwright::test_utils::MockFetcher;
///
/// let fetcher = MockFetcher::new()
///     .with_tag("jarro2783/cxxopts", "v2.2.0", "fixtures/cxxopts")
///     .with_url("https://example.com/lua-5.3.5.tar.gz", "fixtures/lua-5.3.5.tar.gz");
/// assert!(fetcher.calls().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    tags: HashMap<String, PathBuf>,
    assets: HashMap<String, PathBuf>,
    commits: HashMap<String, PathBuf>,
    urls: HashMap<String, PathBuf>,
    offline: bool,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// A fetcher with no fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher whose every request fails with a network error.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Serves the directory `source` as the tarball of `repo` at `tag`.
    #[must_use]
    pub fn with_tag(mut self, repo: &str, tag: &str, source: impl Into<PathBuf>) -> Self {
        self.tags.insert(format!("{repo}@{tag}"), source.into());
        self
    }

    /// Serves the file `file` as release asset `asset` of `repo` at `tag`.
    #[must_use]
    pub fn with_asset(mut self, repo: &str, tag: &str, asset: &str, file: impl Into<PathBuf>) -> Self {
        self.assets.insert(format!("{repo}@{tag}/{asset}"), file.into());
        self
    }

    /// Serves the directory `source` as a checkout of `repo` at `commit`.
    #[must_use]
    pub fn with_commit(mut self, repo: &str, commit: &str, source: impl Into<PathBuf>) -> Self {
        self.commits.insert(format!("{repo}@{commit}"), source.into());
        self
    }

    /// Serves the file `file` at `url`.
    #[must_use]
    pub fn with_url(mut self, url: &str, file: impl Into<PathBuf>) -> Self {
        self.urls.insert(url.to_string(), file.into());
        self
    }

    /// Every request so far, e.g. `tag jarro2783/cxxopts@v2.2.0`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Records `request` and looks up its fixture. Only an offline fetcher fails here.
    fn serve<'a>(
        &self,
        request: String,
        fixtures: &'a HashMap<String, PathBuf>,
        key: &str,
    ) -> Result<Option<&'a Path>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }
        if self.offline {
            return Err(DepwrightError::NetworkError {
                url: key.to_string(),
                reason: "connection refused".to_string(),
            }
            .into());
        }
        Ok(fixtures.get(key).map(PathBuf::as_path))
    }
}

fn not_found(key: &str) -> DepwrightError {
    DepwrightError::HttpStatus {
        url: key.to_string(),
        status: 404,
    }
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest).map_err(|e| DepwrightError::filesystem("copy fixture", source, e))?;
    Ok(())
}

impl Fetch for MockFetcher {
    async fn download_tag(&self, repo: &GitHubRepo, tag: &str, dest: &Path) -> Result<PathBuf> {
        let key = format!("{repo}@{tag}");
        let source = self.serve(format!("tag {key}"), &self.tags, &key)?.ok_or_else(|| not_found(&key))?;
        let checkout = dest.join(&repo.name);
        copy_dir(source, &checkout)?;
        Ok(checkout)
    }

    async fn download_asset(&self, repo: &GitHubRepo, tag: &str, asset: &str, dest: &Path) -> Result<PathBuf> {
        let key = format!("{repo}@{tag}/{asset}");
        let file = self.serve(format!("asset {key}"), &self.assets, &key)?.ok_or_else(|| {
            DepwrightError::AssetNotFound {
                repository: repo.to_string(),
                tag: tag.to_string(),
                asset: asset.to_string(),
            }
        })?;
        let target = dest.join(asset);
        copy_file(file, &target)?;
        Ok(target)
    }

    async fn clone_commit(&self, repo: &GitHubRepo, commit: &str, dest: &Path) -> Result<PathBuf> {
        let key = format!("{repo}@{commit}");
        let source = self.serve(format!("commit {key}"), &self.commits, &key)?.ok_or_else(|| not_found(&key))?;
        let checkout = dest.join(&repo.name);
        copy_dir(source, &checkout)?;
        Ok(checkout)
    }

    async fn stream(&self, url: &str, dest: &Path) -> Result<()> {
        let file = self.serve(format!("url {url}"), &self.urls, url)?.ok_or_else(|| not_found(url))?;
        copy_file(file, dest)
    }
}
