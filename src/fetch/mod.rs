//! Downloading dependency sources.
//!
//! The [`Fetch`] trait is the seam between the install strategies and the network.
//! [`GitHubFetcher`] is the real implementation; tests substitute a fixture-backed
//! fetcher. Install strategies never call a fetcher in dry-run mode, the install
//! context announces the equivalent `curl`/`git` commands instead.

pub mod archive;
pub mod github;
pub mod http;

pub use github::{GitHubFetcher, GitHubRepo, GitHubSettings};
pub use http::HttpClient;

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Retrieval of dependency sources.
pub trait Fetch {
    /// Downloads the tarball of `tag` and extracts it under `dest`.
    ///
    /// Returns the extracted source root.
    fn download_tag(
        &self,
        repo: &GitHubRepo,
        tag: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<PathBuf>>;

    /// Downloads the release asset named `asset` of release `tag` into `dest`.
    ///
    /// Returns the path of the downloaded file.
    fn download_asset(
        &self,
        repo: &GitHubRepo,
        tag: &str,
        asset: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<PathBuf>>;

    /// Clones `repo` into `dest` and checks out `commit`.
    ///
    /// Returns the checkout directory.
    fn clone_commit(
        &self,
        repo: &GitHubRepo,
        commit: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<PathBuf>>;

    /// Streams `url` to the file `dest`.
    fn stream(&self, url: &str, dest: &Path) -> impl Future<Output = Result<()>>;
}
