//! Streaming HTTP downloads.

use anyhow::Result;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::DepwrightError;

/// Media type requested from the GitHub REST API.
pub const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// HTTP client that streams response bodies to disk.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    user_agent: String,
    token: Option<String>,
    show_progress: bool,
}

fn network_error(url: &str, reason: impl std::fmt::Display) -> DepwrightError {
    DepwrightError::NetworkError {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

impl HttpClient {
    /// Creates a client. The token is only sent on requests marked as authorized.
    pub fn new(user_agent: impl Into<String>, token: Option<String>, show_progress: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| network_error("<client>", e))?;
        Ok(Self {
            client,
            user_agent: user_agent.into(),
            token,
            show_progress,
        })
    }

    fn headers(&self, accept: Option<&str>, authorized: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        if let Some(accept) = accept.and_then(|accept| HeaderValue::from_str(accept).ok()) {
            headers.insert(ACCEPT, accept);
        }
        if authorized
            && let Some(token) = &self.token
            && let Ok(value) = HeaderValue::from_str(&format!("token {token}"))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn get(&self, url: &str, accept: Option<&str>, authorized: bool) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .headers(self.headers(accept, authorized))
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        if !response.status().is_success() {
            return Err(DepwrightError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(response)
    }

    /// Fetches and decodes a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, authorized: bool) -> Result<T> {
        let response = self.get(url, Some(GITHUB_JSON), authorized).await?;
        let value = response.json::<T>().await.map_err(|e| network_error(url, e))?;
        Ok(value)
    }

    /// Streams `url` into the file `dest` chunk by chunk.
    ///
    /// Returns the number of bytes written.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        accept: Option<&str>,
        authorized: bool,
    ) -> Result<u64> {
        info!("Downloading {}", url);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DepwrightError::filesystem("create directory", parent, e))?;
        }

        let response = self.get(url, accept, authorized).await?;
        let progress = self.progress_bar(response.content_length(), dest);

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| DepwrightError::filesystem("create file", dest, e))?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| network_error(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DepwrightError::filesystem("write", dest, e))?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }

        file.flush().await.map_err(|e| DepwrightError::filesystem("write", dest, e))?;
        progress.finish_and_clear();

        debug!("Downloaded {} bytes to {}", downloaded, dest.display());
        Ok(downloaded)
    }

    fn progress_bar(&self, length: Option<u64>, dest: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let name = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match length {
            Some(length) => {
                let bar = ProgressBar::new(length);
                if let Ok(style) = ProgressStyle::with_template(
                    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                ) {
                    bar.set_style(style.progress_chars("=>-"));
                }
                bar.set_message(name);
                bar
            }
            None => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_message(name);
                spinner
            }
        }
    }
}
