//! GitHub gist endpoints
//!
//! The network boundary of the pipeline: one unauthenticated listing call
//! per run, one raw-content call per retained file. Both sit behind the
//! `GistFetcher` trait so the rest of the crate never touches HTTP
//! directly.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;

/// GitHub rejects requests that carry no User-Agent, so a fixed,
/// non-default identification is always sent. Taken from KDE System
/// Settings' Konqueror.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux; English) KHTML/5.62.0 (like Gecko) Konqueror/5 KIO/5.62";

/// Retrieval of gist listings and raw file content
#[async_trait]
pub trait GistFetcher: Send + Sync {
    /// Fetch the gist listing for `username` and return the raw response
    /// body. A transport error or non-success status is an error; the
    /// caller decides how to degrade.
    async fn list_gists(&self, username: &str) -> Result<String>;

    /// Fetch raw file content from `url`. Any failure yields an empty
    /// buffer rather than an error; callers treat empty content as
    /// unknown/failed and still persist the placeholder.
    async fn fetch_raw(&self, url: &str) -> Vec<u8>;
}

/// reqwest-backed `GistFetcher` against the live API
pub struct HttpGistClient {
    http: reqwest::Client,
    api_base: String,
}

impl HttpGistClient {
    /// Create a client from the network section of the configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.network.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base: config.network.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GistFetcher for HttpGistClient {
    async fn list_gists(&self, username: &str) -> Result<String> {
        let url = format!("{}/users/{}/gists", self.api_base, username);
        debug!("Requesting gist listing: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Gist listing request to {} returned {}", url, status);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read listing body from {}", url))
    }

    async fn fetch_raw(&self, url: &str) -> Vec<u8> {
        if url.is_empty() {
            warn!("File has no content URL, treating content as unknown");
            return Vec::new();
        }

        debug!("Fetching raw content: {}", url);

        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    warn!("Failed to read content body from {}: {}", url, e);
                    Vec::new()
                }
            },
            Ok(response) => {
                warn!("Content request to {} returned {}", url, response.status());
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to fetch content from {}: {}", url, e);
                Vec::new()
            }
        }
    }
}
