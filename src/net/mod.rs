//! Network collaborators: redirect lookups and asset byte downloads.
//!
//! The conversion core only sees the `RedirectLookup` seam; the concrete
//! `HttpClient` lives here so tests can substitute a deterministic stub.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Errors from the network collaborators.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to construct the underlying HTTP client
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Request failed or answered with an error status
    #[error("request for {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Writing downloaded bytes to disk failed
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Follows a URL's redirect chain and reports where it ends up.
///
/// Share links are the only caller; a failed lookup is fatal for the owning
/// document's conversion, so implementations should not retry.
#[async_trait]
pub trait RedirectLookup: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<String, NetError>;
}

/// Thin wrapper around `reqwest::Client` with the configured user agent.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self, NetError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(NetError::Client)?;
        Ok(Self { client })
    }

    /// Download `url` and write the bytes to `dest`, creating parent
    /// directories as needed.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), NetError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| NetError::Request {
                url: url.to_string(),
                source,
            })?;

        let bytes = response.bytes().await.map_err(|source| NetError::Request {
            url: url.to_string(),
            source,
        })?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| NetError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| NetError::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        log::debug!("downloaded {} to {}", url, dest.display());
        Ok(())
    }
}

#[async_trait]
impl RedirectLookup for HttpClient {
    async fn resolve(&self, url: &str) -> Result<String, NetError> {
        // reqwest's default policy follows the chain; the response URL is the
        // final hop.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| NetError::Request {
                url: url.to_string(),
                source,
            })?;

        Ok(response.url().to_string())
    }
}
