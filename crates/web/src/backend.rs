//! Search backends.
//!
//! The router talks to Elasticsearch through the [`SearchBackend`] trait so
//! handlers can be exercised against an in-memory implementation.

use std::time::Duration;

use marcus_core::settings::ElasticsearchSettings;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Errors from a search backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached or did not answer in time.
    #[error("search backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a non-success status.
    #[error("search backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered with something other than JSON.
    #[error("invalid response from search backend: {0}")]
    InvalidResponse(String),
}

/// Backend that executes `_search` requests.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run `body` against `indices` (all indices when empty) and return the
    /// raw JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable, rejects the request or
    /// answers with invalid JSON.
    async fn search(&self, indices: &[String], body: &Value) -> Result<Value, BackendError>;
}

/// Elasticsearch over HTTP.
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    base_url: Url,
    http_client: reqwest::Client,
}

impl ElasticsearchBackend {
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(settings: &ElasticsearchSettings) -> Result<Self, BackendError> {
        let base_url = Url::parse(&settings.url)
            .map_err(|e| BackendError::Unreachable(format!("invalid url '{}': {e}", settings.url)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Unreachable(format!(
                "url '{}' cannot be a base",
                settings.url
            )));
        }
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// `{base}/{indices}/_search`, with every index name percent-encoded as
    /// a single path segment.
    fn search_url(&self, indices: &[String]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                BackendError::Unreachable(format!("url '{}' cannot be a base", self.base_url))
            })?;
            segments.pop_if_empty();
            if !indices.is_empty() {
                segments.push(&indices.join(","));
            }
            segments.push("_search");
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn search(&self, indices: &[String], body: &Value) -> Result<Value, BackendError> {
        let url = self.search_url(indices)?;
        debug!(%url, "Forwarding search");

        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!(status = status.as_u16(), error = %e, "Failed to read backend error body");
                String::new()
            });
            warn!(status = status.as_u16(), "Search backend rejected request");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}
