use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;

use super::Release;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("release feed {url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("release feed {url} is not a release list: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where release lists come from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Releases in the order the feed lists them. Only the first page the
    /// URL serves is read.
    async fn fetch_releases(&self, url: &str) -> Result<Vec<Release>, FetchError>;
}

/// Fetches release feeds over HTTP(S). One GET per call, no retries.
#[derive(Clone)]
pub struct HttpReleaseSource {
    client: Client,
}

impl HttpReleaseSource {
    /// `timeout` of `None` leaves the transport defaults in place.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    async fn fetch_releases(&self, url: &str) -> Result<Vec<Release>, FetchError> {
        log::debug!("fetching releases from {}", url);
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
