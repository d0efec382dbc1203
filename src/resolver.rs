use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    release::{self, FetchError, ReleaseSource},
    storage::{
        traits::{StorageRead, StorageWrite},
        RepositoryEntry, Storage,
    },
};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid registration body: {0}")]
    BadRequest(#[source] serde_json::Error),
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("repository {0:?} not found")]
    NotFound(String),
    #[error("repository {0:?} has no releases")]
    NoVersions(String),
    #[error("no asset of {name:?} matches filter {filter:?}")]
    NoMatchingAsset { name: String, filter: String },
    #[error("store error: {0:#}")]
    Store(anyhow::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::NotFound(_)
                | ResolveError::NoVersions(_)
                | ResolveError::NoMatchingAsset { .. }
        )
    }
}

/// Body of a registration request. All three fields are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub short_name: String,
    pub github: String,
    pub filter: String,
}

impl From<RegisterRequest> for RepositoryEntry {
    fn from(req: RegisterRequest) -> Self {
        RepositoryEntry::new(req.short_name, req.github, req.filter)
    }
}

/// Per-request pipelines: registry lookup, feed fetch, asset match.
/// Holds no state between requests.
#[derive(Clone)]
pub struct Resolver {
    storage: Arc<dyn Storage + Send + Sync>,
    releases: Arc<dyn ReleaseSource>,
}

impl Resolver {
    pub fn new(storage: Arc<dyn Storage + Send + Sync>, releases: Arc<dyn ReleaseSource>) -> Self {
        Self { storage, releases }
    }

    /// Parses `body` and stores the entry. Nothing is written when the body
    /// is malformed.
    pub fn register(&self, body: &[u8]) -> Result<RepositoryEntry, RegisterError> {
        let request: RegisterRequest =
            serde_json::from_slice(body).map_err(RegisterError::BadRequest)?;
        let entry = RepositoryEntry::from(request);
        self.storage
            .insert_repository(&entry)
            .map_err(RegisterError::Store)?;
        Ok(entry)
    }

    pub fn lookup(&self, name: &str) -> Result<RepositoryEntry, ResolveError> {
        self.storage
            .load_repository(name)
            .map_err(ResolveError::Store)?
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }

    /// Tag of the first release the feed lists.
    pub async fn resolve_version(&self, name: &str) -> Result<String, ResolveError> {
        let entry = self.lookup(name)?;
        let releases = self.releases.fetch_releases(&entry.repository_url).await?;
        release::latest_release(&releases)
            .map(|r| r.tag_name.clone())
            .ok_or_else(|| ResolveError::NoVersions(name.to_string()))
    }

    /// Download URL of the first asset matching the entry's filter.
    pub async fn resolve_download(&self, name: &str) -> Result<String, ResolveError> {
        let entry = self.lookup(name)?;
        let releases = self.releases.fetch_releases(&entry.repository_url).await?;
        release::find_match(&releases, &entry.filter)
            .map(|asset| asset.browser_download_url.clone())
            .ok_or(ResolveError::NoMatchingAsset {
                name: entry.short_name,
                filter: entry.filter,
            })
    }

    pub fn list_all(&self) -> Result<Vec<RepositoryEntry>, ResolveError> {
        self.storage.list_repositories().map_err(ResolveError::Store)
    }
}
