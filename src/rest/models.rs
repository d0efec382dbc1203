use serde::{Deserialize, Serialize};

use crate::storage::RepositoryEntry;

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryResponse {
    pub short_name: String,
    #[serde(rename = "githubURL")]
    pub github_url: String,
    pub filter: String,
}

impl From<RepositoryEntry> for RepositoryResponse {
    fn from(entry: RepositoryEntry) -> Self {
        Self {
            short_name: entry.short_name,
            github_url: entry.repository_url,
            filter: entry.filter,
        }
    }
}
