mod fetcher;
mod matcher;

pub use fetcher::{FetchError, HttpReleaseSource, ReleaseSource};
pub use matcher::{find_match, latest_release};

use serde::Deserialize;

/// One downloadable file attached to a release. Does not contain all fields
/// the feed may carry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

/// One entry of a release feed, in the shape GitHub's releases API serves.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}
