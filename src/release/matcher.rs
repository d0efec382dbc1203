use super::{Asset, Release};

/// First release in feed order. The feed's own ordering decides what
/// "latest" means; no version sort is applied.
pub fn latest_release(releases: &[Release]) -> Option<&Release> {
    releases.first()
}

/// First asset, walking releases then assets in feed order, whose name
/// contains `filter`. Case-sensitive plain substring match; an empty filter
/// matches the first asset seen.
pub fn find_match<'a>(releases: &'a [Release], filter: &str) -> Option<&'a Asset> {
    releases
        .iter()
        .flat_map(|release| release.assets.iter())
        .find(|asset| asset.name.contains(filter))
}
