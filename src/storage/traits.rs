/// A registered short name and the release feed it points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryEntry {
    pub short_name: String,
    pub repository_url: String,
    pub filter: String,
}

impl RepositoryEntry {
    pub fn new(
        short_name: impl Into<String>,
        repository_url: impl Into<String>,
        filter: impl Into<String>,
    ) -> Self {
        Self {
            short_name: short_name.into(),
            repository_url: repository_url.into(),
            filter: filter.into(),
        }
    }
}

pub trait StorageRead {
    fn load_repository(&self, short_name: &str) -> anyhow::Result<Option<RepositoryEntry>>;
    fn list_repositories(&self) -> anyhow::Result<Vec<RepositoryEntry>>;
}

pub trait StorageWrite {
    /// Fails if `entry.short_name` is already registered.
    fn insert_repository(&self, entry: &RepositoryEntry) -> anyhow::Result<()>;
}

pub trait Storage: StorageRead + StorageWrite {
    /// Round-trips to the store without touching any rows.
    fn ping(&self) -> anyhow::Result<()>;
}
