use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, RwLock,
};

use anyhow::{anyhow, bail, Result};

use super::traits::{RepositoryEntry, Storage, StorageRead, StorageWrite};

/// In-process stand-in for the SQLite store.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<Vec<RepositoryEntry>>>,
    failing: Arc<AtomicBool>,
    pings: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn with_entry(self, entry: RepositoryEntry) -> Self {
        self.entries.write().unwrap().push(entry);
        self
    }

    /// Every subsequent call returns an error.
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("store unavailable"));
        }
        Ok(())
    }
}

impl StorageRead for MemoryStorage {
    fn load_repository(&self, short_name: &str) -> Result<Option<RepositoryEntry>> {
        self.check()?;
        let entries = self.entries.read().unwrap();
        Ok(entries.iter().find(|e| e.short_name == short_name).cloned())
    }

    fn list_repositories(&self) -> Result<Vec<RepositoryEntry>> {
        self.check()?;
        Ok(self.entries.read().unwrap().clone())
    }
}

impl StorageWrite for MemoryStorage {
    fn insert_repository(&self, entry: &RepositoryEntry) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut entries = self.entries.write().unwrap();
        if entries.iter().any(|e| e.short_name == entry.short_name) {
            bail!("short name {:?} is already registered", entry.short_name);
        }
        entries.push(entry.clone());
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn ping(&self) -> Result<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check()
    }
}
