#[cfg(test)]
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{RepositoryEntry, Storage};
