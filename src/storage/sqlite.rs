use anyhow::Result;
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};
use std::path::Path;

use super::traits::{RepositoryEntry, Storage, StorageRead, StorageWrite};

const DB_SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

fn map_repository_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RepositoryEntry> {
    Ok(RepositoryEntry {
        short_name: row.get(0)?,
        repository_url: row.get(1)?,
        filter: row.get(2)?,
    })
}

fn db_load_repository(
    conn: &Connection,
    short_name: &str,
) -> rusqlite::Result<Option<RepositoryEntry>> {
    conn.query_row(
        "SELECT short_name, github_url, filter FROM repositories WHERE short_name = ?1",
        params![short_name],
        map_repository_row,
    )
    .optional()
}

fn db_list_repositories(conn: &Connection) -> rusqlite::Result<Vec<RepositoryEntry>> {
    let mut stmt = conn
        .prepare("SELECT short_name, github_url, filter FROM repositories ORDER BY short_name")?;
    let mapped = stmt
        .query_map([], map_repository_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(mapped)
}

fn db_insert_repository(conn: &Connection, entry: &RepositoryEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO repositories (short_name, github_url, filter) VALUES (?1, ?2, ?3)",
        params![entry.short_name, entry.repository_url, entry.filter],
    )?;
    Ok(())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        if !Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.open()?;
        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        if version == 0 {
            log::info!(
                "SQLite schema migration: {} -> {}",
                version,
                DB_SCHEMA_VERSION
            );
            conn.execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS repositories (
                short_name TEXT PRIMARY KEY,
                github_url TEXT NOT NULL,
                filter TEXT NOT NULL
            );
            "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl StorageRead for SqliteStorage {
    fn load_repository(&self, short_name: &str) -> Result<Option<RepositoryEntry>> {
        let row = self.with_conn(|conn| db_load_repository(conn, short_name))?;
        Ok(row)
    }

    fn list_repositories(&self) -> Result<Vec<RepositoryEntry>> {
        let rows = self.with_conn(db_list_repositories)?;
        Ok(rows)
    }
}

impl StorageWrite for SqliteStorage {
    fn insert_repository(&self, entry: &RepositoryEntry) -> Result<()> {
        match self.with_conn(|conn| db_insert_repository(conn, entry)) {
            Ok(()) => Ok(()),
            Err(err) if is_constraint_violation(&err) => Err(anyhow::Error::new(err).context(
                format!("short name {:?} is already registered", entry.short_name),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

impl Storage for SqliteStorage {
    /// Never creates the database: a file removed at runtime fails the ping.
    fn ping(&self) -> Result<()> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
