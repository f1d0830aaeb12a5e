pub mod error;
pub mod migrations;
pub mod models;
pub mod pagination;
pub mod queries;

pub use error::RepoError;
pub use pagination::Pagination;

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, NaiveDateTime, Timelike, Utc};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Owner of the SQLite connection. Construct once, share behind an `Arc`,
/// and call [`Database::close`] on shutdown.
pub struct Database {
    conn: Mutex<Connection>,
    /// Zone used for every timestamp the repository writes.
    timezone: FixedOffset,
}

impl Database {
    pub fn open(path: &Path, timezone: FixedOffset) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::bootstrap(conn, timezone)?;

        info!("Database opened at {} (timezone {})", path.display(), timezone);
        Ok(db)
    }

    pub fn open_in_memory(timezone: FixedOffset) -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory()?, timezone)
    }

    fn bootstrap(conn: Connection, timezone: FixedOffset) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            timezone,
        })
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        conn.close().map_err(|(_, e)| e)?;

        info!("Database closed");
        Ok(())
    }

    /// Wall-clock time in the configured zone, truncated to whole seconds.
    pub fn now(&self) -> NaiveDateTime {
        let now = Utc::now().with_timezone(&self.timezone).naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, RepoError>
    where
        F: FnOnce(&mut Connection) -> Result<T, RepoError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepoError::Lock(e.to_string()))?;
        f(&mut conn)
    }

    /// Run `f` inside its own transaction, committed when `f` succeeds.
    /// An error drops the transaction, which rolls it back.
    pub fn in_transaction<F, T>(&self, f: F) -> Result<T, RepoError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, RepoError>,
    {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }
}
