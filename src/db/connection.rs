//! Database connection management
//!
//! A small r2d2 pool over the SQLite file that holds the ingredient catalog
//! and the nutrient standards. The server mostly reads; writes happen during
//! imports and go through [`Database::transaction`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OpenFlags, Transaction};
use thiserror::Error;

/// Readers rarely overlap; a handful of connections is plenty
const POOL_SIZE: u32 = 4;

/// How long a reader waits on an import holding the write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Duplicate ingredient id: {0}")]
    DuplicateIngredient(i64),
}

pub type DbResult<T> = Result<T, DbError>;

pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Shared handle to the catalog database
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Open (or create) the database file
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
            .with_init(|conn| {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA cache_size = -16000;",
                )
            });

        Self::from_manager(manager, POOL_SIZE)
    }

    /// Single shared in-memory connection (tests)
    #[cfg(test)]
    pub fn in_memory() -> DbResult<Self> {
        Self::from_manager(SqliteConnectionManager::memory(), 1)
    }

    fn from_manager(manager: SqliteConnectionManager, size: u32) -> DbResult<Self> {
        let pool = Pool::builder().max_size(size).build(manager)?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn get_conn(&self) -> DbResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// Run `f` with a pooled connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Run `f` inside a transaction. Commits when `f` succeeds; on error
    /// the transaction is dropped and everything `f` wrote is rolled back.
    pub fn transaction<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_table(db: &Database) {
        db.with_conn(|conn| {
            conn.execute_batch("CREATE TABLE foods (id INTEGER PRIMARY KEY)")?;
            Ok(())
        })
        .unwrap();
    }

    fn count(db: &Database) -> i64 {
        db.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?))
            .unwrap()
    }

    #[test]
    fn test_transaction_commits_on_success() {
        let db = Database::in_memory().unwrap();
        with_table(&db);

        let written = db
            .transaction(|tx| Ok(tx.execute("INSERT INTO foods (id) VALUES (1), (2)", [])?))
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(count(&db), 2);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::in_memory().unwrap();
        with_table(&db);

        let result: DbResult<()> = db.transaction(|tx| {
            tx.execute("INSERT INTO foods (id) VALUES (1)", [])?;
            Err(DbError::DuplicateIngredient(1))
        });
        assert!(matches!(result, Err(DbError::DuplicateIngredient(1))));
        assert_eq!(count(&db), 0);
    }

    #[test]
    fn test_file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("nutrigap.db")).unwrap();
        let mode: String = db
            .with_conn(|conn| Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(mode, "wal");
    }
}
