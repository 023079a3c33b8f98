//! # Database Pool Management
//!
//! Connection pool creation, configuration and the write gate.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  DbConfig::new(path) ──► Database::new(config).await                   │
//! │                                   │                                     │
//! │         ┌─────────────────────────┴──────────────────────┐              │
//! │         ▼                                                ▼              │
//! │  ┌──────────────────────────────┐        ┌──────────────────────────┐  │
//! │  │ Readers                      │        │ Writers                  │  │
//! │  │ db.ledger().history(..)      │        │ db.begin_write().await   │  │
//! │  │ db.sales().get(..)           │        │   │                      │  │
//! │  │ any pooled connection,       │        │   ├─ wait for write gate │  │
//! │  │ WAL snapshot, never blocked  │        │   ├─ BEGIN               │  │
//! │  └──────────────────────────────┘        │   ├─ reads + writes      │  │
//! │                                          │   └─ COMMIT / ROLLBACK   │  │
//! │                                          └──────────────────────────┘  │
//! │                                                                         │
//! │  One writer at a time: ledger read-modify-write, cascade walks and     │
//! │  invoice allocation can never interleave.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for file databases:
//! - Readers don't block writers
//! - Writers don't block readers
//! - A reader sees either all of a committed sale or none of it

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::item::ItemRepository;
use crate::repository::ledger::LedgerRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::store::StoreRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/stockbook.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a pooled connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// How long SQLite itself waits on a locked database file.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Single Connection
    /// Every SQLite in-memory connection is its own database, so the pool
    /// holds exactly one connection and never recycles it. While a write
    /// transaction is open, pool readers wait for it to finish.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// True for a `:memory:` database.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access and write transactions.
///
/// Cheap to clone: clones share the pool and the write gate.
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Admits one write transaction at a time.
    write_gate: Arc<Mutex<()>>,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads (file databases)
    ///    - NORMAL synchronous
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_in_memory() {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            write_gate: Arc::new(Mutex::new(())),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Embedded versus applied migrations.
    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// Reads only. Writes go through [`Database::begin_write`].
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a write transaction.
    ///
    /// Waits for the write gate first, then issues `BEGIN`. Every query of
    /// the operation must run on [`WriteTx::conn`]; the transaction is rolled
    /// back unless [`WriteTx::commit`] is reached.
    pub async fn begin_write(&self) -> DbResult<WriteTx> {
        let guard = self.write_gate.clone().lock_owned().await;
        let tx = self.pool.begin().await?;
        debug!("Write transaction started");
        Ok(WriteTx { tx, _guard: guard })
    }

    /// Returns the item repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.pool.clone())
    }

    /// Returns the store repository.
    pub fn stores(&self) -> StoreRepository {
        StoreRepository::new(self.pool.clone())
    }

    /// Returns the ledger repository.
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Write Transaction
// =============================================================================

/// An open write transaction holding the write gate.
///
/// Field order matters: the transaction is dropped (rolled back) before the
/// gate is released.
pub struct WriteTx {
    tx: Transaction<'static, Sqlite>,
    _guard: OwnedMutexGuard<()>,
}

impl WriteTx {
    /// The connection every statement of this transaction must use.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commits and releases the gate.
    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Write transaction committed");
        Ok(())
    }

    /// Rolls back and releases the gate.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!("Write transaction rolled back");
        Ok(())
    }

    /// Commits on `Ok`, rolls back on `Err`, and hands the result back.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let mut tx = db.begin_write().await?;
    /// let result = do_work(&mut tx).await;
    /// tx.finish(result).await
    /// ```
    pub async fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let status = db.migration_status().await.unwrap();
        assert!(status.is_current());
        assert_eq!(status.embedded, status.applied);
        assert_eq!(status.latest_applied, Some(1));
    }

    #[tokio::test]
    async fn test_unmigrated_database_reports_pending() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false)).await.unwrap();

        let status = db.migration_status().await.unwrap();
        assert_eq!(status.applied, 0);
        assert_eq!(status.pending, vec![1]);
        assert!(!status.is_current());
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockbook.db");

        let db = Database::new(DbConfig::new(path.clone())).await.unwrap();
        let mut tx = db.begin_write().await.unwrap();
        sqlx::query("INSERT INTO invoice_counters (day, last_seq) VALUES ('2026-01-01', 3)")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(path.clone())).await.unwrap();
        assert!(reopened.migration_status().await.unwrap().is_current());
        let seq: i64 = sqlx::query_scalar("SELECT last_seq FROM invoice_counters")
            .fetch_one(reopened.pool())
            .await
            .unwrap();
        assert_eq!(seq, 3);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.begin_write().await.unwrap();
        sqlx::query("INSERT INTO invoice_counters (day, last_seq) VALUES ('2026-01-01', 7)")
            .execute(tx.conn())
            .await
            .unwrap();
        let result: Result<(), DbError> = Err(DbError::Internal("boom".into()));
        assert!(tx.finish(result).await.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_counters")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_commit_keeps_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.begin_write().await.unwrap();
        sqlx::query("INSERT INTO invoice_counters (day, last_seq) VALUES ('2026-01-01', 7)")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.finish(Ok::<_, DbError>(())).await.unwrap();

        let seq: i64 = sqlx::query_scalar("SELECT last_seq FROM invoice_counters")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(seq, 7);
    }
}
