//! # Database Migrations
//!
//! The schema lives in `migrations/sqlite/` at the workspace root and is
//! compiled into the binary with `sqlx::migrate!`.
//!
//! ```text
//!   Database::new ──► run_migrations ──► _sqlx_migrations
//!                                             │
//!   Engine::health ◄── migration_status ◄─────┘
//!                      (embedded vs applied versions)
//! ```
//!
//! Never edit a shipped migration. Add `NNN_description.sql` with the next
//! number instead; a changed file fails its checksum on the next start.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Which embedded migrations a database has applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
    /// Highest successfully applied version, if any.
    pub latest_applied: Option<i64>,
    /// Embedded versions not yet applied, ascending.
    pub pending: Vec<i64>,
}

impl MigrationStatus {
    /// True when every embedded migration has been applied.
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Applies pending migrations. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(embedded = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Compares the embedded migrations with `_sqlx_migrations`.
///
/// A database that was never migrated has no bookkeeping table; it reports
/// every migration as pending rather than failing.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: Vec<i64> =
        match sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1 ORDER BY version")
            .fetch_all(pool)
            .await
        {
            Ok(versions) => versions,
            Err(sqlx::Error::Database(e)) if e.message().contains("no such table") => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read migration table");
                return Err(e.into());
            }
        };

    let pending = MIGRATOR
        .iter()
        .map(|m| m.version)
        .filter(|version| !applied.contains(version))
        .collect();

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: applied.len(),
        latest_applied: applied.last().copied(),
        pending,
    })
}
