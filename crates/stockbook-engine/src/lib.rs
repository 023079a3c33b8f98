//! # stockbook-engine: Stock Ledger and Sale Settlement
//!
//! The operations exposed to a calling layer. Everything here is a thin
//! orchestration of `stockbook-core` math over `stockbook-db` storage.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Stockbook Engine                               │
//! │                                                                         │
//! │  Caller                                                                │
//! │    │  engine.create_sale(request).await                               │
//! │    ▼                                                                    │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  commands::{stock, inventory, sale}                             │   │
//! │  │    validate ─► begin_write ─► resolve / price / mutate ─►      │   │
//! │  │    cascade ─► invoice ─► commit  (rollback on any Err)          │   │
//! │  └──────────────────────────────┬──────────────────────────────────┘   │
//! │                                 │                                       │
//! │         ┌───────────────────────┼───────────────────────┐              │
//! │         ▼                       ▼                       ▼              │
//! │  ┌──────────────┐      ┌────────────────┐      ┌──────────────┐       │
//! │  │ Clock        │      │ stockbook-core │      │ stockbook-db │       │
//! │  │ (today)      │      │ (pure math)    │      │ (SQLite)     │       │
//! │  └──────────────┘      └────────────────┘      └──────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! stockbook_engine::init_tracing();
//!
//! let config = EngineConfig::load(None)?;
//! let engine = Engine::open(&config).await?;
//!
//! engine.add_stock(item_id, store_id, dec!(2000)).await?;
//! let sale = engine.create_sale(request).await?;
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;
use stockbook_core::clock::business_day;
use stockbook_core::{Clock, SystemClock};
use stockbook_db::{Database, DbError, WriteTx};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod config;
pub mod error;
mod ledger;

// =============================================================================
// Re-exports
// =============================================================================

pub use commands::inventory::{Availability, CurrentStockItem, ItemHistory, StockHistory};
pub use commands::sale::{CreateSaleRequest, SaleQuery};
pub use commands::HealthReport;
pub use config::{ConfigError, EngineConfig};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Failures while bringing the engine up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),
}

// =============================================================================
// Engine
// =============================================================================

/// Handle to every engine operation.
///
/// Cheap to clone; clones share the database pool, its write gate and the
/// clock.
#[derive(Clone)]
pub struct Engine {
    db: Database,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("db", &self.db)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Wraps an open database.
    ///
    /// `offset` fixes the business day: ledger entries and invoice numbers
    /// belong to the local date at that offset.
    pub fn new(db: Database, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Engine { db, clock, offset }
    }

    /// Opens the configured database (running migrations) on the system clock.
    pub async fn open(config: &EngineConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let offset = config.business.utc_offset()?;
        let db = Database::new(config.db_config()).await?;

        info!(
            path = %config.database.path.display(),
            utc_offset_minutes = config.business.utc_offset_minutes,
            "Engine ready"
        );
        Ok(Engine::new(db, Arc::new(SystemClock), offset))
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Today's business day.
    pub fn today(&self) -> NaiveDate {
        business_day(self.clock.now(), self.offset)
    }

    /// Opens a write transaction, then reads the clock once.
    ///
    /// The clock is read with the gate held, so a command that queued
    /// across midnight books onto the new day.
    async fn begin_write(&self) -> ApiResult<(WriteTx, NaiveDate, DateTime<Utc>)> {
        let tx = self.db.begin_write().await?;
        let now = self.clock.now();
        Ok((tx, business_day(now, self.offset), now))
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockbook_db=trace` - Show trace for the database crate only
/// - Default: `info,stockbook=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockbook=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
