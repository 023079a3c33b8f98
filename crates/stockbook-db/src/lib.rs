//! # stockbook-db: Database Layer for Stockbook
//!
//! SQLite storage for the stock ledger and sales, through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  stockbook-engine (add_stock, create_sale, ...)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ StoreRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ItemRepo      │    │ 001_initial  │  │   │
//! │  │   │ Write gate    │    │ LedgerRepo    │    │ _schema.sql  │  │   │
//! │  │   │ WriteTx       │    │ SaleRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, write gate and [`WriteTx`]
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Store, item, ledger and sale repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{Database, DbConfig, LedgerRepository};
//!
//! let db = Database::new(DbConfig::new("stockbook.db")).await?;
//!
//! let mut tx = db.begin_write().await?;
//! let entry = LedgerRepository::find_by_item_and_day(tx.conn(), item, store, day).await?;
//! // ...
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

mod codec;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, WriteTx};

// Repository re-exports for convenience
pub use repository::item::ItemRepository;
pub use repository::ledger::{LedgerRepository, StockLevel};
pub use repository::sale::{SaleFilter, SaleRepository};
pub use repository::store::StoreRepository;
