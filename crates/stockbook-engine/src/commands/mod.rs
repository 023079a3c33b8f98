//! # Engine Commands
//!
//! The operations a calling layer invokes, grouped by area:
//!
//! | Module        | Commands                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`stock`]     | `add_stock`, `remove_stock`, `edit_ledger_entry`, `delete_ledger_entry` |
//! | [`inventory`] | `check_availability`, `get_current_stock`, `get_stock_history` |
//! | [`sale`]      | `create_sale`, `get_sale`, `list_sales`                         |
//!
//! Mutating commands follow one shape:
//!
//! ```rust,ignore
//! let (mut tx, day, now) = self.begin_write().await?;   // clock read under the gate
//! let result = inner(&mut tx, ...).await;   // every read and write on tx
//! tx.finish(result).await                   // commit on Ok, rollback on Err
//! ```

pub mod inventory;
pub mod sale;
pub mod stock;

use serde::Serialize;
use stockbook_core::{CoreError, Item, ItemId, Store, StoreId};
use stockbook_db::{ItemRepository, MigrationStatus, StoreRepository, WriteTx};
use tracing::warn;

use crate::error::ApiResult;
use crate::Engine;

/// Finds a live store or fails with `StoreNotFound`.
async fn require_store(tx: &mut WriteTx, store_id: StoreId) -> ApiResult<Store> {
    StoreRepository::find_by_id(tx.conn(), store_id)
        .await?
        .ok_or_else(|| CoreError::StoreNotFound(store_id).into())
}

/// Finds a live item of `store_id` or fails with `ItemNotFound`.
async fn require_item(tx: &mut WriteTx, item_id: ItemId, store_id: StoreId) -> ApiResult<Item> {
    ItemRepository::find_by_id(tx.conn(), item_id)
        .await?
        .filter(|item| item.store_id == store_id)
        .ok_or_else(|| CoreError::ItemNotFound(item_id).into())
}

/// Result of [`Engine::health`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database_ok: bool,
    pub migrations: MigrationStatus,
}

impl Engine {
    /// Database reachability and migration state.
    pub async fn health(&self) -> ApiResult<HealthReport> {
        let database_ok = self.db.health_check().await;
        let migrations = self.db.migration_status().await?;
        if !migrations.is_current() {
            warn!(pending = ?migrations.pending, "Database schema is behind");
        }
        Ok(HealthReport {
            database_ok,
            migrations,
        })
    }
}
