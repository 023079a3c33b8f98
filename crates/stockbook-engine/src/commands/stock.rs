//! # Stock Commands
//!
//! Manual stock movements and corrections to the daily ledger.
//!
//! ## Edit / Delete Cascade
//! ```text
//!   day:      1      4      9      12
//!   before:  100 ─► 130 ─► 110 ─► 150      (closing balances)
//!
//!   edit day 4: added 30 → 10
//!   after:   100 ─► 110 ─►  90 ─► 130      days 9 and 12 re-derived
//!
//!   delete day 4 instead:
//!   after:   100 ─╳─────►  80 ─► 120      day 9 opens from day 1
//! ```
//!
//! A correction that would take any later day below zero is rejected with
//! `InsufficientStock` and nothing is written.

use chrono::{DateTime, NaiveDate, Utc};
use stockbook_core::ledger::{apply_add, apply_remove, edit_movements};
use stockbook_core::{CoreError, ItemId, LedgerEntry, LedgerEntryId, Quantity, StoreId};
use stockbook_db::{LedgerRepository, WriteTx};
use tracing::{debug, info};

use super::{require_item, require_store};
use crate::error::ApiResult;
use crate::ledger::{resolve_daily_entry, save_and_cascade};
use crate::Engine;

#[derive(Debug, Clone, Copy)]
enum Movement {
    Add(Quantity),
    Remove(Quantity),
}

impl Engine {
    /// Records incoming stock on today's entry.
    pub async fn add_stock(&self, item_id: ItemId, store_id: StoreId, amount: Quantity) -> ApiResult<LedgerEntry> {
        debug!(item_id = %item_id, store_id = %store_id, %amount, "add_stock command");

        let entry = self
            .move_stock(item_id, store_id, Movement::Add(amount))
            .await
            .inspect_err(|e| e.log("add_stock"))?;

        info!(item_id = %item_id, day = %entry.day, %amount, closing = %entry.closing_stock, "Stock added");
        Ok(entry)
    }

    /// Records outgoing stock (waste, transfer, correction) on today's entry.
    ///
    /// Fails with `InsufficientStock` if today's closing balance is short.
    pub async fn remove_stock(
        &self,
        item_id: ItemId,
        store_id: StoreId,
        amount: Quantity,
    ) -> ApiResult<LedgerEntry> {
        debug!(item_id = %item_id, store_id = %store_id, %amount, "remove_stock command");

        let entry = self
            .move_stock(item_id, store_id, Movement::Remove(amount))
            .await
            .inspect_err(|e| e.log("remove_stock"))?;

        info!(item_id = %item_id, day = %entry.day, %amount, closing = %entry.closing_stock, "Stock removed");
        Ok(entry)
    }

    /// Replaces the movements of a (possibly historical) entry and re-derives
    /// every later day. `None` keeps the current value.
    pub async fn edit_ledger_entry(
        &self,
        entry_id: LedgerEntryId,
        new_added: Option<Quantity>,
        new_removed: Option<Quantity>,
    ) -> ApiResult<LedgerEntry> {
        debug!(entry_id = %entry_id, ?new_added, ?new_removed, "edit_ledger_entry command");

        let (mut tx, _, now) = self.begin_write().await.inspect_err(|e| e.log("edit_ledger_entry"))?;
        let result = edit_entry(&mut tx, entry_id, new_added, new_removed, now).await;
        let entry = tx.finish(result).await.inspect_err(|e| e.log("edit_ledger_entry"))?;

        info!(entry_id = %entry_id, day = %entry.day, closing = %entry.closing_stock, "Ledger entry edited");
        Ok(entry)
    }

    /// Soft-deletes an entry and re-derives every later day from the
    /// closing balance before it.
    pub async fn delete_ledger_entry(&self, entry_id: LedgerEntryId) -> ApiResult<()> {
        debug!(entry_id = %entry_id, "delete_ledger_entry command");

        let (mut tx, _, now) = self.begin_write().await.inspect_err(|e| e.log("delete_ledger_entry"))?;
        let result = delete_entry(&mut tx, entry_id, now).await;
        let entry = tx.finish(result).await.inspect_err(|e| e.log("delete_ledger_entry"))?;

        info!(entry_id = %entry_id, day = %entry.day, "Ledger entry deleted");
        Ok(())
    }

    async fn move_stock(&self, item_id: ItemId, store_id: StoreId, movement: Movement) -> ApiResult<LedgerEntry> {
        let (mut tx, day, now) = self.begin_write().await?;
        let result = apply_movement(&mut tx, item_id, store_id, day, now, movement).await;
        tx.finish(result).await
    }
}

async fn apply_movement(
    tx: &mut WriteTx,
    item_id: ItemId,
    store_id: StoreId,
    day: NaiveDate,
    now: DateTime<Utc>,
    movement: Movement,
) -> ApiResult<LedgerEntry> {
    require_store(tx, store_id).await?;
    require_item(tx, item_id, store_id).await?;

    let entry = resolve_daily_entry(tx, item_id, store_id, day, now).await?;
    let moved = match movement {
        Movement::Add(amount) => apply_add(&entry, amount)?,
        Movement::Remove(amount) => apply_remove(&entry, amount)?,
    };
    save_and_cascade(tx, &moved, now).await
}

async fn find_entry(tx: &mut WriteTx, entry_id: LedgerEntryId) -> ApiResult<LedgerEntry> {
    LedgerRepository::find_by_id(tx.conn(), entry_id)
        .await?
        .ok_or_else(|| CoreError::LedgerEntryNotFound(entry_id).into())
}

async fn edit_entry(
    tx: &mut WriteTx,
    entry_id: LedgerEntryId,
    new_added: Option<Quantity>,
    new_removed: Option<Quantity>,
    now: DateTime<Utc>,
) -> ApiResult<LedgerEntry> {
    let entry = find_entry(tx, entry_id).await?;
    let edited = edit_movements(&entry, new_added, new_removed)?;
    save_and_cascade(tx, &edited, now).await
}

async fn delete_entry(tx: &mut WriteTx, entry_id: LedgerEntryId, now: DateTime<Utc>) -> ApiResult<LedgerEntry> {
    let entry = find_entry(tx, entry_id).await?;
    let deleted = LedgerEntry {
        is_deleted: true,
        ..entry
    };
    save_and_cascade(tx, &deleted, now).await
}
