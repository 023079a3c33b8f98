//! Ledger steps shared by the stock and sale commands. Every function runs
//! inside the caller's write transaction.
//!
//! ```text
//!   resolve_daily_entry(item, day)
//!     │  live entry on `day`? ──yes──► return it
//!     │  no
//!     ▼
//!   nearest earlier live entry ──► open_entry(opening = its closing or 0)
//!     │
//!     ▼
//!   INSERT, return
//!
//!   save_and_cascade(entry)
//!     UPDATE entry (version-checked)
//!     carry = entry.closing, or if deleted the closing before it
//!     for each later live entry, ascending:
//!         opening = carry, closing = opening + added − removed, UPDATE
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use stockbook_core::ledger::{cascade, open_entry};
use stockbook_core::{ItemId, LedgerEntry, Quantity, StoreId};
use stockbook_db::{DbResult, LedgerRepository, WriteTx};
use tracing::debug;

use crate::error::ApiResult;

/// Returns the live entry for `day`, creating it from the carried-forward
/// balance if the item has none yet.
pub(crate) async fn resolve_daily_entry(
    tx: &mut WriteTx,
    item_id: ItemId,
    store_id: StoreId,
    day: NaiveDate,
    now: DateTime<Utc>,
) -> DbResult<LedgerEntry> {
    if let Some(entry) = LedgerRepository::find_by_item_and_day(tx.conn(), item_id, store_id, day).await? {
        return Ok(entry);
    }

    let prior = LedgerRepository::find_latest_before(tx.conn(), item_id, store_id, day).await?;
    let entry = open_entry(item_id, store_id, day, prior.as_ref(), now);
    LedgerRepository::insert(tx.conn(), &entry).await?;

    debug!(item_id = %item_id, %day, opening = %entry.opening_stock, "Opened ledger entry");
    Ok(entry)
}

/// Persists `entry` and re-derives every later live entry of its item.
///
/// Returns the stored entry. Fails with `InsufficientStock` if a later day
/// would close below zero; the caller's transaction must then roll back.
pub(crate) async fn save_and_cascade(
    tx: &mut WriteTx,
    entry: &LedgerEntry,
    now: DateTime<Utc>,
) -> ApiResult<LedgerEntry> {
    let saved = LedgerRepository::update(tx.conn(), entry, now).await?;

    let carry = if saved.is_deleted {
        LedgerRepository::find_latest_before(tx.conn(), saved.item_id, saved.store_id, saved.day)
            .await?
            .map(|prior| prior.closing_stock)
            .unwrap_or_else(Quantity::zero)
    } else {
        saved.closing_stock
    };

    let later = LedgerRepository::find_all_after(tx.conn(), saved.item_id, saved.store_id, saved.day).await?;
    if later.is_empty() {
        return Ok(saved);
    }

    let corrected = cascade(carry, &later)?;
    for next in &corrected {
        LedgerRepository::update(tx.conn(), next, now).await?;
    }

    debug!(
        item_id = %saved.item_id,
        from_day = %saved.day,
        entries = corrected.len(),
        "Cascaded ledger balances"
    );
    Ok(saved)
}
