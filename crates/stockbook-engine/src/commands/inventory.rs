//! # Inventory Commands
//!
//! Read-only views over the ledger. None of these write: an item with no
//! entry today reports the balance carried from its latest earlier entry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use stockbook_core::{CoreError, ItemId, LedgerEntry, PricingMode, Quantity, StoreId};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::Engine;

/// Result of [`Engine::check_availability`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub item_id: ItemId,
    pub is_available: bool,
    pub available_quantity: Quantity,
    pub pricing_mode: PricingMode,
}

/// One row of [`Engine::get_current_stock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStockItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub pricing_mode: PricingMode,
    pub current_stock: Quantity,
    /// Business day of the entry `current_stock` comes from.
    pub last_day: Option<NaiveDate>,
    /// When that entry was last written. A cascade from an older edit
    /// moves this without changing `last_day`.
    pub last_update: Option<DateTime<Utc>>,
}

/// One item's slice of [`StockHistory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemHistory {
    pub item_id: ItemId,
    /// Ascending by day.
    pub entries: Vec<LedgerEntry>,
    pub total_added: Quantity,
    pub total_removed: Quantity,
    /// Opening balance of the first entry in range.
    pub opening_stock: Quantity,
    /// Closing balance of the last entry in range.
    pub closing_stock: Quantity,
}

/// Result of [`Engine::get_stock_history`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHistory {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub items: Vec<ItemHistory>,
}

impl ItemHistory {
    /// Summarises one item's entries. `entries` must be non-empty and
    /// ascending.
    fn summarise(entries: Vec<LedgerEntry>) -> Option<Self> {
        let first = entries.first()?;
        let last = entries.last()?;
        Some(ItemHistory {
            item_id: first.item_id,
            opening_stock: first.opening_stock,
            closing_stock: last.closing_stock,
            total_added: entries.iter().fold(Quantity::zero(), |sum, e| sum + e.added_stock),
            total_removed: entries.iter().fold(Quantity::zero(), |sum, e| sum + e.removed_stock),
            entries,
        })
    }
}

/// Splits entries ordered by item then day into per-item histories.
fn group_by_item(entries: Vec<LedgerEntry>) -> Vec<ItemHistory> {
    let mut groups: Vec<Vec<LedgerEntry>> = Vec::new();
    for entry in entries {
        match groups.last_mut() {
            Some(group) if group[0].item_id == entry.item_id => group.push(entry),
            _ => groups.push(vec![entry]),
        }
    }
    groups.into_iter().filter_map(ItemHistory::summarise).collect()
}

impl Engine {
    /// Whether an item has stock right now, and how much.
    pub async fn check_availability(&self, item_id: ItemId, store_id: StoreId) -> ApiResult<Availability> {
        debug!(item_id = %item_id, store_id = %store_id, "check_availability command");

        let item = self
            .db
            .items()
            .get_by_id(item_id)
            .await?
            .filter(|item| item.store_id == store_id)
            .ok_or(CoreError::ItemNotFound(item_id))?;

        let available = self
            .db
            .ledger()
            .latest_on_or_before(item_id, store_id, self.today())
            .await?
            .map(|entry| entry.closing_stock)
            .unwrap_or_else(Quantity::zero);

        Ok(Availability {
            item_id,
            is_available: available.is_positive(),
            available_quantity: available,
            pricing_mode: item.pricing_mode(),
        })
    }

    /// Current stock of every live item in a store, by name.
    pub async fn get_current_stock(&self, store_id: StoreId) -> ApiResult<Vec<CurrentStockItem>> {
        debug!(store_id = %store_id, "get_current_stock command");

        self.db
            .stores()
            .get_by_id(store_id)
            .await?
            .ok_or(CoreError::StoreNotFound(store_id))?;

        let levels = self.db.ledger().current_stock(store_id).await?;
        Ok(levels
            .into_iter()
            .map(|level| CurrentStockItem {
                item_id: level.item_id,
                item_name: level.item_name,
                pricing_mode: level.pricing_mode,
                current_stock: level.current_stock,
                last_day: level.last_day,
                last_update: level.last_update,
            })
            .collect())
    }

    /// Live ledger entries between `from` and `to` inclusive, grouped per
    /// item with movement totals.
    pub async fn get_stock_history(
        &self,
        store_id: StoreId,
        item_id: Option<ItemId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<StockHistory> {
        debug!(store_id = %store_id, ?item_id, %from, %to, "get_stock_history command");

        if from > to {
            return Err(ApiError::invalid_input(format!(
                "history range starts after it ends: {} > {}",
                from, to
            )));
        }

        let entries = self.db.ledger().history(store_id, item_id, from, to).await?;
        Ok(StockHistory {
            from,
            to,
            items: group_by_item(entries),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stockbook_core::ledger::{apply_add, apply_remove, open_entry};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn test_group_by_item_totals() {
        let a = ItemId::new();
        let b = ItemId::new();
        let store = StoreId::new();
        let now = Utc::now();

        let a1 = apply_add(&open_entry(a, store, day(1), None, now), Quantity::new(dec!(100))).unwrap();
        let a2 = apply_remove(&open_entry(a, store, day(2), Some(&a1), now), Quantity::new(dec!(30))).unwrap();
        let b1 = apply_add(&open_entry(b, store, day(1), None, now), Quantity::new(dec!(5))).unwrap();

        let items = group_by_item(vec![a1, a2, b1]);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].item_id, a);
        assert_eq!(items[0].entries.len(), 2);
        assert_eq!(items[0].opening_stock, Quantity::zero());
        assert_eq!(items[0].closing_stock, Quantity::new(dec!(70)));
        assert_eq!(items[0].total_added, Quantity::new(dec!(100)));
        assert_eq!(items[0].total_removed, Quantity::new(dec!(30)));

        assert_eq!(items[1].item_id, b);
        assert_eq!(items[1].closing_stock, Quantity::new(dec!(5)));
    }

    #[test]
    fn test_group_by_item_empty() {
        assert!(group_by_item(Vec::new()).is_empty());
    }
}
