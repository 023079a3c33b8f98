//! # Ledger Math
//!
//! Pure functions over [`LedgerEntry`] snapshots. Nothing here reads or
//! writes storage: callers load entries, run these functions, then persist
//! the returned values.
//!
//! ## The Running Balance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item: Almonds            (no entry on the 2nd: gaps are fine)         │
//! │                                                                         │
//! │    day 1               day 3               day 4                        │
//! │    open      0    ┌──► open   1500    ┌──► open   1300                  │
//! │    add    2000    │    add       0    │    add     200                  │
//! │    rem     500    │    rem     200    │    rem       0                  │
//! │    close  1500 ───┘    close  1300 ───┘    close  1500                  │
//! │                                                                         │
//! │  closing  = opening + added − removed               (every entry)      │
//! │  opening  = closing of nearest earlier live entry   (0 if none)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cascade
//! Editing or deleting day 1 changes what day 3 opens with, which changes
//! day 4, and so on. [`cascade`] is a left fold over the later entries,
//! seeded with the new balance, producing the corrected chain.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{CoreError, CoreResult};
use crate::ids::{ItemId, LedgerEntryId, StoreId};
use crate::quantity::Quantity;
use crate::types::LedgerEntry;
use crate::validation::validate_amount;

/// Builds a fresh entry for `day`, carrying forward `prior`'s closing balance.
///
/// `prior` must be the nearest earlier live entry of the same item, if any.
pub fn open_entry(
    item_id: ItemId,
    store_id: StoreId,
    day: NaiveDate,
    prior: Option<&LedgerEntry>,
    now: DateTime<Utc>,
) -> LedgerEntry {
    let opening = prior.map(|p| p.closing_stock).unwrap_or_default();
    LedgerEntry {
        id: LedgerEntryId::new(),
        item_id,
        store_id,
        day,
        opening_stock: opening,
        added_stock: Quantity::zero(),
        removed_stock: Quantity::zero(),
        closing_stock: opening,
        is_deleted: false,
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

/// Returns `entry` with `closing = opening + added − removed`.
///
/// Fails with `AmountOutOfRange` if the balance overflows.
pub fn recompute_closing(entry: &LedgerEntry) -> CoreResult<LedgerEntry> {
    let closing = entry
        .opening_stock
        .checked_add(entry.added_stock)
        .and_then(|available| available.checked_sub(entry.removed_stock))
        .ok_or_else(|| CoreError::out_of_range("closing stock"))?;
    Ok(LedgerEntry {
        closing_stock: closing,
        ..entry.clone()
    })
}

/// Opening plus added: what a day can give out.
fn available(entry: &LedgerEntry, added: Quantity) -> CoreResult<Quantity> {
    entry
        .opening_stock
        .checked_add(added)
        .ok_or_else(|| CoreError::out_of_range("available stock"))
}

fn insufficient(entry: &LedgerEntry, available: Quantity, requested: Quantity) -> CoreError {
    CoreError::InsufficientStock {
        item_id: entry.item_id,
        available,
        requested,
    }
}

/// Records `amount` of incoming stock.
pub fn apply_add(entry: &LedgerEntry, amount: Quantity) -> CoreResult<LedgerEntry> {
    validate_amount("amount", amount.value())?;
    let added = entry
        .added_stock
        .checked_add(amount)
        .ok_or_else(|| CoreError::out_of_range("added stock"))?;
    recompute_closing(&LedgerEntry {
        added_stock: added,
        ..entry.clone()
    })
}

/// Records `amount` of outgoing stock.
///
/// Fails with `InsufficientStock` when the closing balance cannot cover it;
/// the input entry is untouched either way.
pub fn apply_remove(entry: &LedgerEntry, amount: Quantity) -> CoreResult<LedgerEntry> {
    validate_amount("amount", amount.value())?;
    if entry.closing_stock < amount {
        return Err(insufficient(entry, entry.closing_stock, amount));
    }
    let removed = entry
        .removed_stock
        .checked_add(amount)
        .ok_or_else(|| CoreError::out_of_range("removed stock"))?;
    recompute_closing(&LedgerEntry {
        removed_stock: removed,
        ..entry.clone()
    })
}

/// Replaces an entry's movements. `None` keeps the current value.
///
/// The entry's own closing balance may not go negative.
pub fn edit_movements(
    entry: &LedgerEntry,
    new_added: Option<Quantity>,
    new_removed: Option<Quantity>,
) -> CoreResult<LedgerEntry> {
    let added = new_added.unwrap_or(entry.added_stock);
    let removed = new_removed.unwrap_or(entry.removed_stock);
    validate_amount("added", added.value())?;
    validate_amount("removed", removed.value())?;

    let available = available(entry, added)?;
    if available < removed {
        return Err(insufficient(entry, available, removed));
    }
    recompute_closing(&LedgerEntry {
        added_stock: added,
        removed_stock: removed,
        ..entry.clone()
    })
}

/// Re-derives the balances of `later` (ascending by day, all live) starting
/// from `previous_closing`.
///
/// Returns the whole corrected chain. Fails with `InsufficientStock` if any
/// entry would close below zero, naming the first such entry.
pub fn cascade(previous_closing: Quantity, later: &[LedgerEntry]) -> CoreResult<Vec<LedgerEntry>> {
    later
        .iter()
        .try_fold(
            (previous_closing, Vec::with_capacity(later.len())),
            |(carry, mut chain), entry| {
                let reopened = LedgerEntry {
                    opening_stock: carry,
                    ..entry.clone()
                };
                let available = available(&reopened, reopened.added_stock)?;
                if available < reopened.removed_stock {
                    return Err(insufficient(&reopened, available, reopened.removed_stock));
                }
                let next = recompute_closing(&reopened)?;
                let carry = next.closing_stock;
                chain.push(next);
                Ok((carry, chain))
            },
        )
        .map(|(_, chain)| chain)
}

/// Checks both ledger invariants over one item's live entries, ascending.
///
/// Returns the first offending entry, if any.
pub fn find_broken_link(chain: &[LedgerEntry]) -> Option<&LedgerEntry> {
    let mut carry = Quantity::zero();
    for entry in chain {
        let expected = recompute_closing(entry).ok().map(|e| e.closing_stock);
        if entry.opening_stock != carry || expected != Some(entry.closing_stock) {
            return Some(entry);
        }
        carry = entry.closing_stock;
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn q(v: rust_decimal::Decimal) -> Quantity {
        Quantity::new(v)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn entry_on(d: u32, prior: Option<&LedgerEntry>) -> LedgerEntry {
        let item = prior.map(|p| p.item_id).unwrap_or_default();
        let store = prior.map(|p| p.store_id).unwrap_or_default();
        open_entry(item, store, day(d), prior, Utc::now())
    }

    #[test]
    fn test_open_without_prior_starts_at_zero() {
        let e = entry_on(1, None);
        assert!(e.opening_stock.is_zero());
        assert!(e.closing_stock.is_zero());
        assert_eq!(e.version, 0);
    }

    #[test]
    fn test_open_carries_prior_closing() {
        let first = apply_add(&entry_on(1, None), q(dec!(2000))).unwrap();
        let second = entry_on(5, Some(&first));
        assert_eq!(second.opening_stock, q(dec!(2000)));
        assert_eq!(second.closing_stock, q(dec!(2000)));
        assert_eq!(second.item_id, first.item_id);
    }

    #[test]
    fn test_add_then_remove_restores_closing() {
        let base = apply_add(&entry_on(1, None), q(dec!(700))).unwrap();
        let added = apply_add(&base, q(dec!(250.5))).unwrap();
        let back = apply_remove(&added, q(dec!(250.5))).unwrap();
        assert_eq!(back.closing_stock, base.closing_stock);
        assert_eq!(back.closing_stock, back.opening_stock + back.added_stock - back.removed_stock);
    }

    #[test]
    fn test_remove_more_than_closing_fails() {
        let e = apply_add(&entry_on(1, None), q(dec!(1500))).unwrap();
        let before = e.clone();
        let err = apply_remove(&e, q(dec!(2000))).unwrap_err();
        match err {
            CoreError::InsufficientStock { available, requested, .. } => {
                assert_eq!(available, q(dec!(1500)));
                assert_eq!(requested, q(dec!(2000)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(e, before);
    }

    #[test]
    fn test_remove_exactly_closing_is_allowed() {
        let e = apply_add(&entry_on(1, None), q(dec!(3))).unwrap();
        let e = apply_remove(&e, q(dec!(3))).unwrap();
        assert!(e.closing_stock.is_zero());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let e = entry_on(1, None);
        assert!(matches!(apply_add(&e, q(dec!(-1))), Err(CoreError::Validation(_))));
        assert!(matches!(apply_remove(&e, q(dec!(-1))), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_cascade_walks_the_whole_chain() {
        let d1 = apply_add(&entry_on(1, None), q(dec!(1000))).unwrap();
        let d3 = apply_remove(&entry_on(3, Some(&d1)), q(dec!(200))).unwrap();
        let d4 = apply_add(&entry_on(4, Some(&d3)), q(dec!(50))).unwrap();
        let d9 = apply_remove(&entry_on(9, Some(&d4)), q(dec!(100))).unwrap();

        // Day 1 was really a delivery of 1500.
        let d1 = edit_movements(&d1, Some(q(dec!(1500))), None).unwrap();
        let chain = cascade(d1.closing_stock, &[d3, d4, d9]).unwrap();

        let closings: Vec<_> = chain.iter().map(|e| e.closing_stock).collect();
        assert_eq!(closings, vec![q(dec!(1300)), q(dec!(1350)), q(dec!(1250))]);

        let mut full = vec![d1];
        full.extend(chain);
        assert!(find_broken_link(&full).is_none());
    }

    #[test]
    fn test_cascade_after_delete_uses_earlier_balance() {
        let d1 = apply_add(&entry_on(1, None), q(dec!(100))).unwrap();
        let d2 = apply_add(&entry_on(2, Some(&d1)), q(dec!(40))).unwrap();
        let d3 = apply_remove(&entry_on(3, Some(&d2)), q(dec!(30))).unwrap();

        // Deleting day 2 makes day 3 open with day 1's closing.
        let chain = cascade(d1.closing_stock, &[d3]).unwrap();
        assert_eq!(chain[0].opening_stock, q(dec!(100)));
        assert_eq!(chain[0].closing_stock, q(dec!(70)));
    }

    #[test]
    fn test_cascade_rejects_negative_future() {
        let d1 = apply_add(&entry_on(1, None), q(dec!(100))).unwrap();
        let d2 = apply_remove(&entry_on(2, Some(&d1)), q(dec!(90))).unwrap();
        let d1 = edit_movements(&d1, Some(q(dec!(50))), None).unwrap();
        let err = cascade(d1.closing_stock, &[d2]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
    }

    #[test]
    fn test_edit_cannot_close_below_zero() {
        let e = apply_add(&entry_on(1, None), q(dec!(10))).unwrap();
        assert!(edit_movements(&e, None, Some(q(dec!(11)))).is_err());
        let ok = edit_movements(&e, None, Some(q(dec!(10)))).unwrap();
        assert!(ok.closing_stock.is_zero());
    }

    #[test]
    fn test_cascade_of_nothing_is_empty() {
        assert!(cascade(q(dec!(5)), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_find_broken_link_spots_gap_in_balance() {
        let d1 = apply_add(&entry_on(1, None), q(dec!(10))).unwrap();
        let mut d2 = entry_on(2, Some(&d1));
        d2.opening_stock = q(dec!(9));
        let chain = vec![d1, d2];
        assert_eq!(find_broken_link(&chain).map(|e| e.day), Some(day(2)));
    }

    #[test]
    fn test_amount_above_cap_is_rejected() {
        let e = entry_on(1, None);
        let err = apply_add(&e, q(rust_decimal::Decimal::MAX)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(crate::error::ValidationError::TooLarge { .. })
        ));
        assert!(edit_movements(&e, Some(q(rust_decimal::Decimal::MAX)), None).is_err());
    }

    #[test]
    fn test_overflowing_balance_is_out_of_range() {
        // A balance already at the edge of Decimal's range, e.g. a corrupt row.
        let mut edge = entry_on(1, None);
        edge.opening_stock = q(rust_decimal::Decimal::MAX);
        edge.closing_stock = q(rust_decimal::Decimal::MAX);

        let err = apply_add(&edge, q(dec!(1))).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));

        let later = apply_add(&entry_on(2, None), q(dec!(1))).unwrap();
        let err = cascade(q(rust_decimal::Decimal::MAX), &[later]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
    }
}
