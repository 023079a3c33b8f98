//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stockbook-engine errors                                               │
//! │  └── ApiError         - What the calling layer sees (serialized)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! Every error collapses onto one [`ErrorKind`]. Callers branch on the kind,
//! humans read the message.

use chrono::NaiveDate;
use thiserror::Error;

use crate::ids::{ItemId, LedgerEntryId, SaleId, StoreId};
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Error Kind
// =============================================================================

/// The coarse failure category every error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Item, store, ledger entry or sale is absent (or soft-deleted).
    NotFound,
    /// A removal exceeds the closing balance.
    InsufficientStock,
    /// Bad input type, mode mismatch, non-positive quantity or total.
    InvalidInput,
    /// Computed figures are inconsistent (cost exceeds price).
    InvalidState,
    /// Store configuration cannot be interpreted.
    InvalidConfig,
    /// Persistence or unexpected failure.
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are recoverable: they are returned to the caller as typed results
/// and are never raised after anything has been committed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item does not exist or has been soft-deleted.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Store does not exist or has been soft-deleted.
    #[error("Store not found: {0}")]
    StoreNotFound(StoreId),

    /// Ledger entry does not exist or has been soft-deleted.
    #[error("Ledger entry not found: {0}")]
    LedgerEntryNotFound(LedgerEntryId),

    /// Sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// Not enough stock to satisfy a removal.
    ///
    /// ## When This Occurs
    /// ```text
    /// Sale line: 2000 g of Almonds
    ///      │
    ///      ▼
    /// Today's entry: closing = 1500 g
    ///      │
    ///      ▼
    /// InsufficientStock { available: 1500, requested: 2000 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, nothing deducted
    /// ```
    ///
    /// Also raised when editing or deleting a historical entry would drive a
    /// later day's closing balance below zero.
    #[error("Insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: ItemId,
        available: Quantity,
        requested: Quantity,
    },

    /// Request cannot be interpreted for this item.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The sale would be recorded at a loss on cost alone, which means the
    /// item catalog is misconfigured.
    #[error("Total cost {total_cost} exceeds sale total {total}")]
    CostExceedsPrice { total: Money, total_cost: Money },

    /// The store's platform charge type is not recognised.
    #[error("Unknown platform charge type: {charge_type}")]
    InvalidPlatformCharge { charge_type: String },

    /// An amount overflowed while computing a balance or a line total.
    #[error("{what} is out of range")]
    AmountOutOfRange { what: String },

    /// More than 999999 invoices on one day.
    #[error("Invoice sequence exhausted for {day}")]
    InvoiceSequenceExhausted { day: NaiveDate },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`CoreError::AmountOutOfRange`].
    pub fn out_of_range(what: impl Into<String>) -> Self {
        CoreError::AmountOutOfRange { what: what.into() }
    }

    /// Maps this error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ItemNotFound(_)
            | CoreError::StoreNotFound(_)
            | CoreError::LedgerEntryNotFound(_)
            | CoreError::SaleNotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::InvalidInput { .. }
            | CoreError::AmountOutOfRange { .. }
            | CoreError::Validation(_) => ErrorKind::InvalidInput,
            CoreError::CostExceedsPrice { .. } => ErrorKind::InvalidState,
            CoreError::InvalidPlatformCharge { .. } => ErrorKind::InvalidConfig,
            CoreError::InvoiceSequenceExhausted { .. } => ErrorKind::Internal,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value exceeds the largest amount the ledger accepts.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. a mobile number with letters in it).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Too many entries in a list.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_stock_message() {
        let item_id = ItemId::new();
        let err = CoreError::InsufficientStock {
            item_id,
            available: Quantity::new(dec!(1500)),
            requested: Quantity::new(dec!(2000)),
        };
        assert_eq!(
            err.to_string(),
            format!("Insufficient stock for item {item_id}: available 1500, requested 2000")
        );
    }

    #[test]
    fn test_kinds_cover_taxonomy() {
        assert_eq!(CoreError::ItemNotFound(ItemId::new()).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::SaleNotFound(SaleId::new()).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::invalid_input("x").kind(), ErrorKind::InvalidInput);
        assert_eq!(
            CoreError::CostExceedsPrice {
                total: Money::zero(),
                total_cost: Money::zero(),
            }
            .kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            CoreError::InvalidPlatformCharge {
                charge_type: "bogus".into()
            }
            .kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn test_out_of_range_is_invalid_input() {
        let err = CoreError::out_of_range("line total");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "line total is out of range");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::InvalidInput);
    }
}
