//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of Stockbook's stock ledger and sale
//! settlement. It contains the business rules as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Calling layer (HTTP, auth: not in this workspace)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockbook-engine (commands)                    │   │
//! │  │    add_stock, remove_stock, edit_ledger_entry, create_sale ...  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │  pricing  │  │    fee    │  │  invoice  │  │   │
//! │  │   │ open/add  │  │ per gram  │  │ fixed or  │  │ YYYYMMDD  │  │   │
//! │  │   │ cascade   │  │ per piece │  │ percent   │  │ + seq     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, write gate, repositories   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ids`] - One identifier type per entity
//! - [`money`] / [`quantity`] - Decimal amounts (no floating point!)
//! - [`types`] - Domain types (Item, Store, LedgerEntry, Sale, ...)
//! - [`ledger`] - Running-balance math and the cascade fold
//! - [`pricing`] - Sale line pricing by weight, quantity or target price
//! - [`fee`] - Platform charge calculation
//! - [`invoice`] - Invoice number format
//! - [`clock`] - Injected time and the business day
//! - [`error`] / [`validation`] - Typed failures and input checks
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use stockbook_core::{fee, Money, PlatformCharge, PlatformChargeType};
//!
//! let charge = PlatformCharge {
//!     charge_type: PlatformChargeType::Percentage,
//!     value: dec!(10),
//! };
//! let fee = fee::platform_charge(&charge, Money::new(dec!(1000)), 3).unwrap();
//! assert_eq!(fee.amount(), dec!(100));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod fee;
pub mod ids;
pub mod invoice;
pub mod ledger;
pub mod money;
pub mod pricing;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use ids::*;
pub use invoice::InvoiceNumber;
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines in a single sale.
///
/// ## Business Reason
/// Every line locks a ledger row inside the sale's transaction; a runaway
/// request should fail fast instead of holding the write gate.
pub const MAX_SALE_LINES: usize = 100;

/// Largest single amount (grams, pieces or money) accepted from a caller.
///
/// ## Business Reason
/// Balances and line totals are sums and products of these amounts; capping
/// the inputs keeps every derived figure far inside `Decimal`'s range.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
