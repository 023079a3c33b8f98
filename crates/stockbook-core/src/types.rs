//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Store       │   │      Item       │   │  LedgerEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  store_id       │◄──│  item_id        │       │
//! │  │  name           │   │  name           │   │  day            │       │
//! │  │  platform_charge│   │  pricing        │   │  opening/added  │       │
//! │  └─────────────────┘   └─────────────────┘   │  removed/closing│       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      Sale       │   │    SaleLine     │   Snapshot pattern: a line   │
//! │  │  ─────────────  │   │  ─────────────  │   keeps its own copy of the  │
//! │  │  invoice_number │──►│  item_name      │   name and price so later    │
//! │  │  total, profit  │   │  unit_price     │   item edits never rewrite   │
//! │  │  platform_charge│   │  line_total     │   history.                   │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::ids::{ItemId, LedgerEntryId, SaleId, SaleLineId, StoreId, UserId};
use crate::invoice::InvoiceNumber;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Pricing
// =============================================================================

/// How an item is priced and in which unit its stock is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Priced per kilogram, stock tracked in grams.
    Weight,
    /// Priced per piece, stock tracked as a count.
    Fixed,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Weight => "weight",
            PricingMode::Fixed => "fixed",
        }
    }
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weight" => Ok(PricingMode::Weight),
            "fixed" => Ok(PricingMode::Fixed),
            other => Err(CoreError::invalid_input(format!("unknown pricing mode '{other}'"))),
        }
    }
}

/// The price and cost attributes of an item, by mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ItemPricing {
    Weight {
        price_per_kg: Money,
        cost_per_kg: Money,
    },
    Fixed {
        price_per_unit: Money,
        cost_per_unit: Money,
    },
}

impl ItemPricing {
    pub fn mode(&self) -> PricingMode {
        match self {
            ItemPricing::Weight { .. } => PricingMode::Weight,
            ItemPricing::Fixed { .. } => PricingMode::Fixed,
        }
    }

    /// Price of one natural unit (one gram, or one piece).
    pub fn unit_price(&self) -> Money {
        match self {
            ItemPricing::Weight { price_per_kg, .. } => price_per_kg.per_thousand(),
            ItemPricing::Fixed { price_per_unit, .. } => *price_per_unit,
        }
    }

    /// Cost of one natural unit (one gram, or one piece).
    pub fn unit_cost(&self) -> Money {
        match self {
            ItemPricing::Weight { cost_per_kg, .. } => cost_per_kg.per_thousand(),
            ItemPricing::Fixed { cost_per_unit, .. } => *cost_per_unit,
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item owned by a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub store_id: StoreId,
    /// Display name, snapshotted onto every sale line.
    pub name: String,
    pub pricing: ItemPricing,
    /// Soft delete flag. Deleted items cannot be sold or restocked.
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Builds a new, live item.
    pub fn new(store_id: StoreId, name: impl Into<String>, pricing: ItemPricing, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            store_id,
            name: name.into(),
            pricing,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn pricing_mode(&self) -> PricingMode {
        self.pricing.mode()
    }
}

// =============================================================================
// Store & Platform Charge
// =============================================================================

/// The kind of per-sale service fee a store levies.
///
/// Stored as text; anything unrecognised is kept as [`PlatformChargeType::Other`]
/// so that loading a store never fails and the fee calculator can report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlatformChargeType {
    /// `value` percent of the sale total.
    Percentage,
    /// `value` per distinct sale line.
    Fixed,
    Other(String),
}

impl PlatformChargeType {
    pub fn as_str(&self) -> &str {
        match self {
            PlatformChargeType::Percentage => "percentage",
            PlatformChargeType::Fixed => "fixed",
            PlatformChargeType::Other(raw) => raw,
        }
    }
}

impl From<String> for PlatformChargeType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "percentage" => PlatformChargeType::Percentage,
            "fixed" => PlatformChargeType::Fixed,
            _ => PlatformChargeType::Other(raw),
        }
    }
}

impl From<PlatformChargeType> for String {
    fn from(t: PlatformChargeType) -> Self {
        t.as_str().to_string()
    }
}

/// Store-level fee configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCharge {
    pub charge_type: PlatformChargeType,
    pub value: Decimal,
}

impl Default for PlatformCharge {
    /// A new store charges nothing: 0 percent.
    fn default() -> Self {
        Self {
            charge_type: PlatformChargeType::Percentage,
            value: Decimal::ZERO,
        }
    }
}

/// A store. Read-only from the engine's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub platform_charge: PlatformCharge,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn new(name: impl Into<String>, platform_charge: PlatformCharge, now: DateTime<Utc>) -> Self {
        Self {
            id: StoreId::new(),
            name: name.into(),
            platform_charge,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One item's stock movements in one store on one calendar day.
///
/// ```text
///   opening ──► + added ──► − removed ──► closing
///      ▲                                    │
///      └──── previous live entry's closing ─┘ (next day with an entry)
/// ```
///
/// `version` increments on every persisted change and guards updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub item_id: ItemId,
    pub store_id: StoreId,
    pub day: NaiveDate,
    pub opening_stock: Quantity,
    pub added_stock: Quantity,
    pub removed_stock: Quantity,
    pub closing_stock: Quantity,
    pub is_deleted: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Online,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Online => "online",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "online" => Ok(PaymentMode::Online),
            other => Err(CoreError::invalid_input(format!("unknown payment mode '{other}'"))),
        }
    }
}

/// Optional customer details printed on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_name: Option<String>,
    pub mobile: Option<String>,
}

/// One requested sale line, as received from the calling layer.
///
/// `input_type` is `"weight"` or `"price"` for weight items and
/// `"quantity"` or `"price"` for fixed items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLineRequest {
    pub item_id: ItemId,
    pub input_type: String,
    pub value: Decimal,
}

/// A committed sale line. Name and price are frozen at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: SaleLineId,
    /// 1-based position in the sale, in request order.
    pub line_no: u32,
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub store_id: StoreId,
    pub user_id: UserId,
    pub payment_mode: PaymentMode,
    pub customer: CustomerInfo,
    pub lines: Vec<SaleLine>,
    pub total: Money,
    pub total_cost: Money,
    /// `total - total_cost`.
    pub profit: Money,
    pub platform_charge: Money,
    pub invoice_number: InvoiceNumber,
    /// Business day the sale belongs to.
    pub sale_day: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
