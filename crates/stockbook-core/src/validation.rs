//! # Validation Module
//!
//! Input validation run before any ledger or sale logic.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Calling layer (HTTP, outside this workspace)                 │
//! │  └── Deserialization, auth, store access                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine command                                               │
//! │  ├── THIS MODULE: shape of the request                                 │
//! │  └── pricing / ledger rules (pricing.rs, ledger.rs)                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (invoice number, one live entry per item per day)          │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{CustomerInfo, ItemPricing, PlatformCharge, PlatformChargeType, SaleLineRequest};
use crate::{MAX_AMOUNT, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item or store name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_name;
///
/// assert!(validate_name("Almonds (loose)").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates optional customer details.
///
/// ## Rules
/// - Customer name: at most 100 characters
/// - Mobile: 7 to 15 digits, optionally prefixed with `+`
pub fn validate_customer(customer: &CustomerInfo) -> ValidationResult<()> {
    if let Some(name) = &customer.customer_name {
        if name.trim().chars().count() > 100 {
            return Err(ValidationError::TooLong {
                field: "customer_name".to_string(),
                max: 100,
            });
        }
    }

    if let Some(mobile) = &customer.mobile {
        let digits = mobile.trim().strip_prefix('+').unwrap_or(mobile.trim());
        let ok = (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
        if !ok {
            return Err(ValidationError::InvalidFormat {
                field: "mobile".to_string(),
                reason: "must be 7 to 15 digits".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a caller-supplied amount: zero up to [`MAX_AMOUNT`].
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use stockbook_core::validation::validate_amount;
///
/// assert!(validate_amount("amount", Decimal::from(2000)).is_ok());
/// assert!(validate_amount("amount", Decimal::MAX).is_err());
/// ```
pub fn validate_amount(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT.to_string(),
        });
    }
    Ok(())
}

/// Validates catalog prices. Zero is allowed (free items); negatives and
/// amounts above [`MAX_AMOUNT`] are not.
pub fn validate_pricing(pricing: &ItemPricing) -> ValidationResult<()> {
    match pricing {
        ItemPricing::Weight {
            price_per_kg,
            cost_per_kg,
        } => {
            validate_amount("price_per_kg", price_per_kg.amount())?;
            validate_amount("cost_per_kg", cost_per_kg.amount())
        }
        ItemPricing::Fixed {
            price_per_unit,
            cost_per_unit,
        } => {
            validate_amount("price_per_unit", price_per_unit.amount())?;
            validate_amount("cost_per_unit", cost_per_unit.amount())
        }
    }
}

/// Validates a store's platform charge.
///
/// ## Rules
/// - Value is never negative nor above [`MAX_AMOUNT`]
/// - A percentage is at most 100
///
/// Unknown charge types are left to the fee calculator.
pub fn validate_platform_charge(charge: &PlatformCharge) -> ValidationResult<()> {
    validate_amount("platform_charge.value", charge.value)?;
    if charge.charge_type == PlatformChargeType::Percentage && charge.value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::InvalidFormat {
            field: "platform_charge.value".to_string(),
            reason: "percentage cannot exceed 100".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line list of a sale request.
///
/// ## Rules
/// - At least one line
/// - At most [`MAX_SALE_LINES`]
/// - Every value within [`validate_amount`]
pub fn validate_sale_lines(lines: &[SaleLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::TooMany {
            field: "lines".to_string(),
            max: MAX_SALE_LINES,
        });
    }

    lines.iter().try_for_each(|line| validate_amount("value", line.value))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ItemId;
    use crate::money::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Cashews").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_customer() {
        assert!(validate_customer(&CustomerInfo::default()).is_ok());

        let good = CustomerInfo {
            customer_name: Some("R. Iyer".into()),
            mobile: Some("+919876543210".into()),
        };
        assert!(validate_customer(&good).is_ok());

        let bad = CustomerInfo {
            customer_name: None,
            mobile: Some("98-76".into()),
        };
        assert!(validate_customer(&bad).is_err());
    }

    #[test]
    fn test_validate_pricing() {
        let ok = ItemPricing::Fixed {
            price_per_unit: Money::zero(),
            cost_per_unit: Money::zero(),
        };
        assert!(validate_pricing(&ok).is_ok());

        let bad = ItemPricing::Weight {
            price_per_kg: Money::new(dec!(100)),
            cost_per_kg: Money::new(dec!(-1)),
        };
        assert!(validate_pricing(&bad).is_err());

        let huge = ItemPricing::Fixed {
            price_per_unit: Money::new(rust_decimal::Decimal::MAX),
            cost_per_unit: Money::zero(),
        };
        assert!(matches!(
            validate_pricing(&huge),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount("amount", Decimal::ZERO).is_ok());
        assert!(validate_amount("amount", Decimal::from(MAX_AMOUNT)).is_ok());
        assert!(matches!(
            validate_amount("amount", Decimal::from(MAX_AMOUNT) + dec!(0.001)),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_amount("amount", dec!(-0.5)),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_platform_charge() {
        let pct = |v| PlatformCharge {
            charge_type: PlatformChargeType::Percentage,
            value: v,
        };
        assert!(validate_platform_charge(&pct(dec!(10))).is_ok());
        assert!(validate_platform_charge(&pct(dec!(100.5))).is_err());
        assert!(validate_platform_charge(&pct(dec!(-1))).is_err());
    }

    #[test]
    fn test_validate_sale_lines() {
        assert!(validate_sale_lines(&[]).is_err());

        let line = SaleLineRequest {
            item_id: ItemId::new(),
            input_type: "weight".into(),
            value: dec!(100),
        };
        assert!(validate_sale_lines(&[line.clone()]).is_ok());
        assert!(validate_sale_lines(&vec![line.clone(); MAX_SALE_LINES + 1]).is_err());

        let runaway = SaleLineRequest {
            value: Decimal::MAX,
            ..line
        };
        assert!(matches!(
            validate_sale_lines(&[runaway]),
            Err(ValidationError::TooLarge { .. })
        ));
    }
}
