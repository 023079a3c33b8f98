//! # Platform Fee Calculator
//!
//! ```text
//!   FIXED       charge = value × number of sale lines   (quantities ignored)
//!   PERCENTAGE  charge = total × value / 100
//! ```
//!
//! The charge is recorded on the sale. It does not change `total` or `profit`.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PlatformCharge, PlatformChargeType};

/// Computes the platform charge for a sale with `line_count` lines.
pub fn platform_charge(charge: &PlatformCharge, total: Money, line_count: usize) -> CoreResult<Money> {
    let fee = match &charge.charge_type {
        PlatformChargeType::Fixed => Money::new(charge.value)
            .checked_times(line_count)
            .map(|fee| fee.round()),
        PlatformChargeType::Percentage => total.checked_percentage(charge.value),
        PlatformChargeType::Other(raw) => {
            return Err(CoreError::InvalidPlatformCharge {
                charge_type: raw.clone(),
            })
        }
    };
    fee.ok_or_else(|| CoreError::out_of_range("platform charge"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn charge(charge_type: PlatformChargeType, value: rust_decimal::Decimal) -> PlatformCharge {
        PlatformCharge { charge_type, value }
    }

    #[test]
    fn test_fixed_is_per_line() {
        let fee = platform_charge(
            &charge(PlatformChargeType::Fixed, dec!(5)),
            Money::new(dec!(730)),
            2,
        )
        .unwrap();
        assert_eq!(fee.amount(), dec!(10));
    }

    #[test]
    fn test_percentage_of_total() {
        let fee = platform_charge(
            &charge(PlatformChargeType::Percentage, dec!(10)),
            Money::new(dec!(1000)),
            7,
        )
        .unwrap();
        assert_eq!(fee.amount(), dec!(100));
    }

    #[test]
    fn test_overflowing_charge_is_an_error() {
        let err = platform_charge(
            &charge(PlatformChargeType::Percentage, dec!(50)),
            Money::new(rust_decimal::Decimal::MAX),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::AmountOutOfRange { .. }));
    }

    #[test]
    fn test_default_charges_nothing() {
        let fee = platform_charge(&PlatformCharge::default(), Money::new(dec!(999.99)), 3).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn test_unknown_type_is_config_error() {
        let err = platform_charge(
            &charge(PlatformChargeType::Other("tiered".into()), dec!(1)),
            Money::new(dec!(10)),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPlatformCharge { .. }));
    }
}
