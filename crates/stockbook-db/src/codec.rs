//! Column codecs for values SQLite has no native type for.
//!
//! ```text
//!   ItemId / StoreId / ...   ◄──►  TEXT  "6f1c…-…"      (hyphenated UUID)
//!   Decimal (Money/Quantity) ◄──►  TEXT  "1500.000"     (scale preserved)
//! ```
//!
//! Days and timestamps go through sqlx's own chrono support.

use rust_decimal::Decimal;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{DbError, DbResult};

/// Parses a TEXT id column.
pub(crate) fn parse_id<T>(entity: &str, raw: &str) -> DbResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| DbError::corrupt(entity, format!("bad id '{raw}': {e}")))
}

/// Parses a TEXT decimal column.
pub(crate) fn parse_decimal(entity: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| DbError::corrupt(entity, format!("bad decimal '{raw}': {e}")))
}

/// Parses a nullable TEXT decimal column that must be present.
pub(crate) fn require_decimal(entity: &str, column: &str, raw: Option<&str>) -> DbResult<Decimal> {
    match raw {
        Some(raw) => parse_decimal(entity, raw),
        None => Err(DbError::corrupt(entity, format!("{column} is NULL"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockbook_core::ItemId;

    #[test]
    fn test_decimal_keeps_scale() {
        let d = parse_decimal("ledger", "1500.000").unwrap();
        assert_eq!(d.to_string(), "1500.000");
    }

    #[test]
    fn test_bad_values_are_corrupt() {
        assert!(matches!(
            parse_decimal("ledger", "12,5"),
            Err(DbError::Corrupt { .. })
        ));
        assert!(matches!(
            parse_id::<ItemId>("item", "nope"),
            Err(DbError::Corrupt { .. })
        ));
        assert!(matches!(
            require_decimal("item", "price_per_kg", None),
            Err(DbError::Corrupt { .. })
        ));
    }
}
