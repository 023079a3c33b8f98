//! # Invoice Numbers
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   2 0 2 6 1 0 1 8   0 0 0 0 4 2              │
//! │   └──── day ────┘   └─ seq ──┘               │
//! │     YYYYMMDD        6 digits, from 000001    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The sequence restarts every calendar day. Allocation (the `max + 1` step)
//! happens atomically in the database; this module only owns the format.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Highest sequence a single day can hold.
pub const MAX_SEQUENCE: u32 = 999_999;

const DAY_DIGITS: usize = 8;
const SEQ_DIGITS: usize = 6;

/// A formatted, validated invoice number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber {
    day: NaiveDate,
    seq: u32,
}

impl InvoiceNumber {
    /// Formats the `seq`-th invoice of `day`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use stockbook_core::invoice::InvoiceNumber;
    ///
    /// let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    /// let n = InvoiceNumber::new(day, 42).unwrap();
    /// assert_eq!(n.to_string(), "20261018000042");
    /// ```
    pub fn new(day: NaiveDate, seq: u32) -> CoreResult<Self> {
        if seq == 0 {
            return Err(CoreError::invalid_input("invoice sequence starts at 1"));
        }
        if seq > MAX_SEQUENCE {
            return Err(CoreError::InvoiceSequenceExhausted { day });
        }
        Ok(Self { day, seq })
    }

    /// The day partition this number belongs to.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// The per-day sequence.
    pub fn sequence(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.day.format("%Y%m%d"), self.seq, width = SEQ_DIGITS)
    }
}

impl FromStr for InvoiceNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::invalid_input(format!("malformed invoice number '{s}'"));

        if s.len() != DAY_DIGITS + SEQ_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let day = NaiveDate::parse_from_str(&s[..DAY_DIGITS], "%Y%m%d").map_err(|_| malformed())?;
        let seq: u32 = s[DAY_DIGITS..].parse().map_err(|_| malformed())?;
        Self::new(day, seq)
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(n: InvoiceNumber) -> Self {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn test_first_of_day() {
        let n = InvoiceNumber::new(day(), 1).unwrap();
        assert_eq!(n.to_string(), "20260105000001");
        assert_eq!(n.day(), day());
        assert_eq!(n.sequence(), 1);
    }

    #[test]
    fn test_exhausted() {
        assert!(InvoiceNumber::new(day(), MAX_SEQUENCE).is_ok());
        let err = InvoiceNumber::new(day(), MAX_SEQUENCE + 1).unwrap_err();
        assert!(matches!(err, CoreError::InvoiceSequenceExhausted { .. }));
    }

    #[test]
    fn test_parse() {
        let n: InvoiceNumber = "20260105000123".parse().unwrap();
        assert_eq!(n.sequence(), 123);
        assert!("2026010500012".parse::<InvoiceNumber>().is_err());
        assert!("20261305000001".parse::<InvoiceNumber>().is_err());
        assert!("20260105000000".parse::<InvoiceNumber>().is_err());
        assert!("2026O105000001".parse::<InvoiceNumber>().is_err());
    }

    #[test]
    fn test_orders_like_allocation() {
        let a = InvoiceNumber::new(day(), 9).unwrap();
        let b = InvoiceNumber::new(day(), 10).unwrap();
        assert!(a < b);
    }
}
