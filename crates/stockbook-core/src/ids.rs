//! # Typed Identifiers
//!
//! Every entity gets its own identifier type so an `ItemId` can never be
//! passed where a `StoreId` is expected.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_stock(item_id: ItemId, store_id: StoreId, ...)                     │
//! │                                                                         │
//! │  add_stock(store_id, item_id, ...)   ← compile error, not a bad query  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All ids are UUID v4 and are stored as their hyphenated string form.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(ItemId, "Identifier of a catalog item.");
typed_id!(StoreId, "Identifier of a store.");
typed_id!(UserId, "Identifier of the user (cashier, admin) acting on a store.");
typed_id!(LedgerEntryId, "Identifier of a per-item, per-day stock ledger entry.");
typed_id!(SaleId, "Identifier of a committed sale.");
typed_id!(SaleLineId, "Identifier of one line of a sale.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_string() {
        let id = ItemId::new();
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("not-an-id".parse::<StoreId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = LedgerEntryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
