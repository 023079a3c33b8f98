//! # Item Repository
//!
//! The item catalog as seen by the ledger: pricing attributes by mode.
//!
//! ## Column Layout
//! ```text
//! ┌──────────────┬──────────────────────────────┬────────────────────────┐
//! │ pricing_mode │ filled                       │ NULL                   │
//! ├──────────────┼──────────────────────────────┼────────────────────────┤
//! │ weight       │ price/cost_per_kg            │ price/cost_per_unit    │
//! │              │ price/cost_per_gram (cached) │                        │
//! │ fixed        │ price/cost_per_unit          │ per_kg, per_gram       │
//! └──────────────┴──────────────────────────────┴────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::codec::{parse_id, require_decimal};
use crate::error::{DbError, DbResult};
use stockbook_core::validation::{validate_name, validate_pricing};
use stockbook_core::{Item, ItemId, ItemPricing, Money, PricingMode, StoreId};

const ENTITY: &str = "Item";

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    store_id: String,
    name: String,
    pricing_mode: String,
    price_per_kg: Option<String>,
    cost_per_kg: Option<String>,
    price_per_unit: Option<String>,
    cost_per_unit: Option<String>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        let mode: PricingMode = row
            .pricing_mode
            .parse()
            .map_err(|e| DbError::corrupt(ENTITY, e))?;

        let money = |column: &str, raw: &Option<String>| {
            require_decimal(ENTITY, column, raw.as_deref()).map(Money::new)
        };

        let pricing = match mode {
            PricingMode::Weight => ItemPricing::Weight {
                price_per_kg: money("price_per_kg", &row.price_per_kg)?,
                cost_per_kg: money("cost_per_kg", &row.cost_per_kg)?,
            },
            PricingMode::Fixed => ItemPricing::Fixed {
                price_per_unit: money("price_per_unit", &row.price_per_unit)?,
                cost_per_unit: money("cost_per_unit", &row.cost_per_unit)?,
            },
        };

        Ok(Item {
            id: parse_id(ENTITY, &row.id)?,
            store_id: parse_id(ENTITY, &row.store_id)?,
            name: row.name,
            pricing,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_ITEM: &str = r#"
    SELECT id, store_id, name, pricing_mode,
           price_per_kg, cost_per_kg, price_per_unit, cost_per_unit,
           is_deleted, created_at, updated_at
    FROM items
"#;

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets a live item by ID.
    pub async fn get_by_id(&self, id: ItemId) -> DbResult<Option<Item>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id(&mut conn, id).await
    }

    /// Lists the live items of a store, by name.
    pub async fn list_by_store(&self, store_id: StoreId) -> DbResult<Vec<Item>> {
        debug!(store_id = %store_id, "Listing items");

        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "{SELECT_ITEM} WHERE store_id = ?1 AND is_deleted = 0 ORDER BY name"
        ))
        .bind(store_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    /// Inserts an item.
    pub async fn insert(&self, item: &Item) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_with(&mut conn, item).await
    }

    /// Finds a live (not soft-deleted) item.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: ItemId) -> DbResult<Option<Item>> {
        debug!(item_id = %id, "Fetching item");

        let row: Option<ItemRow> = sqlx::query_as(&format!("{SELECT_ITEM} WHERE id = ?1 AND is_deleted = 0"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        row.map(Item::try_from).transpose()
    }

    /// Inserts an item on `conn`, filling the cached per-gram columns for
    /// weight items.
    pub async fn insert_with(conn: &mut SqliteConnection, item: &Item) -> DbResult<()> {
        debug!(item_id = %item.id, name = %item.name, mode = %item.pricing_mode(), "Inserting item");

        validate_name(&item.name)
            .and_then(|()| validate_pricing(&item.pricing))
            .map_err(DbError::invalid("item"))?;

        let text = |m: Money| Some(m.amount().to_string());
        let (per_kg, per_gram, per_unit) = match item.pricing {
            ItemPricing::Weight {
                price_per_kg,
                cost_per_kg,
            } => (
                (text(price_per_kg), text(cost_per_kg)),
                (text(item.pricing.unit_price()), text(item.pricing.unit_cost())),
                (None, None),
            ),
            ItemPricing::Fixed {
                price_per_unit,
                cost_per_unit,
            } => (
                (None, None),
                (None, None),
                (text(price_per_unit), text(cost_per_unit)),
            ),
        };

        sqlx::query(
            r#"
            INSERT INTO items (
                id, store_id, name, pricing_mode,
                price_per_kg, cost_per_kg, price_per_gram, cost_per_gram,
                price_per_unit, cost_per_unit,
                is_deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.store_id.to_string())
        .bind(&item.name)
        .bind(item.pricing_mode().as_str())
        .bind(per_kg.0)
        .bind(per_kg.1)
        .bind(per_gram.0)
        .bind(per_gram.1)
        .bind(per_unit.0)
        .bind(per_unit.1)
        .bind(item.is_deleted)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rust_decimal_macros::dec;
    use stockbook_core::{PlatformCharge, Store};

    async fn setup() -> (Database, Store) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Store::new("Test", PlatformCharge::default(), Utc::now());
        db.stores().insert(&store).await.unwrap();
        (db, store)
    }

    #[tokio::test]
    async fn test_weight_item_roundtrip_and_cached_per_gram() {
        let (db, store) = setup().await;
        let item = Item::new(
            store.id,
            "Almonds",
            ItemPricing::Weight {
                price_per_kg: Money::new(dec!(1250)),
                cost_per_kg: Money::new(dec!(800)),
            },
            Utc::now(),
        );
        db.items().insert(&item).await.unwrap();

        let loaded = db.items().get_by_id(item.id).await.unwrap().unwrap();
        assert_eq!(loaded.pricing, item.pricing);

        let per_gram: String = sqlx::query_scalar("SELECT price_per_gram FROM items WHERE id = ?1")
            .bind(item.id.to_string())
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(per_gram.parse::<rust_decimal::Decimal>().unwrap(), dec!(1.25));
    }

    #[tokio::test]
    async fn test_deleted_items_are_invisible() {
        let (db, store) = setup().await;
        let mut item = Item::new(
            store.id,
            "Old soda",
            ItemPricing::Fixed {
                price_per_unit: Money::new(dec!(50)),
                cost_per_unit: Money::new(dec!(30)),
            },
            Utc::now(),
        );
        item.is_deleted = true;
        db.items().insert(&item).await.unwrap();

        assert!(db.items().get_by_id(item.id).await.unwrap().is_none());
        assert!(db.items().list_by_store(store.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_item_requires_existing_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = Item::new(
            StoreId::new(),
            "Orphan",
            ItemPricing::Fixed {
                price_per_unit: Money::new(dec!(1)),
                cost_per_unit: Money::new(dec!(1)),
            },
            Utc::now(),
        );
        let err = db.items().insert(&item).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_invalid_item_is_not_written() {
        let (db, store) = setup().await;
        let negative_cost = Item::new(
            store.id,
            "Cashews",
            ItemPricing::Weight {
                price_per_kg: Money::new(dec!(1600)),
                cost_per_kg: Money::new(dec!(-1)),
            },
            Utc::now(),
        );
        let err = db.items().insert(&negative_cost).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid { .. }), "{err}");

        let blank = Item::new(
            store.id,
            "  ",
            ItemPricing::Fixed {
                price_per_unit: Money::new(dec!(10)),
                cost_per_unit: Money::new(dec!(5)),
            },
            Utc::now(),
        );
        let err = db.items().insert(&blank).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid { .. }), "{err}");

        assert!(db.items().list_by_store(store.id).await.unwrap().is_empty());
    }
}
