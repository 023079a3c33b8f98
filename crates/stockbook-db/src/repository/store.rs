//! # Store Repository
//!
//! Stores are read-only to the engine. `insert` exists for seeding and tests.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::codec::{parse_decimal, parse_id};
use crate::error::{DbError, DbResult};
use stockbook_core::validation::{validate_name, validate_platform_charge};
use stockbook_core::{PlatformCharge, PlatformChargeType, Store, StoreId};

const ENTITY: &str = "Store";

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: String,
    name: String,
    platform_charge_type: String,
    platform_charge_value: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = DbError;

    fn try_from(row: StoreRow) -> DbResult<Self> {
        Ok(Store {
            id: parse_id(ENTITY, &row.id)?,
            name: row.name,
            platform_charge: PlatformCharge {
                charge_type: PlatformChargeType::from(row.platform_charge_type),
                value: parse_decimal(ENTITY, &row.platform_charge_value)?,
            },
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for store database operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    /// Creates a new StoreRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Gets a live store by ID.
    pub async fn get_by_id(&self, id: StoreId) -> DbResult<Option<Store>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id(&mut conn, id).await
    }

    /// Inserts a store.
    pub async fn insert(&self, store: &Store) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_with(&mut conn, store).await
    }

    /// Finds a live (not soft-deleted) store.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: StoreId) -> DbResult<Option<Store>> {
        debug!(store_id = %id, "Fetching store");

        let row: Option<StoreRow> = sqlx::query_as(
            r#"
            SELECT id, name, platform_charge_type, platform_charge_value,
                   is_deleted, created_at, updated_at
            FROM stores
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Store::try_from).transpose()
    }

    /// Inserts a store on `conn`.
    pub async fn insert_with(conn: &mut SqliteConnection, store: &Store) -> DbResult<()> {
        debug!(store_id = %store.id, name = %store.name, "Inserting store");

        validate_name(&store.name)
            .and_then(|()| validate_platform_charge(&store.platform_charge))
            .map_err(DbError::invalid("store"))?;

        sqlx::query(
            r#"
            INSERT INTO stores (
                id, name, platform_charge_type, platform_charge_value,
                is_deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(store.id.to_string())
        .bind(&store.name)
        .bind(store.platform_charge.charge_type.as_str())
        .bind(store.platform_charge.value.to_string())
        .bind(store.is_deleted)
        .bind(store.created_at)
        .bind(store.updated_at)
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

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Store::new(
            "Main Street",
            PlatformCharge {
                charge_type: PlatformChargeType::Fixed,
                value: dec!(5),
            },
            Utc::now(),
        );
        db.stores().insert(&store).await.unwrap();

        let loaded = db.stores().get_by_id(store.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Main Street");
        assert_eq!(loaded.platform_charge.charge_type, PlatformChargeType::Fixed);
        assert_eq!(loaded.platform_charge.value, dec!(5));
    }

    #[tokio::test]
    async fn test_unknown_charge_type_still_loads() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut store = Store::new("Odd", PlatformCharge::default(), Utc::now());
        store.platform_charge.charge_type = PlatformChargeType::Other("tiered".into());
        db.stores().insert(&store).await.unwrap();

        let loaded = db.stores().get_by_id(store.id).await.unwrap().unwrap();
        assert_eq!(
            loaded.platform_charge.charge_type,
            PlatformChargeType::Other("tiered".into())
        );
    }

    #[tokio::test]
    async fn test_invalid_charge_is_not_written() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Store::new(
            "Greedy",
            PlatformCharge {
                charge_type: PlatformChargeType::Percentage,
                value: dec!(150),
            },
            Utc::now(),
        );
        let err = db.stores().insert(&store).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid { .. }), "{err}");
        assert!(db.stores().get_by_id(store.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_store_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.stores().get_by_id(StoreId::new()).await.unwrap().is_none());
    }
}
