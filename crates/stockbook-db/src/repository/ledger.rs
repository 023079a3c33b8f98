//! # Ledger Repository
//!
//! Persistence for per-item, per-day stock ledger entries.
//!
//! ## Queries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_by_item_and_day ── the live entry on one day (resolver, today)   │
//! │  find_latest_before   ── nearest earlier live entry (carry forward)    │
//! │  find_latest_on_or_before ── what is in stock right now (availability) │
//! │  find_all_after       ── live entries strictly later, ascending        │
//! │                          (cascade input)                               │
//! │  insert / update      ── versioned writes, inside a WriteTx            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optimistic Versioning
//! `update` only matches the row at the version that was read. The write
//! gate already serializes writers, so a mismatch means an entry was changed
//! outside the gate and the whole transaction is abandoned with
//! [`DbError::Conflict`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::codec::{parse_decimal, parse_id};
use crate::error::{DbError, DbResult};
use stockbook_core::{ItemId, LedgerEntry, LedgerEntryId, PricingMode, Quantity, StoreId};

const ENTITY: &str = "LedgerEntry";

#[derive(Debug, sqlx::FromRow)]
struct LedgerRow {
    id: String,
    item_id: String,
    store_id: String,
    day: NaiveDate,
    opening_stock: String,
    added_stock: String,
    removed_stock: String,
    closing_stock: String,
    is_deleted: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = DbError;

    fn try_from(row: LedgerRow) -> DbResult<Self> {
        let qty = |raw: &str| parse_decimal(ENTITY, raw).map(Quantity::new);
        Ok(LedgerEntry {
            id: parse_id(ENTITY, &row.id)?,
            item_id: parse_id(ENTITY, &row.item_id)?,
            store_id: parse_id(ENTITY, &row.store_id)?,
            day: row.day,
            opening_stock: qty(&row.opening_stock)?,
            added_stock: qty(&row.added_stock)?,
            removed_stock: qty(&row.removed_stock)?,
            closing_stock: qty(&row.closing_stock)?,
            is_deleted: row.is_deleted,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_ENTRY: &str = r#"
    SELECT id, item_id, store_id, day,
           opening_stock, added_stock, removed_stock, closing_stock,
           is_deleted, version, created_at, updated_at
    FROM ledger_entries
"#;

fn decode_all(rows: Vec<LedgerRow>) -> DbResult<Vec<LedgerEntry>> {
    rows.into_iter().map(LedgerEntry::try_from).collect()
}

/// One row of the current-stock view: an item and its latest live entry.
#[derive(Debug, Clone)]
pub struct StockLevel {
    pub item_id: ItemId,
    pub item_name: String,
    pub pricing_mode: PricingMode,
    /// Closing balance of the latest live entry, 0 if the item has none.
    pub current_stock: Quantity,
    /// Day of that entry.
    pub last_day: Option<NaiveDate>,
    /// When that entry was last written.
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct StockLevelRow {
    item_id: String,
    item_name: String,
    pricing_mode: String,
    closing_stock: Option<String>,
    day: Option<NaiveDate>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<StockLevelRow> for StockLevel {
    type Error = DbError;

    fn try_from(row: StockLevelRow) -> DbResult<Self> {
        let current_stock = match row.closing_stock.as_deref() {
            Some(raw) => Quantity::new(parse_decimal(ENTITY, raw)?),
            None => Quantity::zero(),
        };
        Ok(StockLevel {
            item_id: parse_id("Item", &row.item_id)?,
            item_name: row.item_name,
            pricing_mode: row
                .pricing_mode
                .parse()
                .map_err(|e| DbError::corrupt("Item", e))?,
            current_stock,
            last_day: row.day,
            last_update: row.updated_at,
        })
    }
}

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Pool reads
    // =========================================================================

    /// Gets a live entry by ID.
    pub async fn get_by_id(&self, id: LedgerEntryId) -> DbResult<Option<LedgerEntry>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id(&mut conn, id).await
    }

    /// The latest live entry on or before `day`.
    pub async fn latest_on_or_before(
        &self,
        item_id: ItemId,
        store_id: StoreId,
        day: NaiveDate,
    ) -> DbResult<Option<LedgerEntry>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_latest_on_or_before(&mut conn, item_id, store_id, day).await
    }

    /// Live entries of a store between `from` and `to` inclusive, optionally
    /// for one item, ordered by item then day.
    pub async fn history(
        &self,
        store_id: StoreId,
        item_id: Option<ItemId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<LedgerEntry>> {
        debug!(store_id = %store_id, ?item_id, %from, %to, "Fetching stock history");

        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            r#"{SELECT_ENTRY}
            WHERE store_id = ?1
              AND (?2 IS NULL OR item_id = ?2)
              AND day >= ?3 AND day <= ?4
              AND is_deleted = 0
            ORDER BY item_id, day"#
        ))
        .bind(store_id.to_string())
        .bind(item_id.map(|id| id.to_string()))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    /// Every live entry of one item, ascending by day.
    pub async fn chain(&self, item_id: ItemId, store_id: StoreId) -> DbResult<Vec<LedgerEntry>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            "{SELECT_ENTRY} WHERE item_id = ?1 AND store_id = ?2 AND is_deleted = 0 ORDER BY day"
        ))
        .bind(item_id.to_string())
        .bind(store_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    /// Current stock of every live item in a store.
    ///
    /// Items that never had a movement report zero with no last update.
    pub async fn current_stock(&self, store_id: StoreId) -> DbResult<Vec<StockLevel>> {
        debug!(store_id = %store_id, "Fetching current stock");

        let rows: Vec<StockLevelRow> = sqlx::query_as(
            r#"
            SELECT i.id AS item_id,
                   i.name AS item_name,
                   i.pricing_mode AS pricing_mode,
                   l.closing_stock AS closing_stock,
                   l.day AS day,
                   l.updated_at AS updated_at
            FROM items i
            LEFT JOIN ledger_entries l ON l.id = (
                SELECT id FROM ledger_entries
                WHERE item_id = i.id AND store_id = ?1 AND is_deleted = 0
                ORDER BY day DESC
                LIMIT 1
            )
            WHERE i.store_id = ?1 AND i.is_deleted = 0
            ORDER BY i.name
            "#,
        )
        .bind(store_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StockLevel::try_from).collect()
    }

    // =========================================================================
    // Connection-scoped queries (use inside a WriteTx)
    // =========================================================================

    /// Finds a live entry by ID.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: LedgerEntryId) -> DbResult<Option<LedgerEntry>> {
        debug!(entry_id = %id, "Fetching ledger entry");

        let row: Option<LedgerRow> = sqlx::query_as(&format!("{SELECT_ENTRY} WHERE id = ?1 AND is_deleted = 0"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        row.map(LedgerEntry::try_from).transpose()
    }

    /// Finds the live entry of an item on one day.
    pub async fn find_by_item_and_day(
        conn: &mut SqliteConnection,
        item_id: ItemId,
        store_id: StoreId,
        day: NaiveDate,
    ) -> DbResult<Option<LedgerEntry>> {
        debug!(item_id = %item_id, %day, "Fetching ledger entry for day");

        let row: Option<LedgerRow> = sqlx::query_as(&format!(
            "{SELECT_ENTRY} WHERE item_id = ?1 AND store_id = ?2 AND day = ?3 AND is_deleted = 0"
        ))
        .bind(item_id.to_string())
        .bind(store_id.to_string())
        .bind(day)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(LedgerEntry::try_from).transpose()
    }

    /// Finds the nearest live entry strictly before `day`.
    pub async fn find_latest_before(
        conn: &mut SqliteConnection,
        item_id: ItemId,
        store_id: StoreId,
        day: NaiveDate,
    ) -> DbResult<Option<LedgerEntry>> {
        let row: Option<LedgerRow> = sqlx::query_as(&format!(
            r#"{SELECT_ENTRY}
            WHERE item_id = ?1 AND store_id = ?2 AND day < ?3 AND is_deleted = 0
            ORDER BY day DESC
            LIMIT 1"#
        ))
        .bind(item_id.to_string())
        .bind(store_id.to_string())
        .bind(day)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(LedgerEntry::try_from).transpose()
    }

    /// Finds the latest live entry on or before `day`.
    pub async fn find_latest_on_or_before(
        conn: &mut SqliteConnection,
        item_id: ItemId,
        store_id: StoreId,
        day: NaiveDate,
    ) -> DbResult<Option<LedgerEntry>> {
        let row: Option<LedgerRow> = sqlx::query_as(&format!(
            r#"{SELECT_ENTRY}
            WHERE item_id = ?1 AND store_id = ?2 AND day <= ?3 AND is_deleted = 0
            ORDER BY day DESC
            LIMIT 1"#
        ))
        .bind(item_id.to_string())
        .bind(store_id.to_string())
        .bind(day)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(LedgerEntry::try_from).transpose()
    }

    /// Finds every live entry strictly after `day`, ascending.
    pub async fn find_all_after(
        conn: &mut SqliteConnection,
        item_id: ItemId,
        store_id: StoreId,
        day: NaiveDate,
    ) -> DbResult<Vec<LedgerEntry>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(&format!(
            r#"{SELECT_ENTRY}
            WHERE item_id = ?1 AND store_id = ?2 AND day > ?3 AND is_deleted = 0
            ORDER BY day ASC"#
        ))
        .bind(item_id.to_string())
        .bind(store_id.to_string())
        .bind(day)
        .fetch_all(&mut *conn)
        .await?;

        decode_all(rows)
    }

    /// Inserts a new entry.
    ///
    /// A second live entry for the same item and day violates
    /// `uq_ledger_live_day` and fails with [`DbError::UniqueViolation`].
    pub async fn insert(conn: &mut SqliteConnection, entry: &LedgerEntry) -> DbResult<()> {
        debug!(
            entry_id = %entry.id,
            item_id = %entry.item_id,
            day = %entry.day,
            opening = %entry.opening_stock,
            "Inserting ledger entry"
        );

        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id, item_id, store_id, day,
                opening_stock, added_stock, removed_stock, closing_stock,
                is_deleted, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.item_id.to_string())
        .bind(entry.store_id.to_string())
        .bind(entry.day)
        .bind(entry.opening_stock.value().to_string())
        .bind(entry.added_stock.value().to_string())
        .bind(entry.removed_stock.value().to_string())
        .bind(entry.closing_stock.value().to_string())
        .bind(entry.is_deleted)
        .bind(entry.version)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Writes an entry's balances and delete flag, guarded by its version.
    ///
    /// ## Returns
    /// The entry as stored: `version + 1`, `updated_at = now`.
    pub async fn update(
        conn: &mut SqliteConnection,
        entry: &LedgerEntry,
        now: DateTime<Utc>,
    ) -> DbResult<LedgerEntry> {
        debug!(
            entry_id = %entry.id,
            version = entry.version,
            closing = %entry.closing_stock,
            deleted = entry.is_deleted,
            "Updating ledger entry"
        );

        let result = sqlx::query(
            r#"
            UPDATE ledger_entries SET
                opening_stock = ?3,
                added_stock = ?4,
                removed_stock = ?5,
                closing_stock = ?6,
                is_deleted = ?7,
                version = version + 1,
                updated_at = ?8
            WHERE id = ?1 AND version = ?2
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.version)
        .bind(entry.opening_stock.value().to_string())
        .bind(entry.added_stock.value().to_string())
        .bind(entry.removed_stock.value().to_string())
        .bind(entry.closing_stock.value().to_string())
        .bind(entry.is_deleted)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::conflict(ENTITY, entry.id));
        }

        Ok(LedgerEntry {
            version: entry.version + 1,
            updated_at: now,
            ..entry.clone()
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
