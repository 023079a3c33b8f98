//! # Sale Repository
//!
//! Database operations for sales, their line snapshots and the per-day
//! invoice counter.
//!
//! ## Sale Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   One WriteTx, in this order                            │
//! │                                                                         │
//! │  1. ledger updates for every line (LedgerRepository)                   │
//! │                                                                         │
//! │  2. next_invoice_number(day)                                           │
//! │     └── INSERT ... ON CONFLICT DO UPDATE ... RETURNING last_seq        │
//! │         (seeded from MAX(existing invoices) the first time a day       │
//! │          is seen)                                                      │
//! │                                                                         │
//! │  3. insert(sale)                                                       │
//! │     └── sales row + one sale_items row per line                        │
//! │                                                                         │
//! │  Any failure rolls back all three: no stock moves, the counter does    │
//! │  not advance, no sale row exists.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable. There is no update or delete here.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::codec::{parse_decimal, parse_id};
use crate::error::{DbError, DbResult};
use stockbook_core::{
    CustomerInfo, InvoiceNumber, Money, Quantity, Sale, SaleId, SaleLine, StoreId, UserId,
};

const ENTITY: &str = "Sale";

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    store_id: String,
    user_id: String,
    payment_mode: String,
    customer_name: Option<String>,
    mobile: Option<String>,
    total: String,
    total_cost: String,
    profit: String,
    platform_charge: String,
    invoice_number: String,
    sale_day: NaiveDate,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    id: String,
    line_no: i64,
    item_id: String,
    name_snapshot: String,
    quantity: String,
    unit_price: String,
    line_total: String,
}

impl TryFrom<SaleLineRow> for SaleLine {
    type Error = DbError;

    fn try_from(row: SaleLineRow) -> DbResult<Self> {
        Ok(SaleLine {
            id: parse_id(ENTITY, &row.id)?,
            line_no: u32::try_from(row.line_no).map_err(|e| DbError::corrupt(ENTITY, e))?,
            item_id: parse_id(ENTITY, &row.item_id)?,
            item_name: row.name_snapshot,
            quantity: Quantity::new(parse_decimal(ENTITY, &row.quantity)?),
            unit_price: Money::new(parse_decimal(ENTITY, &row.unit_price)?),
            line_total: Money::new(parse_decimal(ENTITY, &row.line_total)?),
        })
    }
}

impl SaleRow {
    fn into_sale(self, lines: Vec<SaleLine>) -> DbResult<Sale> {
        let money = |raw: &str| parse_decimal(ENTITY, raw).map(Money::new);
        Ok(Sale {
            id: parse_id(ENTITY, &self.id)?,
            store_id: parse_id(ENTITY, &self.store_id)?,
            user_id: parse_id(ENTITY, &self.user_id)?,
            payment_mode: self
                .payment_mode
                .parse()
                .map_err(|e| DbError::corrupt(ENTITY, e))?,
            customer: CustomerInfo {
                customer_name: self.customer_name,
                mobile: self.mobile,
            },
            lines,
            total: money(&self.total)?,
            total_cost: money(&self.total_cost)?,
            profit: money(&self.profit)?,
            platform_charge: money(&self.platform_charge)?,
            invoice_number: self
                .invoice_number
                .parse()
                .map_err(|e| DbError::corrupt(ENTITY, e))?,
            sale_day: self.sale_day,
            created_at: self.created_at,
        })
    }
}

const SELECT_SALE: &str = r#"
    SELECT id, store_id, user_id, payment_mode, customer_name, mobile,
           total, total_cost, profit, platform_charge,
           invoice_number, sale_day, created_at
    FROM sales
"#;

/// Filter for [`SaleRepository::list`]. Day bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub store_id: Option<StoreId>,
    pub user_id: Option<UserId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its lines.
    pub async fn get_by_id(&self, id: SaleId) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id(&mut conn, id).await
    }

    /// Gets a sale by its invoice number.
    pub async fn get_by_invoice(&self, invoice: &InvoiceNumber) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} WHERE invoice_number = ?1"))
            .bind(invoice.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => {
                let lines = Self::find_lines(&mut conn, &row.id).await?;
                row.into_sale(lines).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Lists sales newest first.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(?filter, "Listing sales");

        let mut conn = self.pool.acquire().await?;

        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            r#"{SELECT_SALE}
            WHERE (?1 IS NULL OR store_id = ?1)
              AND (?2 IS NULL OR user_id = ?2)
              AND (?3 IS NULL OR sale_day >= ?3)
              AND (?4 IS NULL OR sale_day <= ?4)
            ORDER BY invoice_number DESC
            LIMIT ?5"#
        ))
        .bind(filter.store_id.map(|id| id.to_string()))
        .bind(filter.user_id.map(|id| id.to_string()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit.map(i64::from).unwrap_or(-1))
        .fetch_all(&mut *conn)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = Self::find_lines(&mut conn, &row.id).await?;
            sales.push(row.into_sale(lines)?);
        }
        Ok(sales)
    }

    // =========================================================================
    // Connection-scoped queries (use inside a WriteTx)
    // =========================================================================

    /// Finds a sale with its lines.
    pub async fn find_by_id(conn: &mut SqliteConnection, id: SaleId) -> DbResult<Option<Sale>> {
        debug!(sale_id = %id, "Fetching sale");

        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => {
                let lines = Self::find_lines(&mut *conn, &row.id).await?;
                row.into_sale(lines).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn find_lines(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let rows: Vec<SaleLineRow> = sqlx::query_as(
            r#"
            SELECT id, line_no, item_id, name_snapshot, quantity, unit_price, line_total
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(SaleLine::try_from).collect()
    }

    /// Allocates the next invoice sequence for `day`.
    ///
    /// The counter row is created on first use, seeded from the highest
    /// sequence already present in `sales` for that day, so a counter table
    /// added to an existing database continues the sequence.
    ///
    /// Must run inside the same transaction as the sale insert.
    pub async fn next_invoice_number(conn: &mut SqliteConnection, day: NaiveDate) -> DbResult<i64> {
        let seq: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO invoice_counters (day, last_seq)
            VALUES (
                ?1,
                COALESCE(
                    (SELECT MAX(CAST(substr(invoice_number, 9) AS INTEGER))
                     FROM sales WHERE sale_day = ?1),
                    0
                ) + 1
            )
            ON CONFLICT(day) DO UPDATE SET last_seq = last_seq + 1
            RETURNING last_seq
            "#,
        )
        .bind(day)
        .fetch_one(&mut *conn)
        .await?;

        debug!(%day, seq, "Allocated invoice sequence");
        Ok(seq)
    }

    /// Inserts a sale and its lines.
    pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(
            sale_id = %sale.id,
            invoice = %sale.invoice_number,
            lines = sale.lines.len(),
            total = %sale.total,
            "Inserting sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, store_id, user_id, payment_mode, customer_name, mobile,
                total, total_cost, profit, platform_charge,
                invoice_number, sale_day, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(sale.id.to_string())
        .bind(sale.store_id.to_string())
        .bind(sale.user_id.to_string())
        .bind(sale.payment_mode.as_str())
        .bind(sale.customer.customer_name.as_deref())
        .bind(sale.customer.mobile.as_deref())
        .bind(sale.total.amount().to_string())
        .bind(sale.total_cost.amount().to_string())
        .bind(sale.profit.amount().to_string())
        .bind(sale.platform_charge.amount().to_string())
        .bind(sale.invoice_number.to_string())
        .bind(sale.sale_day)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

        for line in &sale.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, line_no, item_id, name_snapshot,
                    quantity, unit_price, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(line.id.to_string())
            .bind(sale.id.to_string())
            .bind(i64::from(line.line_no))
            .bind(line.item_id.to_string())
            .bind(&line.item_name)
            .bind(line.quantity.value().to_string())
            .bind(line.unit_price.amount().to_string())
            .bind(line.line_total.amount().to_string())
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rust_decimal_macros::dec;
    use stockbook_core::{Item, ItemPricing, PaymentMode, PlatformCharge, SaleLineId, Store};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    async fn setup() -> (Database, Store, Item) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Store::new("Test", PlatformCharge::default(), Utc::now());
        db.stores().insert(&store).await.unwrap();
        let item = Item::new(
            store.id,
            "Cola 500ml",
            ItemPricing::Fixed {
                price_per_unit: Money::new(dec!(40)),
                cost_per_unit: Money::new(dec!(30)),
            },
            Utc::now(),
        );
        db.items().insert(&item).await.unwrap();
        (db, store, item)
    }

    fn sale(store: &Store, item: &Item, invoice: InvoiceNumber) -> Sale {
        let line_total = Money::new(dec!(80));
        Sale {
            id: SaleId::new(),
            store_id: store.id,
            user_id: UserId::new(),
            payment_mode: PaymentMode::Cash,
            customer: CustomerInfo {
                customer_name: Some("Asha".into()),
                mobile: None,
            },
            lines: vec![SaleLine {
                id: SaleLineId::new(),
                line_no: 1,
                item_id: item.id,
                item_name: item.name.clone(),
                quantity: Quantity::new(dec!(2)),
                unit_price: Money::new(dec!(40)),
                line_total,
            }],
            total: line_total,
            total_cost: Money::new(dec!(60)),
            profit: Money::new(dec!(20)),
            platform_charge: Money::zero(),
            invoice_number: invoice.clone(),
            sale_day: invoice.day(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_counter_starts_at_one_and_is_per_day() {
        let (db, _store, _item) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(SaleRepository::next_invoice_number(&mut conn, day(1)).await.unwrap(), 1);
        assert_eq!(SaleRepository::next_invoice_number(&mut conn, day(1)).await.unwrap(), 2);
        assert_eq!(SaleRepository::next_invoice_number(&mut conn, day(2)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_counter_continues_from_existing_sales() {
        let (db, store, item) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        // A sale written before the counter row existed.
        let old = sale(&store, &item, InvoiceNumber::new(day(3), 41).unwrap());
        SaleRepository::insert(&mut conn, &old).await.unwrap();

        assert_eq!(SaleRepository::next_invoice_number(&mut conn, day(3)).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_insert_and_load_with_lines() {
        let (db, store, item) = setup().await;
        let s = sale(&store, &item, InvoiceNumber::new(day(4), 1).unwrap());
        let mut conn = db.pool().acquire().await.unwrap();
        SaleRepository::insert(&mut conn, &s).await.unwrap();
        drop(conn);

        let loaded = db.sales().get_by_id(s.id).await.unwrap().unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.invoice_number.to_string(), "20260504000001");

        let by_invoice = db.sales().get_by_invoice(&s.invoice_number).await.unwrap().unwrap();
        assert_eq!(by_invoice.id, s.id);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_rejected() {
        let (db, store, item) = setup().await;
        let invoice = InvoiceNumber::new(day(5), 7).unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        SaleRepository::insert(&mut conn, &sale(&store, &item, invoice.clone())).await.unwrap();

        let err = SaleRepository::insert(&mut conn, &sale(&store, &item, invoice))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_day_and_orders_newest_first() {
        let (db, store, item) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();
        for (d, seq) in [(1, 1), (2, 1), (2, 2), (9, 1)] {
            let s = sale(&store, &item, InvoiceNumber::new(day(d), seq).unwrap());
            SaleRepository::insert(&mut conn, &s).await.unwrap();
        }
        drop(conn);

        let filter = SaleFilter {
            store_id: Some(store.id),
            from: Some(day(2)),
            to: Some(day(8)),
            ..Default::default()
        };
        let sales = db.sales().list(&filter).await.unwrap();
        let invoices: Vec<String> = sales.iter().map(|s| s.invoice_number.to_string()).collect();
        assert_eq!(invoices, vec!["20260502000002", "20260502000001"]);
        assert!(sales.iter().all(|s| s.lines.len() == 1));

        let limited = db
            .sales()
            .list(&SaleFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].invoice_number.to_string(), "20260509000001");
    }
}
