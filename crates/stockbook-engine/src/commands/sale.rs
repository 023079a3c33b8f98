//! # Sale Commands
//!
//! ## Settlement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale(request)                                                   │
//! │                                                                         │
//! │  validate lines + customer            (no transaction yet)             │
//! │       │                                                                 │
//! │  begin_write ───────────────────────────────────────────────────┐      │
//! │       │                                                          │      │
//! │  for each line, in order:                                        │      │
//! │       item (NotFound) ─► price (InvalidInput)                   │      │
//! │       ─► today's entry ─► remove (InsufficientStock) ─► save    │      │
//! │       │                                                          │      │
//! │  total_cost ≤ total (InvalidState)                               │      │
//! │  platform charge (InvalidConfig)                                 │      │
//! │  invoice number ─► insert sale + lines                           │      │
//! │       │                                                          │      │
//! │  commit ◄──── Ok                          Err ────► rollback ◄───┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure on line 3 undoes the deductions of lines 1 and 2 and does not
//! consume an invoice number.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stockbook_core::fee::platform_charge;
use stockbook_core::ledger::apply_remove;
use stockbook_core::pricing::price_request;
use stockbook_core::validation::{validate_customer, validate_sale_lines};
use stockbook_core::{
    CoreError, CustomerInfo, InvoiceNumber, Money, PaymentMode, Sale, SaleId, SaleLine, SaleLineId,
    SaleLineRequest, StoreId, UserId,
};
use stockbook_db::{SaleFilter, SaleRepository, WriteTx};
use tracing::{debug, info};

use super::{require_item, require_store};
use crate::error::{ApiError, ApiResult};
use crate::ledger::{resolve_daily_entry, save_and_cascade};
use crate::Engine;

/// Input of [`Engine::create_sale`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub store_id: StoreId,
    pub user_id: UserId,
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub customer: CustomerInfo,
    pub lines: Vec<SaleLineRequest>,
}

/// Optional filters for [`Engine::list_sales`]. Day bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub user_id: Option<UserId>,
    pub limit: Option<u32>,
}

impl Engine {
    /// Settles a sale: deducts stock for every line, allocates the next
    /// invoice number of the day and records the sale, all or nothing.
    pub async fn create_sale(&self, request: CreateSaleRequest) -> ApiResult<Sale> {
        debug!(
            store_id = %request.store_id,
            user_id = %request.user_id,
            lines = request.lines.len(),
            "create_sale command"
        );

        validate_sale_lines(&request.lines)
            .and_then(|()| validate_customer(&request.customer))
            .map_err(ApiError::from)
            .inspect_err(|e| e.log("create_sale"))?;

        let (mut tx, day, now) = self.begin_write().await.inspect_err(|e| e.log("create_sale"))?;
        let result = settle(&mut tx, &request, day, now).await;
        let sale = tx.finish(result).await.inspect_err(|e| e.log("create_sale"))?;

        info!(
            sale_id = %sale.id,
            invoice = %sale.invoice_number,
            total = %sale.total,
            profit = %sale.profit,
            platform_charge = %sale.platform_charge,
            "Sale completed"
        );
        Ok(sale)
    }

    /// Reads back a committed sale with its line snapshots.
    pub async fn get_sale(&self, sale_id: SaleId) -> ApiResult<Sale> {
        debug!(sale_id = %sale_id, "get_sale command");

        Ok(self
            .db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or(CoreError::SaleNotFound(sale_id))?)
    }

    /// Sales of a store, newest invoice first.
    pub async fn list_sales(&self, store_id: StoreId, query: SaleQuery) -> ApiResult<Vec<Sale>> {
        debug!(store_id = %store_id, ?query, "list_sales command");

        let filter = SaleFilter {
            store_id: Some(store_id),
            user_id: query.user_id,
            from: query.from,
            to: query.to,
            limit: query.limit,
        };
        Ok(self.db.sales().list(&filter).await?)
    }
}

async fn settle(
    tx: &mut WriteTx,
    request: &CreateSaleRequest,
    day: NaiveDate,
    now: DateTime<Utc>,
) -> ApiResult<Sale> {
    let store = require_store(tx, request.store_id).await?;

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut total = Money::zero();
    let mut total_cost = Money::zero();

    for (index, line) in request.lines.iter().enumerate() {
        let item = require_item(tx, line.item_id, store.id).await?;
        let priced = price_request(&item, &line.input_type, line.value)?;

        let entry = resolve_daily_entry(tx, item.id, store.id, day, now).await?;
        let removed = apply_remove(&entry, priced.quantity)?;
        save_and_cascade(tx, &removed, now).await?;

        total = total
            .checked_add(priced.line_total)
            .ok_or_else(|| CoreError::out_of_range("sale total"))?;
        total_cost = total_cost
            .checked_add(priced.line_cost)
            .ok_or_else(|| CoreError::out_of_range("sale cost"))?;
        lines.push(SaleLine {
            id: SaleLineId::new(),
            line_no: (index + 1) as u32,
            item_id: item.id,
            item_name: item.name,
            quantity: priced.quantity,
            unit_price: priced.unit_price,
            line_total: priced.line_total,
        });
    }

    if total_cost > total {
        return Err(CoreError::CostExceedsPrice { total, total_cost }.into());
    }
    let profit = total - total_cost;
    let fee = platform_charge(&store.platform_charge, total, lines.len())?;

    let seq = SaleRepository::next_invoice_number(tx.conn(), day).await?;
    let seq = u32::try_from(seq).map_err(|_| CoreError::InvoiceSequenceExhausted { day })?;
    let invoice_number = InvoiceNumber::new(day, seq)?;

    let sale = Sale {
        id: SaleId::new(),
        store_id: store.id,
        user_id: request.user_id,
        payment_mode: request.payment_mode,
        customer: request.customer.clone(),
        lines,
        total,
        total_cost,
        profit,
        platform_charge: fee,
        invoice_number,
        sale_day: day,
        created_at: now,
    };
    SaleRepository::insert(tx.conn(), &sale).await?;

    Ok(sale)
}
