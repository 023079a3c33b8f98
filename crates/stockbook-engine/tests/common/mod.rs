//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use stockbook_core::{
    Clock, Item, ItemPricing, ManualClock, Money, PlatformCharge, Quantity, SaleLineRequest, Store,
};
use stockbook_db::{Database, DbConfig};
use stockbook_engine::{CreateSaleRequest, Engine};

pub struct Fixture {
    pub engine: Engine,
    pub clock: Arc<ManualClock>,
    pub store: Store,
}

/// 2026-03-02 10:00 UTC.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

pub fn start_day() -> NaiveDate {
    start().date_naive()
}

pub fn q(value: Decimal) -> Quantity {
    Quantity::new(value)
}

pub fn m(value: Decimal) -> Money {
    Money::new(value)
}

/// In-memory engine on a UTC business day, with one store charging nothing.
pub async fn fixture() -> Fixture {
    fixture_with_charge(PlatformCharge::default()).await
}

pub async fn fixture_with_charge(charge: PlatformCharge) -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    fixture_on(db, charge).await
}

pub async fn fixture_on(db: Database, charge: PlatformCharge) -> Fixture {
    let store = Store::new("Test Store", charge, start());
    db.stores().insert(&store).await.unwrap();

    let clock = Arc::new(ManualClock::new(start()));
    let engine = Engine::new(
        db,
        clock.clone() as Arc<dyn Clock>,
        FixedOffset::east_opt(0).unwrap(),
    );

    Fixture { engine, clock, store }
}

impl Fixture {
    pub async fn weight_item(&self, name: &str, per_kg: Decimal, cost_per_kg: Decimal) -> Item {
        self.insert_item(
            name,
            ItemPricing::Weight {
                price_per_kg: m(per_kg),
                cost_per_kg: m(cost_per_kg),
            },
        )
        .await
    }

    pub async fn fixed_item(&self, name: &str, per_unit: Decimal, cost_per_unit: Decimal) -> Item {
        self.insert_item(
            name,
            ItemPricing::Fixed {
                price_per_unit: m(per_unit),
                cost_per_unit: m(cost_per_unit),
            },
        )
        .await
    }

    async fn insert_item(&self, name: &str, pricing: ItemPricing) -> Item {
        let item = Item::new(self.store.id, name, pricing, start());
        self.engine.database().items().insert(&item).await.unwrap();
        item
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    pub async fn stock_of(&self, item: &Item) -> Quantity {
        self.engine
            .check_availability(item.id, self.store.id)
            .await
            .unwrap()
            .available_quantity
    }

    pub fn sale(&self, lines: Vec<SaleLineRequest>) -> CreateSaleRequest {
        CreateSaleRequest {
            store_id: self.store.id,
            user_id: stockbook_core::UserId::new(),
            payment_mode: stockbook_core::PaymentMode::Cash,
            customer: Default::default(),
            lines,
        }
    }
}

pub fn line(item: &Item, input_type: &str, value: Decimal) -> SaleLineRequest {
    SaleLineRequest {
        item_id: item.id,
        input_type: input_type.to_string(),
        value,
    }
}
