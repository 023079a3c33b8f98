//! # Seed Data Generator
//!
//! Populates a database with one store, a mixed catalog and opening stock
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockbook_dev.db
//! cargo run -p stockbook-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockbook-db --bin seed -- --db ./data/stockbook.db
//!
//! # Use a flat per-line platform charge instead of a percentage
//! cargo run -p stockbook-db --bin seed -- --fixed-charge 5
//! ```
//!
//! ## Generated Data
//! - One store, platform charge 2% (or the given flat fee per line)
//! - Weight items (dry fruits, spices) priced per kg, opening stock in grams
//! - Fixed items (packaged goods) priced per unit, opening stock in units
//! - One ledger entry per item on today's UTC date

use chrono::Utc;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use stockbook_core::ledger::{apply_add, open_entry};
use stockbook_core::{Item, ItemPricing, Money, PlatformCharge, PlatformChargeType, Quantity, Store};
use stockbook_db::{Database, DbConfig, ItemRepository, LedgerRepository, StoreRepository};

/// Weight items: (name, price per kg, cost per kg, opening grams)
const WEIGHT_ITEMS: &[(&str, &str, &str, &str)] = &[
    ("Almonds", "1250", "900", "25000"),
    ("Cashews", "1100", "820", "20000"),
    ("Pistachios", "1800", "1350", "8000"),
    ("Walnuts", "1400", "1050", "10000"),
    ("Raisins", "450", "300", "15000"),
    ("Dates", "380", "240", "30000"),
    ("Cardamom", "3200", "2600", "2000"),
    ("Black Pepper", "900", "640", "5000"),
];

/// Fixed items: (name, price per unit, cost per unit, opening units)
const FIXED_ITEMS: &[(&str, &str, &str, &str)] = &[
    ("Gift Box Small", "150", "90", "40"),
    ("Gift Box Large", "350", "210", "25"),
    ("Honey 500g Jar", "280", "200", "30"),
    ("Saffron 1g Pack", "450", "360", "50"),
];

fn dec(s: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(s)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockbook_dev.db");
    let mut charge = PlatformCharge {
        charge_type: PlatformChargeType::Percentage,
        value: Decimal::TWO,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--fixed-charge" => {
                if i + 1 < args.len() {
                    charge = PlatformCharge {
                        charge_type: PlatformChargeType::Fixed,
                        value: dec(&args[i + 1])?,
                    };
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./stockbook_dev.db)");
                println!("      --fixed-charge <N>   Flat platform charge per sale line");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockbook Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let now = Utc::now();
    let today = now.date_naive();
    let store = Store::new("Dev Store", charge, now);

    let mut items = Vec::with_capacity(WEIGHT_ITEMS.len() + FIXED_ITEMS.len());
    for (name, price, cost, opening) in WEIGHT_ITEMS {
        let pricing = ItemPricing::Weight {
            price_per_kg: Money::new(dec(price)?),
            cost_per_kg: Money::new(dec(cost)?),
        };
        items.push((Item::new(store.id, *name, pricing, now), dec(opening)?));
    }
    for (name, price, cost, opening) in FIXED_ITEMS {
        let pricing = ItemPricing::Fixed {
            price_per_unit: Money::new(dec(price)?),
            cost_per_unit: Money::new(dec(cost)?),
        };
        items.push((Item::new(store.id, *name, pricing, now), dec(opening)?));
    }

    let start = std::time::Instant::now();

    let mut tx = db.begin_write().await?;
    StoreRepository::insert_with(tx.conn(), &store).await?;
    for (item, opening) in &items {
        ItemRepository::insert_with(tx.conn(), item).await?;
        let entry = open_entry(item.id, store.id, today, None, now);
        let entry = apply_add(&entry, Quantity::new(*opening))?;
        LedgerRepository::insert(tx.conn(), &entry).await?;
    }
    tx.commit().await?;

    let elapsed = start.elapsed();

    println!();
    println!("✓ Store: {} ({})", store.name, store.id);
    println!("✓ Items: {} with opening stock on {}", items.len(), today);
    println!("  Time: {:.2}s", elapsed.as_secs_f64());

    db.close().await;
    Ok(())
}
