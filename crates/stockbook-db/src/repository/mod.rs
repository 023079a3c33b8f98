//! # Repository Module
//!
//! Database repository implementations for Stockbook.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Read path (pooled)                 Write path (inside WriteTx)         │
//! │                                                                         │
//! │  db.ledger().history(..)            let mut tx = db.begin_write()?;     │
//! │  db.sales().list(..)                LedgerRepository::update(           │
//! │       │                                 tx.conn(), &entry, now)         │
//! │       │ acquire()                   SaleRepository::insert(             │
//! │       ▼                                 tx.conn(), &sale)               │
//! │  associated fn(&mut conn, ..)       tx.commit()                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is an associated function taking `&mut SqliteConnection`, so
//! the same SQL serves both paths. The `&self` methods are pool shortcuts.
//!
//! ## Available Repositories
//!
//! - [`StoreRepository`](store::StoreRepository) - Store lookup and platform charge
//! - [`ItemRepository`](item::ItemRepository) - Item catalog by pricing mode
//! - [`LedgerRepository`](ledger::LedgerRepository) - Daily stock ledger, current stock, history
//! - [`SaleRepository`](sale::SaleRepository) - Sales, line snapshots, invoice counter

pub mod item;
pub mod ledger;
pub mod sale;
pub mod store;
