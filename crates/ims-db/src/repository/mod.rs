//! # Repository Module
//!
//! Database repository implementations for the inventory store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  ims-api service                                                       │
//! │       │                                                                 │
//! │       │  db.orders().submit_cart(&cart, mode, customer_id)             │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── BEGIN                                                             │
//! │  ├── read stock for the cart's products                                │
//! │  ├── ims_core::cart::plan_cart (pure validation)                       │
//! │  ├── UPDATE products / INSERT INTO orders per line                     │
//! │  └── COMMIT (an early return drops the transaction → ROLLBACK)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog reads, product creation from QR payloads
//! - [`order::OrderRepository`] - Cart submission and stock updates
//! - [`purchase::PurchaseRepository`] - Stock receipts
//! - [`inventory::InventoryRepository`] - Reconciliation report

pub mod inventory;
pub mod order;
pub mod product;
pub mod purchase;
