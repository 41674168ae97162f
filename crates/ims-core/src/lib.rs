//! # ims-core: Pure Business Logic for the Inventory Backend
//!
//! This crate contains the business rules of the inventory backend as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        IMS Architecture                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    /api/products  /api/add_order  /api/inventory  /api/add_...  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ ims-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   cart    │  │ inventory │  │  payload  │  │   │
//! │  │   │  Product  │  │ plan_cart │  │ Snapshot  │  │  QR JSON  │  │   │
//! │  │   │ OrderLine │  │ plan_stock│  │  on_hand  │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ims-db (Database Layer)                      │   │
//! │  │         SQLite queries, migrations, transactions               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, OrderLine, Purchase, etc.)
//! - [`cart`] - Cart and stock-update planning against a stock snapshot
//! - [`inventory`] - On-hand inventory reconciliation
//! - [`payload`] - Parsing of product payloads embedded in QR codes
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use ims_core::cart::plan_cart;
//! use ims_core::CartLine;
//!
//! let stock = HashMap::from([(1, 10), (2, 3)]);
//! let lines = vec![CartLine::new(1, 4), CartLine::new(2, 3)];
//!
//! let plan = plan_cart(&lines, &stock).unwrap();
//! assert_eq!(plan.len(), 2);
//! assert_eq!(plan[0].remaining_stock, 6);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod inventory;
pub mod payload;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::InventorySnapshot;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart submission.
///
/// ## Business Reason
/// Keeps a single submission (and its transaction) to a reasonable size.
pub const MAX_CART_LINES: usize = 100;

/// Customer recorded on order lines when the caller does not identify one.
pub const DEFAULT_CUSTOMER_ID: i64 = 1;
