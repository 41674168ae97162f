//! # Domain Types
//!
//! Core domain types used throughout the inventory backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   OrderLine     │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  pid            │◄──│  product_id     │   │  product_id ───►│ pid   │
//! │  │  pname          │   │  total_shipped  │   │  quantity       │       │
//! │  │  quantity       │   │  customer_id    │   │  source         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   NewProduct    │   │    CartLine     │   │   StockLine     │       │
//! │  │  (QR payload)   │   │  {id, quantity} │   │ {product_id?,   │       │
//! │  │                 │   │                 │   │  quantity?}     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are store-generated integers (`INTEGER PRIMARY KEY`), which
//! is what the HTTP clients send back in carts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Product
// =============================================================================

/// A full product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub pid: i64,
    pub category_id: i64,
    pub brand_id: i64,
    pub pname: String,
    pub model: String,
    pub description: String,
    pub unit: String,
    pub base_price: f64,
    pub tax: f64,
    pub minimum_order: i64,
    pub supplier: i64,
    pub status: String,

    /// Current stock level.
    pub quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// The product projection served by `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductSummary {
    pub pid: i64,
    pub description: String,
    pub pname: String,
    pub base_price: f64,
    pub quantity: i64,
}

/// A product record as carried inside a QR code.
///
/// Field names follow the JSON the labels are printed with, so `name`
/// maps to the `pname` column and `min_order` to `minimum_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub category_id: i64,
    pub brand_id: i64,
    pub name: String,
    pub model: String,
    pub description: String,

    /// Initial stock; also recorded as the initial purchase receipt.
    pub quantity: i64,
    pub unit: String,
    pub base_price: f64,
    pub tax: f64,
    pub min_order: i64,

    /// Supplier id, recorded on the initial purchase receipt as well.
    pub supplier: i64,
    pub status: String,
}

// =============================================================================
// Cart & Stock Lines
// =============================================================================

/// One line of a submitted cart: `{"id": 3, "quantity": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product id.
    pub id: i64,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(id: i64, quantity: i64) -> Self {
        CartLine { id, quantity }
    }
}

/// One line of a stock update: `{"product_id": 3, "quantity": 2}`.
///
/// Both fields are optional on the wire; what happens to incomplete lines
/// is decided by [`StockUpdatePolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLine {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl StockLine {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        StockLine {
            product_id: Some(product_id),
            quantity: Some(quantity),
        }
    }
}

// =============================================================================
// Orders & Purchases
// =============================================================================

/// A shipment line recorded against a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: i64,
    pub product_id: i64,
    pub total_shipped: i64,
    pub customer_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Where a purchase receipt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptSource {
    /// Initial stocking recorded when a product is ingested from a QR code.
    /// At most one per product.
    Ingest,
    /// Any other receipt (seeding, manual restock).
    Manual,
}

/// A record of stock received into inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: i64,
    pub supplier_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    #[ts(as = "String")]
    pub purchase_date: DateTime<Utc>,
    pub source: ReceiptSource,
}

// =============================================================================
// Behaviour Switches
// =============================================================================

/// Whether submitting a cart also decrements stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderMode {
    /// Decrement stock and insert one order line per cart line.
    #[default]
    Decrement,
    /// Insert order lines only; stock is adjusted later via `update_stock`.
    Deferred,
}

/// How `update_stock` treats incomplete or unknown lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockUpdatePolicy {
    /// Skip such lines silently and apply the rest.
    #[default]
    Lenient,
    /// Reject the whole update.
    Strict,
}

/// What counts as a product's starting inventory in reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StartingInventory {
    /// The product's current stock column.
    #[default]
    CurrentStock,
    /// A per-product `MAX(quantity)` sub-query.
    MaxQuantity,
}

/// Result of applying a stock update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockUpdateOutcome {
    pub applied: usize,
    pub skipped: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_line_missing_fields_deserialize_to_none() {
        let line: StockLine = serde_json::from_str(r#"{"quantity": 3}"#).unwrap();
        assert_eq!(line.product_id, None);
        assert_eq!(line.quantity, Some(3));
    }

    #[test]
    fn test_cart_line_requires_both_fields() {
        assert!(serde_json::from_str::<CartLine>(r#"{"id": 1}"#).is_err());
        let line: CartLine = serde_json::from_str(r#"{"id": 1, "quantity": 2}"#).unwrap();
        assert_eq!(line, CartLine::new(1, 2));
    }

    #[test]
    fn test_switch_defaults() {
        assert_eq!(OrderMode::default(), OrderMode::Decrement);
        assert_eq!(StockUpdatePolicy::default(), StockUpdatePolicy::Lenient);
        assert_eq!(StartingInventory::default(), StartingInventory::CurrentStock);
    }

    #[test]
    fn test_switches_use_snake_case() {
        let mode: OrderMode = serde_json::from_str(r#""deferred""#).unwrap();
        assert_eq!(mode, OrderMode::Deferred);

        let start: StartingInventory = serde_json::from_str(r#""max_quantity""#).unwrap();
        assert_eq!(start, StartingInventory::MaxQuantity);
    }
}
