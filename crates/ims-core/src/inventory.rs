//! # Inventory Reconciliation
//!
//! On-hand inventory is a read-time projection, never stored:
//!
//! ```text
//! on_hand = starting + Σ purchases.quantity − Σ orders.total_shipped
//! ```
//!
//! The store aggregates the three inputs per product ([`InventoryTotals`]);
//! this module turns them into the snapshot served by `GET /api/inventory`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Aggregated inputs for one product, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryTotals {
    pub pid: i64,
    pub product_name: String,
    pub starting_inventory: i64,
    pub inventory_received: i64,
    pub inventory_shipped: i64,
}

/// Per-product inventory position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySnapshot {
    pub pid: i64,
    pub product_name: String,
    pub starting_inventory: i64,
    pub inventory_received: i64,
    pub inventory_shipped: i64,
    pub inventory_on_hand: i64,
}

impl InventorySnapshot {
    /// Builds a snapshot, deriving the on-hand quantity.
    pub fn new(
        pid: i64,
        product_name: impl Into<String>,
        starting: i64,
        received: i64,
        shipped: i64,
    ) -> Self {
        InventorySnapshot {
            pid,
            product_name: product_name.into(),
            starting_inventory: starting,
            inventory_received: received,
            inventory_shipped: shipped,
            inventory_on_hand: on_hand(starting, received, shipped),
        }
    }
}

impl From<InventoryTotals> for InventorySnapshot {
    fn from(totals: InventoryTotals) -> Self {
        InventorySnapshot::new(
            totals.pid,
            totals.product_name,
            totals.starting_inventory,
            totals.inventory_received,
            totals.inventory_shipped,
        )
    }
}

/// `starting + received − shipped`, saturating instead of overflowing.
#[inline]
pub fn on_hand(starting: i64, received: i64, shipped: i64) -> i64 {
    starting.saturating_add(received).saturating_sub(shipped)
}
