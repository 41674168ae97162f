//! # Inventory Repository
//!
//! Reads the per-product totals behind `GET /api/inventory`.
//!
//! Received and shipped totals come from independent correlated
//! sub-queries. Joining `purchases` and `orders` onto `products` in one
//! pass would multiply each purchase by the number of order rows (and
//! vice versa).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use ims_core::inventory::InventoryTotals;
use ims_core::{InventorySnapshot, StartingInventory};

/// Repository for inventory reconciliation.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Computes one snapshot per product, ordered by pid.
    ///
    /// Products without purchases or orders report 0 received / 0 shipped.
    pub async fn snapshot(&self, starting: StartingInventory) -> DbResult<Vec<InventorySnapshot>> {
        let sql = format!(
            r#"
            SELECT
                p.pid AS pid,
                p.pname AS product_name,
                {starting} AS starting_inventory,
                COALESCE(
                    (SELECT SUM(pu.quantity) FROM purchases pu WHERE pu.product_id = p.pid),
                    0
                ) AS inventory_received,
                COALESCE(
                    (SELECT SUM(o.total_shipped) FROM orders o WHERE o.product_id = p.pid),
                    0
                ) AS inventory_shipped
            FROM products p
            ORDER BY p.pid
            "#,
            starting = starting_expr(starting)
        );

        let totals = sqlx::query_as::<_, InventoryTotals>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(products = totals.len(), ?starting, "Inventory computed");

        Ok(totals.into_iter().map(InventorySnapshot::from).collect())
    }
}

/// SQL for the starting-inventory column. Both variants are fixed strings.
fn starting_expr(starting: StartingInventory) -> &'static str {
    match starting {
        StartingInventory::CurrentStock => "p.quantity",
        StartingInventory::MaxQuantity => {
            "(SELECT MAX(px.quantity) FROM products px WHERE px.pid = p.pid)"
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
