//! # Order Repository
//!
//! Cart submission and stock updates. Both run in a single transaction.
//!
//! ## Cart Submission
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     submit_cart(lines, mode, customer)                  │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                                                        │
//! │    SELECT quantity FROM products WHERE pid = ?   (once per product)    │
//! │    plan_cart(lines, stock)        ── any error → drop tx → ROLLBACK    │
//! │    for each planned line:                                               │
//! │      [Decrement] UPDATE products SET quantity = quantity - ?           │
//! │                  WHERE pid = ? AND quantity >= ?                        │
//! │                  0 rows → InsufficientStock → ROLLBACK                  │
//! │      INSERT INTO orders (product_id, total_shipped, customer_id)       │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers queue on SQLite's write lock (up to the busy timeout) instead of
//! failing, so concurrent carts commit one after another. The guarded
//! UPDATE still turns a lost race into `InsufficientStock`.

use std::collections::{HashMap, HashSet};

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::product::stock_of;
use ims_core::cart::{check_cart_size, plan_cart, plan_stock_updates};
use ims_core::{
    CartLine, CoreError, OrderLine, OrderMode, StockLine, StockUpdateOutcome, StockUpdatePolicy,
};

/// Repository for order (shipment line) operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Opens a transaction that holds the write lock from its first
    /// statement. A deferred `BEGIN` would read under a snapshot and then
    /// fail with `SQLITE_BUSY` when upgrading to write, without waiting
    /// out the busy timeout.
    async fn begin_write(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Submits a cart: validates every line, then writes one order line per
    /// cart line (and decrements stock in [`OrderMode::Decrement`]).
    ///
    /// ## Arguments
    /// * `lines` - Cart lines in submission order
    /// * `mode` - Whether stock is decremented now or later via `update_stock`
    /// * `customer_id` - Customer recorded on every order line
    ///
    /// ## Returns
    /// * `Ok(ids)` - Generated order ids, in submission order
    /// * `Err(DbError::Rejected(_))` - Cart rejected; nothing was written
    pub async fn submit_cart(
        &self,
        lines: &[CartLine],
        mode: OrderMode,
        customer_id: i64,
    ) -> DbResult<Vec<i64>> {
        debug!(lines = lines.len(), ?mode, customer_id, "Submitting cart");

        check_cart_size(lines)?;

        let mut tx = self.begin_write().await?;

        let mut stock = HashMap::with_capacity(lines.len());
        for line in lines {
            if stock.contains_key(&line.id) {
                continue;
            }
            if let Some(quantity) = stock_of(&mut tx, line.id).await? {
                stock.insert(line.id, quantity);
            }
        }

        let plan = plan_cart(lines, &stock)?;

        let mut order_ids = Vec::with_capacity(plan.len());
        for line in &plan {
            if mode == OrderMode::Decrement {
                let result = sqlx::query(
                    r#"
                    UPDATE products
                    SET quantity = quantity - ?1
                    WHERE pid = ?2 AND quantity >= ?1
                    "#,
                )
                .bind(line.quantity)
                .bind(line.product_id)
                .execute(&mut *tx)
                .await?;

                if result.rows_affected() == 0 {
                    let available = stock_of(&mut tx, line.product_id).await?.unwrap_or(0);
                    return Err(CoreError::InsufficientStock {
                        product_id: line.product_id,
                        available,
                        requested: line.quantity,
                    }
                    .into());
                }
            }

            let result = sqlx::query(
                r#"
                INSERT INTO orders (product_id, total_shipped, customer_id)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

            order_ids.push(result.last_insert_rowid());
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            lines = order_ids.len(),
            ?mode,
            customer_id,
            "Cart submitted"
        );

        Ok(order_ids)
    }

    /// Applies a stock update: for every valid line, decrement the product's
    /// stock (no floor) and add the quantity to `total_shipped` on the
    /// product's most recent order line.
    ///
    /// Incomplete or unknown lines are skipped or rejected according to
    /// `policy`. Existing order rows are never created here.
    pub async fn apply_stock_updates(
        &self,
        lines: &[StockLine],
        policy: StockUpdatePolicy,
    ) -> DbResult<StockUpdateOutcome> {
        debug!(lines = lines.len(), ?policy, "Applying stock updates");

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let mut tx = self.begin_write().await?;

        let mut known = HashSet::new();
        for id in lines.iter().filter_map(|line| line.product_id) {
            if !known.contains(&id) && stock_of(&mut tx, id).await?.is_some() {
                known.insert(id);
            }
        }

        let plan = plan_stock_updates(lines, policy, |id| known.contains(&id))?;

        for adjustment in &plan.apply {
            sqlx::query("UPDATE products SET quantity = quantity - ?1 WHERE pid = ?2")
                .bind(adjustment.quantity)
                .bind(adjustment.product_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                UPDATE orders
                SET total_shipped = total_shipped + ?1
                WHERE id = (SELECT MAX(id) FROM orders WHERE product_id = ?2)
                "#,
            )
            .bind(adjustment.quantity)
            .bind(adjustment.product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if plan.skipped > 0 {
            warn!(skipped = plan.skipped, "Skipped invalid stock update lines");
        }
        info!(applied = plan.apply.len(), "Stock updated");

        Ok(StockUpdateOutcome {
            applied: plan.apply.len(),
            skipped: plan.skipped,
        })
    }

    /// Lists the order lines recorded against a product, oldest first.
    pub async fn list_for_product(&self, product_id: i64) -> DbResult<Vec<OrderLine>> {
        let orders = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, product_id, total_shipped, customer_id, created_at
            FROM orders
            WHERE product_id = ?1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Counts every order line in the store.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use ims_core::{StartingInventory, ValidationError, MAX_CART_LINES};
    use tempfile::TempDir;

    /// A WAL file database with one product, for tests that need several
    /// pooled connections.
    async fn file_db_with_stock(quantity: i64) -> (TempDir, Database, i64) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("orders.db")))
            .await
            .unwrap();
        let pid = sqlx::query("INSERT INTO products (pname, quantity) VALUES ('Bolt', ?1)")
            .bind(quantity)
            .execute(db.pool())
            .await
            .unwrap()
            .last_insert_rowid();
        (dir, db, pid)
    }

    async fn db_with_stock(levels: &[i64]) -> (Database, Vec<i64>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for (i, quantity) in levels.iter().enumerate() {
            let id = sqlx::query("INSERT INTO products (pname, quantity) VALUES (?1, ?2)")
                .bind(format!("Product {i}"))
                .bind(quantity)
                .execute(db.pool())
                .await
                .unwrap()
                .last_insert_rowid();
            ids.push(id);
        }
        (db, ids)
    }

    async fn stock(db: &Database, pid: i64) -> i64 {
        db.products().stock_of(pid).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_submit_cart_decrements_and_records_lines() {
        let (db, ids) = db_with_stock(&[10, 5]).await;
        let cart = [CartLine::new(ids[0], 3), CartLine::new(ids[1], 5)];

        let order_ids = db
            .orders()
            .submit_cart(&cart, OrderMode::Decrement, 7)
            .await
            .unwrap();

        assert_eq!(order_ids.len(), 2);
        assert!(order_ids[0] < order_ids[1]);
        assert_eq!(stock(&db, ids[0]).await, 7);
        assert_eq!(stock(&db, ids[1]).await, 0);

        let lines = db.orders().list_for_product(ids[0]).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, order_ids[0]);
        assert_eq!(lines[0].total_shipped, 3);
        assert_eq!(lines[0].customer_id, 7);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_everything() {
        let (db, ids) = db_with_stock(&[10]).await;
        let cart = [CartLine::new(ids[0], 2), CartLine::new(999, 1)];

        let err = db
            .orders()
            .submit_cart(&cart, OrderMode::Decrement, 1)
            .await
            .unwrap_err();

        assert_eq!(err.as_rejection(), Some(&CoreError::ProductNotFound(999)));
        assert_eq!(stock(&db, ids[0]).await, 10);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_names_the_product() {
        let (db, ids) = db_with_stock(&[10, 2]).await;
        let cart = [CartLine::new(ids[0], 1), CartLine::new(ids[1], 3)];

        let err = db
            .orders()
            .submit_cart(&cart, OrderMode::Decrement, 1)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("Not enough stock for product ID {}.", ids[1])
        );
        assert_eq!(stock(&db, ids[0]).await, 10);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repeated_lines_share_stock() {
        let (db, ids) = db_with_stock(&[5]).await;
        let cart = [CartLine::new(ids[0], 3), CartLine::new(ids[0], 3)];

        let err = db
            .orders()
            .submit_cart(&cart, OrderMode::Decrement, 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(stock(&db, ids[0]).await, 5);
    }

    #[tokio::test]
    async fn test_cart_shape_errors() {
        let (db, ids) = db_with_stock(&[5]).await;

        let err = db
            .orders()
            .submit_cart(&[], OrderMode::Decrement, 1)
            .await
            .unwrap_err();
        assert_eq!(err.as_rejection(), Some(&CoreError::EmptyCart));

        let oversized = vec![CartLine::new(ids[0], 1); MAX_CART_LINES + 1];
        let err = db
            .orders()
            .submit_cart(&oversized, OrderMode::Decrement, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::CartTooLarge { .. })
        ));

        let err = db
            .orders()
            .submit_cart(&[CartLine::new(ids[0], 0)], OrderMode::Decrement, 1)
            .await
            .unwrap_err();
        assert_eq!(
            err.as_rejection(),
            Some(&CoreError::Validation(ValidationError::must_be_positive(
                "quantity"
            )))
        );
    }

    #[tokio::test]
    async fn test_deferred_mode_leaves_stock() {
        let (db, ids) = db_with_stock(&[4]).await;

        let order_ids = db
            .orders()
            .submit_cart(&[CartLine::new(ids[0], 4)], OrderMode::Deferred, 1)
            .await
            .unwrap();

        assert_eq!(order_ids.len(), 1);
        assert_eq!(stock(&db, ids[0]).await, 4);

        let err = db
            .orders()
            .submit_cart(&[CartLine::new(ids[0], 5)], OrderMode::Deferred, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_rejection(),
            Some(CoreError::InsufficientStock { .. })
        ));
    }

    #[tokio::test]
    async fn test_lenient_stock_update_skips_bad_lines() {
        let (db, ids) = db_with_stock(&[10, 3]).await;
        db.orders()
            .submit_cart(&[CartLine::new(ids[0], 2)], OrderMode::Deferred, 1)
            .await
            .unwrap();

        let lines = [
            StockLine::new(ids[0], 4),
            StockLine::new(ids[1], 0),
            StockLine {
                product_id: None,
                quantity: Some(1),
            },
            StockLine::new(999, 1),
            StockLine::new(ids[1], 5),
        ];

        let outcome = db
            .orders()
            .apply_stock_updates(&lines, StockUpdatePolicy::Lenient)
            .await
            .unwrap();

        assert_eq!(outcome, StockUpdateOutcome { applied: 2, skipped: 3 });
        assert_eq!(stock(&db, ids[0]).await, 6);
        // No floor on update_stock.
        assert_eq!(stock(&db, ids[1]).await, -2);

        let shipped = db.orders().list_for_product(ids[0]).await.unwrap();
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped[0].total_shipped, 6);
        // No order rows are created for products that had none.
        assert!(db.orders().list_for_product(ids[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_update_ships_against_latest_order_only() {
        let (db, ids) = db_with_stock(&[100]).await;
        for _ in 0..3 {
            db.orders()
                .submit_cart(&[CartLine::new(ids[0], 1)], OrderMode::Deferred, 1)
                .await
                .unwrap();
        }

        db.orders()
            .apply_stock_updates(&[StockLine::new(ids[0], 4)], StockUpdatePolicy::Lenient)
            .await
            .unwrap();

        assert_eq!(stock(&db, ids[0]).await, 96);
        let shipped: Vec<i64> = db
            .orders()
            .list_for_product(ids[0])
            .await
            .unwrap()
            .iter()
            .map(|line| line.total_shipped)
            .collect();
        assert_eq!(shipped, vec![1, 1, 5]);

        let report = db
            .inventory()
            .snapshot(StartingInventory::CurrentStock)
            .await
            .unwrap();
        assert_eq!(report[0].inventory_shipped, 7);
    }

    #[tokio::test]
    async fn test_strict_stock_update_rejects_and_rolls_back() {
        let (db, ids) = db_with_stock(&[10]).await;
        let lines = [StockLine::new(ids[0], 4), StockLine::new(999, 1)];

        let err = db
            .orders()
            .apply_stock_updates(&lines, StockUpdatePolicy::Strict)
            .await
            .unwrap_err();

        assert_eq!(err.as_rejection(), Some(&CoreError::ProductNotFound(999)));
        assert_eq!(stock(&db, ids[0]).await, 10);
    }

    #[tokio::test]
    async fn test_empty_stock_update() {
        let (db, _) = db_with_stock(&[]).await;

        let err = db
            .orders()
            .apply_stock_updates(&[], StockUpdatePolicy::Lenient)
            .await
            .unwrap_err();
        assert_eq!(err.as_rejection(), Some(&CoreError::EmptyCart));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_carts_all_commit() {
        let (_dir, db, pid) = file_db_with_stock(1_000).await;

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                let mut results = Vec::new();
                for _ in 0..10 {
                    results.push(
                        db.orders()
                            .submit_cart(&[CartLine::new(pid, 1)], OrderMode::Decrement, 1)
                            .await,
                    );
                }
                results
            }));
        }

        for task in tasks {
            for result in task.await.unwrap() {
                assert!(result.is_ok(), "cart failed: {:?}", result.err());
            }
        }

        assert_eq!(stock(&db, pid).await, 840);
        assert_eq!(db.orders().count().await.unwrap(), 160);
        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_carts_past_stock_are_rejected_not_failed() {
        let (_dir, db, pid) = file_db_with_stock(5).await;

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                db.orders()
                    .submit_cart(&[CartLine::new(pid, 1)], OrderMode::Decrement, 1)
                    .await
            }));
        }

        let mut committed = 0;
        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => committed += 1,
                Err(err) => {
                    assert!(
                        matches!(err.as_rejection(), Some(CoreError::InsufficientStock { .. })),
                        "unexpected error: {err}"
                    );
                    rejected += 1;
                }
            }
        }

        assert_eq!(committed, 5);
        assert_eq!(rejected, 15);
        assert_eq!(stock(&db, pid).await, 0);
        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stock_updates_all_commit() {
        let (_dir, db, pid) = file_db_with_stock(100).await;

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                db.orders()
                    .apply_stock_updates(&[StockLine::new(pid, 2)], StockUpdatePolicy::Strict)
                    .await
            }));
        }

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }

        assert_eq!(stock(&db, pid).await, 80);
        db.close().await;
    }
}
