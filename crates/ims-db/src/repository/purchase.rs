//! # Purchase Repository
//!
//! Stock receipts. Two kinds exist:
//!
//! - `ingest`: the initial stocking recorded when a product is created from
//!   a QR code. The partial unique index `idx_purchases_ingest_once` allows
//!   one per product, and writes use `INSERT OR IGNORE`, so recording it a
//!   second time is a no-op that reports `false`.
//! - `manual`: everything else (seeding, restocks). Unlimited.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use ims_core::Purchase;

/// Repository for purchase receipt operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records the initial (ingest) receipt for a product.
    ///
    /// ## Returns
    /// * `Ok(true)` - A receipt row was inserted
    /// * `Ok(false)` - The product already had its ingest receipt; nothing changed
    pub async fn record_initial_receipt(
        &self,
        product_id: i64,
        supplier_id: i64,
        quantity: i64,
    ) -> DbResult<bool> {
        let mut conn = self.pool.acquire().await?;
        insert_ingest_receipt(&mut conn, product_id, supplier_id, quantity).await
    }

    /// Records a manual receipt and returns its id.
    pub async fn insert_manual(
        &self,
        product_id: i64,
        supplier_id: i64,
        quantity: i64,
    ) -> DbResult<i64> {
        debug!(product_id, supplier_id, quantity, "Inserting manual receipt");

        let result = sqlx::query(
            r#"
            INSERT INTO purchases (supplier_id, product_id, quantity, source)
            VALUES (?1, ?2, ?3, 'manual')
            "#,
        )
        .bind(supplier_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Lists every receipt for a product, oldest first.
    pub async fn list_for_product(&self, product_id: i64) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, supplier_id, product_id, quantity, purchase_date, source
            FROM purchases
            WHERE product_id = ?1
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Counts receipts for a product.
    pub async fn count_for_product(&self, product_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts every receipt in the store.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts the ingest receipt on an existing connection, so product
/// creation can write it inside its own transaction.
pub(crate) async fn insert_ingest_receipt(
    conn: &mut SqliteConnection,
    product_id: i64,
    supplier_id: i64,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO purchases (supplier_id, product_id, quantity, source)
        VALUES (?1, ?2, ?3, 'ingest')
        "#,
    )
    .bind(supplier_id)
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    let recorded = result.rows_affected() > 0;
    debug!(product_id, supplier_id, quantity, recorded, "Ingest receipt");

    Ok(recorded)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use ims_core::ReceiptSource;

    async fn db_with_product() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pid: i64 = sqlx::query("INSERT INTO products (pname, quantity) VALUES ('Bolt', 4)")
            .execute(db.pool())
            .await
            .unwrap()
            .last_insert_rowid();
        (db, pid)
    }

    #[tokio::test]
    async fn test_initial_receipt_is_recorded_once() {
        let (db, pid) = db_with_product().await;
        let purchases = db.purchases();

        assert!(purchases.record_initial_receipt(pid, 2, 10).await.unwrap());
        assert!(!purchases.record_initial_receipt(pid, 2, 10).await.unwrap());
        assert!(!purchases.record_initial_receipt(pid, 3, 99).await.unwrap());

        let rows = purchases.list_for_product(pid).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, 10);
        assert_eq!(rows[0].supplier_id, 2);
        assert_eq!(rows[0].source, ReceiptSource::Ingest);
    }

    #[tokio::test]
    async fn test_manual_receipts_are_unlimited() {
        let (db, pid) = db_with_product().await;
        let purchases = db.purchases();

        purchases.record_initial_receipt(pid, 1, 5).await.unwrap();
        purchases.insert_manual(pid, 1, 3).await.unwrap();
        purchases.insert_manual(pid, 1, 3).await.unwrap();

        assert_eq!(purchases.count_for_product(pid).await.unwrap(), 3);
        assert_eq!(purchases.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_receipt_for_unknown_product_is_rejected() {
        let (db, _) = db_with_product().await;

        let err = db
            .purchases()
            .record_initial_receipt(999, 1, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
