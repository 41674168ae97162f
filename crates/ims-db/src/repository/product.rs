//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Creation From a QR Payload
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 create_with_receipt(&NewProduct)                        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT INTO products (...)            → pid                          │
//! │    INSERT OR IGNORE INTO purchases       → ingest receipt (qty, supplier)│
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either both rows exist afterwards or neither does.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::purchase::insert_ingest_receipt;
use ims_core::{NewProduct, Product, ProductSummary};

/// Outcome of creating a product from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedProduct {
    pub product_id: i64,

    /// Whether the initial ingest receipt was written.
    pub receipt_recorded: bool,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the catalog projection served by `GET /api/products`, ordered by pid.
    pub async fn list_summaries(&self) -> DbResult<Vec<ProductSummary>> {
        let products = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT pid, description, pname, base_price, quantity
            FROM products
            ORDER BY pid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a full product row by id.
    pub async fn get_by_id(&self, pid: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                pid, category_id, brand_id, pname, model, description, unit,
                base_price, tax, minimum_order, supplier, status, quantity,
                created_at
            FROM products
            WHERE pid = ?1
            "#,
        )
        .bind(pid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by id, failing with `NotFound` when it does not exist.
    pub async fn require(&self, pid: i64) -> DbResult<Product> {
        self.get_by_id(pid)
            .await?
            .ok_or_else(|| DbError::not_found("Product", pid))
    }

    /// Returns the current stock of a product.
    pub async fn stock_of(&self, pid: i64) -> DbResult<Option<i64>> {
        let mut conn = self.pool.acquire().await?;
        stock_of(&mut conn, pid).await
    }

    /// Counts products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts a product together with its initial purchase receipt.
    ///
    /// ## Arguments
    /// * `product` - A payload that already passed `ims_core` validation
    ///
    /// ## Returns
    /// The generated product id and whether the receipt row was written.
    pub async fn create_with_receipt(&self, product: &NewProduct) -> DbResult<CreatedProduct> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let product_id = insert_product(&mut tx, product).await?;
        let receipt_recorded =
            insert_ingest_receipt(&mut tx, product_id, product.supplier, product.quantity).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            product_id,
            name = %product.name,
            quantity = product.quantity,
            receipt_recorded,
            "Product created"
        );

        Ok(CreatedProduct {
            product_id,
            receipt_recorded,
        })
    }
}

/// Inserts a product row on an existing connection and returns its pid.
pub(crate) async fn insert_product(
    conn: &mut SqliteConnection,
    product: &NewProduct,
) -> DbResult<i64> {
    debug!(name = %product.name, model = %product.model, "Inserting product");

    let result = sqlx::query(
        r#"
        INSERT INTO products (
            category_id, brand_id, pname, model, description, unit,
            base_price, tax, minimum_order, supplier, status, quantity
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12
        )
        "#,
    )
    .bind(product.category_id)
    .bind(product.brand_id)
    .bind(&product.name)
    .bind(&product.model)
    .bind(&product.description)
    .bind(&product.unit)
    .bind(product.base_price)
    .bind(product.tax)
    .bind(product.min_order)
    .bind(product.supplier)
    .bind(&product.status)
    .bind(product.quantity)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Reads the stock column of one product on an existing connection.
pub(crate) async fn stock_of(conn: &mut SqliteConnection, pid: i64) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE pid = ?1")
        .bind(pid)
        .fetch_optional(conn)
        .await?;

    Ok(stock)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn widget() -> NewProduct {
        NewProduct {
            category_id: 1,
            brand_id: 1,
            name: "Widget".into(),
            model: "W1".into(),
            description: "d".into(),
            quantity: 10,
            unit: "ea".into(),
            base_price: 5.0,
            tax: 0.1,
            min_order: 1,
            supplier: 2,
            status: "active".into(),
        }
    }

    #[tokio::test]
    async fn test_create_with_receipt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let created = db.products().create_with_receipt(&widget()).await.unwrap();
        assert!(created.receipt_recorded);

        let product = db.products().require(created.product_id).await.unwrap();
        assert_eq!(product.pname, "Widget");
        assert_eq!(product.model, "W1");
        assert_eq!(product.quantity, 10);
        assert_eq!(product.minimum_order, 1);
        assert_eq!(product.supplier, 2);

        let receipts = db.purchases().list_for_product(created.product_id).await.unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].quantity, 10);
        assert_eq!(receipts[0].supplier_id, 2);

        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_summaries_ordered_by_pid() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();

        let first = products.create_with_receipt(&widget()).await.unwrap();
        let second = products
            .create_with_receipt(&NewProduct {
                name: "Gadget".into(),
                quantity: 3,
                ..widget()
            })
            .await
            .unwrap();

        let list = products.list_summaries().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].pid, first.product_id);
        assert_eq!(list[1].pid, second.product_id);
        assert_eq!(list[1].pname, "Gadget");
        assert_eq!(list[1].quantity, 3);
        assert!((list[0].base_price - 5.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.products().get_by_id(42).await.unwrap().is_none());
        assert_eq!(db.products().stock_of(42).await.unwrap(), None);
        assert!(matches!(
            db.products().require(42).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
