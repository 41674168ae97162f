//! Product catalog service.

use ims_core::{NewProduct, Product, ProductSummary};
use ims_db::{CreatedProduct, Database};

use crate::error::ApiResult;

/// Reads the catalog and creates products from decoded payloads.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    /// All products, ordered by pid.
    pub async fn list_products(&self) -> ApiResult<Vec<ProductSummary>> {
        Ok(self.db.products().list_summaries().await?)
    }

    /// One full product row; 404 when it does not exist.
    pub async fn get_product(&self, pid: i64) -> ApiResult<Product> {
        Ok(self.db.products().require(pid).await?)
    }

    /// Inserts a product and its initial purchase receipt in one transaction.
    pub async fn create_product(&self, product: &NewProduct) -> ApiResult<CreatedProduct> {
        Ok(self.db.products().create_with_receipt(product).await?)
    }

    /// Records the initial receipt for an existing product. A second call
    /// for the same product records nothing and returns `false`.
    pub async fn record_initial_receipt(
        &self,
        product_id: i64,
        supplier_id: i64,
        quantity: i64,
    ) -> ApiResult<bool> {
        Ok(self
            .db
            .purchases()
            .record_initial_receipt(product_id, supplier_id, quantity)
            .await?)
    }
}
