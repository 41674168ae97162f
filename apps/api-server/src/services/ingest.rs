//! # QR Ingestion Service
//!
//! ```text
//! upload bytes
//!      │
//!      ▼
//! UploadStore::put  ─── <upload_dir>/<sha256>.<ext>
//!      │
//!      ▼
//! spawn_blocking(qr::decode_product)  ─── 400 on unreadable / no code / bad payload
//!      │
//!      ▼
//! CatalogService::create_product  ─── product row + ingest receipt, one transaction
//! ```
//!
//! Nothing reaches the database unless decoding succeeded.

use axum::body::Bytes;
use tracing::info;

use ims_core::NewProduct;

use crate::error::{ApiError, ApiResult};
use crate::qr;
use crate::services::CatalogService;
use crate::storage::UploadStore;

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub product_id: i64,
    pub purchase_quantity: i64,

    /// The decoded payload.
    pub product: NewProduct,
}

#[derive(Debug, Clone)]
pub struct IngestService {
    store: UploadStore,
    catalog: CatalogService,
}

impl IngestService {
    pub fn new(store: UploadStore, catalog: CatalogService) -> Self {
        IngestService { store, catalog }
    }

    /// Stores an uploaded label image, decodes it and creates the product.
    ///
    /// ## Arguments
    /// * `bytes` - Uploaded file content
    /// * `filename` - Client filename; only its extension is kept
    pub async fn ingest(&self, bytes: Bytes, filename: Option<&str>) -> ApiResult<IngestOutcome> {
        let stored = self.store.put(&bytes, filename).await?;

        let product = tokio::task::spawn_blocking(move || qr::decode_product(&bytes))
            .await
            .map_err(|e| ApiError::internal(format!("QR decoding task failed: {e}")))??;

        let created = self.catalog.create_product(&product).await?;

        info!(
            product_id = created.product_id,
            upload = %stored.key,
            quantity = product.quantity,
            receipt_recorded = created.receipt_recorded,
            "Product ingested from QR code"
        );

        Ok(IngestOutcome {
            product_id: created.product_id,
            purchase_quantity: product.quantity,
            product,
        })
    }
}
