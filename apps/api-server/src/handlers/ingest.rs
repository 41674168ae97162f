//! QR ingestion handler.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use ims_core::NewProduct;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Multipart field carrying the label image.
pub const UPLOAD_FIELD: &str = "qr_code";

/// Success body of `POST /api/add_product`.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub product_id: i64,
    pub purchase_quantity: i64,
    pub product: NewProduct,
}

/// `POST /api/add_product` (multipart, file field `qr_code`)
pub async fn add_product(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        upload = Some((bytes, filename));
        break;
    }

    let (bytes, filename) = match upload {
        Some((bytes, filename)) if !bytes.is_empty() => (bytes, filename),
        _ => {
            return Err(ApiError::bad_request(format!(
                "No file uploaded in field '{UPLOAD_FIELD}'."
            )))
        }
    };

    let outcome = state.ingest.ingest(bytes, filename.as_deref()).await?;

    Ok(Json(IngestResponse {
        status: "success",
        product_id: outcome.product_id,
        purchase_quantity: outcome.purchase_quantity,
        product: outcome.product,
    }))
}
