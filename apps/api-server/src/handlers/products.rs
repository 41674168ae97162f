//! Catalog handlers.

use axum::extract::State;
use axum::Json;

use ims_core::ProductSummary;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/products`
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductSummary>>> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products))
}
