//! # Order Handlers
//!
//! ```text
//! POST /api/update_stock  {"cart": [{"id": 1, "quantity": 2}]}
//!     → submit cart, always decrementing stock
//! POST /api/update_stock  {"products": [{"product_id": 1, "quantity": 2}]}
//!     → stock update under the configured policy
//! POST /api/add_order     {"cart": [{"id": 1, "quantity": 2}]}
//!     → submit cart in the configured order mode
//! ```
//!
//! A body with neither key is treated as an empty cart.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ims_core::{CartLine, OrderMode, StockLine, StockUpdateOutcome};

use crate::error::ApiResult;
use crate::AppState;

const STOCK_UPDATED: &str = "Stock updated successfully.";
const ORDER_PLACED: &str = "Order placed successfully.";

/// Body of `POST /api/update_stock`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStockRequest {
    #[serde(default)]
    pub cart: Option<Vec<CartLine>>,
    #[serde(default)]
    pub products: Option<Vec<StockLine>>,
}

/// Body of `POST /api/add_order`.
#[derive(Debug, Default, Deserialize)]
pub struct AddOrderRequest {
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

/// Success body shared by the order endpoints.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<usize>,
}

impl OrderResponse {
    fn placed(message: &'static str, order_ids: Vec<i64>) -> Self {
        OrderResponse {
            status: "success",
            message,
            order_ids: Some(order_ids),
            applied: None,
            skipped: None,
        }
    }

    fn updated(outcome: StockUpdateOutcome) -> Self {
        OrderResponse {
            status: "success",
            message: STOCK_UPDATED,
            order_ids: None,
            applied: Some(outcome.applied),
            skipped: Some(outcome.skipped),
        }
    }
}

/// `POST /api/update_stock`
pub async fn update_stock(
    State(state): State<AppState>,
    payload: Result<Json<UpdateStockRequest>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let Json(request) = payload?;

    match (request.cart, request.products) {
        (None, Some(products)) => {
            debug!(lines = products.len(), "update_stock: products form");
            let outcome = state.orders.update_stock(&products).await?;
            Ok(Json(OrderResponse::updated(outcome)))
        }
        (cart, _) => {
            let cart = cart.unwrap_or_default();
            debug!(lines = cart.len(), "update_stock: cart form");
            let order_ids = state
                .orders
                .submit_cart_with(&cart, OrderMode::Decrement)
                .await?;
            Ok(Json(OrderResponse::placed(STOCK_UPDATED, order_ids)))
        }
    }
}

/// `POST /api/add_order`
pub async fn add_order(
    State(state): State<AppState>,
    payload: Result<Json<AddOrderRequest>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let Json(request) = payload?;

    let order_ids = state.orders.submit_cart(&request.cart).await?;
    Ok(Json(OrderResponse::placed(ORDER_PLACED, order_ids)))
}
