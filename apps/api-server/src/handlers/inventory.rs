//! Inventory reconciliation handler.

use axum::extract::State;
use axum::Json;

use ims_core::InventorySnapshot;

use crate::error::ApiResult;
use crate::AppState;

/// `GET /api/inventory`
///
/// One row per product: `{pid, product_name, starting_inventory,
/// inventory_received, inventory_shipped, inventory_on_hand}`.
pub async fn get_inventory(State(state): State<AppState>) -> ApiResult<Json<Vec<InventorySnapshot>>> {
    let report = state.inventory.get_inventory().await?;
    Ok(Json(report))
}
