//! Order service.
//!
//! `/api/add_order` follows the configured [`OrderMode`]; the cart form of
//! `/api/update_stock` always decrements stock.

use ims_core::{CartLine, OrderMode, StockLine, StockUpdateOutcome, StockUpdatePolicy};
use ims_db::Database;

use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    mode: OrderMode,
    policy: StockUpdatePolicy,
    customer_id: i64,
}

impl OrderService {
    pub fn new(
        db: Database,
        mode: OrderMode,
        policy: StockUpdatePolicy,
        customer_id: i64,
    ) -> Self {
        OrderService {
            db,
            mode,
            policy,
            customer_id,
        }
    }

    /// Submits a cart in the configured mode.
    pub async fn submit_cart(&self, lines: &[CartLine]) -> ApiResult<Vec<i64>> {
        self.submit_cart_with(lines, self.mode).await
    }

    /// Submits a cart in an explicit mode. All lines succeed or none do.
    pub async fn submit_cart_with(&self, lines: &[CartLine], mode: OrderMode) -> ApiResult<Vec<i64>> {
        Ok(self
            .db
            .orders()
            .submit_cart(lines, mode, self.customer_id)
            .await?)
    }

    /// Applies a stock update under the configured policy.
    pub async fn update_stock(&self, lines: &[StockLine]) -> ApiResult<StockUpdateOutcome> {
        Ok(self
            .db
            .orders()
            .apply_stock_updates(lines, self.policy)
            .await?)
    }
}
