//! Inventory reconciliation service.

use ims_core::{InventorySnapshot, StartingInventory};
use ims_db::Database;

use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    starting: StartingInventory,
}

impl InventoryService {
    pub fn new(db: Database, starting: StartingInventory) -> Self {
        InventoryService { db, starting }
    }

    /// `starting + received - shipped` for every product, ordered by pid.
    pub async fn get_inventory(&self) -> ApiResult<Vec<InventorySnapshot>> {
        Ok(self.db.inventory().snapshot(self.starting).await?)
    }
}
