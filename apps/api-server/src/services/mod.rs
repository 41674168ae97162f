//! # Services
//!
//! One service per area of the API. Services own the behaviour switches
//! from [`ServerConfig`](crate::config::ServerConfig) and delegate storage
//! to the `ims-db` repositories, so handlers only translate HTTP.
//!
//! ```text
//! ┌────────────────────┐   ┌────────────────────┐   ┌────────────────────┐
//! │  CatalogService    │   │  OrderService      │   │  InventoryService  │
//! │  list / create     │   │  cart / update     │   │  snapshot          │
//! └─────────▲──────────┘   └────────────────────┘   └────────────────────┘
//!           │
//! ┌─────────┴──────────┐
//! │  IngestService     │  store upload → decode QR → create product
//! └────────────────────┘
//! ```

pub mod catalog;
pub mod ingest;
pub mod inventory;
pub mod orders;

pub use catalog::CatalogService;
pub use ingest::{IngestOutcome, IngestService};
pub use inventory::InventoryService;
pub use orders::OrderService;
