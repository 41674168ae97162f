//! # HTTP Handlers
//!
//! Thin axum handlers: extract, call a service, wrap the result in JSON.
//! Extractor rejections are taken as `Result<_, _>` so malformed bodies
//! produce the same `{status, message}` error body as everything else.
//!
//! | Route                    | Handler                          |
//! |--------------------------|----------------------------------|
//! | `GET  /api/products`     | [`products::list_products`]      |
//! | `GET  /api/inventory`    | [`inventory::get_inventory`]     |
//! | `POST /api/update_stock` | [`orders::update_stock`]         |
//! | `POST /api/add_order`    | [`orders::add_order`]            |
//! | `POST /api/add_product`  | [`ingest::add_product`]          |
//! | `GET  /api/health`       | [`health::health`]               |

pub mod health;
pub mod ingest;
pub mod inventory;
pub mod orders;
pub mod products;
