//! # IMS API Server
//!
//! HTTP/JSON server for the inventory backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Server                                   │
//! │                                                                         │
//! │  Router  /api/*   (CORS: any origin/method/header, body limit)          │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  products      │  │  orders        │  │  ingest                    ││
//! │  │ • GET products │  │ • update_stock │  │ • POST add_product         ││
//! │  │                │  │ • add_order    │  │   (multipart qr_code)      ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  inventory     │  │  health        │                                │
//! │  │ • GET inventory│  │ • GET health   │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │ Upload store │  │  QR decoding             ││  │
//! │  │  │  (ims-db)    │  │ sha256 keys  │  │  image + rqrr            ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ServerConfig`]. Every key can be set from the environment
//! with an `IMS_` prefix, e.g. `IMS_PORT`, `IMS_DATABASE_PATH`,
//! `IMS_ORDER_MODE`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod qr;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ims_db::Database;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};

use crate::services::{CatalogService, IngestService, InventoryService, OrderService};
use crate::storage::{StorageError, UploadStore};

/// Shared application state.
///
/// Cheap to clone: the pool and config are reference counted.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub inventory: InventoryService,
    pub ingest: IngestService,
}

impl AppState {
    /// Wires the services. Creates the upload directory if it is missing.
    pub async fn new(db: Database, config: ServerConfig) -> Result<Self, StorageError> {
        let store = UploadStore::open(&config.upload_dir).await?;
        let catalog = CatalogService::new(db.clone());

        Ok(AppState {
            orders: OrderService::new(
                db.clone(),
                config.order_mode,
                config.stock_update_policy,
                config.default_customer_id,
            ),
            inventory: InventoryService::new(db.clone(), config.starting_inventory),
            ingest: IngestService::new(store, catalog.clone()),
            catalog,
            db,
            config: Arc::new(config),
        })
    }
}

/// Builds the HTTP router.
///
/// Every endpoint lives under `/api` with permissive CORS and a request
/// body limit of `max_upload_bytes`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/products", get(handlers::products::list_products))
        .route("/inventory", get(handlers::inventory::get_inventory))
        .route("/update_stock", post(handlers::orders::update_stock))
        .route("/add_order", post(handlers::orders::add_order))
        .route("/add_product", post(handlers::ingest::add_product))
        .route("/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(cors);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,ims_api=debug,ims_db=debug,tower_http=debug,sqlx=warn";

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
