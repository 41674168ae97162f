//! API server configuration module.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `ims.toml` in the working directory, or the file named by `IMS_CONFIG`
//! 3. Environment variables prefixed `IMS_` (`IMS_PORT=8080`, `IMS_ORDER_MODE=deferred`)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use ims_core::{OrderMode, StartingInventory, StockUpdatePolicy, DEFAULT_CUSTOMER_ID};
use ims_db::DbConfig;

/// Config file read when `IMS_CONFIG` is not set. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "ims.toml";

const DEFAULT_MAX_UPLOAD_BYTES: i64 = 10 * 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Directory uploaded QR images are stored in
    pub upload_dir: PathBuf,

    /// Request body limit for `/api/*` (default: 10 MiB)
    pub max_upload_bytes: usize,

    /// Whether `/api/add_order` decrements stock
    pub order_mode: OrderMode,

    /// How `update_stock` treats incomplete or unknown lines
    pub stock_update_policy: StockUpdatePolicy,

    /// Starting inventory column of the reconciliation report
    pub starting_inventory: StartingInventory,

    /// Customer recorded on order lines
    pub default_customer_id: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: PathBuf::from("./ims.db"),
            max_connections: 5,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES as usize,
            order_mode: OrderMode::default(),
            stock_update_policy: StockUpdatePolicy::default(),
            starting_inventory: StartingInventory::default(),
            default_customer_id: DEFAULT_CUSTOMER_ID,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, the config file and `IMS_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("IMS_CONFIG") {
            Ok(path) => Self::load_from(Some(Path::new(&path))),
            Err(_) => Self::load_from(None),
        }
    }

    /// Load configuration using `file` instead of the default config file.
    ///
    /// An explicitly named file must exist; the default one may be absent.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("database_path", "./ims.db")?
            .set_default("max_connections", 5)?
            .set_default("upload_dir", "./uploads")?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES)?
            .set_default("order_mode", "decrement")?
            .set_default("stock_update_policy", "lenient")?
            .set_default("starting_inventory", "current_stock")?
            .set_default("default_customer_id", DEFAULT_CUSTOMER_ID)?
            .add_source(source)
            .add_source(Environment::with_prefix("IMS").try_parsing(true))
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Rejects values the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue("max_upload_bytes".to_string()));
        }
        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("host".to_string()))
    }

    /// Database pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
