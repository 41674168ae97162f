//! # Database Errors
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where a DbError comes from                          │
//! │                                                                         │
//! │  sqlx::Error ───────► classify ──► NotFound / UniqueViolation /         │
//! │                                    ForeignKeyViolation / PoolExhausted  │
//! │                                    / QueryFailed / ...                  │
//! │                                                                         │
//! │  CoreError (plan_cart, plan_stock_updates, inside a transaction)        │
//! │            ───────────────────► Rejected   (tx dropped = ROLLBACK)      │
//! │                                                                         │
//! │  ims-api turns Rejected back into the CoreError's 400/404 and every    │
//! │  other variant into a 500 (404 for NotFound).                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ims_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by id found no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A business rule rejected the operation before anything committed.
    /// Displays exactly as the wrapped [`CoreError`].
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// `UNIQUE constraint failed: <table>.<column>`
    #[error("Duplicate value for {constraint}")]
    UniqueViolation { constraint: String },

    /// An order line or receipt pointed at a product that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The database file could not be opened, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other error reported by SQLite for a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// `BEGIN` or `COMMIT` failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// `NotFound` for `entity` with the given id.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// The business rejection carried by this error, if any.
    pub fn as_rejection(&self) -> Option<&CoreError> {
        match self {
            DbError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

const UNIQUE_FAILED: &str = "UNIQUE constraint failed: ";
const FOREIGN_KEY_FAILED: &str = "FOREIGN KEY constraint failed";

/// Sorts an SQLite error message into a constraint variant.
fn classify_sqlite_message(message: &str) -> DbError {
    if let Some(constraint) = message.strip_prefix(UNIQUE_FAILED) {
        return DbError::UniqueViolation {
            constraint: constraint.to_string(),
        };
    }
    if message.contains(FOREIGN_KEY_FAILED) {
        return DbError::ForeignKeyViolation {
            message: message.to_string(),
        };
    }
    DbError::QueryFailed(message.to_string())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => classify_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}
