//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary
//! and applied when the pool opens.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new                                                          │
//! │    └── run_migrations                                                   │
//! │          ├── _sqlx_migrations lists 001 as applied  → skip              │
//! │          └── 002_one_ingest_receipt_per_product     → apply, record     │
//! │                                                                         │
//! │  GET /api/health                                                        │
//! │    └── migration_status → { total: 2, applied: 2 }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Applied files are checksummed by sqlx; editing one after release makes
//! startup fail. Schema changes go in a new `NNN_name.sql` file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Path is relative to this crate's manifest.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in filename order, each in its own
/// transaction. A no-op when the schema is current.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(embedded = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Embedded vs applied migration counts, reported by `/api/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
}

impl MigrationStatus {
    /// True when every embedded migration has been applied.
    pub fn is_current(&self) -> bool {
        self.applied >= self.total
    }
}

/// Counts embedded and applied migrations.
///
/// A store that was never migrated has no `_sqlx_migrations` table and
/// reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 =
        match sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
        {
            Ok(count) => count,
            Err(sqlx::Error::Database(err)) if is_missing_table(err.message()) => 0,
            Err(err) => return Err(err.into()),
        };

    Ok(MigrationStatus {
        total,
        applied: applied.max(0) as usize,
    })
}

fn is_missing_table(message: &str) -> bool {
    message.starts_with("no such table")
}
