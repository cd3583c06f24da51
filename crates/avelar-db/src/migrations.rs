//! # Schema Migrations
//!
//! The store schema ships inside the binary. `001_initial_schema.sql`
//! creates every table the desktop app uses: customers, catalog, sales,
//! stock and financial ledgers, prescriptions, lab orders, suppliers,
//! warranties, contact lens control, quotes, users and the consultório
//! agenda.
//!
//! Applied versions are tracked by sqlx in `_sqlx_migrations`, so opening
//! an existing `avelar.db` only runs files it has not seen yet. New schema
//! changes go in a new numbered file next to the first one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies the embedded schema files that the database has not seen yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(versions = MIGRATOR.migrations.len(), "Store schema up to date");
    Ok(())
}
