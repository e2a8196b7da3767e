//! Audit database access
//!
//! The engine owns no durable state except the audit documents: one JSON
//! document per completed transfer, stored in SQLite.

use sqlx::SqlitePool;
use std::path::Path;

/// Open (creating if needed) the audit database and ensure its schema.
pub async fn init_audit_pool(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to audit database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Ensure the audit table exists. Append-only; each row is one
/// independent document, so no locking discipline is needed.
pub async fn init_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transfer_audit (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transferred_at TEXT NOT NULL,
            acting_user_id INTEGER NOT NULL,
            document TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
