//! Best-effort audit writer
//!
//! One audit document is written after each completed transfer. Losing it
//! must not fail the transfer: the driver calls `record_best_effort`,
//! which logs and swallows any failure.

use sqlx::SqlitePool;

use crate::error::AuditError;
use crate::models::transfer::TransferAudit;

/// Audit document store
#[derive(Clone)]
pub struct AuditStore {
    pool: SqlitePool,
}

impl AuditStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one audit document.
    pub async fn record(&self, audit: &TransferAudit) -> Result<(), AuditError> {
        let document = serde_json::to_string(audit)?;

        sqlx::query(
            "INSERT INTO transfer_audit (transferred_at, acting_user_id, document) VALUES (?, ?, ?)",
        )
        .bind(audit.timestamp.to_rfc3339())
        .bind(audit.acting_user_id)
        .bind(document)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append one audit document, swallowing failures.
    pub async fn record_best_effort(&self, audit: &TransferAudit) {
        if let Err(e) = self.record(audit).await {
            tracing::warn!("Failed to write transfer audit record: {}", e);
        }
    }
}
