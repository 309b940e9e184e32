//! # Audit Log Repository
//!
//! The audit sink: append-only action records. The ledger appends inside
//! its own transactions (so an audit row never outlives a rolled-back
//! mutation); this repository is the standalone fire-and-forget surface
//! plus the read side for the audit screen.

use sqlx::SqlitePool;

use crate::error::DbResult;
use dukaan_core::{AuditLog, TenantId};

/// Repository for audit records.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends an audit record.
    pub async fn append(
        &self,
        tenant: &TenantId,
        action: &str,
        details: &str,
        username: &str,
        is_suspicious: bool,
    ) -> DbResult<()> {
        let entry = AuditLog::new(tenant, action, details, username, is_suspicious);

        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, tenant_id, timestamp, action, details, username, is_suspicious, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.tenant_id().as_str())
        .bind(entry.timestamp)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(&entry.username)
        .bind(entry.is_suspicious)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the most recent audit records, newest-first.
    pub async fn recent(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<AuditLog>> {
        let entries = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE tenant_id = ?
            ORDER BY timestamp DESC
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
