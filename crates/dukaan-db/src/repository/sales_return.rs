//! # Sales Return Repository
//!
//! Read side of standalone returns (the over-the-counter kind that is not
//! tied to an invoice). Created through [`crate::ledger::Ledger`].

use sqlx::SqlitePool;

use crate::error::DbResult;
use dukaan_core::{SalesReturn, SalesReturnItem, TenantId};

/// Repository for standalone sales-return reads.
#[derive(Debug, Clone)]
pub struct SalesReturnRepository {
    pool: SqlitePool,
}

impl SalesReturnRepository {
    /// Creates a new SalesReturnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesReturnRepository { pool }
    }

    /// Gets a return by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<SalesReturn>> {
        let record = sqlx::query_as::<_, SalesReturn>(
            "SELECT * FROM sales_returns WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets the line items of a return.
    pub async fn items(&self, tenant: &TenantId, return_id: &str) -> DbResult<Vec<SalesReturnItem>> {
        let items = sqlx::query_as::<_, SalesReturnItem>(
            r#"
            SELECT * FROM sales_return_items
            WHERE sales_return_id = ? AND tenant_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(return_id)
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists returns newest-first.
    pub async fn list_recent(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<SalesReturn>> {
        let records = sqlx::query_as::<_, SalesReturn>(
            r#"
            SELECT * FROM sales_returns
            WHERE tenant_id = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
