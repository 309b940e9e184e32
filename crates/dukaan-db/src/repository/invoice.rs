//! # Invoice Repository
//!
//! Read side of the sales ledger. Invoices are created and reversed only
//! through [`crate::ledger::Ledger`]; this repository serves the history
//! screens.

use sqlx::SqlitePool;

use crate::error::DbResult;
use dukaan_core::{Invoice, InvoiceItem, TenantId};

/// Repository for invoice reads.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets the line items of an invoice, in insertion order.
    pub async fn items(&self, tenant: &TenantId, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT * FROM invoice_items
            WHERE invoice_id = ? AND tenant_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(invoice_id)
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists invoices newest-first.
    pub async fn list_recent(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT * FROM invoices
            WHERE tenant_id = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }
}
