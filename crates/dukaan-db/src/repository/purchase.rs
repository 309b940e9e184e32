//! # Purchase Repository
//!
//! Read side of the purchase ledger. Purchases are created and deleted
//! (reversed) only through [`crate::ledger::Ledger`].

use sqlx::SqlitePool;

use crate::error::DbResult;
use dukaan_core::{Purchase, PurchaseItem, TenantId};

/// Repository for purchase reads.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Gets a purchase by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Gets the line items of a purchase, in insertion order.
    pub async fn items(&self, tenant: &TenantId, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            r#"
            SELECT * FROM purchase_items
            WHERE purchase_id = ? AND tenant_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(purchase_id)
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists purchases newest-first.
    pub async fn list_recent(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE tenant_id = ?
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}
