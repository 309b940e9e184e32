//! # Supplier Repository
//!
//! Supplier lookups and maintenance. The `balance` column (what the shop
//! owes) is moved by the ledger: purchases, reversals, and payments.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dukaan_core::{Supplier, TenantId};

/// Repository for supplier records.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Creates a supplier with a zero balance.
    pub async fn create(
        &self,
        tenant: &TenantId,
        name: &str,
        contact_person: &str,
        phone: &str,
    ) -> DbResult<Supplier> {
        let supplier = Supplier::new(tenant, name, contact_person, phone);
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, tenant_id, name, contact_person, phone, balance, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&supplier.id)
        .bind(supplier.tenant_id().as_str())
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(supplier.balance.paisa())
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Gets a supplier by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists all suppliers for the tenant, sorted by name.
    pub async fn list(&self, tenant: &TenantId) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE tenant_id = ? ORDER BY name",
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Updates a supplier's contact details.
    pub async fn update(&self, tenant: &TenantId, supplier: &Supplier) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers SET name = ?, contact_person = ?, phone = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.id)
        .bind(tenant.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Deletes a supplier.
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}
