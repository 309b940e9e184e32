//! # Customer Repository
//!
//! Customer lookups and maintenance. The `credit_balance` column is moved
//! by the ledger (credit sales, returns, received payments) - never
//! written directly from here except through `update`, which mirrors the
//! original back-office edit screen.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dukaan_core::{Customer, Money, TenantId};

/// Repository for customer records.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer with a zero credit balance.
    pub async fn create(
        &self,
        tenant: &TenantId,
        name: &str,
        phone: &str,
        credit_limit: Money,
    ) -> DbResult<Customer> {
        let customer = Customer::new(tenant, name, phone, credit_limit);
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, tenant_id, name, phone,
                credit_balance, credit_limit, last_payment_date, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(customer.tenant_id().as_str())
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.credit_balance.paisa())
        .bind(customer.credit_limit.paisa())
        .bind(customer.last_payment_date)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists customers, optionally filtered by a name/phone search.
    pub async fn list(&self, tenant: &TenantId, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let customers = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(q) => {
                let pattern = format!("%{}%", q);
                sqlx::query_as::<_, Customer>(
                    r#"
                    SELECT * FROM customers
                    WHERE tenant_id = ? AND (name LIKE ? OR phone LIKE ?)
                    ORDER BY name
                    "#,
                )
                .bind(tenant.as_str())
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Customer>(
                    "SELECT * FROM customers WHERE tenant_id = ? ORDER BY name",
                )
                .bind(tenant.as_str())
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(customers)
    }

    /// Updates a customer's details (back-office edit).
    pub async fn update(&self, tenant: &TenantId, customer: &Customer) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?, phone = ?, credit_balance = ?, credit_limit = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(customer.credit_balance.paisa())
        .bind(customer.credit_limit.paisa())
        .bind(&customer.id)
        .bind(tenant.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer. Past invoices keep their customer_id; reads of
    /// those fall back to "Walking Customer".
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}
