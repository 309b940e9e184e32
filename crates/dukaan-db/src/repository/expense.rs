//! # Expense Repository
//!
//! Operating expenses. Written here, read by the report engine; the
//! ledger never touches them.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dukaan_core::{Expense, Money, TenantId};

/// Repository for expense records.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense.
    pub async fn create(
        &self,
        tenant: &TenantId,
        description: &str,
        amount: Money,
        category: &str,
        date: DateTime<Utc>,
    ) -> DbResult<Expense> {
        let expense = Expense::new(tenant, description, amount, category, date);
        debug!(id = %expense.id, amount = %expense.amount, "Inserting expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, tenant_id, description, amount, category, date, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(expense.tenant_id().as_str())
        .bind(&expense.description)
        .bind(expense.amount.paisa())
        .bind(&expense.category)
        .bind(expense.date)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Lists expenses in a date window, newest-first.
    pub async fn list_range(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE tenant_id = ? AND date >= ? AND date < ?
            ORDER BY date DESC
            "#,
        )
        .bind(tenant.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Deletes an expense.
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }
}
