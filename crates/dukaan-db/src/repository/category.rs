//! # Category Repository

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dukaan_core::{Category, TenantId};

/// Repository for product categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category.
    pub async fn create(&self, tenant: &TenantId, name: &str) -> DbResult<Category> {
        let category = Category::new(tenant, name);
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            "INSERT INTO categories (id, tenant_id, name, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(category.tenant_id().as_str())
        .bind(&category.name)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists all categories for the tenant, sorted by name.
    pub async fn list(&self, tenant: &TenantId) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE tenant_id = ? ORDER BY name",
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Deletes a category.
    ///
    /// Refused while any product still references it: deleting "Medicine"
    /// must not orphan "Panadol".
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> DbResult<()> {
        let category = self
            .get(tenant, id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))?;

        let product_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE category_id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_one(&self.pool)
        .await?;

        if product_count > 0 {
            return Err(DbError::ForeignKeyViolation {
                message: format!(
                    "Cannot delete category '{}' because it contains products. \
                     Delete the products first",
                    category.name
                ),
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
