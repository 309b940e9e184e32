//! # Product Repository
//!
//! Catalog operations for products. Stock and cost movements caused by
//! sales/returns/purchases happen in the ledger, not here; this module
//! only covers catalog maintenance and lookups.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dukaan_core::{NewProduct, Product, TenantId};

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product.
    ///
    /// ## Guards
    /// - The category must exist in this tenant
    /// - The barcode must be unique within this tenant (also backed by a
    ///   UNIQUE index)
    pub async fn create(&self, tenant: &TenantId, new: NewProduct) -> DbResult<Product> {
        let category_exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE id = ? AND tenant_id = ?",
        )
        .bind(&new.category_id)
        .bind(tenant.as_str())
        .fetch_one(&self.pool)
        .await?;

        if category_exists == 0 {
            return Err(DbError::not_found("Category", &new.category_id));
        }

        let barcode_taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE barcode = ? AND tenant_id = ?",
        )
        .bind(&new.barcode)
        .bind(tenant.as_str())
        .fetch_one(&self.pool)
        .await?;

        if barcode_taken > 0 {
            return Err(DbError::duplicate("barcode", &new.barcode));
        }

        let product = Product::new(tenant, new);
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, name, barcode, sku,
                sale_price, cost_price, stock_quantity, low_stock_alert,
                category_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(product.tenant_id().as_str())
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.sku)
        .bind(product.sale_price.paisa())
        .bind(product.cost_price.paisa())
        .bind(product.stock_quantity)
        .bind(product.low_stock_alert)
        .bind(&product.category_id)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    pub async fn get(&self, tenant: &TenantId, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ? AND tenant_id = ?",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its barcode (the scanner path).
    pub async fn get_by_barcode(&self, tenant: &TenantId, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE barcode = ? AND tenant_id = ?",
        )
        .bind(barcode)
        .bind(tenant.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products for the tenant, sorted by name.
    pub async fn list(&self, tenant: &TenantId) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = ? ORDER BY name",
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by name, barcode, or SKU.
    ///
    /// An empty query lists everything up to `limit`.
    pub async fn search(&self, tenant: &TenantId, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", query);
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = ?
              AND (name LIKE ? OR barcode LIKE ? OR sku LIKE ?)
            ORDER BY name
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates a product's catalog fields.
    pub async fn update(&self, tenant: &TenantId, product: &Product) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, barcode = ?, sku = ?,
                sale_price = ?, cost_price = ?,
                stock_quantity = ?, low_stock_alert = ?, category_id = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.sku)
        .bind(product.sale_price.paisa())
        .bind(product.cost_price.paisa())
        .bind(product.stock_quantity)
        .bind(product.low_stock_alert)
        .bind(&product.category_id)
        .bind(&product.id)
        .bind(tenant.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}
