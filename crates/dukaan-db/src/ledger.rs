//! # The Transactional Ledger
//!
//! Every operation that moves more than one balance lives here: sales,
//! invoice returns, purchases, purchase reversals, standalone returns,
//! and the two direct balance adjustments.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Sale, One Transaction                          │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    ├── for each line:                                                   │
//! │    │     load product            (NotFound on miss)                     │
//! │    │     UPDATE stock -= qty                                            │
//! │    │       WHERE stock >= qty    (InsufficientStock on 0 rows)          │
//! │    │     snapshot name + price into the line                            │
//! │    ├── totals = Σ lines, net = total − discount                         │
//! │    ├── credit? customer.credit_balance += net                           │
//! │    ├── INSERT invoice + items                                           │
//! │  COMMIT          ← everything lands, or nothing does                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check and decrement are a single conditional UPDATE, so two
//! concurrent checkouts of the same product cannot both pass the check
//! and drive stock below zero. All other mutated rows (customer,
//! supplier) move through single UPDATE statements with the floor-at-zero
//! policy applied in SQL (`MAX(0, ...)`).
//!
//! ## Not idempotent
//! Commands carry no client idempotency key: a retried request after a
//! timeout applies the sale twice. Known limitation; callers must not
//! blindly retry a timed-out checkout.

use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::DbError;
use dukaan_core::ledger_math;
use dukaan_core::{
    CoreError, CreatePurchase, CreateSale, CreateSalesReturn, Invoice, InvoiceItem, InvoiceStatus,
    Money, Product, Purchase, PurchaseItem, SalesReturn, SalesReturnItem, TenantId,
    ValidationError,
};

// =============================================================================
// Error Type
// =============================================================================

/// Errors a ledger protocol can surface: domain invariant violations or
/// infrastructure failures. Either way the transaction is rolled back and
/// no partial state is observable.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(err.into())
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Db(err.into())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Ledger
// =============================================================================

/// The write side of the system. Obtained via `Database::ledger()`.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Creates a new Ledger over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Ledger { pool }
    }

    // -------------------------------------------------------------------------
    // Sale
    // -------------------------------------------------------------------------

    /// Checkout: creates a Completed invoice, deducts stock, and accrues
    /// customer debt for credit (udhaar) sales.
    ///
    /// ## Rules
    /// - Totals are computed server-side from the product rows, never
    ///   trusted from the caller
    /// - Product name and sale price are frozen into each line
    /// - Credit sales require a customer and force `paid_amount` to zero
    /// - The discount is NOT capped against the total; net may go negative
    ///
    /// ## Returns
    /// The new invoice id.
    pub async fn create_sale(&self, tenant: &TenantId, cmd: CreateSale) -> LedgerResult<String> {
        debug!(
            items = cmd.items.len(),
            method = %cmd.payment_method,
            "create_sale"
        );

        if cmd.items.is_empty() {
            return Err(ValidationError::NoItems.into());
        }
        if cmd.payment_method.is_credit() && cmd.customer_id.is_none() {
            return Err(ValidationError::CustomerRequired.into());
        }

        let mut tx = self.pool.begin().await?;

        let mut invoice = Invoice::new(
            tenant,
            generate_invoice_number(),
            cmd.payment_method,
            cmd.customer_id,
        );

        let mut priced = Vec::with_capacity(cmd.items.len());
        let mut items = Vec::with_capacity(cmd.items.len());

        for line in &cmd.items {
            let product = load_product(&mut tx, tenant, &line.product_id).await?;

            if line.quantity <= 0 {
                return Err(ValidationError::NonPositiveQuantity { name: product.name }.into());
            }

            // Check-and-decrement in one statement: concurrent checkouts
            // serialize on the product row instead of racing past the check.
            let updated = sqlx::query(
                r#"
                UPDATE products SET stock_quantity = stock_quantity - ?
                WHERE id = ? AND tenant_id = ? AND stock_quantity >= ?
                "#,
            )
            .bind(line.quantity)
            .bind(&line.product_id)
            .bind(tenant.as_str())
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }

            let item = InvoiceItem::new(
                tenant,
                &invoice.id,
                &product.id,
                &product.name,
                line.quantity,
                product.sale_price,
            );
            priced.push((item.quantity, item.unit_price));
            items.push(item);
        }

        let totals = ledger_math::sale_totals(priced, cmd.discount_amount);
        invoice.total_amount = totals.total;
        invoice.discount_amount = cmd.discount_amount;
        invoice.net_amount = totals.net;

        if invoice.payment_method.is_credit() {
            // Nothing changes hands now; the whole net amount becomes udhaar.
            let Some(customer_id) = invoice.customer_id.clone() else {
                return Err(ValidationError::CustomerRequired.into());
            };

            let updated = sqlx::query(
                r#"
                UPDATE customers SET credit_balance = credit_balance + ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(totals.net.paisa())
            .bind(&customer_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(CoreError::not_found("Customer", customer_id).into());
            }
        } else {
            invoice.paid_amount = cmd.paid_amount;
            invoice.change_given = ledger_math::change_given(cmd.paid_amount, totals.net);
        }

        insert_invoice(&mut tx, &invoice).await?;
        for item in &items {
            insert_invoice_item(&mut tx, item).await?;
        }

        tx.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total_amount,
            "Sale completed"
        );

        Ok(invoice.id)
    }

    // -------------------------------------------------------------------------
    // Invoice Return
    // -------------------------------------------------------------------------

    /// Reverses an invoice: restocks every line and, for credit sales,
    /// reduces the customer's debt by the net amount (floored at zero).
    ///
    /// Cash refunds are handed over physically and are not re-booked here;
    /// the discount/paid bookkeeping of the original sale stays untouched.
    ///
    /// Idempotency guard: a Returned invoice cannot be returned again.
    pub async fn return_invoice(
        &self,
        tenant: &TenantId,
        invoice_id: &str,
        username: &str,
    ) -> LedgerResult<()> {
        debug!(invoice_id = %invoice_id, "return_invoice");

        let mut tx = self.pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT * FROM invoices WHERE id = ? AND tenant_id = ?",
        )
        .bind(invoice_id)
        .bind(tenant.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("Invoice", invoice_id))?;

        if invoice.status == InvoiceStatus::Returned {
            return Err(CoreError::AlreadyReturned(invoice.invoice_number).into());
        }

        let items = sqlx::query_as::<_, InvoiceItem>(
            "SELECT * FROM invoice_items WHERE invoice_id = ? AND tenant_id = ?",
        )
        .bind(invoice_id)
        .bind(tenant.as_str())
        .fetch_all(&mut *tx)
        .await?;

        // Put the goods back on the shelf. No upper bound: restock is
        // unconditional. A product deleted since the sale is skipped.
        for item in &items {
            sqlx::query(
                r#"
                UPDATE products SET stock_quantity = stock_quantity + ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(item.quantity)
            .bind(&item.product_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;
        }

        // Credit sales reduce the customer's udhaar; cash was refunded
        // over the counter.
        if invoice.payment_method.is_credit() {
            if let Some(customer_id) = invoice.customer_id.as_deref() {
                sqlx::query(
                    r#"
                    UPDATE customers SET credit_balance = MAX(0, credit_balance - ?)
                    WHERE id = ? AND tenant_id = ?
                    "#,
                )
                .bind(invoice.net_amount.paisa())
                .bind(customer_id)
                .bind(tenant.as_str())
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query(
            "UPDATE invoices SET status = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(InvoiceStatus::Returned)
        .bind(invoice_id)
        .bind(tenant.as_str())
        .execute(&mut *tx)
        .await?;

        append_audit(
            &mut tx,
            tenant,
            "Return",
            &format!("Invoice {} was returned.", invoice.invoice_number),
            username,
        )
        .await?;

        tx.commit().await?;

        info!(invoice_id = %invoice_id, "Invoice returned");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Purchase
    // -------------------------------------------------------------------------

    /// Stock-in: increments stock, overwrites each product's cost with
    /// the latest unit cost, and books the unpaid remainder on the
    /// supplier's balance.
    ///
    /// The remainder rule is arithmetic, not label-driven: whatever
    /// `total − amount_paid` leaves over becomes payable, for Cash and
    /// Bank purchases just as for Credit ones.
    ///
    /// ## Returns
    /// The new purchase id.
    pub async fn create_purchase(
        &self,
        tenant: &TenantId,
        cmd: CreatePurchase,
    ) -> LedgerResult<String> {
        debug!(
            supplier_id = %cmd.supplier_id,
            items = cmd.items.len(),
            "create_purchase"
        );

        if cmd.items.is_empty() {
            return Err(ValidationError::NoItems.into());
        }

        let mut tx = self.pool.begin().await?;

        let supplier_exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM suppliers WHERE id = ? AND tenant_id = ?",
        )
        .bind(&cmd.supplier_id)
        .bind(tenant.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if supplier_exists == 0 {
            return Err(CoreError::not_found("Supplier", cmd.supplier_id).into());
        }

        let mut purchase = Purchase::new(
            tenant,
            &cmd.invoice_number,
            &cmd.supplier_id,
            cmd.payment_method,
            cmd.amount_paid,
        );

        let mut total = Money::ZERO;
        let mut items = Vec::with_capacity(cmd.items.len());

        for line in &cmd.items {
            let product = load_product(&mut tx, tenant, &line.product_id).await?;

            if line.quantity <= 0 {
                return Err(ValidationError::NonPositiveQuantity { name: product.name }.into());
            }

            // Latest cost wins; no weighted average.
            sqlx::query(
                r#"
                UPDATE products SET
                    stock_quantity = stock_quantity + ?,
                    cost_price = ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(line.quantity)
            .bind(line.unit_cost.paisa())
            .bind(&line.product_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;

            let item = PurchaseItem::new(
                tenant,
                &purchase.id,
                &product.id,
                line.quantity,
                line.unit_cost,
            );
            total += item.total_cost();
            items.push(item);
        }

        purchase.total_amount = total;

        let pending = ledger_math::pending_debt(total, cmd.amount_paid);
        if pending.is_positive() {
            sqlx::query(
                r#"
                UPDATE suppliers SET balance = balance + ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(pending.paisa())
            .bind(&purchase.supplier_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;
        }

        insert_purchase(&mut tx, &purchase).await?;
        for item in &items {
            insert_purchase_item(&mut tx, item).await?;
        }

        tx.commit().await?;

        info!(
            purchase_id = %purchase.id,
            total = %purchase.total_amount,
            pending = %pending.floor_zero(),
            "Purchase received"
        );

        Ok(purchase.id)
    }

    // -------------------------------------------------------------------------
    // Purchase Reversal
    // -------------------------------------------------------------------------

    /// Deletes a purchase and reverses its effects: stock comes back off
    /// the shelf and, for credit purchases, the booked debt comes off the
    /// supplier's balance (floored at zero).
    ///
    /// Stock that was already sold onward cannot be reversed; every line
    /// is checked before any line is mutated, so the reversal is
    /// all-or-nothing.
    pub async fn delete_purchase(&self, tenant: &TenantId, purchase_id: &str) -> LedgerResult<()> {
        debug!(purchase_id = %purchase_id, "delete_purchase");

        let mut tx = self.pool.begin().await?;

        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT * FROM purchases WHERE id = ? AND tenant_id = ?",
        )
        .bind(purchase_id)
        .bind(tenant.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("Purchase", purchase_id))?;

        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT * FROM purchase_items WHERE purchase_id = ? AND tenant_id = ?",
        )
        .bind(purchase_id)
        .bind(tenant.as_str())
        .fetch_all(&mut *tx)
        .await?;

        // Phase 1: every line must be reversible before anything moves.
        let mut reversals: Vec<(String, i64)> = Vec::with_capacity(items.len());
        for item in &items {
            let product = sqlx::query_as::<_, Product>(
                "SELECT * FROM products WHERE id = ? AND tenant_id = ?",
            )
            .bind(&item.product_id)
            .bind(tenant.as_str())
            .fetch_optional(&mut *tx)
            .await?;

            match product {
                // Product row is gone; nothing left to reverse for this line.
                None => continue,
                Some(p) if p.stock_quantity < item.quantity => {
                    return Err(ValidationError::StockAlreadySold {
                        name: p.name,
                        available: p.stock_quantity,
                        required: item.quantity,
                    }
                    .into());
                }
                Some(p) => reversals.push((p.id, item.quantity)),
            }
        }

        // Phase 2: apply. All reads and writes share the transaction, so
        // the phase-1 snapshot still holds.
        for (product_id, quantity) in &reversals {
            sqlx::query(
                r#"
                UPDATE products SET stock_quantity = stock_quantity - ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(quantity)
            .bind(product_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;
        }

        if purchase.payment_method.is_credit() {
            let debt = purchase.pending_amount();
            sqlx::query(
                r#"
                UPDATE suppliers SET balance = MAX(0, balance - ?)
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(debt.paisa())
            .bind(&purchase.supplier_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;
        }

        // Line items cascade with the header.
        sqlx::query("DELETE FROM purchases WHERE id = ? AND tenant_id = ?")
            .bind(purchase_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(purchase_id = %purchase_id, "Purchase deleted and reversed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Direct Balance Adjustments
    // -------------------------------------------------------------------------

    /// Books a payment received from a customer against their udhaar.
    ///
    /// A flat decrement, floored at zero - there is no per-invoice
    /// settlement in this model.
    pub async fn receive_customer_payment(
        &self,
        tenant: &TenantId,
        customer_id: &str,
        amount: Money,
    ) -> LedgerResult<()> {
        if !amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount {
                field: "Payment amount",
            }
            .into());
        }

        let updated = sqlx::query(
            r#"
            UPDATE customers SET
                credit_balance = MAX(0, credit_balance - ?),
                last_payment_date = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(amount.paisa())
        .bind(chrono::Utc::now())
        .bind(customer_id)
        .bind(tenant.as_str())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CoreError::not_found("Customer", customer_id).into());
        }

        info!(customer_id = %customer_id, amount = %amount, "Customer payment received");
        Ok(())
    }

    /// Pays a supplier, reducing what the shop owes them.
    ///
    /// Paying more than the balance leaves it at zero, never negative.
    pub async fn pay_supplier(
        &self,
        tenant: &TenantId,
        supplier_id: &str,
        amount: Money,
    ) -> LedgerResult<()> {
        if !amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount {
                field: "Payment amount",
            }
            .into());
        }

        let updated = sqlx::query(
            r#"
            UPDATE suppliers SET balance = MAX(0, balance - ?)
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(amount.paisa())
        .bind(supplier_id)
        .bind(tenant.as_str())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CoreError::not_found("Supplier", supplier_id).into());
        }

        info!(supplier_id = %supplier_id, amount = %amount, "Supplier paid");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Standalone Sales Return
    // -------------------------------------------------------------------------

    /// Records a return that is not tied to an invoice (e.g. a third-party
    /// drop-off): restocks every line and books the agreed refund total.
    ///
    /// ## Returns
    /// The new sales-return id.
    pub async fn create_sales_return(
        &self,
        tenant: &TenantId,
        cmd: CreateSalesReturn,
    ) -> LedgerResult<String> {
        debug!(items = cmd.items.len(), "create_sales_return");

        if cmd.items.is_empty() {
            return Err(ValidationError::NoItems.into());
        }

        let mut tx = self.pool.begin().await?;

        let mut record = SalesReturn::new(tenant, &cmd.reason, cmd.original_invoice_id);

        let mut refund_total = Money::ZERO;
        let mut items = Vec::with_capacity(cmd.items.len());

        for line in &cmd.items {
            let product = load_product(&mut tx, tenant, &line.product_id).await?;

            if line.quantity <= 0 {
                return Err(ValidationError::NonPositiveQuantity { name: product.name }.into());
            }

            sqlx::query(
                r#"
                UPDATE products SET stock_quantity = stock_quantity + ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(line.quantity)
            .bind(&line.product_id)
            .bind(tenant.as_str())
            .execute(&mut *tx)
            .await?;

            let item = SalesReturnItem::new(
                tenant,
                &record.id,
                &product.id,
                line.quantity,
                line.refund_amount,
            );
            refund_total += line.refund_amount;
            items.push(item);
        }

        record.refund_amount = refund_total;

        insert_sales_return(&mut tx, &record).await?;
        for item in &items {
            insert_sales_return_item(&mut tx, item).await?;
        }

        tx.commit().await?;

        info!(
            return_id = %record.id,
            refund = %record.refund_amount,
            "Sales return recorded"
        );

        Ok(record.id)
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

async fn load_product(
    tx: &mut Transaction<'_, Sqlite>,
    tenant: &TenantId,
    product_id: &str,
) -> LedgerResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE id = ? AND tenant_id = ?",
    )
    .bind(product_id)
    .bind(tenant.as_str())
    .fetch_optional(&mut **tx)
    .await?;

    product.ok_or_else(|| CoreError::not_found("Product", product_id).into())
}

async fn insert_invoice(tx: &mut Transaction<'_, Sqlite>, invoice: &Invoice) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, tenant_id, invoice_number, date,
            total_amount, discount_amount, net_amount, paid_amount, change_given,
            payment_method, status, customer_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&invoice.id)
    .bind(invoice.tenant_id().as_str())
    .bind(&invoice.invoice_number)
    .bind(invoice.date)
    .bind(invoice.total_amount.paisa())
    .bind(invoice.discount_amount.paisa())
    .bind(invoice.net_amount.paisa())
    .bind(invoice.paid_amount.paisa())
    .bind(invoice.change_given.paisa())
    .bind(invoice.payment_method)
    .bind(invoice.status)
    .bind(&invoice.customer_id)
    .bind(invoice.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_invoice_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &InvoiceItem,
) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO invoice_items (
            id, tenant_id, invoice_id, product_id, product_name,
            quantity, unit_price, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(item.tenant_id().as_str())
    .bind(&item.invoice_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price.paisa())
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_purchase(
    tx: &mut Transaction<'_, Sqlite>,
    purchase: &Purchase,
) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchases (
            id, tenant_id, invoice_number, date,
            total_amount, amount_paid, payment_method, status,
            supplier_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&purchase.id)
    .bind(purchase.tenant_id().as_str())
    .bind(&purchase.invoice_number)
    .bind(purchase.date)
    .bind(purchase.total_amount.paisa())
    .bind(purchase.amount_paid.paisa())
    .bind(purchase.payment_method)
    .bind(purchase.status)
    .bind(&purchase.supplier_id)
    .bind(purchase.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_purchase_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &PurchaseItem,
) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_items (
            id, tenant_id, purchase_id, product_id, quantity, unit_cost, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(item.tenant_id().as_str())
    .bind(&item.purchase_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.unit_cost.paisa())
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_sales_return(
    tx: &mut Transaction<'_, Sqlite>,
    record: &SalesReturn,
) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_returns (
            id, tenant_id, date, reason, refund_amount, original_invoice_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(record.tenant_id().as_str())
    .bind(record.date)
    .bind(&record.reason)
    .bind(record.refund_amount.paisa())
    .bind(&record.original_invoice_id)
    .bind(record.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_sales_return_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &SalesReturnItem,
) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_return_items (
            id, tenant_id, sales_return_id, product_id, quantity, refund_amount, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&item.id)
    .bind(item.tenant_id().as_str())
    .bind(&item.sales_return_id)
    .bind(&item.product_id)
    .bind(item.quantity)
    .bind(item.refund_amount.paisa())
    .bind(item.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn append_audit(
    tx: &mut Transaction<'_, Sqlite>,
    tenant: &TenantId,
    action: &str,
    details: &str,
    username: &str,
) -> LedgerResult<()> {
    let entry = dukaan_core::AuditLog::new(tenant, action, details, username, false);

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
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Generates an invoice number: "INV-" + a time-derived suffix.
///
/// Uniqueness within a shop is as good as the millisecond clock; the UUID
/// primary key is what relations hang off.
fn generate_invoice_number() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    format!("INV-{:08}", millis % 100_000_000)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use dukaan_core::{
        InvoiceStatus, NewProduct, PaymentMethod, PurchaseLine, ReturnLine, SaleLine,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn tenant() -> TenantId {
        TenantId::new("shop-01")
    }

    async fn seed_product(
        db: &Database,
        t: &TenantId,
        name: &str,
        barcode: &str,
        sale_rupees: i64,
        cost_rupees: i64,
        stock: i64,
    ) -> Product {
        let category = db.categories().create(t, "General").await.unwrap();
        db.products()
            .create(
                t,
                NewProduct {
                    name: name.into(),
                    barcode: barcode.into(),
                    sku: None,
                    sale_price: Money::from_rupees(sale_rupees),
                    cost_price: Money::from_rupees(cost_rupees),
                    stock_quantity: stock,
                    low_stock_alert: NewProduct::DEFAULT_LOW_STOCK_ALERT,
                    category_id: category.id,
                },
            )
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, t: &TenantId, product_id: &str) -> i64 {
        db.products()
            .get(t, product_id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }

    fn sale(lines: Vec<SaleLine>, method: PaymentMethod, customer: Option<String>) -> CreateSale {
        CreateSale {
            customer_id: customer,
            payment_method: method,
            discount_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            items: lines,
        }
    }

    // -------------------------------------------------------------------------
    // Sale protocol
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sale_computes_totals_and_deducts_stock() {
        let db = test_db().await;
        let t = tenant();
        let tea = seed_product(&db, &t, "Tapal Danedar", "111", 900, 800, 10).await;
        let soap = seed_product(&db, &t, "Lux Soap", "222", 55, 40, 20).await;

        let invoice_id = db
            .ledger()
            .create_sale(
                &t,
                CreateSale {
                    customer_id: None,
                    payment_method: PaymentMethod::Cash,
                    discount_amount: Money::from_rupees(5),
                    paid_amount: Money::from_rupees(3000),
                    items: vec![
                        SaleLine {
                            product_id: tea.id.clone(),
                            quantity: 3,
                        },
                        SaleLine {
                            product_id: soap.id.clone(),
                            quantity: 2,
                        },
                    ],
                },
            )
            .await
            .unwrap();

        let invoice = db.invoices().get(&t, &invoice_id).await.unwrap().unwrap();
        // 3×900 + 2×55 = 2810; net = 2810 − 5 = 2805; change = 3000 − 2805
        assert_eq!(invoice.total_amount, Money::from_rupees(2810));
        assert_eq!(invoice.net_amount, Money::from_rupees(2805));
        assert_eq!(invoice.paid_amount, Money::from_rupees(3000));
        assert_eq!(invoice.change_given, Money::from_rupees(195));
        assert_eq!(invoice.status, InvoiceStatus::Completed);

        // stock moved in the same transaction
        assert_eq!(stock_of(&db, &t, &tea.id).await, 7);
        assert_eq!(stock_of(&db, &t, &soap.id).await, 18);

        // lines froze name and price
        let items = db.invoices().items(&t, &invoice_id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Tapal Danedar");
        assert_eq!(items[0].unit_price, Money::from_rupees(900));
    }

    #[tokio::test]
    async fn test_oversell_rolls_back_every_line() {
        let db = test_db().await;
        let t = tenant();
        let a = seed_product(&db, &t, "Rice 5kg", "111", 700, 600, 10).await;
        let b = seed_product(&db, &t, "Ghee 1kg", "222", 500, 420, 1).await;

        let err = db
            .ledger()
            .create_sale(
                &t,
                sale(
                    vec![
                        SaleLine {
                            product_id: a.id.clone(),
                            quantity: 2,
                        },
                        SaleLine {
                            product_id: b.id.clone(),
                            quantity: 5,
                        },
                    ],
                    PaymentMethod::Cash,
                    None,
                ),
            )
            .await
            .unwrap_err();

        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }) => {
                assert_eq!(name, "Ghee 1kg");
                assert_eq!(available, 1);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // the first line's decrement must not survive the rollback
        assert_eq!(stock_of(&db, &t, &a.id).await, 10);
        assert_eq!(stock_of(&db, &t, &b.id).await, 1);
        assert!(db.invoices().list_recent(&t, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_stock_sells_out_then_next_sale_fails() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "ProductX", "111", 100, 80, 5).await;

        db.ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 5,
                    }],
                    PaymentMethod::Cash,
                    None,
                ),
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &t, &p.id).await, 0);

        let err = db
            .ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 1,
                    }],
                    PaymentMethod::Cash,
                    None,
                ),
            )
            .await
            .unwrap_err();

        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                name, available, ..
            }) => {
                assert_eq!(name, "ProductX");
                assert_eq!(available, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_credit_sale_requires_customer() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Sugar 1kg", "111", 150, 130, 10).await;

        let err = db
            .ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 1,
                    }],
                    PaymentMethod::Credit,
                    None,
                ),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::Validation(ValidationError::CustomerRequired))
        ));
        assert_eq!(stock_of(&db, &t, &p.id).await, 10);
    }

    #[tokio::test]
    async fn test_credit_sale_accrues_debt_and_forces_paid_to_zero() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Sugar 1kg", "111", 150, 130, 10).await;
        let customer = db
            .customers()
            .create(&t, "Bilal", "0300-1234567", Money::from_rupees(50_000))
            .await
            .unwrap();

        let invoice_id = db
            .ledger()
            .create_sale(
                &t,
                CreateSale {
                    customer_id: Some(customer.id.clone()),
                    payment_method: PaymentMethod::Credit,
                    discount_amount: Money::ZERO,
                    // caller-supplied paid amount is ignored on credit
                    paid_amount: Money::from_rupees(999),
                    items: vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 4,
                    }],
                },
            )
            .await
            .unwrap();

        let invoice = db.invoices().get(&t, &invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.paid_amount, Money::ZERO);
        assert_eq!(invoice.change_given, Money::ZERO);
        assert_eq!(invoice.net_amount, Money::from_rupees(600));

        let customer = db.customers().get(&t, &customer.id).await.unwrap().unwrap();
        assert_eq!(customer.credit_balance, Money::from_rupees(600));
    }

    #[tokio::test]
    async fn test_credit_sale_with_unknown_customer_is_not_found() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Sugar 1kg", "111", 150, 130, 10).await;

        let err = db
            .ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 1,
                    }],
                    PaymentMethod::Credit,
                    Some("no-such-customer".into()),
                ),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::NotFound {
                entity: "Customer",
                ..
            })
        ));
        // the line's stock decrement rolled back with the transaction
        assert_eq!(stock_of(&db, &t, &p.id).await, 10);
    }

    // -------------------------------------------------------------------------
    // Return protocol
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_credit_round_trip_and_double_return_guard() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Sugar 1kg", "111", 150, 130, 10).await;
        let customer = db
            .customers()
            .create(&t, "Bilal", "0300-1234567", Money::from_rupees(50_000))
            .await
            .unwrap();

        let invoice_id = db
            .ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 3,
                    }],
                    PaymentMethod::Credit,
                    Some(customer.id.clone()),
                ),
            )
            .await
            .unwrap();

        assert_eq!(stock_of(&db, &t, &p.id).await, 7);

        db.ledger()
            .return_invoice(&t, &invoice_id, "admin")
            .await
            .unwrap();

        // stock restored, debt reversed, status flipped
        assert_eq!(stock_of(&db, &t, &p.id).await, 10);
        let customer_row = db.customers().get(&t, &customer.id).await.unwrap().unwrap();
        assert_eq!(customer_row.credit_balance, Money::ZERO);
        let invoice = db.invoices().get(&t, &invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Returned);

        // the audit trail saw it
        let audit = db.audit_logs().recent(&t, 5).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "Return");
        assert!(audit[0].details.contains(&invoice.invoice_number));

        // second return must change nothing
        let err = db
            .ledger()
            .return_invoice(&t, &invoice_id, "admin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::AlreadyReturned(_))
        ));
        assert_eq!(stock_of(&db, &t, &p.id).await, 10);
        let customer_row = db.customers().get(&t, &customer.id).await.unwrap().unwrap();
        assert_eq!(customer_row.credit_balance, Money::ZERO);
    }

    #[tokio::test]
    async fn test_credit_reversal_floors_at_zero() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Sugar 1kg", "111", 150, 130, 10).await;
        let customer = db
            .customers()
            .create(&t, "Bilal", "0300-1234567", Money::from_rupees(50_000))
            .await
            .unwrap();

        let invoice_id = db
            .ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 2,
                    }],
                    PaymentMethod::Credit,
                    Some(customer.id.clone()),
                ),
            )
            .await
            .unwrap();

        // a payment in between leaves less debt than the invoice's net
        db.ledger()
            .receive_customer_payment(&t, &customer.id, Money::from_rupees(250))
            .await
            .unwrap();

        db.ledger()
            .return_invoice(&t, &invoice_id, "admin")
            .await
            .unwrap();

        let customer_row = db.customers().get(&t, &customer.id).await.unwrap().unwrap();
        assert_eq!(customer_row.credit_balance, Money::ZERO);
    }

    #[tokio::test]
    async fn test_return_of_unknown_invoice_is_not_found() {
        let db = test_db().await;
        let t = tenant();

        let err = db
            .ledger()
            .return_invoice(&t, "missing", "admin")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::NotFound {
                entity: "Invoice",
                ..
            })
        ));
    }

    // -------------------------------------------------------------------------
    // Purchase protocol
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_purchase_restocks_reprices_and_books_debt() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Tea 950g", "111", 900, 800, 10).await;
        let supplier = db
            .suppliers()
            .create(&t, "Karachi Traders", "Imran", "021-111")
            .await
            .unwrap();

        let purchase_id = db
            .ledger()
            .create_purchase(
                &t,
                CreatePurchase {
                    supplier_id: supplier.id.clone(),
                    invoice_number: "KT-7781".into(),
                    payment_method: PaymentMethod::Bank,
                    amount_paid: Money::from_rupees(10_000),
                    items: vec![PurchaseLine {
                        product_id: p.id.clone(),
                        quantity: 20,
                        unit_cost: Money::from_rupees(850),
                    }],
                },
            )
            .await
            .unwrap();

        let purchase = db.purchases().get(&t, &purchase_id).await.unwrap().unwrap();
        assert_eq!(purchase.total_amount, Money::from_rupees(17_000));

        let product = db.products().get(&t, &p.id).await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 30);
        // latest cost wins
        assert_eq!(product.cost_price, Money::from_rupees(850));

        // debt is the arithmetic remainder even though the label says Bank
        let supplier_row = db.suppliers().get(&t, &supplier.id).await.unwrap().unwrap();
        assert_eq!(supplier_row.balance, Money::from_rupees(7_000));
    }

    #[tokio::test]
    async fn test_delete_credit_purchase_reverses_stock_and_debt() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Tea 950g", "111", 900, 800, 10).await;
        let supplier = db
            .suppliers()
            .create(&t, "Karachi Traders", "Imran", "021-111")
            .await
            .unwrap();

        let purchase_id = db
            .ledger()
            .create_purchase(
                &t,
                CreatePurchase {
                    supplier_id: supplier.id.clone(),
                    invoice_number: "KT-7782".into(),
                    payment_method: PaymentMethod::Credit,
                    amount_paid: Money::from_rupees(5_000),
                    items: vec![PurchaseLine {
                        product_id: p.id.clone(),
                        quantity: 20,
                        unit_cost: Money::from_rupees(850),
                    }],
                },
            )
            .await
            .unwrap();

        let supplier_row = db.suppliers().get(&t, &supplier.id).await.unwrap().unwrap();
        assert_eq!(supplier_row.balance, Money::from_rupees(12_000));

        db.ledger().delete_purchase(&t, &purchase_id).await.unwrap();

        assert_eq!(stock_of(&db, &t, &p.id).await, 10);
        let supplier_row = db.suppliers().get(&t, &supplier.id).await.unwrap().unwrap();
        assert_eq!(supplier_row.balance, Money::ZERO);
        assert!(db.purchases().get(&t, &purchase_id).await.unwrap().is_none());
        assert!(db.purchases().items(&t, &purchase_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_purchase_fails_when_stock_was_sold_onward() {
        let db = test_db().await;
        let t = tenant();
        let p = seed_product(&db, &t, "Tea 950g", "111", 900, 800, 0).await;
        let supplier = db
            .suppliers()
            .create(&t, "Karachi Traders", "Imran", "021-111")
            .await
            .unwrap();

        let purchase_id = db
            .ledger()
            .create_purchase(
                &t,
                CreatePurchase {
                    supplier_id: supplier.id.clone(),
                    invoice_number: "KT-7783".into(),
                    payment_method: PaymentMethod::Credit,
                    amount_paid: Money::ZERO,
                    items: vec![PurchaseLine {
                        product_id: p.id.clone(),
                        quantity: 10,
                        unit_cost: Money::from_rupees(850),
                    }],
                },
            )
            .await
            .unwrap();

        // 6 of the 10 received units leave the shelf
        db.ledger()
            .create_sale(
                &t,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 6,
                    }],
                    PaymentMethod::Cash,
                    None,
                ),
            )
            .await
            .unwrap();

        let err = db
            .ledger()
            .delete_purchase(&t, &purchase_id)
            .await
            .unwrap_err();
        match err {
            LedgerError::Core(CoreError::Validation(ValidationError::StockAlreadySold {
                name,
                available,
                required,
            })) => {
                assert_eq!(name, "Tea 950g");
                assert_eq!(available, 4);
                assert_eq!(required, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // nothing moved: stock, debt, and the purchase itself all intact
        assert_eq!(stock_of(&db, &t, &p.id).await, 4);
        let supplier_row = db.suppliers().get(&t, &supplier.id).await.unwrap().unwrap();
        assert_eq!(supplier_row.balance, Money::from_rupees(8_500));
        assert!(db.purchases().get(&t, &purchase_id).await.unwrap().is_some());
    }

    // -------------------------------------------------------------------------
    // Direct balance adjustments
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_pay_supplier_floors_at_zero() {
        let db = test_db().await;
        let t = tenant();
        let supplier = db
            .suppliers()
            .create(&t, "Karachi Traders", "Imran", "021-111")
            .await
            .unwrap();
        let p = seed_product(&db, &t, "Tea 950g", "111", 900, 800, 0).await;

        db.ledger()
            .create_purchase(
                &t,
                CreatePurchase {
                    supplier_id: supplier.id.clone(),
                    invoice_number: "KT-1".into(),
                    payment_method: PaymentMethod::Credit,
                    amount_paid: Money::ZERO,
                    items: vec![PurchaseLine {
                        product_id: p.id.clone(),
                        quantity: 2,
                        unit_cost: Money::from_rupees(850),
                    }],
                },
            )
            .await
            .unwrap();

        // owe 1700, pay 5000 → balance clamps to 0
        db.ledger()
            .pay_supplier(&t, &supplier.id, Money::from_rupees(5_000))
            .await
            .unwrap();
        let supplier_row = db.suppliers().get(&t, &supplier.id).await.unwrap().unwrap();
        assert_eq!(supplier_row.balance, Money::ZERO);

        let err = db
            .ledger()
            .pay_supplier(&t, &supplier.id, Money::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::Validation(ValidationError::NonPositiveAmount { .. }))
        ));
    }

    #[tokio::test]
    async fn test_receive_customer_payment_floors_and_stamps_date() {
        let db = test_db().await;
        let t = tenant();
        let customer = db
            .customers()
            .create(&t, "Bilal", "0300-1234567", Money::from_rupees(50_000))
            .await
            .unwrap();

        db.ledger()
            .receive_customer_payment(&t, &customer.id, Money::from_rupees(100))
            .await
            .unwrap();

        let row = db.customers().get(&t, &customer.id).await.unwrap().unwrap();
        assert_eq!(row.credit_balance, Money::ZERO);
        assert!(row.last_payment_date.is_some());

        let err = db
            .ledger()
            .receive_customer_payment(&t, "nobody", Money::from_rupees(10))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::NotFound {
                entity: "Customer",
                ..
            })
        ));
    }

    // -------------------------------------------------------------------------
    // Standalone sales return
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_sales_return_restocks_and_sums_refunds() {
        let db = test_db().await;
        let t = tenant();
        let a = seed_product(&db, &t, "Rice 5kg", "111", 700, 600, 3).await;
        let b = seed_product(&db, &t, "Ghee 1kg", "222", 500, 420, 0).await;

        let return_id = db
            .ledger()
            .create_sales_return(
                &t,
                CreateSalesReturn {
                    reason: "Damaged packaging".into(),
                    original_invoice_id: None,
                    items: vec![
                        ReturnLine {
                            product_id: a.id.clone(),
                            quantity: 1,
                            refund_amount: Money::from_rupees(700),
                        },
                        ReturnLine {
                            product_id: b.id.clone(),
                            quantity: 2,
                            refund_amount: Money::from_rupees(950),
                        },
                    ],
                },
            )
            .await
            .unwrap();

        assert_eq!(stock_of(&db, &t, &a.id).await, 4);
        assert_eq!(stock_of(&db, &t, &b.id).await, 2);

        let record = db
            .sales_returns()
            .get(&t, &return_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.refund_amount, Money::from_rupees(1_650));
        assert_eq!(
            db.sales_returns().items(&t, &return_id).await.unwrap().len(),
            2
        );
    }

    // -------------------------------------------------------------------------
    // Tenant isolation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_rows_of_another_tenant_are_invisible() {
        let db = test_db().await;
        let shop_a = TenantId::new("shop-a");
        let shop_b = TenantId::new("shop-b");
        let p = seed_product(&db, &shop_a, "Sugar 1kg", "111", 150, 130, 10).await;

        let err = db
            .ledger()
            .create_sale(
                &shop_b,
                sale(
                    vec![SaleLine {
                        product_id: p.id.clone(),
                        quantity: 1,
                    }],
                    PaymentMethod::Cash,
                    None,
                ),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::NotFound {
                entity: "Product",
                ..
            })
        ));
        assert!(db.products().get(&shop_b, &p.id).await.unwrap().is_none());
        assert_eq!(stock_of(&db, &shop_a, &p.id).await, 10);
    }
}
