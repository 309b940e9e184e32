//! # Domain Types
//!
//! Core domain types used throughout Dukaan POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                Parties                 Ledger records          │
//! │  ┌────────────┐         ┌────────────┐          ┌─────────────────┐     │
//! │  │  Product   │         │  Customer  │          │ Invoice + Items │     │
//! │  │  Category  │         │  Supplier  │          │ Purchase + Items│     │
//! │  └────────────┘         └────────────┘          │ SalesReturn + It│     │
//! │                                                 └─────────────────┘     │
//! │  Read-only side         Append-only                                     │
//! │  ┌────────────┐         ┌────────────┐                                  │
//! │  │  Expense   │         │  AuditLog  │                                  │
//! │  └────────────┘         └────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Discipline
//! Every entity carries a private `tenant_id` set once by its constructor.
//! There is no way to build a row without naming the shop it belongs to,
//! and no way to move a row between shops afterwards.
//!
//! ## Snapshot Pattern
//! Invoice lines freeze the product name and unit price at sale time, so a
//! later price change never rewrites a historical invoice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::money::Money;
use crate::tenant::TenantId;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale or purchase was (or will be) paid.
///
/// `Credit` is the udhaar case: nothing changes hands now, the party's
/// running balance moves instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Bank transfer.
    Bank,
    /// Deferred payment (udhaar) - moves a running balance.
    Credit,
}

impl PaymentMethod {
    /// Whether this method defers payment to a running balance.
    #[inline]
    pub const fn is_credit(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Bank => "Bank",
            PaymentMethod::Credit => "Credit",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// The status of a sale invoice.
///
/// Completed → Returned happens at most once; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Sale went through; stock deducted, balances moved.
    Completed,
    /// Sale was reversed: stock restored, credit debt reduced.
    Returned,
}

// =============================================================================
// Purchase Status
// =============================================================================

/// The status of a stock-in purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Ordered from the supplier, goods not yet on the shelf.
    Ordered,
    /// Goods received; stock and payables already moved.
    Received,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category. Cannot be deleted while products reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    tenant_id: TenantId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(tenant: &TenantId, name: impl Into<String>) -> Self {
        Category {
            id: new_id(),
            tenant_id: tenant.clone(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// A product on the shelf.
///
/// The ledger is the only writer of `stock_quantity` and `cost_price`
/// outside catalog maintenance: sales decrement stock, returns and
/// purchases increment it, and each purchase overwrites the cost with the
/// latest unit cost (latest-cost-wins, no weighted average).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    tenant_id: TenantId,
    pub name: String,
    /// Barcode, unique within the tenant.
    pub barcode: String,
    /// Optional human SKU; empty means "not assigned".
    pub sku: Option<String>,
    pub sale_price: Money,
    pub cost_price: Money,
    /// Units on the shelf. Never negative.
    pub stock_quantity: i64,
    /// Dashboard warns when stock_quantity drops to this level.
    pub low_stock_alert: i64,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(tenant: &TenantId, new: NewProduct) -> Self {
        Product {
            id: new_id(),
            tenant_id: tenant.clone(),
            name: new.name,
            barcode: new.barcode,
            sku: new.sku,
            sale_price: new.sale_price,
            cost_price: new.cost_price,
            stock_quantity: new.stock_quantity,
            low_stock_alert: new.low_stock_alert,
            category_id: new.category_id,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Whether the shelf is at or below the alert level.
    #[inline]
    pub fn is_low_on_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_alert
    }
}

/// Input for creating a product (see `ProductRepository::create`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub barcode: String,
    pub sku: Option<String>,
    pub sale_price: Money,
    pub cost_price: Money,
    pub stock_quantity: i64,
    pub low_stock_alert: i64,
    pub category_id: String,
}

impl NewProduct {
    /// Default alert threshold when the caller does not pick one.
    pub const DEFAULT_LOW_STOCK_ALERT: i64 = 5;
}

// =============================================================================
// Parties
// =============================================================================

/// A known customer of the shop.
///
/// `credit_balance` is the running udhaar: positive means the customer
/// owes the shop. Credit sales increment it; returns of credit sales and
/// received payments decrement it, floored at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    tenant_id: TenantId,
    pub name: String,
    pub phone: String,
    pub credit_balance: Money,
    /// Advisory ceiling for udhaar; stored, not enforced at sale time.
    pub credit_limit: Money,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        tenant: &TenantId,
        name: impl Into<String>,
        phone: impl Into<String>,
        credit_limit: Money,
    ) -> Self {
        Customer {
            id: new_id(),
            tenant_id: tenant.clone(),
            name: name.into(),
            phone: phone.into(),
            credit_balance: Money::ZERO,
            credit_limit,
            last_payment_date: None,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// A supplier the shop buys stock from.
///
/// `balance` is the payable: positive means the shop owes the supplier.
/// Unpaid purchase remainders increment it; explicit payments and credit
/// purchase reversals decrement it, floored at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    tenant_id: TenantId,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(
        tenant: &TenantId,
        name: impl Into<String>,
        contact_person: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Supplier {
            id: new_id(),
            tenant_id: tenant.clone(),
            name: name.into(),
            contact_person: contact_person.into(),
            phone: phone.into(),
            balance: Money::ZERO,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

// =============================================================================
// Invoice (sale header + lines)
// =============================================================================

/// A sale invoice.
///
/// All money fields are computed server-side from the lines; nothing is
/// trusted from the caller except the discount and the tendered amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    tenant_id: TenantId,
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    /// Σ(quantity × unit_price) over the lines.
    pub total_amount: Money,
    pub discount_amount: Money,
    /// total_amount − discount_amount. May go negative: the discount is
    /// deliberately not validated against the total.
    pub net_amount: Money,
    /// What actually changed hands now. Forced to zero for credit sales.
    pub paid_amount: Money,
    pub change_given: Money,
    pub payment_method: PaymentMethod,
    pub status: InvoiceStatus,
    pub customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Starts a Completed invoice with zeroed money fields; the sale
    /// protocol fills them in once the lines are priced.
    pub fn new(
        tenant: &TenantId,
        invoice_number: String,
        payment_method: PaymentMethod,
        customer_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Invoice {
            id: new_id(),
            tenant_id: tenant.clone(),
            invoice_number,
            date: now,
            total_amount: Money::ZERO,
            discount_amount: Money::ZERO,
            net_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            change_given: Money::ZERO,
            payment_method,
            status: InvoiceStatus::Completed,
            customer_id,
            created_at: now,
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// A line on an invoice. Product name and unit price are frozen at sale
/// time (snapshot pattern).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    tenant_id: TenantId,
    pub invoice_id: String,
    pub product_id: String,
    /// Product name at sale time (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at sale time (frozen).
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

impl InvoiceItem {
    pub fn new(
        tenant: &TenantId,
        invoice_id: impl Into<String>,
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        InvoiceItem {
            id: new_id(),
            tenant_id: tenant.clone(),
            invoice_id: invoice_id.into(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// quantity × unit_price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Purchase (stock-in header + lines)
// =============================================================================

/// A stock-in purchase from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    tenant_id: TenantId,
    /// The supplier's own invoice number, carried verbatim.
    pub invoice_number: String,
    pub date: DateTime<Utc>,
    pub total_amount: Money,
    pub amount_paid: Money,
    pub payment_method: PaymentMethod,
    pub status: PurchaseStatus,
    pub supplier_id: String,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(
        tenant: &TenantId,
        invoice_number: impl Into<String>,
        supplier_id: impl Into<String>,
        payment_method: PaymentMethod,
        amount_paid: Money,
    ) -> Self {
        let now = Utc::now();
        Purchase {
            id: new_id(),
            tenant_id: tenant.clone(),
            invoice_number: invoice_number.into(),
            date: now,
            total_amount: Money::ZERO,
            amount_paid,
            payment_method,
            status: PurchaseStatus::Received,
            supplier_id: supplier_id.into(),
            created_at: now,
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// The unpaid remainder this purchase put on the supplier's balance.
    #[inline]
    pub fn pending_amount(&self) -> Money {
        self.total_amount - self.amount_paid
    }
}

/// A line on a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: String,
    tenant_id: TenantId,
    pub purchase_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub created_at: DateTime<Utc>,
}

impl PurchaseItem {
    pub fn new(
        tenant: &TenantId,
        purchase_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: i64,
        unit_cost: Money,
    ) -> Self {
        PurchaseItem {
            id: new_id(),
            tenant_id: tenant.clone(),
            purchase_id: purchase_id.into(),
            product_id: product_id.into(),
            quantity,
            unit_cost,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// quantity × unit_cost.
    #[inline]
    pub fn total_cost(&self) -> Money {
        self.unit_cost * self.quantity
    }
}

// =============================================================================
// Sales Return (standalone, not tied to an invoice)
// =============================================================================

/// A standalone return record: goods coming back over the counter without
/// an invoice to reverse (e.g. third-party drop-offs). Restocks products
/// and records the refund, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesReturn {
    pub id: String,
    tenant_id: TenantId,
    pub date: DateTime<Utc>,
    pub reason: String,
    /// Σ of the per-line refunds.
    pub refund_amount: Money,
    pub original_invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SalesReturn {
    pub fn new(
        tenant: &TenantId,
        reason: impl Into<String>,
        original_invoice_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        SalesReturn {
            id: new_id(),
            tenant_id: tenant.clone(),
            date: now,
            reason: reason.into(),
            refund_amount: Money::ZERO,
            original_invoice_id,
            created_at: now,
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

/// A line on a standalone return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesReturnItem {
    pub id: String,
    tenant_id: TenantId,
    pub sales_return_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub refund_amount: Money,
    pub created_at: DateTime<Utc>,
}

impl SalesReturnItem {
    pub fn new(
        tenant: &TenantId,
        sales_return_id: impl Into<String>,
        product_id: impl Into<String>,
        quantity: i64,
        refund_amount: Money,
    ) -> Self {
        SalesReturnItem {
            id: new_id(),
            tenant_id: tenant.clone(),
            sales_return_id: sales_return_id.into(),
            product_id: product_id.into(),
            quantity,
            refund_amount,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

// =============================================================================
// Expense
// =============================================================================

/// An operating expense. Read by reports only; the ledger never touches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: String,
    tenant_id: TenantId,
    pub description: String,
    pub amount: Money,
    /// Free-form bucket: "Utilities", "Rent", "Salary", ...
    pub category: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        tenant: &TenantId,
        description: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Expense {
            id: new_id(),
            tenant_id: tenant.clone(),
            description: description.into(),
            amount,
            category: category.into(),
            date,
            created_at: Utc::now(),
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// An append-only audit record. Write-only from the ledger's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLog {
    pub id: String,
    tenant_id: TenantId,
    pub timestamp: DateTime<Utc>,
    /// e.g. "Return", "Deleted Purchase"
    pub action: String,
    /// Human-readable detail line, e.g. "Invoice INV-00123 was returned."
    pub details: String,
    pub username: String,
    /// Highlights red in the dashboard.
    pub is_suspicious: bool,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        tenant: &TenantId,
        action: impl Into<String>,
        details: impl Into<String>,
        username: impl Into<String>,
        is_suspicious: bool,
    ) -> Self {
        let now = Utc::now();
        AuditLog {
            id: new_id(),
            tenant_id: tenant.clone(),
            timestamp: now,
            action: action.into(),
            details: details.into(),
            username: username.into(),
            is_suspicious,
            created_at: now,
        }
    }

    /// The shop this row belongs to.
    #[inline]
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantId {
        TenantId::new("shop-01")
    }

    #[test]
    fn test_constructors_stamp_the_tenant() {
        let t = tenant();
        let cat = Category::new(&t, "Beverages");
        let product = Product::new(
            &t,
            NewProduct {
                name: "Tapal Danedar 950g".into(),
                barcode: "8964000050011".into(),
                sku: None,
                sale_price: Money::from_rupees(900),
                cost_price: Money::from_rupees(800),
                stock_quantity: 10,
                low_stock_alert: NewProduct::DEFAULT_LOW_STOCK_ALERT,
                category_id: cat.id.clone(),
            },
        );
        assert_eq!(product.tenant_id(), &t);
        assert_eq!(cat.tenant_id(), &t);
        assert!(!product.is_low_on_stock());
    }

    #[test]
    fn test_line_totals() {
        let t = tenant();
        let line = InvoiceItem::new(&t, "inv-1", "prod-1", "Lux Soap", 3, Money::from_paisa(5500));
        assert_eq!(line.line_total(), Money::from_paisa(16500));

        let pline = PurchaseItem::new(&t, "pur-1", "prod-1", 12, Money::from_paisa(4200));
        assert_eq!(pline.total_cost(), Money::from_paisa(50400));
    }

    #[test]
    fn test_invoice_starts_completed_and_zeroed() {
        let t = tenant();
        let inv = Invoice::new(&t, "INV-0001".into(), PaymentMethod::Cash, None);
        assert_eq!(inv.status, InvoiceStatus::Completed);
        assert!(inv.total_amount.is_zero());
        assert!(inv.net_amount.is_zero());
    }

    #[test]
    fn test_pending_amount() {
        let t = tenant();
        let mut purchase = Purchase::new(&t, "SUP-77", "sup-1", PaymentMethod::Cash, Money::from_rupees(300));
        purchase.total_amount = Money::from_rupees(1000);
        assert_eq!(purchase.pending_amount(), Money::from_rupees(700));
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::Cash.to_string(), "Cash");
        assert_eq!(PaymentMethod::Credit.to_string(), "Credit");
        assert!(PaymentMethod::Credit.is_credit());
        assert!(!PaymentMethod::Bank.is_credit());
    }
}
