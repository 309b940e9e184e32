//! # Ledger Command Inputs
//!
//! The write-side contracts the ledger accepts. The surrounding API layer
//! deserializes requests into these and hands them, together with the
//! `TenantId` it resolved, to `dukaan-db`'s ledger.
//!
//! Quantities and prices here are caller input; totals are never trusted
//! from the caller and are always recomputed server-side.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Sale
// =============================================================================

/// One requested sale line: which product, how many.
///
/// The unit price is deliberately absent; it is read from the product row
/// at sale time and frozen into the invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Checkout command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSale {
    /// Required when `payment_method` is Credit; optional (walk-in) otherwise.
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub discount_amount: Money,
    /// What the customer tendered. Ignored (forced to zero) for credit sales.
    pub paid_amount: Money,
    pub items: Vec<SaleLine>,
}

// =============================================================================
// Purchase
// =============================================================================

/// One received purchase line, priced by the supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost: Money,
}

/// Stock-in command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchase {
    pub supplier_id: String,
    /// The supplier's own invoice number.
    pub invoice_number: String,
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,
    pub items: Vec<PurchaseLine>,
}

// =============================================================================
// Standalone Sales Return
// =============================================================================

/// One returned line with the refund the counter agreed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLine {
    pub product_id: String,
    pub quantity: i64,
    pub refund_amount: Money,
}

/// Standalone return command (not tied to an invoice's status flow).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSalesReturn {
    pub reason: String,
    pub original_invoice_id: Option<String>,
    pub items: Vec<ReturnLine>,
}
