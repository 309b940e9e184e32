//! # Report DTOs
//!
//! The read-side shapes the aggregation engine produces: the live
//! dashboard and the date-range report. These are plain data; the math
//! that fills them lives in [`crate::ledger_math`] and the scanning in
//! dukaan-db.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger_math::ProductTier;
use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Dashboard (today + trailing week)
// =============================================================================

/// One day in the weekly sales trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySales {
    /// Short weekday label, e.g. "Mon".
    pub label: String,
    pub total: Money,
    pub profit: Money,
}

/// Revenue share of one payment method over the trailing week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStat {
    pub method: PaymentMethod,
    pub amount: Money,
}

/// A best-seller row (trailing week, by quantity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// A product at or below its low-stock alert level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockItem {
    pub name: String,
    pub stock: i64,
}

/// One of the latest sales, as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSale {
    pub invoice_id: String,
    pub time: DateTime<Utc>,
    /// Customer name, or "Walking Customer" for anonymous sales.
    pub customer: String,
    pub amount: Money,
    /// "Credit" for udhaar sales, "Paid" otherwise.
    pub settlement: String,
}

/// The dashboard payload.
///
/// Note: today's sums include invoices that were later returned. A
/// return flips the status but does not remove the sale from the day's
/// totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_sales_today: Money,
    pub total_expenses_today: Money,
    pub total_profit_today: Money,
    pub low_stock_item_count: usize,
    /// Best seller of the trailing week, "N/A" if no sales.
    pub top_selling_product: String,
    pub sales_trend: Vec<DailySales>,
    pub payment_stats: Vec<PaymentStat>,
    pub top_products: Vec<TopProduct>,
    pub recent_sales: Vec<RecentSale>,
    pub low_stock_items: Vec<LowStockItem>,
}

// =============================================================================
// Date-range Report
// =============================================================================

/// Invoice count and revenue of one local hour-of-day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlySales {
    /// 0..=23, local time.
    pub hour: u32,
    pub amount: Money,
    pub count: i64,
}

/// One product's row in the profitability matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub name: String,
    pub sold: i64,
    pub revenue: Money,
    pub margin_pct: f64,
    pub tier: ProductTier,
}

/// A top customer by spend over the period (walk-ins excluded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInsight {
    pub name: String,
    pub visits: i64,
    pub spent: Money,
}

/// The date-range report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub total_revenue: Money,
    pub total_expenses: Money,
    /// revenue − expenses.
    pub net_cash_flow: Money,
    /// revenue − COGS − expenses.
    pub total_profit: Money,

    /// vs. the preceding window of equal length.
    pub sales_growth_pct: f64,
    pub average_basket_value: Money,
    pub customer_retention_pct: f64,
    pub total_transactions: i64,

    /// Cost value of all stock currently on hand.
    pub inventory_cost_value: Money,
    /// What the stock on hand would bring in minus what it cost.
    pub projected_profit_value: Money,

    pub peak_hours: Vec<HourlySales>,
    pub product_performance: Vec<ProductPerformance>,
    pub top_customers: Vec<CustomerInsight>,
}
