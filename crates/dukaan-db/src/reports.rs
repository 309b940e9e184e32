//! # Report Engine
//!
//! Read-only rollups over the ledger tables: the live dashboard (today +
//! trailing week) and the date-range report. Scans load the window's
//! invoice heads and lines once, then all math happens in memory via
//! [`dukaan_core::ledger_math`].
//!
//! Two rules worth knowing before reading the numbers:
//! - Returned invoices are NOT excluded from revenue sums; a return flips
//!   the status but the sale still counts toward its day.
//! - COGS uses the product's CURRENT cost, not a cost snapshot from sale
//!   time, capped at the sale price so bad cost data cannot produce
//!   negative gross profit.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, NaiveTime, Timelike, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use dukaan_core::ledger_math;
use dukaan_core::reports::{
    CustomerInsight, DailySales, DashboardStats, HourlySales, LowStockItem, PaymentStat, Report,
    ProductPerformance, RecentSale, TopProduct,
};
use dukaan_core::{Money, PaymentMethod, TenantId};

// =============================================================================
// Scan row shapes
// =============================================================================

/// An invoice head joined with its customer's name (if any).
#[derive(Debug, sqlx::FromRow)]
struct InvoiceHead {
    id: String,
    date: DateTime<Utc>,
    total_amount: Money,
    payment_method: PaymentMethod,
    customer_id: Option<String>,
    customer_name: Option<String>,
}

/// An invoice line joined with the product's current prices. The product
/// may have been deleted since the sale; its costs then read as NULL.
#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    invoice_id: String,
    product_name: String,
    quantity: i64,
    unit_price: Money,
    cost_price: Option<Money>,
    sale_price: Option<Money>,
}

impl LineRow {
    /// COGS contribution: current cost capped at current sale price, zero
    /// when the product row is gone.
    fn cogs(&self) -> Money {
        match (self.cost_price, self.sale_price) {
            (Some(cost), Some(sale)) => ledger_math::capped_cost(cost, sale) * self.quantity,
            _ => Money::ZERO,
        }
    }

    /// Revenue contribution at the frozen sale-time price.
    fn revenue(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Stock-on-hand valuation row.
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    stock_quantity: i64,
    cost_price: Money,
    sale_price: Money,
}

// =============================================================================
// Reports
// =============================================================================

/// The read-only aggregation engine. Obtained via `Database::reports()`.
#[derive(Debug, Clone)]
pub struct Reports {
    pool: SqlitePool,
}

impl Reports {
    /// Creates a new Reports engine over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Reports { pool }
    }

    // -------------------------------------------------------------------------
    // Dashboard
    // -------------------------------------------------------------------------

    /// Computes the dashboard: today's figures plus the trailing 7 days.
    pub async fn dashboard_stats(&self, tenant: &TenantId) -> DbResult<DashboardStats> {
        let now = Utc::now();
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let tomorrow = today + Duration::days(1);
        let week_start = today - Duration::days(6);

        debug!(tenant = %tenant, "Computing dashboard stats");

        let weekly_heads = self.heads_in_range(tenant, week_start, tomorrow).await?;
        let weekly_lines = self.lines_in_range(tenant, week_start, tomorrow).await?;

        // ---- Today's figures ----
        let todays_ids: Vec<&str> = weekly_heads
            .iter()
            .filter(|h| h.date >= today)
            .map(|h| h.id.as_str())
            .collect();

        let total_sales_today: Money = weekly_heads
            .iter()
            .filter(|h| h.date >= today)
            .map(|h| h.total_amount)
            .sum();

        let cogs_today: Money = weekly_lines
            .iter()
            .filter(|l| todays_ids.contains(&l.invoice_id.as_str()))
            .map(LineRow::cogs)
            .sum();

        let total_expenses_today = self.sum_expenses(tenant, today, tomorrow).await?;

        // ---- Chart 1: payment mix over the week ----
        let mut mix: HashMap<PaymentMethod, Money> = HashMap::new();
        for head in &weekly_heads {
            *mix.entry(head.payment_method).or_insert(Money::ZERO) += head.total_amount;
        }
        let mut payment_stats: Vec<PaymentStat> = mix
            .into_iter()
            .map(|(method, amount)| PaymentStat { method, amount })
            .collect();
        payment_stats.sort_by(|a, b| b.amount.cmp(&a.amount));

        // ---- Chart 2: top 5 products by quantity ----
        let mut by_product: HashMap<&str, (i64, Money)> = HashMap::new();
        for line in &weekly_lines {
            let entry = by_product
                .entry(line.product_name.as_str())
                .or_insert((0, Money::ZERO));
            entry.0 += line.quantity;
            entry.1 += line.revenue();
        }
        let mut top_products: Vec<TopProduct> = by_product
            .into_iter()
            .map(|(name, (quantity, revenue))| TopProduct {
                name: name.to_string(),
                quantity,
                revenue,
            })
            .collect();
        top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        top_products.truncate(5);

        // ---- Chart 3: weekly trend ----
        let day_of: HashMap<&str, i64> = weekly_heads
            .iter()
            .map(|h| (h.id.as_str(), (h.date - week_start).num_days()))
            .collect();

        let mut day_sales = [Money::ZERO; 7];
        let mut day_cogs = [Money::ZERO; 7];
        for head in &weekly_heads {
            let day = (head.date - week_start).num_days();
            if (0..7).contains(&day) {
                day_sales[day as usize] += head.total_amount;
            }
        }
        for line in &weekly_lines {
            if let Some(&day) = day_of.get(line.invoice_id.as_str()) {
                if (0..7).contains(&day) {
                    day_cogs[day as usize] += line.cogs();
                }
            }
        }
        let sales_trend: Vec<DailySales> = (0..7)
            .map(|i| {
                let day = week_start + Duration::days(i);
                DailySales {
                    label: day.format("%a").to_string(),
                    total: day_sales[i as usize],
                    profit: day_sales[i as usize] - day_cogs[i as usize],
                }
            })
            .collect();

        // ---- Lists ----
        let low_stock_items = self.low_stock(tenant, 5).await?;
        let recent_sales = self.recent_sales(tenant, 5).await?;

        let top_selling_product = top_products
            .first()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "N/A".to_string());

        Ok(DashboardStats {
            total_sales_today,
            total_expenses_today,
            total_profit_today: total_sales_today - cogs_today,
            low_stock_item_count: low_stock_items.len(),
            top_selling_product,
            sales_trend,
            payment_stats,
            top_products,
            recent_sales,
            low_stock_items,
        })
    }

    // -------------------------------------------------------------------------
    // Date-range report
    // -------------------------------------------------------------------------

    /// Computes the report over `[from, to)`, comparing against the
    /// preceding window of equal length for the growth figure.
    pub async fn generate_report(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Report> {
        debug!(tenant = %tenant, %from, %to, "Generating report");

        let duration = to - from;
        let prev_from = from - duration;

        let heads = self.heads_in_range(tenant, from, to).await?;
        let lines = self.lines_in_range(tenant, from, to).await?;
        let previous_revenue = self.sum_invoice_totals(tenant, prev_from, from).await?;
        let total_expenses = self.sum_expenses(tenant, from, to).await?;

        // ---- Financials ----
        let total_revenue: Money = heads.iter().map(|h| h.total_amount).sum();
        let total_transactions = heads.len() as i64;
        let total_cogs: Money = lines.iter().map(LineRow::cogs).sum();
        let total_profit = total_revenue - total_cogs - total_expenses;

        // ---- Scaling insights ----
        let sales_growth_pct = ledger_math::growth_percent(total_revenue, previous_revenue);
        let average_basket_value = ledger_math::average_basket(total_revenue, total_transactions);

        // Retention: linked customers only, returning = seen on ≥ 2 invoices
        let mut visits_per_customer: HashMap<&str, i64> = HashMap::new();
        for head in &heads {
            if let Some(customer_id) = head.customer_id.as_deref() {
                *visits_per_customer.entry(customer_id).or_insert(0) += 1;
            }
        }
        let unique = visits_per_customer.len();
        let returning = visits_per_customer.values().filter(|&&v| v > 1).count();
        let customer_retention_pct = ledger_math::retention_percent(returning, unique);

        // ---- Peak hours (local time) ----
        let mut by_hour: HashMap<u32, (Money, i64)> = HashMap::new();
        for head in &heads {
            let hour = head.date.with_timezone(&Local).hour();
            let entry = by_hour.entry(hour).or_insert((Money::ZERO, 0));
            entry.0 += head.total_amount;
            entry.1 += 1;
        }
        let mut peak_hours: Vec<HourlySales> = by_hour
            .into_iter()
            .map(|(hour, (amount, count))| HourlySales {
                hour,
                amount,
                count,
            })
            .collect();
        peak_hours.sort_by_key(|h| h.hour);

        // ---- Profitability matrix ----
        struct ProductAgg {
            sold: i64,
            revenue: Money,
            sample_price: Money,
            sample_cost: Money,
        }
        let mut by_product: HashMap<&str, ProductAgg> = HashMap::new();
        for line in &lines {
            let entry = by_product
                .entry(line.product_name.as_str())
                .or_insert(ProductAgg {
                    sold: 0,
                    revenue: Money::ZERO,
                    sample_price: line.unit_price,
                    sample_cost: line.cost_price.unwrap_or(Money::ZERO),
                });
            entry.sold += line.quantity;
            entry.revenue += line.revenue();
        }
        let mut product_performance: Vec<ProductPerformance> = by_product
            .into_iter()
            .map(|(name, agg)| {
                let margin_pct = ledger_math::margin_percent(agg.sample_price, agg.sample_cost);
                ProductPerformance {
                    name: name.to_string(),
                    sold: agg.sold,
                    revenue: agg.revenue,
                    margin_pct,
                    tier: ledger_math::classify_product(margin_pct, agg.sold),
                }
            })
            .collect();
        product_performance.sort_by(|a, b| b.revenue.cmp(&a.revenue));
        product_performance.truncate(50);

        // ---- VIP customers (walk-ins excluded) ----
        let mut by_customer: HashMap<&str, (i64, Money)> = HashMap::new();
        for head in &heads {
            if let Some(name) = head.customer_name.as_deref() {
                let entry = by_customer.entry(name).or_insert((0, Money::ZERO));
                entry.0 += 1;
                entry.1 += head.total_amount;
            }
        }
        let mut top_customers: Vec<CustomerInsight> = by_customer
            .into_iter()
            .map(|(name, (visits, spent))| CustomerInsight {
                name: name.to_string(),
                visits,
                spent,
            })
            .collect();
        top_customers.sort_by(|a, b| b.spent.cmp(&a.spent));
        top_customers.truncate(5);

        // ---- Stock-on-hand valuation ----
        let stock_rows = sqlx::query_as::<_, StockRow>(
            "SELECT stock_quantity, cost_price, sale_price FROM products WHERE tenant_id = ?",
        )
        .bind(tenant.as_str())
        .fetch_all(&self.pool)
        .await?;

        let inventory_cost_value: Money = stock_rows
            .iter()
            .map(|r| r.cost_price * r.stock_quantity)
            .sum();
        let potential_revenue: Money = stock_rows
            .iter()
            .map(|r| r.sale_price * r.stock_quantity)
            .sum();

        Ok(Report {
            total_revenue,
            total_expenses,
            net_cash_flow: total_revenue - total_expenses,
            total_profit,
            sales_growth_pct,
            average_basket_value,
            customer_retention_pct,
            total_transactions,
            inventory_cost_value,
            projected_profit_value: potential_revenue - inventory_cost_value,
            peak_hours,
            product_performance,
            top_customers,
        })
    }

    // -------------------------------------------------------------------------
    // Scan queries
    // -------------------------------------------------------------------------

    async fn heads_in_range(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<InvoiceHead>> {
        let heads = sqlx::query_as::<_, InvoiceHead>(
            r#"
            SELECT i.id, i.date, i.total_amount, i.payment_method, i.customer_id,
                   c.name AS customer_name
            FROM invoices i
            LEFT JOIN customers c ON c.id = i.customer_id AND c.tenant_id = i.tenant_id
            WHERE i.tenant_id = ? AND i.date >= ? AND i.date < ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(heads)
    }

    async fn lines_in_range(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<LineRow>> {
        let lines = sqlx::query_as::<_, LineRow>(
            r#"
            SELECT it.invoice_id, it.product_name, it.quantity, it.unit_price,
                   p.cost_price, p.sale_price
            FROM invoice_items it
            INNER JOIN invoices i ON i.id = it.invoice_id
            LEFT JOIN products p ON p.id = it.product_id AND p.tenant_id = it.tenant_id
            WHERE it.tenant_id = ? AND i.date >= ? AND i.date < ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn sum_invoice_totals(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Money> {
        let paisa: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0) FROM invoices
            WHERE tenant_id = ? AND date >= ? AND date < ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_paisa(paisa))
    }

    async fn sum_expenses(
        &self,
        tenant: &TenantId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Money> {
        let paisa: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM expenses
            WHERE tenant_id = ? AND date >= ? AND date < ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_paisa(paisa))
    }

    async fn low_stock(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<LowStockItem>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            name: String,
            stock_quantity: i64,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT name, stock_quantity FROM products
            WHERE tenant_id = ? AND stock_quantity <= low_stock_alert
            ORDER BY stock_quantity
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LowStockItem {
                name: r.name,
                stock: r.stock_quantity,
            })
            .collect())
    }

    async fn recent_sales(&self, tenant: &TenantId, limit: u32) -> DbResult<Vec<RecentSale>> {
        let heads = sqlx::query_as::<_, InvoiceHead>(
            r#"
            SELECT i.id, i.date, i.total_amount, i.payment_method, i.customer_id,
                   c.name AS customer_name
            FROM invoices i
            LEFT JOIN customers c ON c.id = i.customer_id AND c.tenant_id = i.tenant_id
            WHERE i.tenant_id = ?
            ORDER BY i.date DESC
            LIMIT ?
            "#,
        )
        .bind(tenant.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(heads
            .into_iter()
            .map(|h| RecentSale {
                invoice_id: h.id,
                time: h.date,
                customer: h
                    .customer_name
                    .unwrap_or_else(|| "Walking Customer".to_string()),
                amount: h.total_amount,
                settlement: if h.payment_method.is_credit() {
                    "Credit".to_string()
                } else {
                    "Paid".to_string()
                },
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
