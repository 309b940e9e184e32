//! # Ledger Math
//!
//! The pure arithmetic behind every ledger protocol and report rollup.
//! Everything here is a deterministic function over values the storage
//! layer already loaded; nothing touches the database.
//!
//! Keeping these rules out of the SQL means every invariant in the system
//! (net = total − discount, change never negative, floors at zero, the
//! growth/retention edge cases) has a plain `#[test]` pinning it down.

use crate::money::Money;

// =============================================================================
// Sale Arithmetic
// =============================================================================

/// Server-side invoice totals. Never trusted from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    /// Σ(quantity × unit_price) over the lines.
    pub total: Money,
    /// total − discount. May be negative: the discount is not capped
    /// against the total.
    pub net: Money,
}

/// Computes invoice totals from priced lines.
pub fn sale_totals<I>(lines: I, discount: Money) -> SaleTotals
where
    I: IntoIterator<Item = (i64, Money)>,
{
    let total: Money = lines.into_iter().map(|(qty, unit)| unit * qty).sum();
    SaleTotals {
        total,
        net: total - discount,
    }
}

/// Change handed back to the customer: max(0, paid − net).
#[inline]
pub fn change_given(paid: Money, net: Money) -> Money {
    (paid - net).floor_zero()
}

/// The unpaid remainder of a purchase bill: total − paid.
///
/// Only a strictly positive remainder moves the supplier's balance; the
/// payment-method label plays no part in that decision.
#[inline]
pub fn pending_debt(total: Money, amount_paid: Money) -> Money {
    total - amount_paid
}

// =============================================================================
// Report Arithmetic
// =============================================================================

/// Period-over-period revenue growth, in percent, rounded to one decimal.
///
/// Edge cases are fixed by contract:
/// - previous = 0, current > 0  → 100.0
/// - previous = 0, current = 0  → 0.0
pub fn growth_percent(current: Money, previous: Money) -> f64 {
    if previous.is_positive() {
        let pct =
            (current.paisa() - previous.paisa()) as f64 / previous.paisa() as f64 * 100.0;
        round1(pct)
    } else if current.is_positive() {
        100.0
    } else {
        0.0
    }
}

/// Share of period customers who came back, in percent, rounded to one
/// decimal. "Returning" means ≥ 2 invoices within the period; walk-in
/// sales are excluded from both counts upstream.
pub fn retention_percent(returning: usize, unique: usize) -> f64 {
    if unique == 0 {
        return 0.0;
    }
    round1(returning as f64 / unique as f64 * 100.0)
}

/// Gross margin of a sold unit, in percent of its sale price, rounded to
/// one decimal. A free item (price 0) has no meaningful margin; report 0.
pub fn margin_percent(unit_price: Money, unit_cost: Money) -> f64 {
    if !unit_price.is_positive() {
        return 0.0;
    }
    round1(
        (unit_price.paisa() - unit_cost.paisa()) as f64 / unit_price.paisa() as f64 * 100.0,
    )
}

/// Average invoice value over a period.
pub fn average_basket(revenue: Money, transactions: i64) -> Money {
    if transactions > 0 {
        Money::from_paisa(revenue.paisa() / transactions)
    } else {
        Money::ZERO
    }
}

/// Unit cost used for COGS: capped at the sale price so a data-entry
/// error on cost can never report a negative gross profit.
#[inline]
pub fn capped_cost(cost: Money, sale_price: Money) -> Money {
    cost.min(sale_price)
}

// =============================================================================
// Product Profitability Matrix
// =============================================================================

/// Where a product lands in the margin × volume matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductTier {
    /// margin > 30% and more than 5 units sold.
    Star,
    /// margin < 15% but more than 5 units sold.
    Volume,
    /// margin < 15% and at most 5 units sold.
    Loss,
    /// margin > 30% but at most 5 units sold.
    Potential,
    /// Everything in between.
    Standard,
}

/// Classifies a product by its period margin% and units sold.
pub fn classify_product(margin_pct: f64, units_sold: i64) -> ProductTier {
    if margin_pct > 30.0 && units_sold > 5 {
        ProductTier::Star
    } else if margin_pct < 15.0 && units_sold > 5 {
        ProductTier::Volume
    } else if margin_pct < 15.0 && units_sold <= 5 {
        ProductTier::Loss
    } else if margin_pct > 30.0 && units_sold <= 5 {
        ProductTier::Potential
    } else {
        ProductTier::Standard
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_totals() {
        // 3 × Rs 55 + 2 × Rs 120 = Rs 405; Rs 5 off → Rs 400 net
        let totals = sale_totals(
            vec![(3, Money::from_rupees(55)), (2, Money::from_rupees(120))],
            Money::from_rupees(5),
        );
        assert_eq!(totals.total, Money::from_rupees(405));
        assert_eq!(totals.net, Money::from_rupees(400));
    }

    #[test]
    fn test_discount_can_exceed_total() {
        let totals = sale_totals(vec![(1, Money::from_rupees(100))], Money::from_rupees(150));
        assert_eq!(totals.net, Money::from_rupees(-50));
    }

    #[test]
    fn test_change_given_never_negative() {
        assert_eq!(
            change_given(Money::from_rupees(500), Money::from_rupees(420)),
            Money::from_rupees(80)
        );
        assert_eq!(
            change_given(Money::from_rupees(100), Money::from_rupees(420)),
            Money::ZERO
        );
    }

    #[test]
    fn test_growth_percent_edge_cases() {
        assert_eq!(
            growth_percent(Money::from_rupees(1000), Money::ZERO),
            100.0
        );
        assert_eq!(growth_percent(Money::ZERO, Money::ZERO), 0.0);
        assert_eq!(
            growth_percent(Money::from_rupees(1500), Money::from_rupees(1000)),
            50.0
        );
        assert_eq!(
            growth_percent(Money::from_rupees(500), Money::from_rupees(1000)),
            -50.0
        );
    }

    #[test]
    fn test_retention_percent() {
        assert_eq!(retention_percent(0, 0), 0.0);
        assert_eq!(retention_percent(1, 4), 25.0);
        assert_eq!(retention_percent(2, 3), 66.7);
    }

    #[test]
    fn test_margin_percent() {
        assert_eq!(
            margin_percent(Money::from_rupees(100), Money::from_rupees(60)),
            40.0
        );
        assert_eq!(margin_percent(Money::ZERO, Money::from_rupees(60)), 0.0);
    }

    #[test]
    fn test_capped_cost() {
        assert_eq!(
            capped_cost(Money::from_rupees(120), Money::from_rupees(100)),
            Money::from_rupees(100)
        );
        assert_eq!(
            capped_cost(Money::from_rupees(80), Money::from_rupees(100)),
            Money::from_rupees(80)
        );
    }

    #[test]
    fn test_average_basket() {
        assert_eq!(
            average_basket(Money::from_rupees(900), 3),
            Money::from_rupees(300)
        );
        assert_eq!(average_basket(Money::from_rupees(900), 0), Money::ZERO);
    }

    #[test]
    fn test_classify_product_matrix() {
        assert_eq!(classify_product(45.0, 20), ProductTier::Star);
        assert_eq!(classify_product(10.0, 20), ProductTier::Volume);
        assert_eq!(classify_product(10.0, 5), ProductTier::Loss);
        assert_eq!(classify_product(45.0, 5), ProductTier::Potential);
        assert_eq!(classify_product(20.0, 3), ProductTier::Standard);
        // the boundary sits at exactly 5 units: ≤ 5 is the low-volume side
        assert_eq!(classify_product(45.0, 6), ProductTier::Star);
    }
}
