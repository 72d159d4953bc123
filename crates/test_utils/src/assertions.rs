//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than plain `assert_eq!`.

use domain_fund::{calculate_units, UnitLink};
use domain_investment::{InvestmentItem, InvestmentPayment};
use rust_decimal::Decimal;

/// Asserts that two decimals differ by at most `tolerance`
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Decimals differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts `amount == total_amount + fee_amount` for every item
pub fn assert_items_balanced(items: &[InvestmentItem]) {
    for item in items {
        assert!(
            item.is_balanced(),
            "Item {} is unbalanced: amount={}, total_amount={}, fee_amount={}",
            item.id,
            item.amount,
            item.total_amount,
            item.fee_amount
        );
    }
}

/// Asserts the row carries `nav` and `ip == total_amount / nav`
pub fn assert_priced_at(row: &UnitLink, nav: Decimal) {
    assert_eq!(row.nab, nav, "UnitLink {} priced at {}, expected {}", row.id, row.nab, nav);
    assert_eq!(
        row.ip,
        calculate_units(row.total_amount, nav),
        "UnitLink {} holds {} units for {} at {}",
        row.id,
        row.ip,
        row.total_amount,
        nav
    );
}

/// Asserts the row has not been priced yet
pub fn assert_pending(row: &UnitLink) {
    assert!(
        row.nab.is_zero() && row.ip.is_zero(),
        "UnitLink {} expected pending, got nab={}, ip={}",
        row.id,
        row.nab,
        row.ip
    );
}

/// Asserts the payment is the rounded-up gross of the items
pub fn assert_payment_covers(payment: &InvestmentPayment, items: &[InvestmentItem]) {
    let gross: Decimal = items.iter().map(|item| item.amount).sum();
    assert_eq!(
        payment.amount,
        gross.ceil(),
        "Payment {} of {} does not cover gross {}",
        payment.id,
        payment.amount,
        gross
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_decimal_approx_eq(dec!(100.001), dec!(100.000), dec!(0.01));
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_approx_eq_outside_tolerance() {
        assert_decimal_approx_eq(dec!(100.5), dec!(100.0), dec!(0.01));
    }
}
