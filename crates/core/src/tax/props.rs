//! Property tests for the tax calculators.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::TaxService;

/// Strategy for annual incomes from 0 to 20M pesos with centavo precision.
fn income_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..2_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Income at or below the threshold is exempt under both regimes.
    #[test]
    fn prop_exemption_threshold(income in (0i64..=25_000_000_000i64).prop_map(|n| Decimal::new(n, 5))) {
        prop_assume!(income <= dec!(250000));

        let flat = TaxService::flat_rate(income);
        let graduated = TaxService::graduated(income);

        prop_assert!(flat.is_exempt);
        prop_assert_eq!(flat.tax_due, Decimal::ZERO);
        prop_assert!(graduated.is_exempt);
        prop_assert_eq!(graduated.tax_due, Decimal::ZERO);
    }

    /// Above the threshold, flat-rate tax is exactly 8% of the full income.
    #[test]
    fn prop_flat_rate_is_eight_percent(income in income_strategy()) {
        prop_assume!(income > dec!(250000));

        let result = TaxService::flat_rate(income);
        prop_assert!(!result.is_exempt);
        prop_assert_eq!(result.tax_due, income * dec!(0.08));
    }

    /// Graduated tax is monotonically non-decreasing in income.
    #[test]
    fn prop_graduated_monotonic(a in income_strategy(), b in income_strategy()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let tax_lo = TaxService::graduated(lo).tax_due;
        let tax_hi = TaxService::graduated(hi).tax_due;

        prop_assert!(tax_lo <= tax_hi, "tax({lo}) = {tax_lo} > tax({hi}) = {tax_hi}");
    }

    /// The effective graduated rate never reaches the top marginal rate.
    #[test]
    fn prop_graduated_effective_rate_bounded(income in income_strategy()) {
        let result = TaxService::graduated(income);

        prop_assert!(result.effective_rate >= Decimal::ZERO);
        prop_assert!(result.effective_rate < dec!(35));
    }

    /// Graduated tax never exceeds the income itself.
    #[test]
    fn prop_graduated_tax_below_income(income in income_strategy()) {
        prop_assume!(income > Decimal::ZERO);
        prop_assert!(TaxService::graduated(income).tax_due < income);
    }
}
