//! Tax calculation service.
//!
//! Pure functions computing tax liability for a given annual income
//! under the two regimes. Amounts are `Decimal`; rates are fractions
//! (0.08, 0.15, ...) and effective rates are percentages.

use rust_decimal::Decimal;

use super::types::TaxAssessment;

/// Income at or below this amount is exempt under both regimes.
fn exemption_threshold() -> Decimal {
    Decimal::new(250_000, 0)
}

/// The flat-rate regime's single rate (8%).
fn flat_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// One row of the graduated schedule: bracket floor, marginal rate,
/// and the cumulative tax owed at the floor.
struct Bracket {
    lower: Decimal,
    rate: Decimal,
    base: Decimal,
}

/// The graduated schedule, ascending by bracket floor. An income exactly
/// on a floor belongs to that bracket (the marginal amount is then zero,
/// so the tax due is continuous across the boundary).
fn graduated_schedule() -> [Bracket; 6] {
    [
        Bracket {
            lower: Decimal::ZERO,
            rate: Decimal::ZERO,
            base: Decimal::ZERO,
        },
        Bracket {
            lower: Decimal::new(250_000, 0),
            rate: Decimal::new(15, 2),
            base: Decimal::ZERO,
        },
        Bracket {
            lower: Decimal::new(400_000, 0),
            rate: Decimal::new(20, 2),
            base: Decimal::new(22_500, 0),
        },
        Bracket {
            lower: Decimal::new(800_000, 0),
            rate: Decimal::new(25, 2),
            base: Decimal::new(102_500, 0),
        },
        Bracket {
            lower: Decimal::new(2_000_000, 0),
            rate: Decimal::new(30, 2),
            base: Decimal::new(402_500, 0),
        },
        Bracket {
            lower: Decimal::new(8_000_000, 0),
            rate: Decimal::new(35, 2),
            base: Decimal::new(2_202_500, 0),
        },
    ]
}

/// Tax calculation service.
///
/// Contains pure arithmetic only; no calculation here can fail.
/// Negative income is treated as zero (exempt).
pub struct TaxService;

impl TaxService {
    /// Computes tax due under the flat 8% regime.
    ///
    /// Income at or below the 250,000 threshold is exempt. Above it,
    /// the 8% applies to the *full* income, with no deduction of the
    /// threshold from the taxable base. That mirrors how the product
    /// has always computed it and is kept for compatibility.
    #[must_use]
    pub fn flat_rate(annual_income: Decimal) -> TaxAssessment {
        if annual_income <= exemption_threshold() {
            return TaxAssessment::exempt();
        }

        let tax_due = annual_income * flat_rate();
        TaxAssessment {
            tax_due,
            effective_rate: effective_rate(tax_due, annual_income),
            is_exempt: false,
        }
    }

    /// Computes tax due under the graduated bracket regime.
    ///
    /// The bracket of an income is the last schedule row whose floor is
    /// at or below the income; tax due is the row's cumulative base plus
    /// the marginal rate applied to the amount above the floor.
    #[must_use]
    pub fn graduated(annual_income: Decimal) -> TaxAssessment {
        if annual_income <= Decimal::ZERO {
            return TaxAssessment::exempt();
        }

        let schedule = graduated_schedule();
        let bracket = schedule
            .iter()
            .rev()
            .find(|b| b.lower <= annual_income)
            .unwrap_or(&schedule[0]);

        let tax_due = bracket.base + (annual_income - bracket.lower) * bracket.rate;

        TaxAssessment {
            tax_due,
            effective_rate: effective_rate(tax_due, annual_income),
            is_exempt: annual_income <= exemption_threshold(),
        }
    }
}

/// Tax due as a percentage of income; zero for non-positive income.
fn effective_rate(tax_due: Decimal, income: Decimal) -> Decimal {
    if income > Decimal::ZERO {
        tax_due / income * Decimal::new(100, 0)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_rate_exempt_at_threshold() {
        let result = TaxService::flat_rate(dec!(250000));
        assert!(result.is_exempt);
        assert_eq!(result.tax_due, Decimal::ZERO);
        assert_eq!(result.effective_rate, Decimal::ZERO);
    }

    #[test]
    fn test_flat_rate_below_threshold() {
        let result = TaxService::flat_rate(dec!(180000));
        assert!(result.is_exempt);
        assert_eq!(result.tax_due, Decimal::ZERO);
    }

    #[test]
    fn test_flat_rate_above_threshold() {
        // 8% on the full income, no threshold deduction.
        let result = TaxService::flat_rate(dec!(500000));
        assert!(!result.is_exempt);
        assert_eq!(result.tax_due, dec!(40000.00));
        assert_eq!(result.effective_rate, dec!(8.00));
    }

    #[test]
    fn test_flat_rate_just_above_threshold() {
        let result = TaxService::flat_rate(dec!(250001));
        assert!(!result.is_exempt);
        assert_eq!(result.tax_due, dec!(250001) * dec!(0.08));
    }

    #[test]
    fn test_flat_rate_negative_income() {
        let result = TaxService::flat_rate(dec!(-1000));
        assert!(result.is_exempt);
        assert_eq!(result.tax_due, Decimal::ZERO);
    }

    #[test]
    fn test_graduated_exempt() {
        let result = TaxService::graduated(dec!(250000));
        assert!(result.is_exempt);
        assert_eq!(result.tax_due, Decimal::ZERO);
    }

    #[test]
    fn test_graduated_zero_income() {
        let result = TaxService::graduated(Decimal::ZERO);
        assert!(result.is_exempt);
        assert_eq!(result.tax_due, Decimal::ZERO);
        assert_eq!(result.effective_rate, Decimal::ZERO);
    }

    #[test]
    fn test_graduated_500k() {
        // 22,500 + (500,000 - 400,000) x 20% = 42,500
        let result = TaxService::graduated(dec!(500000));
        assert!(!result.is_exempt);
        assert_eq!(result.tax_due, dec!(42500.00));
        assert_eq!(result.effective_rate, dec!(8.50));
    }

    #[test]
    fn test_graduated_1m() {
        // 102,500 + (1,000,000 - 800,000) x 25% = 152,500
        let result = TaxService::graduated(dec!(1000000));
        assert_eq!(result.tax_due, dec!(152500.00));
    }

    #[test]
    fn test_graduated_boundary_belongs_to_higher_bracket() {
        // Exactly 400,000 sits on the 20% bracket floor; the marginal
        // amount is zero so the base applies unchanged.
        let result = TaxService::graduated(dec!(400000));
        assert_eq!(result.tax_due, dec!(22500));

        // Continuity: the 15% bracket gives the same number at the edge.
        let below = TaxService::graduated(dec!(399999));
        assert!(below.tax_due < result.tax_due);
    }

    #[test]
    fn test_graduated_top_bracket() {
        // 2,202,500 + (10,000,000 - 8,000,000) x 35% = 2,902,500
        let result = TaxService::graduated(dec!(10000000));
        assert_eq!(result.tax_due, dec!(2902500.00));
    }

    #[test]
    fn test_graduated_just_above_exemption() {
        let result = TaxService::graduated(dec!(300000));
        assert!(!result.is_exempt);
        assert_eq!(result.tax_due, dec!(50000) * dec!(0.15));
    }

    #[test]
    fn test_flat_beats_graduated_at_high_income() {
        // The consumer contract: the caller takes the minimum of the two.
        let income = dec!(3000000);
        let flat = TaxService::flat_rate(income);
        let graduated = TaxService::graduated(income);
        assert!(flat.tax_due < graduated.tax_due);
    }
}
