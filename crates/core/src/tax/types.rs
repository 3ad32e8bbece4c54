//! Tax domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The result of a tax calculation for one regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAssessment {
    /// Total tax due for the annual income.
    pub tax_due: Decimal,
    /// Effective rate as a percentage of income (0 when income is zero).
    pub effective_rate: Decimal,
    /// Whether the income falls under the exemption threshold.
    pub is_exempt: bool,
}

impl TaxAssessment {
    /// An exempt assessment: zero tax, zero rate.
    #[must_use]
    pub fn exempt() -> Self {
        Self {
            tax_due: Decimal::ZERO,
            effective_rate: Decimal::ZERO,
            is_exempt: true,
        }
    }
}

/// The tax regime a calculation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Flat 8% on gross income above the exemption threshold.
    FlatRate,
    /// Graduated marginal brackets (0% to 35%).
    Graduated,
}

impl std::fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FlatRate => write!(f, "flat_rate"),
            Self::Graduated => write!(f, "graduated"),
        }
    }
}
