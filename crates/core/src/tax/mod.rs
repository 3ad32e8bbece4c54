//! Philippine income tax calculators.
//!
//! This module implements the two tax regimes available to self-employed
//! service providers:
//! - Flat 8% rate on gross income above the exemption threshold
//! - Graduated brackets with marginal rates from 0% to 35%
//!
//! Both calculators are pure arithmetic over `Decimal` income; neither
//! can fail. Choosing between the two regimes (the smaller tax due) is
//! the caller's decision, not the calculator's.

pub mod service;
pub mod types;

#[cfg(test)]
mod props;

pub use service::TaxService;
pub use types::{TaxAssessment, TaxRegime};
