//! Core business logic for gigbooks.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `tax` - Philippine income tax calculators (flat-rate and graduated)
//! - `billing` - Booking totals, invoice derivation, and payment reconciliation
//! - `banking` - Bank account transaction rules (deposit, withdrawal, transfer)

pub mod banking;
pub mod billing;
pub mod tax;
