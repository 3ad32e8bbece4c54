//! Bank account transaction rules.
//!
//! Pure validation and balance transitions for deposits, withdrawals,
//! and transfers between accounts. The repository layer is responsible
//! for applying the resulting updates atomically.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod props;

pub use error::BankingError;
pub use service::BankingService;
pub use types::{AccountFunds, BalanceUpdate, TransactionKind};
