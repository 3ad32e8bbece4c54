//! Banking error types.

use thiserror::Error;

use super::types::TransactionKind;

/// Errors that can occur when validating a bank transaction.
///
/// All detected before any mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankingError {
    /// Transaction amount must be positive.
    #[error("Transaction amount must be positive")]
    NonPositiveAmount,

    /// This transaction kind requires a source account.
    #[error("{0} requires a source account")]
    MissingSource(TransactionKind),

    /// This transaction kind requires a destination account.
    #[error("{0} requires a destination account")]
    MissingDestination(TransactionKind),

    /// Transfers need two distinct accounts.
    #[error("Transfer source and destination must be different accounts")]
    SameAccount,
}
