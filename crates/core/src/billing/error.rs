//! Billing error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during billing operations.
///
/// All of these are detected before any mutation; a failed payment
/// application leaves every record untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Payment amount cannot be zero.
    #[error("Payment amount cannot be zero")]
    ZeroAmount,

    /// Payment amount cannot be negative.
    #[error("Payment amount cannot be negative")]
    NegativeAmount,

    /// Payment exceeds the remaining balance.
    #[error("Payment of {attempted} exceeds remaining balance of {remaining}")]
    Overpayment {
        /// Amount still owed on the invoice.
        remaining: Decimal,
        /// Amount the caller tried to pay.
        attempted: Decimal,
    },

    /// Invoice is already fully paid.
    #[error("Invoice is already fully paid")]
    AlreadySettled,

    /// Bank payments must reference a bank account.
    #[error("Bank payments must reference a bank account")]
    BankAccountRequired,

    /// Cash payments must not reference a bank account.
    #[error("Cash payments must not reference a bank account")]
    BankAccountNotAllowed,

    /// Cash payments need a default bank account to hold undeposited cash.
    #[error("No default bank account configured to receive undeposited cash")]
    NoDefaultAccount,
}
