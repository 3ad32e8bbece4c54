//! Active enums mapping Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Scheduled but not yet performed.
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    /// Service has been performed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Booking was cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Stored invoice status. Overdue is never stored; it is overlaid at
/// read time from the due date.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Issued, nothing paid.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Partially paid.
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully paid.
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// How an invoice is being settled.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// No payment recorded yet (invoices only; payments reject this).
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Cash in hand.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Direct to a bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
}

/// Kind of bank ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bank_transaction_kind")]
#[serde(rename_all = "lowercase")]
pub enum BankTransactionKind {
    /// Money entering an account.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Money leaving an account.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Money moving between two accounts.
    #[sea_orm(string_value = "transfer")]
    Transfer,
}
