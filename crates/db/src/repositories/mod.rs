//! Repository layer for data access.
//!
//! Each repository owns a `DatabaseConnection` and exposes the
//! operations for one aggregate. Multi-row mutations (payments,
//! transfers, default-account switches) run inside a transaction with
//! compare-and-set guards where concurrent writers could interleave.

pub mod bank_account;
pub mod bank_transaction;
pub mod booking;
pub mod expense;
pub mod invoice;

#[cfg(feature = "mock")]
mod banking_integration_tests;
#[cfg(feature = "mock")]
mod payment_integration_tests;

pub use bank_account::BankAccountRepository;
pub use bank_transaction::BankTransactionRepository;
pub use booking::BookingRepository;
pub use expense::ExpenseRepository;
pub use invoice::InvoiceRepository;
