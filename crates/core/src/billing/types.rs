//! Billing domain types.
//!
//! Pure snapshots of the billing entities, free of persistence concerns.
//! The repository layer maps these to and from database rows.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Scheduled but not yet performed.
    Upcoming,
    /// Service has been performed.
    Completed,
    /// Booking was cancelled.
    Cancelled,
}

/// One service line on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    /// Name of the service performed.
    pub service_name: String,
    /// Number of persons the service covers.
    pub persons: u32,
    /// Price per person.
    pub unit_price: Decimal,
}

impl ServiceLine {
    /// Line subtotal: persons x unit price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.persons) * self.unit_price
    }
}

/// A scheduled service engagement.
///
/// `amount` is always derived from the service lines; the transportation
/// and early-morning fees are non-income and never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID.
    pub id: Uuid,
    /// Client the service is for.
    pub client_name: String,
    /// Service line items.
    pub services: Vec<ServiceLine>,
    /// When the service takes place.
    pub scheduled_at: NaiveDateTime,
    /// Where the service takes place.
    pub location: Option<String>,
    /// Transportation fee (non-income).
    pub transportation_fee: Decimal,
    /// Early-morning surcharge (non-income).
    pub early_morning_fee: Decimal,
    /// Reservation fee collected up front, if any.
    pub reservation_fee: Option<Decimal>,
    /// Lifecycle status.
    pub status: BookingStatus,
}

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Issued, nothing paid yet.
    Pending,
    /// Partially paid.
    Partial,
    /// Fully paid.
    Paid,
    /// Unpaid or partially paid, past the due date. Never stored;
    /// overlaid at read time.
    Overdue,
}

impl InvoiceStatus {
    /// Returns true if the invoice is fully settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash in hand; accrues to the undeposited pool.
    Cash,
    /// Direct to a bank account.
    Bank,
}

/// The mutable slice of an invoice that payment application reads and
/// writes: total, paid-so-far, and due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceState {
    /// Total amount billed.
    pub amount: Decimal,
    /// Sum of payments recorded so far.
    pub paid_amount: Decimal,
    /// Payment deadline.
    pub due_date: NaiveDate,
}

impl InvoiceState {
    /// Amount still owed.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.amount - self.paid_amount
    }
}

/// A payment to apply against an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInput {
    /// Payment amount.
    pub amount: Decimal,
    /// Cash or bank.
    pub method: PaymentMethod,
    /// Receiving bank account; required iff `method` is bank.
    pub bank_account_id: Option<Uuid>,
    /// When the payment was received.
    pub paid_on: NaiveDate,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Where a validated payment's money goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentCredit {
    /// Cash: increases the account's undeposited pool.
    Undeposited(Uuid),
    /// Bank: increases the account's balance.
    BankBalance(Uuid),
}

impl PaymentCredit {
    /// The bank account this credit lands on.
    #[must_use]
    pub fn account_id(&self) -> Uuid {
        match self {
            Self::Undeposited(id) | Self::BankBalance(id) => *id,
        }
    }
}

/// The state transition produced by a valid payment, to be persisted
/// atomically by the repository layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    /// The invoice's paid amount after this payment.
    pub new_paid_amount: Decimal,
    /// The invoice's stored status after this payment (paid or partial).
    pub new_status: InvoiceStatus,
    /// Where the money goes.
    pub credit: PaymentCredit,
}

/// A freshly derived invoice, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// Generated invoice number.
    pub invoice_number: String,
    /// Client billed.
    pub client_name: String,
    /// Amount billed (income-bearing only).
    pub amount: Decimal,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Originating booking, if derived from one.
    pub booking_id: Option<Uuid>,
    /// Notes describing the originating service.
    pub notes: Option<String>,
}
