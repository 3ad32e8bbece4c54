//! Billing reconciliation logic.
//!
//! This module implements the rules that keep invoices, payments, and
//! bookings consistent:
//! - Booking line-item totals (income amount vs non-income fees)
//! - Deriving an invoice from a booking
//! - Invoice number generation
//! - Applying payments to invoices (validation and state transition)
//! - Invoice status reconciliation, including the overdue overlay
//!
//! Everything here is pure: persistence and atomicity live in the
//! repository layer, which calls into these functions before mutating.

pub mod booking;
pub mod error;
pub mod invoice;
pub mod payment;
pub mod types;

#[cfg(test)]
mod props;

pub use booking::{booking_amount, non_income_fees};
pub use error::BillingError;
pub use invoice::{derive_from_booking, effective_status, generate_invoice_number, invoice_number};
pub use payment::{apply_payment, status_after_payment};
pub use types::{
    Booking, BookingStatus, InvoiceDraft, InvoiceState, InvoiceStatus, PaymentCredit,
    PaymentInput, PaymentMethod, PaymentOutcome, ServiceLine,
};
