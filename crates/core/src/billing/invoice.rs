//! Invoice derivation, numbering, and status reconciliation.

use chrono::{Datelike, Days, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

use super::types::{Booking, InvoiceDraft, InvoiceState, InvoiceStatus};

/// Days until a derived invoice falls due.
const PAYMENT_TERMS_DAYS: u64 = 30;

/// Builds the canonical invoice number for a date and random suffix:
/// `INV-{yy}{mm}-{3-digit zero-padded suffix}`.
///
/// The suffix is random, not a sequence, so collisions are possible and
/// tolerated as a low-probability data-quality issue; nothing here
/// enforces uniqueness.
#[must_use]
pub fn invoice_number(date: NaiveDate, suffix: u16) -> String {
    format!(
        "INV-{:02}{:02}-{:03}",
        date.year() % 100,
        date.month(),
        suffix % 1000
    )
}

/// Generates a fresh invoice number for the given issue date.
#[must_use]
pub fn generate_invoice_number(issue_date: NaiveDate) -> String {
    let suffix = rand::rng().random_range(0..1000u16);
    invoice_number(issue_date, suffix)
}

/// Derives a new invoice from a booking.
///
/// The invoice copies the client and the income-bearing amount only;
/// transportation and early-morning fees are excluded. Issue date is
/// today, due date 30 days out, and the notes summarize the originating
/// service and date. At most one invoice per booking is advisory: the
/// creation flow checks for an existing invoice first, but nothing here
/// enforces uniqueness.
#[must_use]
pub fn derive_from_booking(booking: &Booking, today: NaiveDate) -> InvoiceDraft {
    let service_summary = if booking.services.is_empty() {
        "service".to_string()
    } else {
        booking
            .services
            .iter()
            .map(|s| s.service_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    InvoiceDraft {
        invoice_number: generate_invoice_number(today),
        client_name: booking.client_name.clone(),
        amount: booking.amount(),
        issue_date: today,
        due_date: today
            .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
            .unwrap_or(today),
        booking_id: Some(booking.id),
        notes: Some(format!(
            "{} on {}",
            service_summary,
            booking.scheduled_at.date()
        )),
    }
}

/// The status an invoice presents as of `today`.
///
/// Stored status is only ever pending/partial/paid; overdue is overlaid
/// here so a payment never has to race the calendar.
#[must_use]
pub fn effective_status(state: &InvoiceState, today: NaiveDate) -> InvoiceStatus {
    if state.paid_amount >= state.amount && state.amount > Decimal::ZERO {
        InvoiceStatus::Paid
    } else if today > state.due_date {
        InvoiceStatus::Overdue
    } else if state.paid_amount > Decimal::ZERO {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::types::{BookingStatus, ServiceLine};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn sample_booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            client_name: "Maria Santos".to_string(),
            services: vec![
                ServiceLine {
                    service_name: "Hair and makeup".to_string(),
                    persons: 4,
                    unit_price: dec!(1250),
                },
            ],
            scheduled_at: NaiveDate::from_ymd_opt(2026, 9, 12)
                .unwrap()
                .and_hms_opt(5, 30, 0)
                .unwrap(),
            location: Some("Tagaytay".to_string()),
            transportation_fee: dec!(500),
            early_morning_fee: dec!(300),
            reservation_fee: None,
            status: BookingStatus::Upcoming,
        }
    }

    #[test]
    fn test_invoice_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(invoice_number(date, 7), "INV-2603-007");
        assert_eq!(invoice_number(date, 999), "INV-2603-999");
    }

    #[test]
    fn test_invoice_number_suffix_wraps() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(invoice_number(date, 1000), "INV-2612-000");
    }

    #[test]
    fn test_generated_number_matches_pattern() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let number = generate_invoice_number(date);
        assert!(number.starts_with("INV-2601-"));
        assert_eq!(number.len(), "INV-2601-000".len());
    }

    #[test]
    fn test_derive_copies_client_and_income_amount() {
        let booking = sample_booking();
        let today = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        let draft = derive_from_booking(&booking, today);

        assert_eq!(draft.client_name, "Maria Santos");
        // Fees (500 + 300) are excluded from the invoice amount.
        assert_eq!(draft.amount, dec!(5000));
        assert_eq!(draft.booking_id, Some(booking.id));
    }

    #[test]
    fn test_derive_sets_thirty_day_terms() {
        let booking = sample_booking();
        let today = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        let draft = derive_from_booking(&booking, today);

        assert_eq!(draft.issue_date, today);
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2026, 9, 19).unwrap());
    }

    #[test]
    fn test_derive_notes_mention_service_and_date() {
        let booking = sample_booking();
        let today = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        let draft = derive_from_booking(&booking, today);

        let notes = draft.notes.unwrap();
        assert!(notes.contains("Hair and makeup"));
        assert!(notes.contains("2026-09-12"));
    }

    #[test]
    fn test_effective_status_pending() {
        let state = InvoiceState {
            amount: dec!(5000),
            paid_amount: Decimal::ZERO,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert_eq!(effective_status(&state, today), InvoiceStatus::Pending);
    }

    #[test]
    fn test_effective_status_partial() {
        let state = InvoiceState {
            amount: dec!(5000),
            paid_amount: dec!(2000),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        assert_eq!(effective_status(&state, today), InvoiceStatus::Partial);
    }

    #[test]
    fn test_effective_status_overdue_when_past_due() {
        let state = InvoiceState {
            amount: dec!(5000),
            paid_amount: dec!(2000),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 9, 20).unwrap();
        assert_eq!(effective_status(&state, today), InvoiceStatus::Overdue);
    }

    #[test]
    fn test_effective_status_paid_never_overdue() {
        let state = InvoiceState {
            amount: dec!(5000),
            paid_amount: dec!(5000),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
        };
        let today = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert_eq!(effective_status(&state, today), InvoiceStatus::Paid);
    }

    #[test]
    fn test_effective_status_due_date_itself_not_overdue() {
        let due = NaiveDate::from_ymd_opt(2026, 9, 19).unwrap();
        let state = InvoiceState {
            amount: dec!(5000),
            paid_amount: Decimal::ZERO,
            due_date: due,
        };
        assert_eq!(effective_status(&state, due), InvoiceStatus::Pending);
    }
}
