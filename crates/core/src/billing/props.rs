//! Property tests for payment reconciliation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::payment::apply_payment;
use super::types::{InvoiceState, InvoiceStatus, PaymentInput, PaymentMethod};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn cash(amount: Decimal) -> PaymentInput {
    PaymentInput {
        amount,
        method: PaymentMethod::Cash,
        bank_account_id: None,
        paid_on: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
        notes: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Across any sequence of accepted partial payments, the invoice's
    /// paid amount equals the sum of the payments, and the status moves
    /// pending -> partial -> paid without ever reverting.
    #[test]
    fn prop_sequential_payments_reconcile(
        total in amount_strategy(),
        fractions in proptest::collection::vec(1u32..=100, 1..8),
    ) {
        let default_account = Uuid::new_v4();
        let mut state = InvoiceState {
            amount: total,
            paid_amount: Decimal::ZERO,
            due_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        };

        let mut applied_sum = Decimal::ZERO;

        for f in fractions {
            let remaining = state.remaining();
            if remaining == Decimal::ZERO {
                break;
            }
            // A payment between one centavo and the full remainder.
            let amount = (remaining * Decimal::from(f) / dec!(100))
                .round_dp(2)
                .max(dec!(0.01))
                .min(remaining);

            let outcome = apply_payment(&state, &cash(amount), Some(default_account)).unwrap();

            applied_sum += amount;
            prop_assert_eq!(outcome.new_paid_amount, applied_sum);

            match outcome.new_status {
                InvoiceStatus::Partial => {
                    prop_assert!(outcome.new_paid_amount < total);
                }
                InvoiceStatus::Paid => {
                    // Paid is terminal: it only appears on full settlement.
                    prop_assert_eq!(outcome.new_paid_amount, total);
                }
                InvoiceStatus::Pending | InvoiceStatus::Overdue => {
                    prop_assert!(false, "payment produced status {:?}", outcome.new_status);
                }
            }

            state.paid_amount = outcome.new_paid_amount;
            prop_assert!(state.paid_amount <= state.amount);
        }
    }

    /// Any payment above the remaining balance is rejected, whatever the
    /// invoice's progress.
    #[test]
    fn prop_overpayment_always_rejected(
        total in amount_strategy(),
        paid_fraction in 0u32..100,
        excess in amount_strategy(),
    ) {
        let paid = (total * Decimal::from(paid_fraction) / dec!(100)).round_dp(2).min(total);
        let state = InvoiceState {
            amount: total,
            paid_amount: paid,
            due_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        };
        let remaining = state.remaining();
        prop_assume!(remaining > Decimal::ZERO);

        let result = apply_payment(&state, &cash(remaining + excess), Some(Uuid::new_v4()));
        prop_assert!(result.is_err());
    }

    /// A full settlement in one payment always lands on paid.
    #[test]
    fn prop_full_settlement_is_paid(total in amount_strategy()) {
        let state = InvoiceState {
            amount: total,
            paid_amount: Decimal::ZERO,
            due_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
        };
        let outcome = apply_payment(&state, &cash(total), Some(Uuid::new_v4())).unwrap();
        prop_assert_eq!(outcome.new_status, InvoiceStatus::Paid);
        prop_assert_eq!(outcome.new_paid_amount, total);
    }
}
