//! Payment application rules.
//!
//! `apply_payment` is the pure half of the payment flow: it validates a
//! payment against an invoice snapshot and computes the state transition
//! (new paid amount, new stored status, where the money goes). The
//! repository layer persists that transition atomically.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::BillingError;
use super::types::{
    InvoiceState, InvoiceStatus, PaymentCredit, PaymentInput, PaymentMethod, PaymentOutcome,
};

/// The stored status after a payment: paid iff fully settled, else
/// partial. Overdue is a read-time overlay and never stored.
#[must_use]
pub fn status_after_payment(amount: Decimal, new_paid_amount: Decimal) -> InvoiceStatus {
    if new_paid_amount >= amount {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Partial
    }
}

/// Validates a payment against an invoice snapshot and computes the
/// resulting state transition.
///
/// Validation is eager: any error here means nothing may be mutated.
/// `default_account_id` is the account whose undeposited pool receives
/// cash payments; it is only consulted for cash.
///
/// # Errors
///
/// Returns `BillingError` if the amount is not positive, exceeds the
/// remaining balance, the invoice is already settled, a bank payment
/// lacks an account reference, a cash payment carries one, or no
/// default account exists to receive cash.
pub fn apply_payment(
    invoice: &InvoiceState,
    input: &PaymentInput,
    default_account_id: Option<Uuid>,
) -> Result<PaymentOutcome, BillingError> {
    if input.amount == Decimal::ZERO {
        return Err(BillingError::ZeroAmount);
    }
    if input.amount < Decimal::ZERO {
        return Err(BillingError::NegativeAmount);
    }

    let remaining = invoice.remaining();
    if remaining <= Decimal::ZERO {
        return Err(BillingError::AlreadySettled);
    }
    if input.amount > remaining {
        return Err(BillingError::Overpayment {
            remaining,
            attempted: input.amount,
        });
    }

    let credit = match input.method {
        PaymentMethod::Bank => {
            let account_id = input
                .bank_account_id
                .ok_or(BillingError::BankAccountRequired)?;
            PaymentCredit::BankBalance(account_id)
        }
        PaymentMethod::Cash => {
            if input.bank_account_id.is_some() {
                return Err(BillingError::BankAccountNotAllowed);
            }
            let account_id = default_account_id.ok_or(BillingError::NoDefaultAccount)?;
            PaymentCredit::Undeposited(account_id)
        }
    };

    let new_paid_amount = invoice.paid_amount + input.amount;

    Ok(PaymentOutcome {
        new_paid_amount,
        new_status: status_after_payment(invoice.amount, new_paid_amount),
        credit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn invoice(amount: Decimal, paid: Decimal) -> InvoiceState {
        InvoiceState {
            amount,
            paid_amount: paid,
            due_date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
        }
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

    fn bank(amount: Decimal, account: Option<Uuid>) -> PaymentInput {
        PaymentInput {
            amount,
            method: PaymentMethod::Bank,
            bank_account_id: account,
            paid_on: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_full_payment_settles_invoice() {
        let account = Uuid::new_v4();
        let outcome = apply_payment(
            &invoice(dec!(5000), Decimal::ZERO),
            &bank(dec!(5000), Some(account)),
            None,
        )
        .unwrap();

        assert_eq!(outcome.new_paid_amount, dec!(5000));
        assert_eq!(outcome.new_status, InvoiceStatus::Paid);
        assert_eq!(outcome.credit, PaymentCredit::BankBalance(account));
    }

    #[test]
    fn test_partial_payment() {
        let default_account = Uuid::new_v4();
        let outcome = apply_payment(
            &invoice(dec!(5000), Decimal::ZERO),
            &cash(dec!(2000)),
            Some(default_account),
        )
        .unwrap();

        assert_eq!(outcome.new_paid_amount, dec!(2000));
        assert_eq!(outcome.new_status, InvoiceStatus::Partial);
        assert_eq!(outcome.credit, PaymentCredit::Undeposited(default_account));
    }

    #[test]
    fn test_second_full_payment_rejected() {
        let result = apply_payment(
            &invoice(dec!(5000), dec!(5000)),
            &cash(dec!(1)),
            Some(Uuid::new_v4()),
        );
        assert_eq!(result, Err(BillingError::AlreadySettled));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = apply_payment(
            &invoice(dec!(5000), Decimal::ZERO),
            &cash(Decimal::ZERO),
            Some(Uuid::new_v4()),
        );
        assert_eq!(result, Err(BillingError::ZeroAmount));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = apply_payment(
            &invoice(dec!(5000), Decimal::ZERO),
            &cash(dec!(-100)),
            Some(Uuid::new_v4()),
        );
        assert_eq!(result, Err(BillingError::NegativeAmount));
    }

    #[test]
    fn test_overpayment_rejected() {
        let result = apply_payment(
            &invoice(dec!(5000), dec!(3000)),
            &cash(dec!(2500)),
            Some(Uuid::new_v4()),
        );
        assert_eq!(
            result,
            Err(BillingError::Overpayment {
                remaining: dec!(2000),
                attempted: dec!(2500),
            })
        );
    }

    #[test]
    fn test_bank_payment_requires_account() {
        let result = apply_payment(&invoice(dec!(5000), Decimal::ZERO), &bank(dec!(5000), None), None);
        assert_eq!(result, Err(BillingError::BankAccountRequired));
    }

    #[test]
    fn test_cash_payment_rejects_account_reference() {
        let mut input = cash(dec!(1000));
        input.bank_account_id = Some(Uuid::new_v4());
        let result = apply_payment(
            &invoice(dec!(5000), Decimal::ZERO),
            &input,
            Some(Uuid::new_v4()),
        );
        assert_eq!(result, Err(BillingError::BankAccountNotAllowed));
    }

    #[test]
    fn test_cash_payment_needs_default_account() {
        let result = apply_payment(&invoice(dec!(5000), Decimal::ZERO), &cash(dec!(1000)), None);
        assert_eq!(result, Err(BillingError::NoDefaultAccount));
    }

    #[test]
    fn test_exact_remaining_is_full_payment() {
        // The "process payment" convenience flow: amount == remaining.
        let outcome = apply_payment(
            &invoice(dec!(5000), dec!(3500)),
            &cash(dec!(1500)),
            Some(Uuid::new_v4()),
        )
        .unwrap();
        assert_eq!(outcome.new_status, InvoiceStatus::Paid);
    }
}
