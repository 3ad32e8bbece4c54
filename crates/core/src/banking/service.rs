//! Bank transaction validation and balance resolution.

use rust_decimal::Decimal;

use super::error::BankingError;
use super::types::{AccountFunds, BalanceUpdate, TransactionKind};

/// Banking service for transaction validation and balance transitions.
///
/// Contains pure business logic with no database dependencies: given a
/// transaction and snapshots of the accounts it touches, it computes
/// the balances those accounts must be set to. The repository applies
/// every update in one atomic unit or none at all.
pub struct BankingService;

impl BankingService {
    /// Validates account references for a transaction kind.
    ///
    /// # Errors
    ///
    /// Returns `BankingError` if the amount is not positive, a required
    /// account is missing, or a transfer names the same account twice.
    pub fn validate(
        kind: TransactionKind,
        amount: Decimal,
        source: Option<&AccountFunds>,
        destination: Option<&AccountFunds>,
    ) -> Result<(), BankingError> {
        if amount <= Decimal::ZERO {
            return Err(BankingError::NonPositiveAmount);
        }
        if kind.needs_source() && source.is_none() {
            return Err(BankingError::MissingSource(kind));
        }
        if kind.needs_destination() && destination.is_none() {
            return Err(BankingError::MissingDestination(kind));
        }
        if kind == TransactionKind::Transfer {
            if let (Some(src), Some(dst)) = (source, destination) {
                if src.id == dst.id {
                    return Err(BankingError::SameAccount);
                }
            }
        }
        Ok(())
    }

    /// Computes the balance updates a transaction produces.
    ///
    /// Withdrawals (and the debit side of transfers) clamp the balance
    /// at zero rather than rejecting an overdraft. That silently masks
    /// the overdraft; it is a long-standing product quirk kept on
    /// purpose and asserted by the tests.
    ///
    /// # Errors
    ///
    /// Returns `BankingError` if validation fails; no updates are
    /// produced in that case.
    pub fn apply(
        kind: TransactionKind,
        amount: Decimal,
        source: Option<&AccountFunds>,
        destination: Option<&AccountFunds>,
    ) -> Result<Vec<BalanceUpdate>, BankingError> {
        Self::validate(kind, amount, source, destination)?;

        let updates = match kind {
            TransactionKind::Deposit => {
                let dst = destination.ok_or(BankingError::MissingDestination(kind))?;
                vec![BalanceUpdate {
                    account_id: dst.id,
                    new_balance: dst.balance + amount,
                }]
            }
            TransactionKind::Withdrawal => {
                let src = source.ok_or(BankingError::MissingSource(kind))?;
                vec![BalanceUpdate {
                    account_id: src.id,
                    new_balance: debit_clamped(src.balance, amount),
                }]
            }
            TransactionKind::Transfer => {
                let src = source.ok_or(BankingError::MissingSource(kind))?;
                let dst = destination.ok_or(BankingError::MissingDestination(kind))?;
                vec![
                    BalanceUpdate {
                        account_id: src.id,
                        new_balance: debit_clamped(src.balance, amount),
                    },
                    BalanceUpdate {
                        account_id: dst.id,
                        new_balance: dst.balance + amount,
                    },
                ]
            }
        };

        Ok(updates)
    }
}

/// Balance after a debit, clamped at zero.
fn debit_clamped(balance: Decimal, amount: Decimal) -> Decimal {
    (balance - amount).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn account(balance: Decimal) -> AccountFunds {
        AccountFunds {
            id: Uuid::new_v4(),
            balance,
        }
    }

    #[test]
    fn test_deposit_credits_destination() {
        let dst = account(dec!(100));
        let updates =
            BankingService::apply(TransactionKind::Deposit, dec!(250), None, Some(&dst)).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].account_id, dst.id);
        assert_eq!(updates[0].new_balance, dec!(350));
    }

    #[test]
    fn test_withdrawal_debits_source() {
        let src = account(dec!(1000));
        let updates =
            BankingService::apply(TransactionKind::Withdrawal, dec!(400), Some(&src), None).unwrap();

        assert_eq!(updates[0].new_balance, dec!(600));
    }

    #[test]
    fn test_withdrawal_exceeding_balance_clamps_to_zero() {
        // Documented quirk: overdraft is masked, not rejected.
        let src = account(dec!(1000));
        let updates =
            BankingService::apply(TransactionKind::Withdrawal, dec!(1500), Some(&src), None)
                .unwrap();

        assert_eq!(updates[0].new_balance, Decimal::ZERO);
    }

    #[test]
    fn test_transfer_moves_funds() {
        let src = account(dec!(1000));
        let dst = account(Decimal::ZERO);
        let updates =
            BankingService::apply(TransactionKind::Transfer, dec!(400), Some(&src), Some(&dst))
                .unwrap();

        assert_eq!(updates[0].account_id, src.id);
        assert_eq!(updates[0].new_balance, dec!(600));
        assert_eq!(updates[1].account_id, dst.id);
        assert_eq!(updates[1].new_balance, dec!(400));

        // Total funds across both accounts are conserved.
        let total_before = src.balance + dst.balance;
        let total_after = updates[0].new_balance + updates[1].new_balance;
        assert_eq!(total_before, total_after);
    }

    #[test]
    fn test_deposit_requires_destination() {
        let result = BankingService::apply(TransactionKind::Deposit, dec!(100), None, None);
        assert_eq!(
            result,
            Err(BankingError::MissingDestination(TransactionKind::Deposit))
        );
    }

    #[test]
    fn test_withdrawal_requires_source() {
        let dst = account(dec!(100));
        let result =
            BankingService::apply(TransactionKind::Withdrawal, dec!(100), None, Some(&dst));
        assert_eq!(
            result,
            Err(BankingError::MissingSource(TransactionKind::Withdrawal))
        );
    }

    #[test]
    fn test_transfer_requires_both_accounts() {
        let src = account(dec!(100));
        assert_eq!(
            BankingService::apply(TransactionKind::Transfer, dec!(50), Some(&src), None),
            Err(BankingError::MissingDestination(TransactionKind::Transfer))
        );
        assert_eq!(
            BankingService::apply(TransactionKind::Transfer, dec!(50), None, Some(&src)),
            Err(BankingError::MissingSource(TransactionKind::Transfer))
        );
    }

    #[test]
    fn test_transfer_rejects_same_account() {
        let src = account(dec!(100));
        let same = src;
        let result =
            BankingService::apply(TransactionKind::Transfer, dec!(50), Some(&src), Some(&same));
        assert_eq!(result, Err(BankingError::SameAccount));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let dst = account(dec!(100));
        let result = BankingService::apply(TransactionKind::Deposit, Decimal::ZERO, None, Some(&dst));
        assert_eq!(result, Err(BankingError::NonPositiveAmount));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let dst = account(dec!(100));
        let result = BankingService::apply(TransactionKind::Deposit, dec!(-5), None, Some(&dst));
        assert_eq!(result, Err(BankingError::NonPositiveAmount));
    }
}
