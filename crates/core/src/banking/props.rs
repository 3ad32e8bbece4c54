//! Property tests for bank transaction application.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::BankingService;
use super::types::{AccountFunds, TransactionKind};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A covered transfer conserves the total funds across both accounts.
    #[test]
    fn prop_covered_transfer_conserves_funds(
        src_balance in balance_strategy(),
        dst_balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        prop_assume!(amount <= src_balance);

        let src = AccountFunds { id: Uuid::new_v4(), balance: src_balance };
        let dst = AccountFunds { id: Uuid::new_v4(), balance: dst_balance };

        let updates =
            BankingService::apply(TransactionKind::Transfer, amount, Some(&src), Some(&dst))
                .unwrap();

        let total_after: Decimal = updates.iter().map(|u| u.new_balance).sum();
        prop_assert_eq!(total_after, src_balance + dst_balance);
    }

    /// No transaction ever drives a balance negative.
    #[test]
    fn prop_balances_never_negative(
        src_balance in balance_strategy(),
        dst_balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        let src = AccountFunds { id: Uuid::new_v4(), balance: src_balance };
        let dst = AccountFunds { id: Uuid::new_v4(), balance: dst_balance };

        for (kind, s, d) in [
            (TransactionKind::Deposit, None, Some(&dst)),
            (TransactionKind::Withdrawal, Some(&src), None),
            (TransactionKind::Transfer, Some(&src), Some(&dst)),
        ] {
            let updates = BankingService::apply(kind, amount, s, d).unwrap();
            for update in updates {
                prop_assert!(update.new_balance >= Decimal::ZERO);
            }
        }
    }

    /// A withdrawal leaves the balance at exactly max(balance - amount, 0).
    #[test]
    fn prop_withdrawal_clamps(
        balance in balance_strategy(),
        amount in amount_strategy(),
    ) {
        let src = AccountFunds { id: Uuid::new_v4(), balance };
        let updates =
            BankingService::apply(TransactionKind::Withdrawal, amount, Some(&src), None).unwrap();

        let expected = (balance - amount).max(Decimal::ZERO);
        prop_assert_eq!(updates[0].new_balance, expected);
    }
}
