//! Integration tests for default-account handoff and balance movement.
//!
//! Drives `set_default_account` and `record_transaction` over a mocked
//! connection and inspects the statement log for the writes that carry
//! the invariants: the clear-before-set on `is_default` and the paired
//! balance updates of a transfer.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use gigbooks_core::banking::TransactionKind;

    use crate::entities::{bank_accounts, bank_transactions, sea_orm_active_enums};
    use crate::repositories::bank_account::BankAccountRepository;
    use crate::repositories::bank_transaction::{
        BankTransactionError, BankTransactionRepository, RecordTransactionInput,
    };

    // SeaORM's `mock` feature removes `Clone` from `DatabaseConnection`;
    // duplicate the handle by sharing the underlying mock connection so
    // the transaction log can be read back after the repository runs.
    fn handle(db: &DatabaseConnection) -> DatabaseConnection {
        match db {
            DatabaseConnection::MockDatabaseConnection(conn) => {
                DatabaseConnection::MockDatabaseConnection(conn.clone())
            }
            _ => unreachable!("these tests only build mock connections"),
        }
    }

    fn occurred_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
    }

    fn account_row(id: Uuid, balance: Decimal, is_default: bool) -> bank_accounts::Model {
        let now = chrono::Utc::now().into();
        bank_accounts::Model {
            id,
            bank_name: "BPI".to_string(),
            account_name: "Operating".to_string(),
            account_number: format!("ACCT-{id}"),
            balance,
            undeposited: Decimal::ZERO,
            is_default,
            created_at: now,
            updated_at: now,
        }
    }

    fn transaction_row(
        kind: sea_orm_active_enums::BankTransactionKind,
        amount: Decimal,
        source: Option<Uuid>,
        destination: Option<Uuid>,
    ) -> bank_transactions::Model {
        bank_transactions::Model {
            id: Uuid::new_v4(),
            kind,
            amount,
            description: None,
            source_account_id: source,
            destination_account_id: destination,
            occurred_on: occurred_on(),
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_set_default_clears_the_previous_holder_first() {
        let id = Uuid::new_v4();
        let before = account_row(id, dec!(1000), false);
        let mut after = before.clone();
        after.is_default = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![before], vec![after]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = BankAccountRepository::new(handle(&db));
        let updated = repo.set_default_account(id).await.unwrap();
        assert!(updated.is_default);

        // Two writes: the sweep that clears whichever account held the
        // flag, then the targeted set. The sweep filters on is_default,
        // so at most one account can come out of the unit flagged.
        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches(r#"UPDATE \"bank_accounts\""#).count(), 2);
        assert!(log.contains(r#"WHERE \"bank_accounts\".\"is_default\""#));
    }

    #[tokio::test]
    async fn test_transfer_moves_both_balances_in_one_unit() {
        let src_id = Uuid::new_v4();
        let dst_id = Uuid::new_v4();
        let row = transaction_row(
            sea_orm_active_enums::BankTransactionKind::Transfer,
            dec!(437.25),
            Some(src_id),
            Some(dst_id),
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![account_row(src_id, dec!(1000), true)],
                vec![account_row(dst_id, Decimal::ZERO, false)],
            ])
            .append_query_results([vec![row]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let repo = BankTransactionRepository::new(handle(&db));
        let input = RecordTransactionInput {
            kind: TransactionKind::Transfer,
            amount: dec!(437.25),
            description: None,
            source_account_id: Some(src_id),
            destination_account_id: Some(dst_id),
            occurred_on: occurred_on(),
        };

        let recorded = repo.record_transaction(input).await.unwrap();
        assert_eq!(recorded.amount, dec!(437.25));

        // Both sides move in the same unit, and the written balances
        // conserve the total: 1000 - 437.25 on one side, 0 + 437.25 on
        // the other.
        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches(r#"UPDATE \"bank_accounts\""#).count(), 2);
        assert!(log.contains("562.75"));
        assert!(log.contains("437.25"));
    }

    #[tokio::test]
    async fn test_transfer_losing_the_balance_guard_is_a_conflict() {
        let src_id = Uuid::new_v4();
        let dst_id = Uuid::new_v4();

        // The first balance update reports zero rows: the balance moved
        // between our read and our write.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![account_row(src_id, dec!(1000), true)],
                vec![account_row(dst_id, Decimal::ZERO, false)],
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = BankTransactionRepository::new(db);
        let input = RecordTransactionInput {
            kind: TransactionKind::Transfer,
            amount: dec!(400),
            description: None,
            source_account_id: Some(src_id),
            destination_account_id: Some(dst_id),
            occurred_on: occurred_on(),
        };

        let result = repo.record_transaction(input).await;
        assert!(matches!(
            result,
            Err(BankTransactionError::ConcurrentModification)
        ));
    }

    #[tokio::test]
    async fn test_overdrawing_withdrawal_still_records_the_full_amount() {
        let src_id = Uuid::new_v4();
        let row = transaction_row(
            sea_orm_active_enums::BankTransactionKind::Withdrawal,
            dec!(400),
            Some(src_id),
            None,
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![account_row(src_id, dec!(250.50), true)]])
            .append_query_results([vec![row]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = BankTransactionRepository::new(handle(&db));
        let input = RecordTransactionInput {
            kind: TransactionKind::Withdrawal,
            amount: dec!(400),
            description: None,
            source_account_id: Some(src_id),
            destination_account_id: None,
            occurred_on: occurred_on(),
        };

        let recorded = repo.record_transaction(input).await.unwrap();
        assert_eq!(recorded.amount, dec!(400));

        // The balance clamps at zero rather than rejecting; only the
        // source account is written.
        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches(r#"UPDATE \"bank_accounts\""#).count(), 1);
    }
}
