//! Integration tests for payment application.
//!
//! Drives `record_payment` end to end over a mocked connection: the
//! `paid_amount` guard, the settled-invoice rejection, and the account
//! credit that lands in the same unit as the payment row.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use gigbooks_core::billing::{BillingError, PaymentMethod};

    use crate::entities::{bank_accounts, invoice_payments, invoices, sea_orm_active_enums};
    use crate::repositories::invoice::{InvoiceError, InvoiceRepository, RecordPaymentInput};

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

    fn paid_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
    }

    fn invoice_row(amount: Decimal, paid: Decimal) -> invoices::Model {
        let now = chrono::Utc::now().into();
        invoices::Model {
            id: Uuid::new_v4(),
            invoice_number: "INV-2608-117".to_string(),
            client_name: "Ana Reyes".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            amount,
            paid_amount: paid,
            status: sea_orm_active_enums::InvoiceStatus::Pending,
            payment_method: sea_orm_active_enums::PaymentMethod::Unpaid,
            bank_account_id: None,
            booking_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn default_account_row(id: Uuid) -> bank_accounts::Model {
        let now = chrono::Utc::now().into();
        bank_accounts::Model {
            id,
            bank_name: "BPI".to_string(),
            account_name: "Operating".to_string(),
            account_number: "0001-2345-67".to_string(),
            balance: dec!(10000),
            undeposited: Decimal::ZERO,
            is_default: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment_row(
        invoice_id: Uuid,
        amount: Decimal,
        method: sea_orm_active_enums::PaymentMethod,
    ) -> invoice_payments::Model {
        invoice_payments::Model {
            id: Uuid::new_v4(),
            invoice_id,
            amount,
            method,
            bank_account_id: None,
            paid_on: paid_on(),
            notes: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    fn bank_payment_input(amount: Decimal, account_id: Uuid) -> RecordPaymentInput {
        RecordPaymentInput {
            amount,
            method: PaymentMethod::Bank,
            bank_account_id: Some(account_id),
            paid_on: paid_on(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_payment_losing_the_paid_amount_guard_is_a_conflict() {
        let invoice = invoice_row(dec!(5000), Decimal::ZERO);
        let invoice_id = invoice.id;

        // The conditional update reports zero rows: someone else moved
        // paid_amount between our read and our write.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = InvoiceRepository::new(db);
        let result = repo
            .record_payment(invoice_id, bank_payment_input(dec!(2000), Uuid::new_v4()))
            .await;

        assert!(matches!(result, Err(InvoiceError::ConcurrentModification)));
    }

    #[tokio::test]
    async fn test_payment_against_settled_invoice_is_rejected() {
        let invoice = invoice_row(dec!(5000), dec!(5000));
        let invoice_id = invoice.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice]])
            .into_connection();

        let repo = InvoiceRepository::new(db);
        let result = repo
            .record_payment(invoice_id, bank_payment_input(dec!(100), Uuid::new_v4()))
            .await;

        assert!(matches!(
            result,
            Err(InvoiceError::Billing(BillingError::AlreadySettled))
        ));
    }

    #[tokio::test]
    async fn test_cash_payment_credits_the_default_accounts_undeposited_pool() {
        let invoice = invoice_row(dec!(5000), dec!(3000));
        let invoice_id = invoice.id;
        let default_id = Uuid::new_v4();
        let row = payment_row(
            invoice_id,
            dec!(2000),
            sea_orm_active_enums::PaymentMethod::Cash,
        );

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice]])
            .append_query_results([vec![default_account_row(default_id)]])
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

        let repo = InvoiceRepository::new(handle(&db));
        let input = RecordPaymentInput {
            amount: dec!(2000),
            method: PaymentMethod::Cash,
            bank_account_id: None,
            paid_on: paid_on(),
            notes: None,
        };

        let recorded = repo.record_payment(invoice_id, input).await.unwrap();
        assert_eq!(recorded.amount, dec!(2000));
        assert_eq!(recorded.method, sea_orm_active_enums::PaymentMethod::Cash);

        // The credit hits the undeposited pool, not the balance.
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("undeposited"));
    }

    #[tokio::test]
    async fn test_cash_payment_without_a_default_account_is_rejected() {
        let invoice = invoice_row(dec!(5000), Decimal::ZERO);
        let invoice_id = invoice.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invoice]])
            .append_query_results([Vec::<bank_accounts::Model>::new()])
            .into_connection();

        let repo = InvoiceRepository::new(db);
        let input = RecordPaymentInput {
            amount: dec!(500),
            method: PaymentMethod::Cash,
            bank_account_id: None,
            paid_on: paid_on(),
            notes: None,
        };

        let result = repo.record_payment(invoice_id, input).await;
        assert!(matches!(
            result,
            Err(InvoiceError::Billing(BillingError::NoDefaultAccount))
        ));
    }
}
