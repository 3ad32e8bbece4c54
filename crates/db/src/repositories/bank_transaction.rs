//! Bank transaction repository.
//!
//! Records deposits, withdrawals, and transfers. The balance math
//! lives in `gigbooks_core::banking`; this layer loads the involved
//! account snapshots, asks the service for the resulting balances, and
//! applies them with compare-and-set updates inside one transaction.
//! A concurrent writer that moves a balance between our read and our
//! write makes the guard miss, and the whole transaction rolls back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use gigbooks_core::banking::{AccountFunds, BankingError, BankingService, TransactionKind};

use crate::entities::{bank_accounts, bank_transactions, sea_orm_active_enums};

/// Error types for bank transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum BankTransactionError {
    /// The transaction violates a banking rule.
    #[error("Invalid transaction: {0}")]
    Invalid(#[from] BankingError),

    /// A referenced account does not exist.
    #[error("Bank account not found: {0}")]
    AccountNotFound(Uuid),

    /// A balance moved between read and write; the caller may retry.
    #[error("Account balance changed concurrently; retry the transaction")]
    ConcurrentModification,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a bank transaction.
#[derive(Debug, Clone)]
pub struct RecordTransactionInput {
    /// Deposit, withdrawal, or transfer.
    pub kind: TransactionKind,
    /// Amount moved.
    pub amount: Decimal,
    /// Free-form description.
    pub description: Option<String>,
    /// Account debited (withdrawal, transfer).
    pub source_account_id: Option<Uuid>,
    /// Account credited (deposit, transfer).
    pub destination_account_id: Option<Uuid>,
    /// Date the money moved.
    pub occurred_on: NaiveDate,
}

/// Filter options for listing bank transactions.
#[derive(Debug, Clone, Default)]
pub struct BankTransactionFilter {
    /// Filter by kind.
    pub kind: Option<TransactionKind>,
    /// Only transactions touching this account (either side).
    pub account_id: Option<Uuid>,
    /// Only transactions on or after this date.
    pub from: Option<NaiveDate>,
    /// Only transactions on or before this date.
    pub to: Option<NaiveDate>,
}

/// Bank transaction repository.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct BankTransactionRepository {
    db: DatabaseConnection,
}

impl BankTransactionRepository {
    /// Creates a new bank transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a transaction and moves the balances atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction is invalid, a referenced
    /// account is missing, a balance changed under us, or the database
    /// operation fails.
    pub async fn record_transaction(
        &self,
        input: RecordTransactionInput,
    ) -> Result<bank_transactions::Model, BankTransactionError> {
        let txn = self.db.begin().await?;

        let source = match input.source_account_id {
            Some(id) => Some(load_funds(&txn, id).await?),
            None => None,
        };
        let destination = match input.destination_account_id {
            Some(id) => Some(load_funds(&txn, id).await?),
            None => None,
        };

        let updates = BankingService::apply(
            input.kind,
            input.amount,
            source.as_ref(),
            destination.as_ref(),
        )?;

        let snapshots = [source, destination];
        for update in &updates {
            let old_balance = snapshots
                .iter()
                .flatten()
                .find(|funds| funds.id == update.account_id)
                .map(|funds| funds.balance)
                .ok_or(BankTransactionError::AccountNotFound(update.account_id))?;

            let result = bank_accounts::Entity::update_many()
                .col_expr(
                    bank_accounts::Column::Balance,
                    Expr::value(update.new_balance),
                )
                .col_expr(
                    bank_accounts::Column::UpdatedAt,
                    Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(
                        chrono::Utc::now(),
                    )),
                )
                .filter(bank_accounts::Column::Id.eq(update.account_id))
                .filter(bank_accounts::Column::Balance.eq(old_balance))
                .exec(&txn)
                .await?;

            if result.rows_affected == 0 {
                tracing::warn!(account_id = %update.account_id, "Balance lost the update guard");
                return Err(BankTransactionError::ConcurrentModification);
            }
        }

        let now = chrono::Utc::now().into();
        let record = bank_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(stored_kind(input.kind)),
            amount: Set(input.amount),
            description: Set(input.description),
            source_account_id: Set(input.source_account_id),
            destination_account_id: Set(input.destination_account_id),
            occurred_on: Set(input.occurred_on),
            created_at: Set(now),
        };

        let record = record.insert(&txn).await?;
        txn.commit().await?;

        Ok(record)
    }

    /// Lists transactions, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: BankTransactionFilter,
    ) -> Result<Vec<bank_transactions::Model>, BankTransactionError> {
        let mut query = bank_transactions::Entity::find()
            .order_by_desc(bank_transactions::Column::OccurredOn)
            .order_by_desc(bank_transactions::Column::CreatedAt);

        if let Some(kind) = filter.kind {
            query = query.filter(bank_transactions::Column::Kind.eq(stored_kind(kind)));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(
                bank_transactions::Column::SourceAccountId
                    .eq(account_id)
                    .or(bank_transactions::Column::DestinationAccountId.eq(account_id)),
            );
        }
        if let Some(from) = filter.from {
            query = query.filter(bank_transactions::Column::OccurredOn.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(bank_transactions::Column::OccurredOn.lte(to));
        }

        let rows = query.all(&self.db).await?;
        Ok(rows)
    }

    /// Finds a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_transaction_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<bank_transactions::Model>, BankTransactionError> {
        let record = bank_transactions::Entity::find_by_id(id).one(&self.db).await?;
        Ok(record)
    }
}

/// Loads an account's balance snapshot for the banking service.
async fn load_funds<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<AccountFunds, BankTransactionError> {
    let account = bank_accounts::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(BankTransactionError::AccountNotFound(id))?;

    Ok(AccountFunds {
        id: account.id,
        balance: account.balance,
    })
}

/// Maps the domain transaction kind to its stored enum.
#[must_use]
pub fn stored_kind(kind: TransactionKind) -> sea_orm_active_enums::BankTransactionKind {
    match kind {
        TransactionKind::Deposit => sea_orm_active_enums::BankTransactionKind::Deposit,
        TransactionKind::Withdrawal => sea_orm_active_enums::BankTransactionKind::Withdrawal,
        TransactionKind::Transfer => sea_orm_active_enums::BankTransactionKind::Transfer,
    }
}

/// Maps the stored enum back to the domain transaction kind.
#[must_use]
pub fn domain_kind(kind: &sea_orm_active_enums::BankTransactionKind) -> TransactionKind {
    match kind {
        sea_orm_active_enums::BankTransactionKind::Deposit => TransactionKind::Deposit,
        sea_orm_active_enums::BankTransactionKind::Withdrawal => TransactionKind::Withdrawal,
        sea_orm_active_enums::BankTransactionKind::Transfer => TransactionKind::Transfer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping_round_trips() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdrawal,
            TransactionKind::Transfer,
        ] {
            assert_eq!(domain_kind(&stored_kind(kind)), kind);
        }
    }
}
