//! Bank account repository.
//!
//! Accounts carry two money columns: `balance` (settled funds) and
//! `undeposited` (cash received but not yet banked). At most one
//! account is the default; cash payments accrue to the default
//! account's undeposited pool.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::bank_accounts;

/// Error types for bank account operations.
#[derive(Debug, thiserror::Error)]
pub enum BankAccountError {
    /// Account not found.
    #[error("Bank account not found: {0}")]
    NotFound(Uuid),

    /// Account number already registered.
    #[error("Account number '{0}' already exists")]
    DuplicateAccountNumber(String),

    /// The default account cannot be deleted while it is the default.
    #[error("Cannot delete the default account; make another account the default first")]
    CannotDeleteDefault,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a bank account.
#[derive(Debug, Clone)]
pub struct CreateBankAccountInput {
    /// Name of the bank.
    pub bank_name: String,
    /// Account holder name.
    pub account_name: String,
    /// Account number (unique).
    pub account_number: String,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Whether this account becomes the default.
    pub is_default: bool,
}

/// Input for updating a bank account.
///
/// Balance and undeposited funds are never edited directly; they move
/// only through transactions and payments.
#[derive(Debug, Clone, Default)]
pub struct UpdateBankAccountInput {
    /// Name of the bank.
    pub bank_name: Option<String>,
    /// Account holder name.
    pub account_name: Option<String>,
    /// Account number.
    pub account_number: Option<String>,
}

/// Bank account repository for CRUD and default-account maintenance.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct BankAccountRepository {
    db: DatabaseConnection,
}

impl BankAccountRepository {
    /// Creates a new bank account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bank account.
    ///
    /// If `is_default` is set, any previous default is cleared in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the account number already exists or the
    /// database operation fails.
    pub async fn create_account(
        &self,
        input: CreateBankAccountInput,
    ) -> Result<bank_accounts::Model, BankAccountError> {
        let existing = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::AccountNumber.eq(&input.account_number))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(BankAccountError::DuplicateAccountNumber(
                input.account_number,
            ));
        }

        let txn = self.db.begin().await?;

        if input.is_default {
            clear_default(&txn).await?;
        }

        let now = chrono::Utc::now().into();
        let account = bank_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_name: Set(input.bank_name),
            account_name: Set(input.account_name),
            account_number: Set(input.account_number),
            balance: Set(input.opening_balance),
            undeposited: Set(Decimal::ZERO),
            is_default: Set(input.is_default),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&txn).await?;
        txn.commit().await?;

        Ok(account)
    }

    /// Lists all bank accounts, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<bank_accounts::Model>, BankAccountError> {
        let accounts = bank_accounts::Entity::find()
            .order_by_desc(bank_accounts::Column::IsDefault)
            .order_by_asc(bank_accounts::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }

    /// Finds a bank account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<bank_accounts::Model>, BankAccountError> {
        let account = bank_accounts::Entity::find_by_id(id).one(&self.db).await?;
        Ok(account)
    }

    /// Finds the current default account, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_default_account(
        &self,
    ) -> Result<Option<bank_accounts::Model>, BankAccountError> {
        let account = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::IsDefault.eq(true))
            .one(&self.db)
            .await?;

        Ok(account)
    }

    /// Updates a bank account's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found, the new account
    /// number collides with another account, or the database operation
    /// fails.
    pub async fn update_account(
        &self,
        id: Uuid,
        input: UpdateBankAccountInput,
    ) -> Result<bank_accounts::Model, BankAccountError> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BankAccountError::NotFound(id))?;

        if let Some(new_number) = &input.account_number {
            if *new_number != account.account_number {
                let existing = bank_accounts::Entity::find()
                    .filter(bank_accounts::Column::AccountNumber.eq(new_number))
                    .filter(bank_accounts::Column::Id.ne(id))
                    .one(&self.db)
                    .await?;

                if existing.is_some() {
                    return Err(BankAccountError::DuplicateAccountNumber(new_number.clone()));
                }
            }
        }

        let now = chrono::Utc::now().into();
        let mut active: bank_accounts::ActiveModel = account.into();

        if let Some(bank_name) = input.bank_name {
            active.bank_name = Set(bank_name);
        }
        if let Some(account_name) = input.account_name {
            active.account_name = Set(account_name);
        }
        if let Some(account_number) = input.account_number {
            active.account_number = Set(account_number);
        }
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Makes an account the default, clearing any previous default in
    /// the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found or the database
    /// operation fails.
    pub async fn set_default_account(
        &self,
        id: Uuid,
    ) -> Result<bank_accounts::Model, BankAccountError> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BankAccountError::NotFound(id))?;

        let txn = self.db.begin().await?;

        clear_default(&txn).await?;

        let now = chrono::Utc::now().into();
        let mut active: bank_accounts::ActiveModel = account.into();
        active.is_default = Set(true);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Deletes a bank account.
    ///
    /// The default account is protected: cash payments need it, so it
    /// must be handed off before it can go. Payment and transaction
    /// rows that referenced the account keep their history with the
    /// reference set to null.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is not found, is the default,
    /// or the database operation fails.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), BankAccountError> {
        let account = bank_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BankAccountError::NotFound(id))?;

        if account.is_default {
            return Err(BankAccountError::CannotDeleteDefault);
        }

        bank_accounts::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Total cash received but not yet banked, across all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn undeposited_total(&self) -> Result<Decimal, BankAccountError> {
        let accounts = bank_accounts::Entity::find().all(&self.db).await?;

        Ok(accounts
            .iter()
            .fold(Decimal::ZERO, |total, account| total + account.undeposited))
    }
}

/// Clears the default flag on whichever account holds it.
async fn clear_default<C: sea_orm::ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();

    bank_accounts::Entity::update_many()
        .col_expr(
            bank_accounts::Column::IsDefault,
            sea_orm::sea_query::Expr::value(false),
        )
        .col_expr(
            bank_accounts::Column::UpdatedAt,
            sea_orm::sea_query::Expr::value(now),
        )
        .filter(bank_accounts::Column::IsDefault.eq(true))
        .exec(conn)
        .await?;

    Ok(())
}
