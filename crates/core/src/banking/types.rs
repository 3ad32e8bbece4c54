//! Banking domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money entering an account.
    Deposit,
    /// Money leaving an account.
    Withdrawal,
    /// Money moving between two accounts.
    Transfer,
}

impl TransactionKind {
    /// True if this kind draws from a source account.
    #[must_use]
    pub fn needs_source(&self) -> bool {
        matches!(self, Self::Withdrawal | Self::Transfer)
    }

    /// True if this kind credits a destination account.
    #[must_use]
    pub fn needs_destination(&self) -> bool {
        matches!(self, Self::Deposit | Self::Transfer)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

/// A snapshot of one account's confirmed balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFunds {
    /// Account ID.
    pub id: Uuid,
    /// Confirmed deposited balance.
    pub balance: Decimal,
}

/// One account's balance after a transaction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// Account ID.
    pub account_id: Uuid,
    /// The balance the account must be set to.
    pub new_balance: Decimal,
}
