//! Bank transaction routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use gigbooks_core::banking::TransactionKind;
use gigbooks_db::repositories::bank_transaction::{
    BankTransactionError, BankTransactionFilter, BankTransactionRepository,
    RecordTransactionInput,
};

/// Creates the bank transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(record_transaction))
        .route("/transactions/{id}", get(get_transaction))
}

/// Query parameters for listing bank transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by kind: deposit, withdrawal, transfer.
    pub kind: Option<String>,
    /// Only transactions touching this account.
    pub account_id: Option<Uuid>,
    /// Only transactions on or after this date.
    pub from: Option<NaiveDate>,
    /// Only transactions on or before this date.
    pub to: Option<NaiveDate>,
}

/// Request body for recording a bank transaction.
#[derive(Debug, Deserialize)]
pub struct RecordTransactionRequest {
    /// Kind: deposit, withdrawal, transfer.
    pub kind: String,
    /// Amount moved; must be positive.
    pub amount: Decimal,
    /// Free-form description.
    pub description: Option<String>,
    /// Account debited (withdrawal, transfer).
    pub source_account_id: Option<Uuid>,
    /// Account credited (deposit, transfer).
    pub destination_account_id: Option<Uuid>,
    /// Date the money moved; defaults to today.
    pub occurred_on: Option<NaiveDate>,
}

/// GET `/transactions` - List bank transactions.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let kind = match query.kind.as_deref() {
        Some(raw) => match string_to_kind(raw) {
            Some(kind) => Some(kind),
            None => return invalid_kind(),
        },
        None => None,
    };

    let repo = BankTransactionRepository::new((*state.db).clone());
    let filter = BankTransactionFilter {
        kind,
        account_id: query.account_id,
        from: query.from,
        to: query.to,
    };

    match repo.list_transactions(filter).await {
        Ok(transactions) => {
            (StatusCode::OK, Json(json!({ "transactions": transactions }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list bank transactions");
            internal_error()
        }
    }
}

/// POST `/transactions` - Record a transaction and move the balances.
async fn record_transaction(
    State(state): State<AppState>,
    Json(payload): Json<RecordTransactionRequest>,
) -> impl IntoResponse {
    let Some(kind) = string_to_kind(&payload.kind) else {
        return invalid_kind();
    };

    let repo = BankTransactionRepository::new((*state.db).clone());

    let input = RecordTransactionInput {
        kind,
        amount: payload.amount,
        description: payload.description,
        source_account_id: payload.source_account_id,
        destination_account_id: payload.destination_account_id,
        occurred_on: payload.occurred_on.unwrap_or_else(|| Utc::now().date_naive()),
    };

    match repo.record_transaction(input).await {
        Ok(transaction) => {
            info!(transaction_id = %transaction.id, "Bank transaction recorded");
            (
                StatusCode::CREATED,
                Json(json!({ "transaction": transaction })),
            )
                .into_response()
        }
        Err(e) => transaction_error_response(&e),
    }
}

/// GET `/transactions/{id}` - Get a bank transaction.
async fn get_transaction(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = BankTransactionRepository::new((*state.db).clone());

    match repo.find_transaction_by_id(id).await {
        Ok(Some(transaction)) => (
            StatusCode::OK,
            Json(json!({ "transaction": transaction })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Transaction {id} not found")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, transaction_id = %id, "Failed to get bank transaction");
            internal_error()
        }
    }
}

fn string_to_kind(raw: &str) -> Option<TransactionKind> {
    match raw {
        "deposit" => Some(TransactionKind::Deposit),
        "withdrawal" => Some(TransactionKind::Withdrawal),
        "transfer" => Some(TransactionKind::Transfer),
        _ => None,
    }
}

fn transaction_error_response(error: &BankTransactionError) -> axum::response::Response {
    match error {
        BankTransactionError::Invalid(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_transaction",
                "message": e.to_string()
            })),
        )
            .into_response(),
        BankTransactionError::AccountNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Bank account {id} not found")
            })),
        )
            .into_response(),
        BankTransactionError::ConcurrentModification => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "conflict",
                "message": "Account balance changed concurrently; retry the transaction"
            })),
        )
            .into_response(),
        BankTransactionError::Database(e) => {
            error!(error = %e, "Bank transaction database error");
            internal_error()
        }
    }
}

fn invalid_kind() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_kind",
            "message": "Kind must be one of: deposit, withdrawal, transfer"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
