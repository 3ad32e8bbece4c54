//! Bank account routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use gigbooks_db::repositories::bank_account::{
    BankAccountError, BankAccountRepository, CreateBankAccountInput, UpdateBankAccountInput,
};

/// Creates the bank account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}", put(update_account))
        .route("/accounts/{id}", delete(delete_account))
        .route("/accounts/{id}/default", post(set_default_account))
}

/// Request body for creating a bank account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Name of the bank.
    pub bank_name: String,
    /// Account holder name.
    pub account_name: String,
    /// Account number (unique).
    pub account_number: String,
    /// Opening balance; defaults to zero.
    pub opening_balance: Option<Decimal>,
    /// Whether this account becomes the default.
    pub is_default: Option<bool>,
}

/// Request body for updating a bank account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// Name of the bank.
    pub bank_name: Option<String>,
    /// Account holder name.
    pub account_name: Option<String>,
    /// Account number.
    pub account_number: Option<String>,
}

/// GET `/accounts` - List bank accounts, default first.
async fn list_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let repo = BankAccountRepository::new((*state.db).clone());

    let accounts = match repo.list_accounts().await {
        Ok(accounts) => accounts,
        Err(e) => {
            error!(error = %e, "Failed to list bank accounts");
            return internal_error();
        }
    };

    match repo.undeposited_total().await {
        Ok(undeposited_total) => (
            StatusCode::OK,
            Json(json!({
                "accounts": accounts,
                "undeposited_total": undeposited_total
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to total undeposited cash");
            internal_error()
        }
    }
}

/// POST `/accounts` - Create a bank account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let opening_balance = payload.opening_balance.unwrap_or(Decimal::ZERO);
    if opening_balance < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_balance",
                "message": "Opening balance must not be negative"
            })),
        )
            .into_response();
    }

    let repo = BankAccountRepository::new((*state.db).clone());

    let input = CreateBankAccountInput {
        bank_name: payload.bank_name,
        account_name: payload.account_name,
        account_number: payload.account_number,
        opening_balance,
        is_default: payload.is_default.unwrap_or(false),
    };

    match repo.create_account(input).await {
        Ok(account) => {
            info!(account_id = %account.id, "Bank account created");
            (StatusCode::CREATED, Json(json!({ "account": account }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// GET `/accounts/{id}` - Get a bank account.
async fn get_account(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = BankAccountRepository::new((*state.db).clone());

    match repo.find_account_by_id(id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(json!({ "account": account }))).into_response(),
        Ok(None) => not_found(id),
        Err(e) => {
            error!(error = %e, account_id = %id, "Failed to get bank account");
            internal_error()
        }
    }
}

/// PUT `/accounts/{id}` - Update a bank account's descriptive fields.
async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    let repo = BankAccountRepository::new((*state.db).clone());

    let input = UpdateBankAccountInput {
        bank_name: payload.bank_name,
        account_name: payload.account_name,
        account_number: payload.account_number,
    };

    match repo.update_account(id, input).await {
        Ok(account) => {
            info!(account_id = %id, "Bank account updated");
            (StatusCode::OK, Json(json!({ "account": account }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// DELETE `/accounts/{id}` - Delete a bank account.
async fn delete_account(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = BankAccountRepository::new((*state.db).clone());

    match repo.delete_account(id).await {
        Ok(()) => {
            info!(account_id = %id, "Bank account deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

/// POST `/accounts/{id}/default` - Make an account the default.
async fn set_default_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BankAccountRepository::new((*state.db).clone());

    match repo.set_default_account(id).await {
        Ok(account) => {
            info!(account_id = %id, "Default bank account changed");
            (StatusCode::OK, Json(json!({ "account": account }))).into_response()
        }
        Err(e) => account_error_response(&e),
    }
}

fn account_error_response(error: &BankAccountError) -> axum::response::Response {
    match error {
        BankAccountError::NotFound(id) => not_found(*id),
        BankAccountError::CannotDeleteDefault => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "default_account",
                "message": "Cannot delete the default account; make another account the default first"
            })),
        )
            .into_response(),
        BankAccountError::DuplicateAccountNumber(number) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_account_number",
                "message": format!("Account number '{number}' already exists")
            })),
        )
            .into_response(),
        BankAccountError::Database(e) => {
            error!(error = %e, "Bank account database error");
            internal_error()
        }
    }
}

fn not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Bank account {id} not found")
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
