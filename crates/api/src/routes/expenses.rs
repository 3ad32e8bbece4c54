//! Expense routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use gigbooks_db::repositories::expense::{
    CreateExpenseInput, ExpenseError, ExpenseFilter, ExpenseRepository, UpdateExpenseInput,
};
use gigbooks_shared::types::{PageRequest, PageResponse};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses", post(create_expense))
        .route("/expenses/summary", get(expense_summary))
        .route("/expenses/{id}", get(get_expense))
        .route("/expenses/{id}", put(update_expense))
        .route("/expenses/{id}", delete(delete_expense))
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Filter by category.
    pub category: Option<String>,
    /// Only expenses on or after this date.
    pub from: Option<NaiveDate>,
    /// Only expenses on or before this date.
    pub to: Option<NaiveDate>,
    /// Filter by deductibility.
    pub deductible: Option<bool>,
    /// Filter by recurring-monthly flag.
    pub monthly: Option<bool>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Query parameters for the yearly summary.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Calendar year; defaults to the current year.
    pub year: Option<i32>,
}

/// Request body for creating an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Date the expense was incurred; defaults to today.
    pub incurred_on: Option<NaiveDate>,
    /// What the money was spent on.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Amount spent; must be positive.
    pub amount: Decimal,
    /// Whether this counts against taxable income.
    pub tax_deductible: Option<bool>,
    /// Whether this recurs every month.
    pub is_monthly: Option<bool>,
}

/// Request body for updating an expense.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    /// Date the expense was incurred.
    pub incurred_on: Option<NaiveDate>,
    /// What the money was spent on.
    pub description: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Amount spent.
    pub amount: Option<Decimal>,
    /// Whether this counts against taxable income.
    pub tax_deductible: Option<bool>,
    /// Whether this recurs every month.
    pub is_monthly: Option<bool>,
}

/// GET `/expenses` - List expenses.
async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    let filter = ExpenseFilter {
        category: query.category,
        from: query.from,
        to: query.to,
        tax_deductible: query.deductible,
        is_monthly: query.monthly,
    };

    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    match repo
        .list_expenses(filter, page.offset(), page.limit())
        .await
    {
        Ok((expenses, total)) => {
            let response = PageResponse::new(expenses, page.page, page.per_page, total);
            (StatusCode::OK, Json(json!({ "expenses": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expenses");
            internal_error()
        }
    }
}

/// POST `/expenses` - Create an expense.
async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if payload.amount <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Amount must be positive"
            })),
        )
            .into_response();
    }

    let repo = ExpenseRepository::new((*state.db).clone());

    let input = CreateExpenseInput {
        incurred_on: payload.incurred_on.unwrap_or_else(|| Utc::now().date_naive()),
        description: payload.description,
        category: payload.category,
        amount: payload.amount,
        tax_deductible: payload.tax_deductible.unwrap_or(false),
        is_monthly: payload.is_monthly.unwrap_or(false),
    };

    match repo.create_expense(input).await {
        Ok(expense) => {
            info!(expense_id = %expense.id, "Expense created");
            (StatusCode::CREATED, Json(json!({ "expense": expense }))).into_response()
        }
        Err(e) => expense_error_response(&e),
    }
}

/// GET `/expenses/summary` - Yearly expense aggregates.
async fn expense_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.summarize_year(year).await {
        Ok(summary) => (StatusCode::OK, Json(json!({ "summary": summary }))).into_response(),
        Err(e) => {
            error!(error = %e, year, "Failed to summarize expenses");
            internal_error()
        }
    }
}

/// GET `/expenses/{id}` - Get an expense.
async fn get_expense(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.find_expense_by_id(id).await {
        Ok(Some(expense)) => (StatusCode::OK, Json(json!({ "expense": expense }))).into_response(),
        Ok(None) => not_found(id),
        Err(e) => {
            error!(error = %e, expense_id = %id, "Failed to get expense");
            internal_error()
        }
    }
}

/// PUT `/expenses/{id}` - Update an expense.
async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    if let Some(amount) = payload.amount {
        if amount <= Decimal::ZERO {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_amount",
                    "message": "Amount must be positive"
                })),
            )
                .into_response();
        }
    }

    let repo = ExpenseRepository::new((*state.db).clone());

    let input = UpdateExpenseInput {
        incurred_on: payload.incurred_on,
        description: payload.description,
        category: payload.category,
        amount: payload.amount,
        tax_deductible: payload.tax_deductible,
        is_monthly: payload.is_monthly,
    };

    match repo.update_expense(id, input).await {
        Ok(expense) => {
            info!(expense_id = %id, "Expense updated");
            (StatusCode::OK, Json(json!({ "expense": expense }))).into_response()
        }
        Err(e) => expense_error_response(&e),
    }
}

/// DELETE `/expenses/{id}` - Delete an expense.
async fn delete_expense(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.delete_expense(id).await {
        Ok(()) => {
            info!(expense_id = %id, "Expense deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => expense_error_response(&e),
    }
}

fn expense_error_response(error: &ExpenseError) -> axum::response::Response {
    match error {
        ExpenseError::NotFound(id) => not_found(*id),
        ExpenseError::Database(e) => {
            error!(error = %e, "Expense database error");
            internal_error()
        }
    }
}

fn not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Expense {id} not found")
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
