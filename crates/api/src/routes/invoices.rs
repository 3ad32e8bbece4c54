//! Invoice and payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use gigbooks_core::billing::{BillingError, InvoiceStatus, PaymentMethod};
use gigbooks_db::repositories::invoice::{
    CreateInvoiceInput, InvoiceError, InvoiceFilter, InvoiceRepository, RecordPaymentInput,
    UpdateInvoiceInput,
};
use gigbooks_shared::types::{PageRequest, PageResponse};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}", put(update_invoice))
        .route("/invoices/{id}", delete(delete_invoice))
        .route("/invoices/{id}/payments", post(record_payment))
        .route("/invoices/{id}/payments", get(list_payments))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by effective status: pending, partial, paid, overdue.
    pub status: Option<String>,
    /// Only invoices issued on or after this date.
    pub from: Option<NaiveDate>,
    /// Only invoices issued on or before this date.
    pub to: Option<NaiveDate>,
    /// Filter by client name (substring match).
    pub client: Option<String>,
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Request body for creating an invoice by hand.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Client billed.
    pub client_name: String,
    /// Amount billed; must be positive.
    pub amount: Decimal,
    /// Issue date; defaults to today.
    pub issue_date: Option<NaiveDate>,
    /// Payment deadline.
    pub due_date: NaiveDate,
    /// Originating booking, if any.
    pub booking_id: Option<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating an invoice.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// Client billed.
    pub client_name: Option<String>,
    /// Amount billed; only while nothing has been paid.
    pub amount: Option<Decimal>,
    /// Payment deadline.
    pub due_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Payment amount.
    pub amount: Decimal,
    /// Payment method: cash or bank.
    pub method: String,
    /// Receiving bank account; required iff method is bank.
    pub bank_account_id: Option<Uuid>,
    /// When the payment was received; defaults to today.
    pub paid_on: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// GET `/invoices` - List invoices with the overdue overlay applied.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(raw) => match string_to_status(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: pending, partial, paid, overdue"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    let filter = InvoiceFilter {
        status,
        from: query.from,
        to: query.to,
        client_name: query.client,
    };
    let today = Utc::now().date_naive();

    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    match repo
        .list_invoices(filter, today, page.offset(), page.limit())
        .await
    {
        Ok((invoices, total)) => {
            let response = PageResponse::new(invoices, page.page, page.per_page, total);
            (StatusCode::OK, Json(json!({ "invoices": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list invoices");
            internal_error()
        }
    }
}

/// POST `/invoices` - Create an invoice by hand.
async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let input = CreateInvoiceInput {
        client_name: payload.client_name,
        amount: payload.amount,
        issue_date: payload.issue_date.unwrap_or_else(|| Utc::now().date_naive()),
        due_date: payload.due_date,
        booking_id: payload.booking_id,
        notes: payload.notes,
    };

    match repo.create_invoice(input).await {
        Ok(invoice) => {
            info!(invoice_id = %invoice.id, invoice_number = %invoice.invoice_number, "Invoice created");
            (StatusCode::CREATED, Json(json!({ "invoice": invoice }))).into_response()
        }
        Err(e) => invoice_error_response(&e),
    }
}

/// GET `/invoices/{id}` - Get an invoice with its effective status.
async fn get_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let today = Utc::now().date_naive();

    match repo.find_invoice_by_id(id, today).await {
        Ok(Some(view)) => (StatusCode::OK, Json(json!({ "invoice": view }))).into_response(),
        Ok(None) => invoice_not_found(id),
        Err(e) => {
            error!(error = %e, invoice_id = %id, "Failed to get invoice");
            internal_error()
        }
    }
}

/// PUT `/invoices/{id}` - Update an invoice's descriptive fields.
async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let input = UpdateInvoiceInput {
        client_name: payload.client_name,
        amount: payload.amount,
        due_date: payload.due_date,
        notes: payload.notes.map(Some),
    };

    match repo.update_invoice(id, input).await {
        Ok(invoice) => {
            info!(invoice_id = %id, "Invoice updated");
            (StatusCode::OK, Json(json!({ "invoice": invoice }))).into_response()
        }
        Err(e) => invoice_error_response(&e),
    }
}

/// DELETE `/invoices/{id}` - Delete an unpaid invoice.
async fn delete_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.delete_invoice(id).await {
        Ok(()) => {
            info!(invoice_id = %id, "Invoice deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => invoice_error_response(&e),
    }
}

/// POST `/invoices/{id}/payments` - Record a payment.
async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    let Some(method) = string_to_method(&payload.method) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_method",
                "message": "Method must be one of: cash, bank"
            })),
        )
            .into_response();
    };

    let repo = InvoiceRepository::new((*state.db).clone());

    let input = RecordPaymentInput {
        amount: payload.amount,
        method,
        bank_account_id: payload.bank_account_id,
        paid_on: payload.paid_on.unwrap_or_else(|| Utc::now().date_naive()),
        notes: payload.notes,
    };

    match repo.record_payment(id, input).await {
        Ok(payment) => {
            info!(invoice_id = %id, payment_id = %payment.id, "Payment recorded");
            (StatusCode::CREATED, Json(json!({ "payment": payment }))).into_response()
        }
        Err(e) => invoice_error_response(&e),
    }
}

/// GET `/invoices/{id}/payments` - List payments for an invoice.
async fn list_payments(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.list_payments(id).await {
        Ok(payments) => (StatusCode::OK, Json(json!({ "payments": payments }))).into_response(),
        Err(e) => invoice_error_response(&e),
    }
}

fn string_to_status(raw: &str) -> Option<InvoiceStatus> {
    match raw {
        "pending" => Some(InvoiceStatus::Pending),
        "partial" => Some(InvoiceStatus::Partial),
        "paid" => Some(InvoiceStatus::Paid),
        "overdue" => Some(InvoiceStatus::Overdue),
        _ => None,
    }
}

fn string_to_method(raw: &str) -> Option<PaymentMethod> {
    match raw {
        "cash" => Some(PaymentMethod::Cash),
        "bank" => Some(PaymentMethod::Bank),
        _ => None,
    }
}

fn invoice_error_response(error: &InvoiceError) -> axum::response::Response {
    match error {
        InvoiceError::NotFound(id) => invoice_not_found(*id),
        InvoiceError::BookingNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Booking {id} not found")
            })),
        )
            .into_response(),
        InvoiceError::AccountNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Bank account {id} not found")
            })),
        )
            .into_response(),
        InvoiceError::DuplicateForBooking(id) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "already_invoiced",
                "message": format!("Booking {id} already has an invoice")
            })),
        )
            .into_response(),
        InvoiceError::Billing(e) => billing_error_response(e),
        InvoiceError::ConcurrentModification => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "conflict",
                "message": "Invoice changed concurrently; retry the payment"
            })),
        )
            .into_response(),
        InvoiceError::HasPayments(count) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "has_payments",
                "message": format!("Invoice has {count} recorded payments")
            })),
        )
            .into_response(),
        InvoiceError::NumberExhausted => {
            error!("Invoice number generation exhausted retries");
            internal_error()
        }
        InvoiceError::Database(e) => {
            error!(error = %e, "Invoice database error");
            internal_error()
        }
    }
}

fn billing_error_response(error: &BillingError) -> axum::response::Response {
    let status = match error {
        BillingError::Overpayment { .. } | BillingError::AlreadySettled => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };

    (
        status,
        Json(json!({
            "error": "billing_rule",
            "message": error.to_string()
        })),
    )
        .into_response()
}

fn invoice_not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Invoice {id} not found")
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
