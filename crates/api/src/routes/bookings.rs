//! Booking management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use gigbooks_db::{
    InvoiceRepository,
    entities::sea_orm_active_enums::BookingStatus,
    repositories::booking::{
        BookingError, BookingFilter, BookingRepository, BookingWithServices, CreateBookingInput,
        ServiceLineInput, UpdateBookingInput,
    },
    repositories::invoice::InvoiceError,
};
use gigbooks_shared::types::{PageRequest, PageResponse};

/// Creates the booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}", put(update_booking))
        .route("/bookings/{id}", delete(delete_booking))
        .route("/bookings/{id}/invoice", post(create_invoice_for_booking))
}

/// Query parameters for listing bookings.
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// Filter by status: upcoming, completed, cancelled.
    pub status: Option<String>,
    /// Only bookings scheduled on or after this date.
    pub from: Option<NaiveDate>,
    /// Only bookings scheduled on or before this date.
    pub to: Option<NaiveDate>,
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// One service line in a booking request.
#[derive(Debug, Deserialize)]
pub struct ServiceLineRequest {
    /// Name of the service.
    pub service_name: String,
    /// Number of persons; must be at least 1.
    pub persons: u32,
    /// Price per person.
    pub unit_price: Decimal,
}

/// Request body for creating a booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Client the service is for.
    pub client_name: String,
    /// When the service takes place.
    pub scheduled_at: NaiveDateTime,
    /// Where the service takes place.
    pub location: Option<String>,
    /// Service line items; must be non-empty.
    pub services: Vec<ServiceLineRequest>,
    /// Transportation fee (non-income, default 0).
    pub transportation_fee: Option<Decimal>,
    /// Early-morning surcharge (non-income, default 0).
    pub early_morning_fee: Option<Decimal>,
    /// Reservation fee collected up front, if any.
    pub reservation_fee: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating a booking.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    /// Client the service is for.
    pub client_name: Option<String>,
    /// When the service takes place.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Where the service takes place.
    pub location: Option<String>,
    /// Replacement service lines; when present, must be non-empty.
    pub services: Option<Vec<ServiceLineRequest>>,
    /// Transportation fee.
    pub transportation_fee: Option<Decimal>,
    /// Early-morning surcharge.
    pub early_morning_fee: Option<Decimal>,
    /// Reservation fee.
    pub reservation_fee: Option<Decimal>,
    /// Status: upcoming, completed, cancelled.
    pub status: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Response for a service line.
#[derive(Debug, Serialize)]
pub struct ServiceLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Name of the service.
    pub service_name: String,
    /// Number of persons.
    pub persons: i32,
    /// Price per person.
    pub unit_price: String,
    /// Line subtotal.
    pub subtotal: String,
}

/// Response for a booking.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking ID.
    pub id: Uuid,
    /// Client the service is for.
    pub client_name: String,
    /// When the service takes place.
    pub scheduled_at: NaiveDateTime,
    /// Where the service takes place.
    pub location: Option<String>,
    /// Income amount: sum of the service line subtotals.
    pub amount: String,
    /// Transportation fee (non-income).
    pub transportation_fee: String,
    /// Early-morning surcharge (non-income).
    pub early_morning_fee: String,
    /// Reservation fee, if any.
    pub reservation_fee: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Service line items.
    pub services: Vec<ServiceLineResponse>,
}

impl BookingResponse {
    fn from_record(record: BookingWithServices) -> Self {
        let services = record
            .services
            .into_iter()
            .map(|line| ServiceLineResponse {
                id: line.id,
                service_name: line.service_name,
                persons: line.persons,
                unit_price: line.unit_price.to_string(),
                subtotal: (Decimal::from(line.persons.unsigned_abs()) * line.unit_price)
                    .to_string(),
            })
            .collect();

        Self {
            id: record.booking.id,
            client_name: record.booking.client_name,
            scheduled_at: record.booking.scheduled_at,
            location: record.booking.location,
            amount: record.booking.amount.to_string(),
            transportation_fee: record.booking.transportation_fee.to_string(),
            early_morning_fee: record.booking.early_morning_fee.to_string(),
            reservation_fee: record.booking.reservation_fee.map(|fee| fee.to_string()),
            status: status_to_string(&record.booking.status),
            notes: record.booking.notes,
            services,
        }
    }
}

/// GET `/bookings` - List bookings.
async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(string_to_status) {
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_status",
                    "message": "Status must be one of: upcoming, completed, cancelled"
                })),
            )
                .into_response();
        }
        Some(parsed) => parsed,
        None => None,
    };

    let repo = BookingRepository::new((*state.db).clone());
    let filter = BookingFilter {
        status,
        from: query.from,
        to: query.to,
    };

    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    match repo
        .list_bookings(filter, page.offset(), page.limit())
        .await
    {
        Ok((bookings, total)) => {
            let response = PageResponse::new(bookings, page.page, page.per_page, total);
            (StatusCode::OK, Json(json!({ "bookings": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list bookings");
            internal_error()
        }
    }
}

/// POST `/bookings` - Create a booking.
async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    let repo = BookingRepository::new((*state.db).clone());

    let input = CreateBookingInput {
        client_name: payload.client_name,
        scheduled_at: payload.scheduled_at,
        location: payload.location,
        services: payload.services.into_iter().map(to_line_input).collect(),
        transportation_fee: payload.transportation_fee.unwrap_or(Decimal::ZERO),
        early_morning_fee: payload.early_morning_fee.unwrap_or(Decimal::ZERO),
        reservation_fee: payload.reservation_fee,
        notes: payload.notes,
    };

    match repo.create_booking(input).await {
        Ok(record) => {
            info!(booking_id = %record.booking.id, "Booking created");
            (
                StatusCode::CREATED,
                Json(json!({ "booking": BookingResponse::from_record(record) })),
            )
                .into_response()
        }
        Err(e) => booking_error_response(&e),
    }
}

/// GET `/bookings/{id}` - Get a booking with its service lines.
async fn get_booking(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = BookingRepository::new((*state.db).clone());

    match repo.find_booking_by_id(id).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(json!({ "booking": BookingResponse::from_record(record) })),
        )
            .into_response(),
        Ok(None) => not_found(id),
        Err(e) => {
            error!(error = %e, booking_id = %id, "Failed to get booking");
            internal_error()
        }
    }
}

/// PUT `/bookings/{id}` - Update a booking.
async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> impl IntoResponse {
    let status = match payload.status.as_deref() {
        Some(raw) => match string_to_status(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: upcoming, completed, cancelled"
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let repo = BookingRepository::new((*state.db).clone());

    let input = UpdateBookingInput {
        client_name: payload.client_name,
        scheduled_at: payload.scheduled_at,
        location: payload.location.map(Some),
        services: payload
            .services
            .map(|services| services.into_iter().map(to_line_input).collect()),
        transportation_fee: payload.transportation_fee,
        early_morning_fee: payload.early_morning_fee,
        reservation_fee: payload.reservation_fee.map(Some),
        status,
        notes: payload.notes.map(Some),
    };

    match repo.update_booking(id, input).await {
        Ok(record) => {
            info!(booking_id = %id, "Booking updated");
            (
                StatusCode::OK,
                Json(json!({ "booking": BookingResponse::from_record(record) })),
            )
                .into_response()
        }
        Err(e) => booking_error_response(&e),
    }
}

/// DELETE `/bookings/{id}` - Delete a booking.
///
/// An invoice derived from the booking survives with its booking
/// reference cleared.
async fn delete_booking(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = BookingRepository::new((*state.db).clone());

    match repo.delete_booking(id).await {
        Ok(()) => {
            info!(booking_id = %id, "Booking deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => booking_error_response(&e),
    }
}

/// POST `/bookings/{id}/invoice` - Derive an invoice from a booking.
async fn create_invoice_for_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());
    let today = Utc::now().date_naive();

    match repo.create_for_booking(id, today).await {
        Ok(invoice) => {
            info!(booking_id = %id, invoice_id = %invoice.id, "Invoice derived from booking");
            (StatusCode::CREATED, Json(json!({ "invoice": invoice }))).into_response()
        }
        Err(InvoiceError::BookingNotFound(booking_id)) => not_found(booking_id),
        Err(InvoiceError::DuplicateForBooking(booking_id)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "already_invoiced",
                "message": format!("Booking {booking_id} already has an invoice")
            })),
        )
            .into_response(),
        Err(InvoiceError::Billing(e)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "billing_rule",
                "message": e.to_string()
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, booking_id = %id, "Failed to derive invoice");
            internal_error()
        }
    }
}

fn to_line_input(line: ServiceLineRequest) -> ServiceLineInput {
    ServiceLineInput {
        service_name: line.service_name,
        persons: line.persons,
        unit_price: line.unit_price,
    }
}

fn string_to_status(raw: &str) -> Option<BookingStatus> {
    match raw {
        "upcoming" => Some(BookingStatus::Upcoming),
        "completed" => Some(BookingStatus::Completed),
        "cancelled" => Some(BookingStatus::Cancelled),
        _ => None,
    }
}

fn status_to_string(status: &BookingStatus) -> String {
    match status {
        BookingStatus::Upcoming => "upcoming".to_string(),
        BookingStatus::Completed => "completed".to_string(),
        BookingStatus::Cancelled => "cancelled".to_string(),
    }
}

fn booking_error_response(error: &BookingError) -> axum::response::Response {
    match error {
        BookingError::NotFound(id) => not_found(*id),
        BookingError::NoServices | BookingError::InvalidService { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_services",
                "message": error.to_string()
            })),
        )
            .into_response(),
        BookingError::Database(e) => {
            error!(error = %e, "Booking database error");
            internal_error()
        }
    }
}

fn not_found(id: Uuid) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Booking {id} not found")
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
