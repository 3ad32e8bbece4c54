//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod bookings;
pub mod expenses;
pub mod health;
pub mod invoices;
pub mod tax;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(bookings::routes())
        .merge(invoices::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(expenses::routes())
        .merge(tax::routes())
}
