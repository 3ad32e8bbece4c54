//! Booking line-item aggregation.

use rust_decimal::Decimal;

use super::types::{Booking, ServiceLine};

/// The income-bearing amount of a booking: the sum over line items of
/// persons x unit price. Non-income fees are never part of this.
#[must_use]
pub fn booking_amount(services: &[ServiceLine]) -> Decimal {
    services.iter().map(ServiceLine::subtotal).sum()
}

/// Total of the non-income fees tracked alongside a booking.
#[must_use]
pub fn non_income_fees(booking: &Booking) -> Decimal {
    booking.transportation_fee + booking.early_morning_fee
}

impl Booking {
    /// The derived income amount for this booking.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        booking_amount(&self.services)
    }
}
