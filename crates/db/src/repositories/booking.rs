//! Booking repository.
//!
//! A booking is a header row plus its service line rows. The income
//! amount is always recomputed from the lines on every write; client
//! input never sets it directly.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use gigbooks_core::billing::{self, booking_amount, ServiceLine};

use crate::entities::{booking_services, bookings, sea_orm_active_enums};

/// Error types for booking operations.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Booking not found.
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    /// A booking must have at least one service line.
    #[error("Booking must have at least one service line")]
    NoServices,

    /// A service line failed validation.
    #[error("Invalid service line '{name}': {reason}")]
    InvalidService {
        /// Service name from the offending line.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One service line on a booking input.
#[derive(Debug, Clone)]
pub struct ServiceLineInput {
    /// Name of the service performed.
    pub service_name: String,
    /// Number of persons the service covers.
    pub persons: u32,
    /// Price per person.
    pub unit_price: Decimal,
}

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    /// Client the service is for.
    pub client_name: String,
    /// When the service takes place.
    pub scheduled_at: NaiveDateTime,
    /// Where the service takes place.
    pub location: Option<String>,
    /// Service line items; must be non-empty.
    pub services: Vec<ServiceLineInput>,
    /// Transportation fee (non-income).
    pub transportation_fee: Decimal,
    /// Early-morning surcharge (non-income).
    pub early_morning_fee: Decimal,
    /// Reservation fee collected up front, if any.
    pub reservation_fee: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating a booking.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookingInput {
    /// Client the service is for.
    pub client_name: Option<String>,
    /// When the service takes place.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Where the service takes place.
    pub location: Option<Option<String>>,
    /// Replacement service lines; when present, must be non-empty.
    pub services: Option<Vec<ServiceLineInput>>,
    /// Transportation fee.
    pub transportation_fee: Option<Decimal>,
    /// Early-morning surcharge.
    pub early_morning_fee: Option<Decimal>,
    /// Reservation fee.
    pub reservation_fee: Option<Option<Decimal>>,
    /// Lifecycle status.
    pub status: Option<sea_orm_active_enums::BookingStatus>,
    /// Free-form notes.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Filter by status.
    pub status: Option<sea_orm_active_enums::BookingStatus>,
    /// Only bookings scheduled on or after this date.
    pub from: Option<NaiveDate>,
    /// Only bookings scheduled on or before this date.
    pub to: Option<NaiveDate>,
}

/// A booking with its service lines.
#[derive(Debug, Clone)]
pub struct BookingWithServices {
    /// The booking record.
    pub booking: bookings::Model,
    /// Its service line rows.
    pub services: Vec<booking_services::Model>,
}

/// Booking repository for CRUD operations.
#[derive(Debug)]
#[cfg_attr(not(feature = "mock"), derive(Clone))]
pub struct BookingRepository {
    db: DatabaseConnection,
}

impl BookingRepository {
    /// Creates a new booking repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a booking with its service lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the service lines are empty or invalid, or
    /// the database operation fails.
    pub async fn create_booking(
        &self,
        input: CreateBookingInput,
    ) -> Result<BookingWithServices, BookingError> {
        let lines = validate_services(&input.services)?;
        let amount = booking_amount(&lines);

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let booking_id = Uuid::new_v4();
        let booking = bookings::ActiveModel {
            id: Set(booking_id),
            client_name: Set(input.client_name),
            scheduled_at: Set(input.scheduled_at),
            location: Set(input.location),
            amount: Set(amount),
            transportation_fee: Set(input.transportation_fee),
            early_morning_fee: Set(input.early_morning_fee),
            reservation_fee: Set(input.reservation_fee),
            status: Set(sea_orm_active_enums::BookingStatus::Upcoming),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let booking = booking.insert(&txn).await?;
        let services = insert_services(&txn, booking_id, input.services).await?;

        txn.commit().await?;

        Ok(BookingWithServices { booking, services })
    }

    /// Lists a page of bookings with the total count, soonest
    /// scheduled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_bookings(
        &self,
        filter: BookingFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<bookings::Model>, u64), BookingError> {
        let mut query = bookings::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(bookings::Column::Status.eq(status));
        }
        if let Some(from) = filter.from {
            let start = from.and_hms_opt(0, 0, 0);
            if let Some(start) = start {
                query = query.filter(bookings::Column::ScheduledAt.gte(start));
            }
        }
        if let Some(to) = filter.to {
            let end = to.and_hms_opt(23, 59, 59);
            if let Some(end) = end {
                query = query.filter(bookings::Column::ScheduledAt.lte(end));
            }
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_asc(bookings::Column::ScheduledAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Finds a booking by ID with its service lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_booking_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingWithServices>, BookingError> {
        let booking = bookings::Entity::find_by_id(id).one(&self.db).await?;

        match booking {
            Some(booking) => {
                let services = booking_services::Entity::find()
                    .filter(booking_services::Column::BookingId.eq(id))
                    .order_by_asc(booking_services::Column::ServiceName)
                    .all(&self.db)
                    .await?;

                Ok(Some(BookingWithServices { booking, services }))
            }
            None => Ok(None),
        }
    }

    /// Updates a booking, replacing the service lines when new ones
    /// are given and recomputing the amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is not found, replacement
    /// service lines are empty or invalid, or the database operation
    /// fails.
    pub async fn update_booking(
        &self,
        id: Uuid,
        input: UpdateBookingInput,
    ) -> Result<BookingWithServices, BookingError> {
        let booking = bookings::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BookingError::NotFound(id))?;

        let new_amount = match &input.services {
            Some(services) => {
                let lines = validate_services(services)?;
                Some(booking_amount(&lines))
            }
            None => None,
        };

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let mut active: bookings::ActiveModel = booking.into();

        if let Some(client_name) = input.client_name {
            active.client_name = Set(client_name);
        }
        if let Some(scheduled_at) = input.scheduled_at {
            active.scheduled_at = Set(scheduled_at);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(transportation_fee) = input.transportation_fee {
            active.transportation_fee = Set(transportation_fee);
        }
        if let Some(early_morning_fee) = input.early_morning_fee {
            active.early_morning_fee = Set(early_morning_fee);
        }
        if let Some(reservation_fee) = input.reservation_fee {
            active.reservation_fee = Set(reservation_fee);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        if let Some(amount) = new_amount {
            active.amount = Set(amount);
        }
        active.updated_at = Set(now);

        let booking = active.update(&txn).await?;

        let services = match input.services {
            Some(replacement) => {
                booking_services::Entity::delete_many()
                    .filter(booking_services::Column::BookingId.eq(id))
                    .exec(&txn)
                    .await?;

                insert_services(&txn, id, replacement).await?
            }
            None => {
                booking_services::Entity::find()
                    .filter(booking_services::Column::BookingId.eq(id))
                    .order_by_asc(booking_services::Column::ServiceName)
                    .all(&txn)
                    .await?
            }
        };

        txn.commit().await?;

        Ok(BookingWithServices { booking, services })
    }

    /// Deletes a booking and its service lines.
    ///
    /// An invoice derived from the booking survives with its booking
    /// reference set to null.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is not found or the database
    /// operation fails.
    pub async fn delete_booking(&self, id: Uuid) -> Result<(), BookingError> {
        let result = bookings::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(BookingError::NotFound(id));
        }

        Ok(())
    }
}

/// Maps a stored booking with lines to the billing domain type.
#[must_use]
pub fn to_domain(record: &BookingWithServices) -> billing::Booking {
    billing::Booking {
        id: record.booking.id,
        client_name: record.booking.client_name.clone(),
        services: record
            .services
            .iter()
            .map(|line| ServiceLine {
                service_name: line.service_name.clone(),
                persons: line.persons.unsigned_abs(),
                unit_price: line.unit_price,
            })
            .collect(),
        scheduled_at: record.booking.scheduled_at,
        location: record.booking.location.clone(),
        transportation_fee: record.booking.transportation_fee,
        early_morning_fee: record.booking.early_morning_fee,
        reservation_fee: record.booking.reservation_fee,
        status: match record.booking.status {
            sea_orm_active_enums::BookingStatus::Upcoming => billing::BookingStatus::Upcoming,
            sea_orm_active_enums::BookingStatus::Completed => billing::BookingStatus::Completed,
            sea_orm_active_enums::BookingStatus::Cancelled => billing::BookingStatus::Cancelled,
        },
    }
}

/// Validates service line inputs and maps them to domain lines.
fn validate_services(services: &[ServiceLineInput]) -> Result<Vec<ServiceLine>, BookingError> {
    if services.is_empty() {
        return Err(BookingError::NoServices);
    }

    let mut lines = Vec::with_capacity(services.len());
    for service in services {
        if service.service_name.trim().is_empty() {
            return Err(BookingError::InvalidService {
                name: service.service_name.clone(),
                reason: "service name is empty".to_string(),
            });
        }
        if service.persons == 0 {
            return Err(BookingError::InvalidService {
                name: service.service_name.clone(),
                reason: "persons must be at least 1".to_string(),
            });
        }
        if service.unit_price < Decimal::ZERO {
            return Err(BookingError::InvalidService {
                name: service.service_name.clone(),
                reason: "unit price must not be negative".to_string(),
            });
        }
        lines.push(ServiceLine {
            service_name: service.service_name.clone(),
            persons: service.persons,
            unit_price: service.unit_price,
        });
    }

    Ok(lines)
}

/// Inserts service line rows for a booking.
async fn insert_services<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
    services: Vec<ServiceLineInput>,
) -> Result<Vec<booking_services::Model>, BookingError> {
    let mut rows = Vec::with_capacity(services.len());
    for service in services {
        let line = booking_services::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            service_name: Set(service.service_name),
            persons: Set(i32::try_from(service.persons).unwrap_or(i32::MAX)),
            unit_price: Set(service.unit_price),
        };
        rows.push(line.insert(conn).await?);
    }

    Ok(rows)
}
