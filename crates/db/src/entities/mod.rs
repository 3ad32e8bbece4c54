//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod bank_transactions;
pub mod booking_services;
pub mod bookings;
pub mod expenses;
pub mod invoice_payments;
pub mod invoices;
pub mod sea_orm_active_enums;
