//! Database seeder for gigbooks development and testing.
//!
//! Seeds a default bank account, a sample booking with service lines,
//! and a few recurring expenses for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use gigbooks_db::entities::{
    bank_accounts, booking_services, bookings, expenses,
    sea_orm_active_enums::BookingStatus,
};

/// Seed bank account ID (consistent for all seeds)
const SEED_ACCOUNT_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Seed booking ID (consistent for all seeds)
const SEED_BOOKING_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = gigbooks_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding default bank account...");
    seed_bank_account(&db).await;

    println!("Seeding sample booking...");
    seed_booking(&db).await;

    println!("Seeding recurring expenses...");
    seed_expenses(&db).await;

    println!("Seeding complete!");
}

fn seed_account_id() -> Uuid {
    Uuid::parse_str(SEED_ACCOUNT_ID).unwrap()
}

fn seed_booking_id() -> Uuid {
    Uuid::parse_str(SEED_BOOKING_ID).unwrap()
}

/// Seeds the default bank account that receives cash payments.
async fn seed_bank_account(db: &DatabaseConnection) {
    if bank_accounts::Entity::find_by_id(seed_account_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Default bank account already exists, skipping...");
        return;
    }

    let now = Utc::now().into();
    let account = bank_accounts::ActiveModel {
        id: Set(seed_account_id()),
        bank_name: Set("BPI".to_string()),
        account_name: Set("Business Checking".to_string()),
        account_number: Set("0009-1234-56".to_string()),
        balance: Set(Decimal::ZERO),
        undeposited: Set(Decimal::ZERO),
        is_default: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    account
        .insert(db)
        .await
        .expect("Failed to seed bank account");
}

/// Seeds an upcoming booking with two service lines.
async fn seed_booking(db: &DatabaseConnection) {
    if bookings::Entity::find_by_id(seed_booking_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Sample booking already exists, skipping...");
        return;
    }

    let now = Utc::now();
    let scheduled_at = (now + Duration::days(14)).naive_utc();

    // 1 x 5000 + 4 x 1500 = 11000; fees stay out of the amount.
    let booking = bookings::ActiveModel {
        id: Set(seed_booking_id()),
        client_name: Set("Ana Reyes".to_string()),
        scheduled_at: Set(scheduled_at),
        location: Set(Some("Tagaytay".to_string())),
        amount: Set(Decimal::new(11_000, 0)),
        transportation_fee: Set(Decimal::new(1_500, 0)),
        early_morning_fee: Set(Decimal::new(500, 0)),
        reservation_fee: Set(Some(Decimal::new(1_000, 0))),
        status: Set(BookingStatus::Upcoming),
        notes: Set(Some("Wedding package".to_string())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    booking.insert(db).await.expect("Failed to seed booking");

    let lines = [
        ("Bridal makeup", 1, Decimal::new(5_000, 0)),
        ("Entourage makeup", 4, Decimal::new(1_500, 0)),
    ];

    for (name, persons, unit_price) in lines {
        let line = booking_services::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(seed_booking_id()),
            service_name: Set(name.to_string()),
            persons: Set(persons),
            unit_price: Set(unit_price),
        };

        line.insert(db)
            .await
            .expect("Failed to seed booking service");
    }
}

/// Seeds a few recurring expenses.
async fn seed_expenses(db: &DatabaseConnection) {
    let existing = expenses::Entity::find().one(db).await.ok().flatten();
    if existing.is_some() {
        println!("  Expenses already exist, skipping...");
        return;
    }

    let now = Utc::now();
    let today = now.date_naive();

    let rows = [
        ("Studio rent", "rent", Decimal::new(8_000, 0), true, true),
        ("Product restock", "supplies", Decimal::new(3_500, 0), true, false),
        ("Mobile plan", "utilities", Decimal::new(999, 0), false, true),
    ];

    for (description, category, amount, deductible, monthly) in rows {
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            incurred_on: Set(today),
            description: Set(description.to_string()),
            category: Set(category.to_string()),
            amount: Set(amount),
            tax_deductible: Set(deductible),
            is_monthly: Set(monthly),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        expense.insert(db).await.expect("Failed to seed expense");
    }
}
