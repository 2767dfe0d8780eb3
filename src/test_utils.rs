//! Shared test utilities.
//!
//! Provides an in-memory `SQLite` database with all tables created, plus
//! fixture helpers with sensible defaults for users, programs,
//! reservations and orders.

use crate::{
    core::{
        order::{self, NewOrderItem, OrderWithItems},
        payment::Buyer,
        reservation::{self, NewReservation},
    },
    entities::{Program, Reservation, User, program, reservation as reservation_entity, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Tomorrow's date, so freshly created reservations always pass the
/// past-date re-validation.
#[must_use]
pub fn tomorrow() -> NaiveDate {
    chrono::Utc::now().date_naive() + chrono::Duration::days(1)
}

/// Creates a test user with the given starting point balance.
pub async fn create_test_user(db: &DatabaseConnection, points: i64) -> Result<user::Model> {
    create_test_user_with(db, "test@example.com", points).await
}

/// Creates a test user with a custom email (for multi-user tests).
pub async fn create_test_user_with_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<user::Model> {
    create_test_user_with(db, email, 0).await
}

async fn create_test_user_with(
    db: &DatabaseConnection,
    email: &str,
    points: i64,
) -> Result<user::Model> {
    user::ActiveModel {
        email: Set(email.to_string()),
        display_name: Set("Test User".to_string()),
        points: Set(points),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Overwrites a user's point balance directly (simulates points spent
/// outside the core, for clamp tests).
pub async fn set_user_points(db: &DatabaseConnection, user_id: i64, points: i64) -> Result<()> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "user" })?;
    let mut active: user::ActiveModel = user.into();
    active.points = Set(points);
    active.update(db).await?;
    Ok(())
}

/// Creates a test program with the given personnel bounds.
///
/// # Defaults
/// * `title`: "Test Program"
/// * `price`: 10,000
pub async fn create_test_program(
    db: &DatabaseConnection,
    min_personnel: Option<i32>,
    max_personnel: Option<i32>,
) -> Result<program::Model> {
    program::ActiveModel {
        title: Set("Test Program".to_string()),
        price: Set(10_000),
        min_personnel: Set(min_personnel),
        max_personnel: Set(max_personnel),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Changes a program's maximum personnel after creation, to exercise the
/// deferred re-validation at payment time.
pub async fn set_program_max_personnel(
    db: &DatabaseConnection,
    program_id: i64,
    max_personnel: Option<i32>,
) -> Result<()> {
    let program = Program::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity: "program" })?;
    let mut active: program::ActiveModel = program.into();
    active.max_personnel = Set(max_personnel);
    active.update(db).await?;
    Ok(())
}

/// Forces a reservation status, bypassing the lifecycle (for guard tests).
pub async fn set_reservation_status(
    db: &DatabaseConnection,
    reservation_id: i64,
    status: &str,
) -> Result<()> {
    let res = Reservation::find_by_id(reservation_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "reservation",
        })?;
    let mut active: reservation_entity::ActiveModel = res.into();
    active.status = Set(status.to_string());
    active.update(db).await?;
    Ok(())
}

/// Creates a test reservation with sensible defaults.
///
/// # Defaults
/// * date: tomorrow
/// * `time_slot`: "10:00"
/// * `personnel`: 2
/// * `total_price`: 10,000
pub async fn create_test_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    program_id: i64,
) -> Result<reservation_entity::Model> {
    create_test_reservation_with(db, user_id, program_id, 2, 10_000).await
}

/// Creates a test reservation with custom personnel and price.
pub async fn create_test_reservation_with(
    db: &DatabaseConnection,
    user_id: i64,
    program_id: i64,
    personnel: i32,
    total_price: i64,
) -> Result<reservation_entity::Model> {
    reservation::create_reservation(
        db,
        user_id,
        NewReservation {
            program_id,
            res_date: tomorrow(),
            time_slot: "10:00".to_string(),
            personnel,
            total_price,
        },
    )
    .await
}

/// Creates a test reservation in a custom time slot.
pub async fn create_test_reservation_at(
    db: &DatabaseConnection,
    user_id: i64,
    program_id: i64,
    time_slot: &str,
) -> Result<reservation_entity::Model> {
    reservation::create_reservation(
        db,
        user_id,
        NewReservation {
            program_id,
            res_date: tomorrow(),
            time_slot: time_slot.to_string(),
            personnel: 2,
            total_price: 10_000,
        },
    )
    .await
}

/// Two line items totaling 10,000 (4,000 + 2 x 3,000).
#[must_use]
pub fn test_items() -> Vec<NewOrderItem> {
    vec![
        NewOrderItem {
            product_id: "prod-1".to_string(),
            title: "Apple Jam".to_string(),
            image: None,
            option_id: None,
            option_name: None,
            unit_price: 4_000,
            quantity: 1,
        },
        NewOrderItem {
            product_id: "prod-2".to_string(),
            title: "Honey".to_string(),
            image: Some("honey.jpg".to_string()),
            option_id: Some("opt-1".to_string()),
            option_name: Some("Small".to_string()),
            unit_price: 3_000,
            quantity: 2,
        },
    ]
}

/// Creates a test order with default items and the given total amount.
pub async fn create_test_order(
    db: &DatabaseConnection,
    user_id: i64,
    amount: i64,
) -> Result<OrderWithItems> {
    order::create_order(db, user_id, test_items(), amount, &Buyer::default()).await
}
