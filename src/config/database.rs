//! Database configuration for the booking engine.
//!
//! Handles `SQLite` connections and table creation using `SeaORM`. The
//! connection pool is deliberately small: per-request workers share no
//! in-memory state and all coordination happens in the database, so a
//! handful of connections gates concurrency instead of opening unbounded
//! ones. Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, keeping the schema in lockstep with
//! the Rust structs.

use crate::entities::{
    AuditEvent, Order, OrderItem, Payment, PointTransaction, Program, Reservation, User,
};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default pool size when `DATABASE_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Gets the database URL from the environment or the default `SQLite` path.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/farmbook.sqlite".to_string())
}

/// Gets the bounded pool size from the environment, defaulting to
/// [`DEFAULT_MAX_CONNECTIONS`].
pub fn max_connections() -> u32 {
    std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

/// Establishes a connection with a bounded pool.
pub async fn connect() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url());
    options.max_connections(max_connections());
    Database::connect(options).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    db.execute(builder.build(&schema.create_table_from_entity(User)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Program)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Reservation)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(AuditEvent)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Order)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(OrderItem)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(Payment)))
        .await?;
    db.execute(builder.build(&schema.create_table_from_entity(PointTransaction)))
        .await?;

    Ok(())
}
