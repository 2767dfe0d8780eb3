//! Audit event entity - Append-only history attached to a reservation.
//!
//! Replaces the free-text memo column of earlier designs with structured
//! rows: payment confirmations, user cancellations and system cancellations
//! each get their own event. Rows are never updated or deleted.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reservation the event belongs to
    pub reservation_id: i64,
    /// Event kind: `"payment"`, `"user_cancel"`, `"system_cancel"`, `"payment_failed"`
    pub kind: String,
    /// Human-readable detail (cancellation reason, payment summary)
    pub detail: String,
    /// When the event was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between audit events and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one reservation
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id"
    )]
    Reservation,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
