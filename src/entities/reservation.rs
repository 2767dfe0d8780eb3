//! Reservation entity - A booking for a farm experience program.
//!
//! Status is one of `pending`, `confirmed`, `cancelled`, `completed`
//! (see [`crate::core::status::ReservationStatus`]). Rows are created in
//! `pending` and mutated only by the payment processor and the explicit
//! cancel operation. Only one non-cancelled reservation may exist for the
//! same (user, program, date, time slot).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reservation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Unique identifier for the reservation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Reserved program
    pub program_id: i64,
    /// Date of the experience
    pub res_date: Date,
    /// Time slot of the experience, e.g. `"10:00"`
    pub time_slot: String,
    /// Number of participants
    pub personnel: i32,
    /// Total price in whole currency units
    pub total_price: i64,
    /// Lifecycle status: `"pending"`, `"confirmed"`, `"cancelled"`, `"completed"`
    pub status: String,
    /// When the reservation was created
    pub created_at: DateTimeUtc,
    /// When the reservation was cancelled, if it was
    pub cancelled_at: Option<DateTimeUtc>,
}

/// Defines relationships between Reservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reservation belongs to one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id"
    )]
    Program,
    /// Each reservation belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// A reservation accumulates audit events
    #[sea_orm(has_many = "super::audit_event::Entity")]
    AuditEvent,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::audit_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
