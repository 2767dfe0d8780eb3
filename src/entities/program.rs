//! Program entity - Farm experience definitions.
//!
//! Programs are owned by catalog management, which is outside this core.
//! The payment engine only reads them: once at reservation creation and
//! again at payment time for the deferred re-validation.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Program database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "programs")]
pub struct Model {
    /// Unique identifier for the program
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Program title
    pub title: String,
    /// Price per booking in whole currency units
    pub price: i64,
    /// Minimum participants per reservation, if configured
    pub min_personnel: Option<i32>,
    /// Maximum participants per time slot, if configured
    pub max_personnel: Option<i32>,
    /// Whether the program is currently bookable
    pub is_active: bool,
    /// When the program was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Program and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A program has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservation,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
