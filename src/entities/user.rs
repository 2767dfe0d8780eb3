//! User entity - Account identity and the loyalty point balance.
//!
//! Within the core, `points` is mutated only by the point ledger (accrual
//! on payment, clawback on refund) and must never go negative. Every change
//! is mirrored by an append-only `point_transactions` row.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email address
    #[sea_orm(unique)]
    pub email: String,
    /// Display name shown to other users
    pub display_name: String,
    /// Current loyalty point balance (never negative)
    pub points: i64,
    /// Whether the account is active
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Users are referenced by reservations, orders and point transactions
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
