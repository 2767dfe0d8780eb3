//! Point transaction entity - The append-only loyalty point ledger.
//!
//! Rows are never updated or deleted. `amount` is signed (positive for
//! `EARNED`, negative for `REFUNDED`) and `balance_after` snapshots the
//! user's balance immediately after the transaction was applied, so the
//! most recent row for a user always agrees with `users.points`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Point transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User whose balance was changed
    pub user_id: i64,
    /// Transaction kind: `"EARNED"` or `"REFUNDED"`
    pub kind: String,
    /// Signed point amount (positive for earned, negative for clawback)
    pub amount: i64,
    /// User balance immediately after this transaction
    pub balance_after: i64,
    /// Source kind: `"RESERVATION"` or `"ORDER"`
    pub source_type: String,
    /// Internal id of the source reservation or order
    pub source_id: i64,
    /// Human-readable description
    pub description: String,
    /// When earned points expire (one year after accrual)
    pub expires_at: Option<DateTimeUtc>,
    /// When the transaction was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between point transactions and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
