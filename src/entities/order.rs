//! Order entity - A product store order.
//!
//! Status is one of `PENDING`, `PAID`, `CANCELLED`, `REFUNDED`
//! (see [`crate::core::status::OrderStatus`]). The buyer snapshot columns
//! capture the checkout contact details at creation time.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// External order code shared with the client, e.g. `ORD-...`
    #[sea_orm(unique)]
    pub order_code: String,
    /// Lifecycle status: `"PENDING"`, `"PAID"`, `"CANCELLED"`, `"REFUNDED"`
    pub status: String,
    /// Total amount in whole currency units
    pub total_amount: i64,
    /// Buyer name snapshot taken at checkout
    pub buyer_name: Option<String>,
    /// Buyer phone snapshot taken at checkout
    pub buyer_phone: Option<String>,
    /// Buyer email snapshot taken at checkout
    pub buyer_email: Option<String>,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was cancelled, if it was
    pub cancelled_at: Option<DateTimeUtc>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// An order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
