//! Order item entity - Immutable line item snapshot.
//!
//! Product title, option and unit price are copied at order creation time,
//! not referenced live, so later catalog changes never affect historical
//! orders.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order (internal id, not the external code)
    pub order_id: i64,
    /// Catalog product identifier at order time
    pub product_id: String,
    /// Product title snapshot
    pub product_title: String,
    /// Product image snapshot
    pub product_image: Option<String>,
    /// Selected option identifier, if any
    pub option_id: Option<String>,
    /// Selected option name, if any
    pub option_name: Option<String>,
    /// Unit price snapshot in whole currency units
    pub unit_price: i64,
    /// Ordered quantity
    pub quantity: i32,
}

/// Defines relationships between order items and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
