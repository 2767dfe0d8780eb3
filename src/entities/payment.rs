//! Payment entity - A recorded payment against a reservation or an order.
//!
//! `payment_type` names the target kind and exactly one of `reservation_id`
//! or `order_id` is set. The engine-wide invariant is that at most one row
//! with `status = "PAID"` references any given target.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Target kind: `"RESERVATION"` or `"ORDER"`
    pub payment_type: String,
    /// Target reservation when `payment_type` is `"RESERVATION"`
    pub reservation_id: Option<i64>,
    /// Target order when `payment_type` is `"ORDER"`
    pub order_id: Option<i64>,
    /// External payment code shared with the client, e.g. `PAY-...`
    #[sea_orm(unique)]
    pub payment_code: String,
    /// Payment method, e.g. `"CARD"`
    pub method: String,
    /// Paid amount in whole currency units
    pub amount: i64,
    /// Payment status: `"PAID"` or `"REFUNDED"`
    pub status: String,
    /// Buyer name provided at payment time
    pub buyer_name: Option<String>,
    /// Buyer phone provided at payment time
    pub buyer_phone: Option<String>,
    /// Buyer email provided at payment time
    pub buyer_email: Option<String>,
    /// When the payment was made
    pub paid_at: DateTimeUtc,
    /// When the payment was refunded, if it was
    pub refunded_at: Option<DateTimeUtc>,
    /// Reason given for the refund, if any
    pub refund_reason: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Payments reference their target through the nullable id columns
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
