//! Order lifecycle - Creation with line item snapshots, payment,
//! cancellation and refund.
//!
//! Orders move `PENDING -> PAID -> CANCELLED/REFUNDED`. Refunds re-read
//! the current status inside the transaction immediately before mutating
//! it, reverse the matching payment row, and claw back the points accrued
//! for the order. All multi-step mutations run in one database
//! transaction.

use crate::{
    core::{
        payment::{self, Buyer, PaymentTarget},
        points,
        status::{OrderStatus, PaymentStatus, SourceType},
    },
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};

/// A line item at order creation time.
#[derive(Clone, Debug)]
pub struct NewOrderItem {
    /// Catalog product identifier
    pub product_id: String,
    /// Product title snapshot
    pub title: String,
    /// Product image snapshot
    pub image: Option<String>,
    /// Selected option identifier, if any
    pub option_id: Option<String>,
    /// Selected option name, if any
    pub option_name: Option<String>,
    /// Unit price in whole currency units
    pub unit_price: i64,
    /// Ordered quantity
    pub quantity: i32,
}

/// An order together with its line items.
#[derive(Clone, Debug)]
pub struct OrderWithItems {
    /// The order row
    pub order: order::Model,
    /// Immutable line item snapshots
    pub items: Vec<order_item::Model>,
}

/// Result of a refund operation.
#[derive(Clone, Debug)]
pub struct OrderRefund {
    /// The refunded order
    pub order: order::Model,
    /// Points clawed back (0 when nothing was earned)
    pub refunded_points: i64,
}

/// Creates a `PENDING` order with one immutable item snapshot per line.
///
/// Rejects an empty item list, a non-positive amount, and malformed line
/// items before any write. The external order code is generated here.
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i64,
    items: Vec<NewOrderItem>,
    amount: i64,
    buyer: &Buyer,
) -> Result<OrderWithItems> {
    if items.is_empty() {
        return Err(Error::validation("order must contain at least one item"));
    }
    if amount <= 0 {
        return Err(Error::validation("order amount must be positive"));
    }
    for item in &items {
        if item.quantity < 1 {
            return Err(Error::validation("item quantity must be at least 1"));
        }
        if item.unit_price < 0 {
            return Err(Error::validation("item unit price must not be negative"));
        }
    }

    let txn = db.begin().await?;

    let created = order::ActiveModel {
        user_id: Set(user_id),
        order_code: Set(payment::generate_order_code()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        total_amount: Set(amount),
        buyer_name: Set(buyer.name.clone()),
        buyer_phone: Set(buyer.phone.clone()),
        buyer_email: Set(buyer.email.clone()),
        created_at: Set(chrono::Utc::now()),
        cancelled_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut snapshots = Vec::with_capacity(items.len());
    for item in items {
        let snapshot = order_item::ActiveModel {
            order_id: Set(created.id),
            product_id: Set(item.product_id),
            product_title: Set(item.title),
            product_image: Set(item.image),
            option_id: Set(item.option_id),
            option_name: Set(item.option_name),
            unit_price: Set(item.unit_price),
            quantity: Set(item.quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        snapshots.push(snapshot);
    }

    txn.commit().await?;

    tracing::info!(
        order_id = created.id,
        order_code = %created.order_code,
        user_id,
        amount,
        "order created"
    );

    Ok(OrderWithItems {
        order: created,
        items: snapshots,
    })
}

/// Pays for a `PENDING` order owned by the caller.
///
/// The payment processor rejects a non-`PENDING` order with
/// [`Error::InvalidState`], detects an existing `PAID` payment row as a
/// [`Error::Conflict`], records the payment, flips the status under guard
/// and accrues points with `sourceType=ORDER`.
pub async fn pay_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
    method: &str,
    buyer: &Buyer,
) -> Result<(order::Model, crate::entities::payment::Model)> {
    let txn = db.begin().await?;

    let target = find_owned(&txn, user_id, order_code).await?;
    let paid = payment::process_payment(&txn, &target, method, buyer).await?;

    let updated = Order::find_by_id(target.id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound { entity: "order" })?;

    txn.commit().await?;

    Ok((updated, paid))
}

/// Cancels a `PAID` order prior to fulfillment.
///
/// Cancellation is only meaningful for something already paid for; any
/// other status is rejected with [`Error::InvalidState`].
pub async fn cancel_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let target = find_owned(&txn, user_id, order_code).await?;
    if target.status != OrderStatus::Paid.as_str() {
        return Err(Error::InvalidState {
            current: target.status,
        });
    }

    let mut cancelling: order::ActiveModel = target.into();
    cancelling.status = Set(OrderStatus::Cancelled.as_str().to_string());
    cancelling.cancelled_at = Set(Some(chrono::Utc::now()));
    let cancelled = cancelling.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_code, user_id, "order cancelled");

    Ok(cancelled)
}

/// Refunds a `PAID` or `CANCELLED` order.
///
/// Flips the order to `REFUNDED` with a guarded UPDATE (the status is
/// checked against the freshly loaded row, so a refunded order is
/// rejected with [`Error::InvalidState`] instead of slipping through a
/// stale read), marks the latest `PAID` payment row `REFUNDED` with the
/// reason, and reverses the points accrued for the order. Returns the
/// clawed-back amount, which is 0 when no points were earned.
pub async fn refund_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
    reason: Option<&str>,
) -> Result<OrderRefund> {
    use sea_orm::sea_query::Expr;

    let txn = db.begin().await?;

    // Current status, read inside the transaction right before the mutation
    let target = find_owned(&txn, user_id, order_code).await?;
    match OrderStatus::parse(&target.status) {
        Some(OrderStatus::Paid | OrderStatus::Cancelled) => {}
        _ => {
            return Err(Error::InvalidState {
                current: target.status,
            });
        }
    }

    let result = Order::update_many()
        .col_expr(
            order::Column::Status,
            Expr::value(OrderStatus::Refunded.as_str()),
        )
        .filter(order::Column::Id.eq(target.id))
        .filter(order::Column::Status.is_in([
            OrderStatus::Paid.as_str(),
            OrderStatus::Cancelled.as_str(),
        ]))
        .exec(&txn)
        .await?;
    if result.rows_affected != 1 {
        return Err(Error::conflict("order was modified concurrently"));
    }

    if let Some(paid) = payment::paid_payment_for(&txn, SourceType::Order, target.id).await? {
        let mut refunding: crate::entities::payment::ActiveModel = paid.into();
        refunding.status = Set(PaymentStatus::Refunded.as_str().to_string());
        refunding.refunded_at = Set(Some(chrono::Utc::now()));
        refunding.refund_reason = Set(Some(reason.unwrap_or("customer request").to_string()));
        refunding.update(&txn).await?;
    }

    let refunded_points = points::claw_back(&txn, user_id, SourceType::Order, target.id).await?;

    let refunded = Order::find_by_id(target.id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound { entity: "order" })?;

    txn.commit().await?;

    tracing::info!(order_code, user_id, refunded_points, "order refunded");

    Ok(OrderRefund {
        order: refunded,
        refunded_points,
    })
}

/// Finds an order by external code, scoped to the owning user.
pub async fn find_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
) -> Result<OrderWithItems> {
    let order = find_owned(db, user_id, order_code).await?;
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;
    Ok(OrderWithItems { order, items })
}

/// All orders of a user, newest first, each with its line items.
pub async fn list_orders(db: &DatabaseConnection, user_id: i64) -> Result<Vec<OrderWithItems>> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .order_by_asc(order_item::Column::Id)
            .all(db)
            .await?;
        result.push(OrderWithItems { order, items });
    }
    Ok(result)
}

async fn find_owned<C>(conn: &C, user_id: i64, order_code: &str) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::OrderCode.eq(order_code))
        .filter(order::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(Error::NotFound { entity: "order" })
}
