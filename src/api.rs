//! Client-facing operation surface.
//!
//! Every mutating operation returns a structured `{success, message, data?}`
//! envelope. Business-rule failures carry their reason in `message`, and
//! `data` is populated even on failure when it is informative: the
//! deferred-validation path returns the cancelled reservation snapshot so
//! the client can render the outcome without a follow-up fetch. Internal
//! failures are logged server-side and reported with a generic message.

use crate::{
    core::{
        order::{self, NewOrderItem},
        payment::{self, Buyer},
        points,
        reservation::{self, NewReservation, ReservationPayment},
        status::{DerivedPaymentStatus, ReservationStatus, SourceType},
    },
    entities::{order as order_entity, order_item, payment as payment_entity, reservation as reservation_entity},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// The response envelope shared by every operation.
#[derive(Clone, Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Outcome message, present on failure and on notable successes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload; may be present on failure when informative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying data.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// A successful response with a message and data.
    #[must_use]
    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// A failure with no payload.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// A failure that still carries an informative payload.
    #[must_use]
    pub fn fail_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

fn failure<T>(err: &Error) -> ApiResponse<T> {
    if err.is_internal() {
        tracing::error!(error = %err, "operation failed");
        ApiResponse::fail("an internal error occurred")
    } else {
        ApiResponse::fail(err.to_string())
    }
}

/// Payment details as shown to clients.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentView {
    /// Internal payment id
    pub id: i64,
    /// External payment code
    pub payment_code: String,
    /// Payment method
    pub method: String,
    /// Paid amount
    pub amount: i64,
    /// Payment status string
    pub status: String,
    /// When the payment was made
    pub paid_at: chrono::DateTime<chrono::Utc>,
    /// When the payment was refunded, if it was
    pub refunded_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Refund reason, if any
    pub refund_reason: Option<String>,
}

impl From<payment_entity::Model> for PaymentView {
    fn from(p: payment_entity::Model) -> Self {
        Self {
            id: p.id,
            payment_code: p.payment_code,
            method: p.method,
            amount: p.amount,
            status: p.status,
            paid_at: p.paid_at,
            refunded_at: p.refunded_at,
            refund_reason: p.refund_reason,
        }
    }
}

/// Reservation details as shown to clients, including the derived payment
/// state and the (query-time computed) completion status.
#[derive(Clone, Debug, Serialize)]
pub struct ReservationView {
    /// Reservation id as an external string
    pub booking_id: String,
    /// Reserved program id
    pub program_id: String,
    /// Owning user id
    pub user_id: String,
    /// Experience date
    pub date: chrono::NaiveDate,
    /// Time slot
    pub time_slot: String,
    /// Number of participants
    pub personnel: i32,
    /// Total price
    pub price: i64,
    /// Effective status including derived completion
    pub status: ReservationStatus,
    /// Payment state derived from payment rows
    pub payment_status: DerivedPaymentStatus,
    /// Latest payment, if any
    pub payment: Option<PaymentView>,
    /// Most recent cancellation reason, if any
    pub cancel_reason: Option<String>,
    /// When the reservation was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the reservation was cancelled, if it was
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn reservation_view(
    db: &DatabaseConnection,
    res: &reservation_entity::Model,
) -> Result<ReservationView> {
    let payment_status = reservation::payment_status_for(db, res).await?;
    let latest = payment::latest_payment_for(db, SourceType::Reservation, res.id).await?;
    let trail = reservation::audit_trail(db, res.id).await?;
    let cancel_reason = trail
        .iter()
        .rev()
        .find(|e| e.kind == "user_cancel" || e.kind == "system_cancel")
        .map(|e| e.detail.clone());

    Ok(ReservationView {
        booking_id: res.id.to_string(),
        program_id: res.program_id.to_string(),
        user_id: res.user_id.to_string(),
        date: res.res_date,
        time_slot: res.time_slot.clone(),
        personnel: res.personnel,
        price: res.total_price,
        status: reservation::effective_status(res, payment_status, chrono::Utc::now().date_naive()),
        payment_status,
        payment: latest.map(PaymentView::from),
        cancel_reason,
        created_at: res.created_at,
        cancelled_at: res.cancelled_at,
    })
}

/// Order line item as shown to clients.
#[derive(Clone, Debug, Serialize)]
pub struct OrderItemView {
    /// Catalog product id snapshot
    pub product_id: String,
    /// Product title snapshot
    pub title: String,
    /// Product image snapshot
    pub image: Option<String>,
    /// Selected option id, if any
    pub option_id: Option<String>,
    /// Selected option name, if any
    pub option_name: Option<String>,
    /// Unit price snapshot
    pub unit_price: i64,
    /// Ordered quantity
    pub quantity: i32,
}

impl From<order_item::Model> for OrderItemView {
    fn from(i: order_item::Model) -> Self {
        Self {
            product_id: i.product_id,
            title: i.product_title,
            image: i.product_image,
            option_id: i.option_id,
            option_name: i.option_name,
            unit_price: i.unit_price,
            quantity: i.quantity,
        }
    }
}

/// Order details as shown to clients.
#[derive(Clone, Debug, Serialize)]
pub struct OrderView {
    /// External order code
    pub order_code: String,
    /// Order status string
    pub status: String,
    /// Total amount
    pub total_amount: i64,
    /// Line items
    pub items: Vec<OrderItemView>,
    /// Latest payment, if any
    pub payment: Option<PaymentView>,
    /// When the order was created
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// When the order was cancelled, if it was
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn order_view(
    db: &DatabaseConnection,
    order: &order_entity::Model,
    items: Vec<order_item::Model>,
) -> Result<OrderView> {
    let latest = payment::latest_payment_for(db, SourceType::Order, order.id).await?;
    Ok(OrderView {
        order_code: order.order_code.clone(),
        status: order.status.clone(),
        total_amount: order.total_amount,
        items: items.into_iter().map(OrderItemView::from).collect(),
        payment: latest.map(PaymentView::from),
        created_at: order.created_at,
        cancelled_at: order.cancelled_at,
    })
}

/// Refund outcome as shown to clients.
#[derive(Clone, Debug, Serialize)]
pub struct RefundView {
    /// External order code
    pub order_code: String,
    /// New order status string
    pub status: String,
    /// Points clawed back by the refund
    pub refunded_points: i64,
}

/// Point balance payload.
#[derive(Clone, Debug, Serialize)]
pub struct PointBalanceView {
    /// Current balance
    pub points: i64,
}

/// One ledger entry as shown to clients.
#[derive(Clone, Debug, Serialize)]
pub struct PointTransactionView {
    /// Ledger row id
    pub id: i64,
    /// `"EARNED"` or `"REFUNDED"`
    pub kind: String,
    /// Signed amount
    pub amount: i64,
    /// Balance snapshot after the transaction
    pub balance_after: i64,
    /// `"RESERVATION"` or `"ORDER"`
    pub source_type: String,
    /// Source row id
    pub source_id: i64,
    /// Description
    pub description: String,
    /// Expiry of earned points, if applicable
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When the transaction was recorded
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Paginated point history payload.
#[derive(Clone, Debug, Serialize)]
pub struct PointHistoryView {
    /// The requested page, newest first
    pub transactions: Vec<PointTransactionView>,
    /// Page number (1-based)
    pub page: u64,
    /// Page size
    pub limit: u64,
    /// Total number of ledger rows
    pub total: u64,
}

/// Creates a reservation. `POST reservation.create`.
pub async fn create_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewReservation,
) -> ApiResponse<ReservationView> {
    match reservation::create_reservation(db, user_id, input).await {
        Ok(res) => match reservation_view(db, &res).await {
            Ok(view) => ApiResponse::ok(view),
            Err(err) => failure(&err),
        },
        Err(err) => failure(&err),
    }
}

/// Pays for a reservation. `POST reservation.pay`.
///
/// A deferred-validation cancellation is a failure-shaped response that
/// still carries the cancelled snapshot in `data`.
pub async fn pay_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    reservation_id: i64,
    method: &str,
    buyer: &Buyer,
) -> ApiResponse<ReservationView> {
    match reservation::pay_reservation(db, user_id, reservation_id, method, buyer).await {
        Ok(ReservationPayment::Confirmed { reservation, .. }) => {
            match reservation_view(db, &reservation).await {
                Ok(view) => {
                    ApiResponse::ok_with_message("reservation confirmed and payment completed", view)
                }
                Err(err) => failure(&err),
            }
        }
        Ok(ReservationPayment::CancelledByValidation {
            reservation,
            reason,
        }) => match reservation_view(db, &reservation).await {
            Ok(view) => ApiResponse::fail_with_data(reason, view),
            Err(err) => failure(&err),
        },
        Err(err) => failure(&err),
    }
}

/// Cancels a reservation. `POST reservation.cancel`.
pub async fn cancel_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    reservation_id: i64,
    reason: Option<&str>,
) -> ApiResponse<ReservationView> {
    match reservation::cancel_reservation(db, user_id, reservation_id, reason).await {
        Ok(res) => match reservation_view(db, &res).await {
            Ok(view) => ApiResponse::ok(view),
            Err(err) => failure(&err),
        },
        Err(err) => failure(&err),
    }
}

/// Creates an order. `POST order.create`.
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i64,
    items: Vec<NewOrderItem>,
    amount: i64,
    buyer: &Buyer,
) -> ApiResponse<OrderView> {
    match order::create_order(db, user_id, items, amount, buyer).await {
        Ok(created) => match order_view(db, &created.order, created.items).await {
            Ok(view) => ApiResponse::ok(view),
            Err(err) => failure(&err),
        },
        Err(err) => failure(&err),
    }
}

/// Pays for an order. `POST order.pay`.
pub async fn pay_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
    method: &str,
    buyer: &Buyer,
) -> ApiResponse<PaymentView> {
    match order::pay_order(db, user_id, order_code, method, buyer).await {
        Ok((_, payment)) => {
            ApiResponse::ok_with_message("payment completed", PaymentView::from(payment))
        }
        Err(err) => failure(&err),
    }
}

/// Cancels an order. `POST order.cancel`.
pub async fn cancel_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
) -> ApiResponse<OrderView> {
    match order::cancel_order(db, user_id, order_code).await {
        Ok(cancelled) => match order::find_order(db, user_id, &cancelled.order_code).await {
            Ok(found) => match order_view(db, &found.order, found.items).await {
                Ok(view) => ApiResponse::ok_with_message("order cancelled", view),
                Err(err) => failure(&err),
            },
            Err(err) => failure(&err),
        },
        Err(err) => failure(&err),
    }
}

/// Refunds an order. `POST order.refund`.
pub async fn refund_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_code: &str,
    reason: Option<&str>,
) -> ApiResponse<RefundView> {
    match order::refund_order(db, user_id, order_code, reason).await {
        Ok(refund) => ApiResponse::ok_with_message(
            "refund completed",
            RefundView {
                order_code: refund.order.order_code,
                status: refund.order.status,
                refunded_points: refund.refunded_points,
            },
        ),
        Err(err) => failure(&err),
    }
}

/// Current point balance. `GET points`.
pub async fn my_points(db: &DatabaseConnection, user_id: i64) -> ApiResponse<PointBalanceView> {
    match points::balance(db, user_id).await {
        Ok(points) => ApiResponse::ok(PointBalanceView { points }),
        Err(err) => failure(&err),
    }
}

/// Paginated point history. `GET points/history`.
pub async fn point_history(
    db: &DatabaseConnection,
    user_id: i64,
    page: u64,
    limit: u64,
) -> ApiResponse<PointHistoryView> {
    match points::history(db, user_id, page, limit).await {
        Ok((rows, total)) => ApiResponse::ok(PointHistoryView {
            transactions: rows
                .into_iter()
                .map(|t| PointTransactionView {
                    id: t.id,
                    kind: t.kind,
                    amount: t.amount,
                    balance_after: t.balance_after,
                    source_type: t.source_type,
                    source_id: t.source_id,
                    description: t.description,
                    expires_at: t.expires_at,
                    created_at: t.created_at,
                })
                .collect(),
            page,
            limit,
            total,
        }),
        Err(err) => failure(&err),
    }
}
