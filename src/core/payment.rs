//! Payment processor - The single place a payment can be recorded.
//!
//! Both lifecycle managers funnel through [`process_payment`], so the
//! at-most-one-`PAID`-payment-per-target invariant is enforced once: the
//! target's status must permit payment, no `PAID` row may already
//! reference it, and the status flip is a guarded single-row UPDATE whose
//! affected-row count detects a concurrent pay attempt that won the race.
//! Everything runs on the caller's open transaction; any failure aborts
//! the whole mutation.

use crate::{
    core::{
        points,
        status::{OrderStatus, PaymentStatus, ReservationStatus, SourceType},
    },
    entities::{order, payment, reservation},
    errors::{Error, Result},
};
use rand::Rng;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Buyer contact details captured at payment time.
#[derive(Clone, Debug, Default)]
pub struct Buyer {
    /// Buyer name
    pub name: Option<String>,
    /// Buyer phone number
    pub phone: Option<String>,
    /// Buyer email address
    pub email: Option<String>,
}

/// A reservation or an order, as seen by the payment processor.
///
/// The two target kinds share one payment invariant but have their own
/// payable status and status flip; implementing this seam keeps the
/// processor single and generic instead of duplicated per kind.
#[allow(async_fn_in_trait)]
pub trait PaymentTarget {
    /// Which kind of target this is.
    fn source_type(&self) -> SourceType;

    /// Internal row id of the target.
    fn target_id(&self) -> i64;

    /// The user who pays and receives the point accrual.
    fn payer_id(&self) -> i64;

    /// The amount due, in whole currency units.
    fn amount_due(&self) -> i64;

    /// Rejects with [`Error::InvalidState`] unless the loaded status
    /// permits payment.
    fn assert_payable(&self) -> Result<()>;

    /// Flips the target into its paid status with a guarded UPDATE
    /// conditioned on the payable status. Zero affected rows means a
    /// concurrent mutation won the race and the transaction must abort.
    async fn mark_paid<C: ConnectionTrait>(&self, conn: &C) -> Result<()>;
}

impl PaymentTarget for reservation::Model {
    fn source_type(&self) -> SourceType {
        SourceType::Reservation
    }

    fn target_id(&self) -> i64 {
        self.id
    }

    fn payer_id(&self) -> i64 {
        self.user_id
    }

    fn amount_due(&self) -> i64 {
        self.total_price
    }

    fn assert_payable(&self) -> Result<()> {
        if self.status == ReservationStatus::Pending.as_str() {
            Ok(())
        } else {
            Err(Error::InvalidState {
                current: self.status.clone(),
            })
        }
    }

    async fn mark_paid<C: ConnectionTrait>(&self, conn: &C) -> Result<()> {
        use sea_orm::sea_query::Expr;

        let result = crate::entities::Reservation::update_many()
            .col_expr(
                reservation::Column::Status,
                Expr::value(ReservationStatus::Confirmed.as_str()),
            )
            .filter(reservation::Column::Id.eq(self.id))
            .filter(reservation::Column::Status.eq(ReservationStatus::Pending.as_str()))
            .exec(conn)
            .await?;

        if result.rows_affected == 1 {
            Ok(())
        } else {
            Err(Error::conflict("reservation was modified concurrently"))
        }
    }
}

impl PaymentTarget for order::Model {
    fn source_type(&self) -> SourceType {
        SourceType::Order
    }

    fn target_id(&self) -> i64 {
        self.id
    }

    fn payer_id(&self) -> i64 {
        self.user_id
    }

    fn amount_due(&self) -> i64 {
        self.total_amount
    }

    fn assert_payable(&self) -> Result<()> {
        if self.status == OrderStatus::Pending.as_str() {
            Ok(())
        } else {
            Err(Error::InvalidState {
                current: self.status.clone(),
            })
        }
    }

    async fn mark_paid<C: ConnectionTrait>(&self, conn: &C) -> Result<()> {
        use sea_orm::sea_query::Expr;

        let result = crate::entities::Order::update_many()
            .col_expr(
                order::Column::Status,
                Expr::value(OrderStatus::Paid.as_str()),
            )
            .filter(order::Column::Id.eq(self.id))
            .filter(order::Column::Status.eq(OrderStatus::Pending.as_str()))
            .exec(conn)
            .await?;

        if result.rows_affected == 1 {
            Ok(())
        } else {
            Err(Error::conflict("order was modified concurrently"))
        }
    }
}

/// Records a payment against a target inside the caller's transaction.
///
/// Asserts the target is payable and carries no `PAID` payment row yet,
/// inserts the payment with a fresh external code, flips the target status
/// under guard, and accrues points for the payer. Returns the inserted
/// payment row.
pub async fn process_payment<C, T>(
    conn: &C,
    target: &T,
    method: &str,
    buyer: &Buyer,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
    T: PaymentTarget,
{
    target.assert_payable()?;

    if paid_payment_for(conn, target.source_type(), target.target_id())
        .await?
        .is_some()
    {
        return Err(Error::conflict("target has already been paid"));
    }

    let (reservation_id, order_id) = match target.source_type() {
        SourceType::Reservation => (Some(target.target_id()), None),
        SourceType::Order => (None, Some(target.target_id())),
    };

    let now = chrono::Utc::now();
    let row = payment::ActiveModel {
        payment_type: Set(target.source_type().as_str().to_string()),
        reservation_id: Set(reservation_id),
        order_id: Set(order_id),
        payment_code: Set(generate_payment_code()),
        method: Set(method.to_string()),
        amount: Set(target.amount_due()),
        status: Set(PaymentStatus::Paid.as_str().to_string()),
        buyer_name: Set(buyer.name.clone()),
        buyer_phone: Set(buyer.phone.clone()),
        buyer_email: Set(buyer.email.clone()),
        paid_at: Set(now),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    target.mark_paid(conn).await?;

    points::accrue(
        conn,
        target.payer_id(),
        target.amount_due(),
        target.source_type(),
        target.target_id(),
    )
    .await?;

    tracing::info!(
        target_type = target.source_type().as_str(),
        target_id = target.target_id(),
        amount = target.amount_due(),
        payment_code = %row.payment_code,
        "payment recorded"
    );

    Ok(row)
}

/// The most recent payment row for a target, regardless of status.
pub async fn latest_payment_for<C>(
    conn: &C,
    source_type: SourceType,
    target_id: i64,
) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    payment_query(source_type, target_id)
        .order_by_desc(payment::Column::Id)
        .one(conn)
        .await
        .map_err(Into::into)
}

/// The most recent `PAID` payment row for a target, if any.
pub async fn paid_payment_for<C>(
    conn: &C,
    source_type: SourceType,
    target_id: i64,
) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    payment_query(source_type, target_id)
        .filter(payment::Column::Status.eq(PaymentStatus::Paid.as_str()))
        .order_by_desc(payment::Column::Id)
        .one(conn)
        .await
        .map_err(Into::into)
}

fn payment_query(source_type: SourceType, target_id: i64) -> Select<crate::entities::Payment> {
    let query = crate::entities::Payment::find();
    match source_type {
        SourceType::Reservation => query.filter(payment::Column::ReservationId.eq(target_id)),
        SourceType::Order => query.filter(payment::Column::OrderId.eq(target_id)),
    }
}

/// Generates an external payment code, e.g. `PAY-1719223040000-x7k2m9qzt`.
#[must_use]
pub fn generate_payment_code() -> String {
    format!("PAY-{}-{}", chrono::Utc::now().timestamp_millis(), suffix())
}

/// Generates an external order code, e.g. `ORD-1719223040000-h3n8p1wfa`.
#[must_use]
pub fn generate_order_code() -> String {
    format!("ORD-{}-{}", chrono::Utc::now().timestamp_millis(), suffix())
}

fn suffix() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
