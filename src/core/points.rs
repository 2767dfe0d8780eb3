//! Point ledger - Accrual and clawback of loyalty points.
//!
//! Every balance change goes through an atomic database-level update
//! (`UPDATE users SET points = points + ? WHERE id = ?`) followed by a
//! re-read, and is mirrored by an append-only `point_transactions` row
//! whose `balance_after` snapshots the resulting balance. Callers are
//! expected to run these functions inside an open database transaction so
//! the balance mutation and the ledger row commit together with the
//! payment or refund that caused them.

use crate::{
    core::status::{PointKind, SourceType},
    entities::{User, point_transaction, user},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};

/// Share of the paid amount accrued as points, in percent.
pub const EARN_RATE_PERCENT: i64 = 5;

/// Earned points expire this many days after accrual.
pub const EXPIRY_DAYS: i64 = 365;

/// Points earned for a paid amount: integer floor of 5%.
#[must_use]
pub const fn earned_for(amount: i64) -> i64 {
    amount * EARN_RATE_PERCENT / 100
}

/// Atomically adjusts a user's balance by `delta` and returns the updated
/// row. Uses a single SQL UPDATE on the balance column rather than
/// read-modify-write, so concurrent adjustments cannot lose updates.
async fn adjust_balance<C>(conn: &C, user_id: i64, delta: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound { entity: "user" })?;

    User::update_many()
        .col_expr(
            user::Column::Points,
            Expr::col(user::Column::Points).add(delta),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await?;

    User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound { entity: "user" })
}

/// Accrues points for a successful payment.
///
/// Computes the floor of 5% of `base_amount`; a zero result is a no-op and
/// produces no ledger row. Otherwise the user's balance is incremented
/// atomically, re-read, and an `EARNED` transaction is appended with a
/// one-year expiry horizon.
pub async fn accrue<C>(
    conn: &C,
    user_id: i64,
    base_amount: i64,
    source_type: SourceType,
    source_id: i64,
) -> Result<Option<point_transaction::Model>>
where
    C: ConnectionTrait,
{
    let earned = earned_for(base_amount);
    if earned <= 0 {
        return Ok(None);
    }

    let user = adjust_balance(conn, user_id, earned).await?;

    let now = chrono::Utc::now();
    let row = point_transaction::ActiveModel {
        user_id: Set(user_id),
        kind: Set(PointKind::Earned.as_str().to_string()),
        amount: Set(earned),
        balance_after: Set(user.points),
        source_type: Set(source_type.as_str().to_string()),
        source_id: Set(source_id),
        description: Set(format!(
            "Payment reward ({EARN_RATE_PERCENT}% of {base_amount})"
        )),
        expires_at: Set(Some(now + chrono::Duration::days(EXPIRY_DAYS))),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(user_id, earned, balance = user.points, "points accrued");

    Ok(Some(row))
}

/// Reverses a previous accrual when the originating payment is refunded.
///
/// Looks up the most recent `EARNED` transaction for the source. If none
/// exists nothing is mutated and 0 is returned. Otherwise the recorded
/// amount (never a recomputed percentage) is deducted from the balance,
/// clamped so the balance cannot go negative even if the points were
/// already spent elsewhere, and a `REFUNDED` row with the negated amount
/// is appended. Returns the reversed amount.
pub async fn claw_back<C>(
    conn: &C,
    user_id: i64,
    source_type: SourceType,
    source_id: i64,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let earned_row = crate::entities::PointTransaction::find()
        .filter(point_transaction::Column::UserId.eq(user_id))
        .filter(point_transaction::Column::Kind.eq(PointKind::Earned.as_str()))
        .filter(point_transaction::Column::SourceType.eq(source_type.as_str()))
        .filter(point_transaction::Column::SourceId.eq(source_id))
        .order_by_desc(point_transaction::Column::Id)
        .one(conn)
        .await?;

    let Some(earned_row) = earned_row else {
        return Ok(0);
    };

    let earned = earned_row.amount;
    let user = User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(Error::NotFound { entity: "user" })?;

    // Clamp: the balance never goes negative
    let deduct = earned.min(user.points);
    let user = if deduct > 0 {
        adjust_balance(conn, user_id, -deduct).await?
    } else {
        user
    };

    let now = chrono::Utc::now();
    point_transaction::ActiveModel {
        user_id: Set(user_id),
        kind: Set(PointKind::Refunded.as_str().to_string()),
        amount: Set(-earned),
        balance_after: Set(user.points),
        source_type: Set(source_type.as_str().to_string()),
        source_id: Set(source_id),
        description: Set(format!("Accrual of {earned} reversed on refund")),
        expires_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(
        user_id,
        clawed_back = earned,
        balance = user.points,
        "points clawed back"
    );

    Ok(earned)
}

/// Current point balance for a user; 0 when the user row does not exist.
pub async fn balance(db: &DatabaseConnection, user_id: i64) -> Result<i64> {
    Ok(User::find_by_id(user_id)
        .one(db)
        .await?
        .map_or(0, |u| u.points))
}

/// Paginated point transaction history, newest first.
/// Returns the page of rows and the total row count.
pub async fn history(
    db: &DatabaseConnection,
    user_id: i64,
    page: u64,
    limit: u64,
) -> Result<(Vec<point_transaction::Model>, u64)> {
    let query = crate::entities::PointTransaction::find()
        .filter(point_transaction::Column::UserId.eq(user_id));

    let total = query.clone().count(db).await?;
    let rows = query
        .order_by_desc(point_transaction::Column::Id)
        .offset(page.saturating_sub(1) * limit)
        .limit(limit)
        .all(db)
        .await?;

    Ok((rows, total))
}
