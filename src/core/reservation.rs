//! Reservation lifecycle - Creation, deferred-validation payment, cancellation.
//!
//! The distinctive behavior lives in [`pay_reservation`]: business
//! constraints are re-checked at payment time against the current program
//! state, not the state at creation time. A failed re-validation is not an
//! error but a first-class outcome that auto-cancels the reservation, so
//! the result is a tagged [`ReservationPayment`] the caller cannot ignore.
//! All multi-step mutations run in one database transaction.

use crate::{
    core::{
        payment::{self, Buyer, PaymentTarget},
        status::{AuditKind, DerivedPaymentStatus, PaymentStatus, ReservationStatus, SourceType},
    },
    entities::{AuditEvent, Program, Reservation, audit_event, program, reservation},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};

/// Input for creating a reservation.
#[derive(Clone, Debug)]
pub struct NewReservation {
    /// Program to reserve
    pub program_id: i64,
    /// Experience date
    pub res_date: NaiveDate,
    /// Time slot, e.g. `"10:00"`
    pub time_slot: String,
    /// Number of participants
    pub personnel: i32,
    /// Total price in whole currency units
    pub total_price: i64,
}

/// Outcome of a reservation payment attempt.
///
/// Deferred validation failure is a successful state transition (to
/// `cancelled`) that is returned alongside a failure-shaped message, not a
/// thrown error.
#[derive(Clone, Debug)]
pub enum ReservationPayment {
    /// Validation held; the reservation is confirmed and paid.
    Confirmed {
        /// The confirmed reservation
        reservation: reservation::Model,
        /// The recorded payment
        payment: crate::entities::payment::Model,
    },
    /// Validation failed; the reservation was auto-cancelled.
    CancelledByValidation {
        /// The cancelled reservation snapshot
        reservation: reservation::Model,
        /// Why validation failed
        reason: String,
    },
}

/// Creates a `pending` reservation after validating input, program
/// existence, personnel bounds and slot uniqueness.
pub async fn create_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    input: NewReservation,
) -> Result<reservation::Model> {
    if input.time_slot.trim().is_empty() {
        return Err(Error::validation("time slot is required"));
    }
    if input.personnel < 1 {
        return Err(Error::validation("at least one participant is required"));
    }
    if input.total_price <= 0 {
        return Err(Error::validation("price must be positive"));
    }

    let txn = db.begin().await?;

    let program = Program::find_by_id(input.program_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound { entity: "program" })?;

    check_personnel_bounds(&program, input.personnel)?;

    let duplicate = Reservation::find()
        .filter(reservation::Column::UserId.eq(user_id))
        .filter(reservation::Column::ProgramId.eq(input.program_id))
        .filter(reservation::Column::ResDate.eq(input.res_date))
        .filter(reservation::Column::TimeSlot.eq(input.time_slot.trim()))
        .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled.as_str()))
        .one(&txn)
        .await?;

    if duplicate.is_some() {
        return Err(Error::conflict(
            "a reservation already exists for this time slot",
        ));
    }

    let created = reservation::ActiveModel {
        user_id: Set(user_id),
        program_id: Set(input.program_id),
        res_date: Set(input.res_date),
        time_slot: Set(input.time_slot.trim().to_string()),
        personnel: Set(input.personnel),
        total_price: Set(input.total_price),
        status: Set(ReservationStatus::Pending.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        cancelled_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        reservation_id = created.id,
        user_id,
        program_id = input.program_id,
        "reservation created"
    );

    Ok(created)
}

/// Pays for a `pending` reservation owned by the caller.
///
/// Re-validates the business constraints against current program state
/// first. On failure the reservation transitions `pending -> cancelled`
/// with a system-authored audit event and the cancelled snapshot is
/// returned; no payment row or point accrual happens. On success the
/// payment processor records the payment, flips the status to `confirmed`
/// and accrues points. A reservation not in `pending` is rejected with
/// [`Error::InvalidState`] carrying the current status.
pub async fn pay_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    reservation_id: i64,
    method: &str,
    buyer: &Buyer,
) -> Result<ReservationPayment> {
    let txn = db.begin().await?;

    let target = Reservation::find_by_id(reservation_id)
        .filter(reservation::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "reservation",
        })?;

    target.assert_payable()?;

    if let Some(reason) = revalidate(&txn, &target).await? {
        let now = chrono::Utc::now();
        let mut cancelling: reservation::ActiveModel = target.into();
        cancelling.status = Set(ReservationStatus::Cancelled.as_str().to_string());
        cancelling.cancelled_at = Set(Some(now));
        let cancelled = cancelling.update(&txn).await?;

        record_event(&txn, reservation_id, AuditKind::SystemCancel, &reason).await?;
        txn.commit().await?;

        tracing::warn!(
            reservation_id,
            user_id,
            %reason,
            "reservation cancelled by payment-time validation"
        );

        return Ok(ReservationPayment::CancelledByValidation {
            reservation: cancelled,
            reason,
        });
    }

    let paid = payment::process_payment(&txn, &target, method, buyer).await?;
    record_event(
        &txn,
        reservation_id,
        AuditKind::Payment,
        &format!("paid {} via {} ({})", paid.amount, method, paid.payment_code),
    )
    .await?;

    let confirmed = Reservation::find_by_id(reservation_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "reservation",
        })?;

    txn.commit().await?;

    Ok(ReservationPayment::Confirmed {
        reservation: confirmed,
        payment: paid,
    })
}

/// Cancels a reservation at the user's request.
///
/// Allowed from `pending` or `confirmed`. A `cancelled` reservation is
/// rejected with [`Error::AlreadyCancelled`] and a `completed` one with
/// [`Error::InvalidState`].
pub async fn cancel_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    reservation_id: i64,
    reason: Option<&str>,
) -> Result<reservation::Model> {
    let txn = db.begin().await?;

    let target = Reservation::find_by_id(reservation_id)
        .filter(reservation::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "reservation",
        })?;

    match ReservationStatus::parse(&target.status) {
        Some(ReservationStatus::Cancelled) => return Err(Error::AlreadyCancelled),
        Some(ReservationStatus::Completed) => {
            return Err(Error::InvalidState {
                current: target.status,
            });
        }
        _ => {}
    }

    let mut cancelling: reservation::ActiveModel = target.into();
    cancelling.status = Set(ReservationStatus::Cancelled.as_str().to_string());
    cancelling.cancelled_at = Set(Some(chrono::Utc::now()));
    let cancelled = cancelling.update(&txn).await?;

    record_event(
        &txn,
        reservation_id,
        AuditKind::UserCancel,
        reason.unwrap_or("cancelled by user"),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(reservation_id, user_id, "reservation cancelled by user");

    Ok(cancelled)
}

/// Records a simulated payment failure as an audit event without changing
/// the reservation status.
pub async fn record_payment_failure(
    db: &DatabaseConnection,
    user_id: i64,
    reservation_id: i64,
) -> Result<reservation::Model> {
    let target = Reservation::find_by_id(reservation_id)
        .filter(reservation::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "reservation",
        })?;

    record_event(
        db,
        reservation_id,
        AuditKind::PaymentFailed,
        "payment simulation failed",
    )
    .await?;

    Ok(target)
}

/// Finds a reservation owned by the caller.
pub async fn find_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    reservation_id: i64,
) -> Result<reservation::Model> {
    Reservation::find_by_id(reservation_id)
        .filter(reservation::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "reservation",
        })
}

/// All reservations of a user, newest first.
pub async fn list_reservations(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<reservation::Model>> {
    Reservation::find()
        .filter(reservation::Column::UserId.eq(user_id))
        .order_by_desc(reservation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The append-only audit trail of a reservation, oldest first.
pub async fn audit_trail(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<Vec<audit_event::Model>> {
    AuditEvent::find()
        .filter(audit_event::Column::ReservationId.eq(reservation_id))
        .order_by_asc(audit_event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Payment state of a reservation derived from its payment rows.
pub async fn payment_status_for<C>(
    conn: &C,
    res: &reservation::Model,
) -> Result<DerivedPaymentStatus>
where
    C: ConnectionTrait,
{
    let latest = payment::latest_payment_for(conn, SourceType::Reservation, res.id).await?;
    Ok(match latest {
        Some(p) if p.status == PaymentStatus::Refunded.as_str() => DerivedPaymentStatus::Refunded,
        Some(p) if p.status == PaymentStatus::Paid.as_str() => DerivedPaymentStatus::Paid,
        _ => DerivedPaymentStatus::Unpaid,
    })
}

/// Read-model status including the derived `completed` state.
///
/// Completion is never persisted: a paid reservation whose date has passed
/// reads as `completed` at query time.
#[must_use]
pub fn effective_status(
    res: &reservation::Model,
    payment_status: DerivedPaymentStatus,
    today: NaiveDate,
) -> ReservationStatus {
    match ReservationStatus::parse(&res.status) {
        Some(ReservationStatus::Confirmed)
            if payment_status == DerivedPaymentStatus::Paid && res.res_date < today =>
        {
            ReservationStatus::Completed
        }
        Some(status) => status,
        None => ReservationStatus::Pending,
    }
}

/// Re-runs the business validation at payment time against current
/// program state. Returns `Ok(None)` when the reservation is still valid,
/// or `Ok(Some(reason))` naming the first violated constraint.
async fn revalidate<C>(conn: &C, res: &reservation::Model) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let Some(program) = Program::find_by_id(res.program_id).one(conn).await? else {
        return Ok(Some("the reserved program no longer exists".to_string()));
    };

    if res.res_date < chrono::Utc::now().date_naive() {
        return Ok(Some("the reservation date has already passed".to_string()));
    }

    if let Err(Error::Validation { message }) = check_personnel_bounds(&program, res.personnel) {
        return Ok(Some(message));
    }

    // Aggregate capacity for the slot, counting other live reservations
    if let Some(max) = program.max_personnel {
        let others = Reservation::find()
            .filter(reservation::Column::ProgramId.eq(res.program_id))
            .filter(reservation::Column::ResDate.eq(res.res_date))
            .filter(reservation::Column::TimeSlot.eq(res.time_slot.clone()))
            .filter(reservation::Column::Status.is_in([
                ReservationStatus::Pending.as_str(),
                ReservationStatus::Confirmed.as_str(),
            ]))
            .filter(reservation::Column::Id.ne(res.id))
            .all(conn)
            .await?;

        let taken: i32 = others.iter().map(|r| r.personnel).sum();
        if taken + res.personnel > max {
            return Ok(Some(format!(
                "no capacity left for this time slot ({} of {} places taken)",
                taken, max
            )));
        }
    }

    let duplicate = Reservation::find()
        .filter(reservation::Column::UserId.eq(res.user_id))
        .filter(reservation::Column::ProgramId.eq(res.program_id))
        .filter(reservation::Column::ResDate.eq(res.res_date))
        .filter(reservation::Column::TimeSlot.eq(res.time_slot.clone()))
        .filter(reservation::Column::Status.ne(ReservationStatus::Cancelled.as_str()))
        .filter(reservation::Column::Id.ne(res.id))
        .one(conn)
        .await?;

    if duplicate.is_some() {
        return Ok(Some(
            "another reservation exists for the same time slot".to_string(),
        ));
    }

    Ok(None)
}

fn check_personnel_bounds(program: &program::Model, personnel: i32) -> Result<()> {
    if let Some(min) = program.min_personnel {
        if personnel < min {
            return Err(Error::validation(format!(
                "at least {min} participants required (requested {personnel})"
            )));
        }
    }
    if let Some(max) = program.max_personnel {
        if personnel > max {
            return Err(Error::validation(format!(
                "at most {max} participants allowed (requested {personnel})"
            )));
        }
    }
    Ok(())
}

async fn record_event<C>(conn: &C, reservation_id: i64, kind: AuditKind, detail: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    audit_event::ActiveModel {
        reservation_id: Set(reservation_id),
        kind: Set(kind.as_str().to_string()),
        detail: Set(detail.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::points;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_reservation_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, Some(2), Some(4)).await?;

        // Empty time slot
        let result = create_reservation(
            &db,
            user.id,
            NewReservation {
                program_id: program.id,
                res_date: tomorrow(),
                time_slot: "  ".to_string(),
                personnel: 2,
                total_price: 10_000,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Zero participants
        let result = create_reservation(
            &db,
            user.id,
            NewReservation {
                program_id: program.id,
                res_date: tomorrow(),
                time_slot: "10:00".to_string(),
                personnel: 0,
                total_price: 10_000,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Non-positive price
        let result = create_reservation(
            &db,
            user.id,
            NewReservation {
                program_id: program.id,
                res_date: tomorrow(),
                time_slot: "10:00".to_string(),
                personnel: 2,
                total_price: 0,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_reservation_program_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;

        let result = create_reservation(
            &db,
            user.id,
            NewReservation {
                program_id: 999,
                res_date: tomorrow(),
                time_slot: "10:00".to_string(),
                personnel: 2,
                total_price: 10_000,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "program" }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_reservation_personnel_bounds() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, Some(2), Some(4)).await?;

        for personnel in [1, 5] {
            let result = create_reservation(
                &db,
                user.id,
                NewReservation {
                    program_id: program.id,
                    res_date: tomorrow(),
                    time_slot: "10:00".to_string(),
                    personnel,
                    total_price: 10_000,
                },
            )
            .await;
            assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_create_reservation_duplicate_slot() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;

        create_test_reservation(&db, user.id, program.id).await?;

        let result = create_test_reservation(&db, user.id, program.id).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        // A cancelled reservation frees the slot
        let first = find_reservation(&db, user.id, 1).await?;
        cancel_reservation(&db, user.id, first.id, None).await?;
        create_test_reservation(&db, user.id, program.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_reservation_confirms_and_accrues() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        let outcome =
            pay_reservation(&db, user.id, res.id, "CARD", &Buyer::default()).await?;

        let ReservationPayment::Confirmed {
            reservation,
            payment,
        } = outcome
        else {
            panic!("expected confirmation");
        };
        assert_eq!(reservation.status, "confirmed");
        assert_eq!(payment.amount, res.total_price);
        assert_eq!(payment.payment_type, "RESERVATION");
        assert_eq!(
            payment_status_for(&db, &reservation).await?,
            DerivedPaymentStatus::Paid
        );
        // 5% of 10,000
        assert_eq!(points::balance(&db, user.id).await?, 500);

        let trail = audit_trail(&db, res.id).await?;
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].kind, "payment");
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_reservation_second_attempt_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        pay_reservation(&db, user.id, res.id, "CARD", &Buyer::default()).await?;

        let result = pay_reservation(&db, user.id, res.id, "CARD", &Buyer::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidState { current } if current == "confirmed"
        ));

        // No duplicate payment or ledger rows
        assert_eq!(crate::entities::Payment::find().count(&db).await?, 1);
        assert_eq!(
            crate::entities::PointTransaction::find().count(&db).await?,
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_reservation_deferred_validation_cancels() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation_with(&db, user.id, program.id, 2, 10_000).await?;

        // The program's capacity is lowered below the reserved personnel
        // after creation but before payment
        set_program_max_personnel(&db, program.id, Some(1)).await?;

        let outcome =
            pay_reservation(&db, user.id, res.id, "CARD", &Buyer::default()).await?;

        let ReservationPayment::CancelledByValidation {
            reservation,
            reason,
        } = outcome
        else {
            panic!("expected validation cancellation");
        };
        assert_eq!(reservation.status, "cancelled");
        assert!(reservation.cancelled_at.is_some());
        assert!(reason.contains("at most 1"));

        // No payment, no points
        assert_eq!(crate::entities::Payment::find().count(&db).await?, 0);
        assert_eq!(points::balance(&db, user.id).await?, 0);

        let trail = audit_trail(&db, res.id).await?;
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].kind, "system_cancel");
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_reservation_slot_capacity_exhausted() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, 0).await?;
        let bob = create_test_user_with_email(&db, "bob@example.com").await?;
        let program = create_test_program(&db, None, Some(4)).await?;

        // Two bookings for the same slot, 3 + 2 > 4
        create_test_reservation_with(&db, alice.id, program.id, 3, 10_000).await?;
        let second = create_test_reservation_with(&db, bob.id, program.id, 2, 10_000).await?;

        let outcome =
            pay_reservation(&db, bob.id, second.id, "CARD", &Buyer::default()).await?;
        assert!(matches!(
            outcome,
            ReservationPayment::CancelledByValidation { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_reservation_not_owned() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let stranger = create_test_user_with_email(&db, "other@example.com").await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        let result = pay_reservation(&db, stranger.id, res.id, "CARD", &Buyer::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "reservation"
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_reservation_paths() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        // Pending reservations may be cancelled
        let cancelled = cancel_reservation(&db, user.id, res.id, Some("changed plans")).await?;
        assert_eq!(cancelled.status, "cancelled");
        assert!(cancelled.cancelled_at.is_some());

        // A second cancellation is rejected
        let result = cancel_reservation(&db, user.id, res.id, None).await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyCancelled));

        let trail = audit_trail(&db, res.id).await?;
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].kind, "user_cancel");
        assert_eq!(trail[0].detail, "changed plans");
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_confirmed_reservation_allowed() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        pay_reservation(&db, user.id, res.id, "CARD", &Buyer::default()).await?;
        let cancelled = cancel_reservation(&db, user.id, res.id, None).await?;
        assert_eq!(cancelled.status, "cancelled");
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_completed_reservation_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        set_reservation_status(&db, res.id, "completed").await?;

        let result = cancel_reservation(&db, user.id, res.id, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidState { current } if current == "completed"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_failure_keeps_status() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        let unchanged = record_payment_failure(&db, user.id, res.id).await?;
        assert_eq!(unchanged.status, "pending");

        let trail = audit_trail(&db, res.id).await?;
        assert_eq!(trail[0].kind, "payment_failed");
        Ok(())
    }

    #[tokio::test]
    async fn test_effective_status_derives_completed() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 0).await?;
        let program = create_test_program(&db, None, Some(4)).await?;
        let res = create_test_reservation(&db, user.id, program.id).await?;

        pay_reservation(&db, user.id, res.id, "CARD", &Buyer::default()).await?;
        let confirmed = find_reservation(&db, user.id, res.id).await?;
        let payment_status = payment_status_for(&db, &confirmed).await?;

        // Before the experience date it reads as confirmed
        assert_eq!(
            effective_status(&confirmed, payment_status, confirmed.res_date),
            ReservationStatus::Confirmed
        );
        // Once the date has passed it reads as completed, without any write
        let day_after = confirmed.res_date + chrono::Duration::days(1);
        assert_eq!(
            effective_status(&confirmed, payment_status, day_after),
            ReservationStatus::Completed
        );
        // An unpaid pending reservation never completes
        let pending = create_test_reservation_at(&db, user.id, program.id, "14:00").await?;
        assert_eq!(
            effective_status(&pending, DerivedPaymentStatus::Unpaid, day_after),
            ReservationStatus::Pending
        );
        Ok(())
    }
}
