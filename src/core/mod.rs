//! Core business logic - the transactional payment and loyalty point engine.
//!
//! Each module owns one lifecycle: reservations (with deferred payment-time
//! validation), orders, the shared payment processor, and the point ledger.
//! Every multi-step mutation runs inside a single database transaction and
//! either commits completely or not at all.

/// Order lifecycle manager
pub mod order;
/// Payment processor shared by both target kinds
pub mod payment;
/// Loyalty point ledger (accrual and clawback)
pub mod points;
/// Reservation lifecycle manager
pub mod reservation;
/// Status vocabulary persisted as strings
pub mod status;
