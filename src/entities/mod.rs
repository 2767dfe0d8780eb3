//! `SeaORM` entity definitions for the relational ledger.
//!
//! The schema is the invariant surface of the whole engine: at most one
//! `PAID` payment per target, append-only point transactions whose
//! `balance_after` snapshots the user balance, and immutable order item
//! price snapshots.

/// Append-only audit events attached to reservations
pub mod audit_event;
/// Orders for the product store
pub mod order;
/// Immutable order line item snapshots
pub mod order_item;
/// Payment records for reservations and orders
pub mod payment;
/// Append-only loyalty point ledger
pub mod point_transaction;
/// Farm experience program definitions (read-only to the core)
pub mod program;
/// Reservations for farm experience programs
pub mod reservation;
/// User accounts and their point balances
pub mod user;

pub use audit_event::Entity as AuditEvent;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use payment::Entity as Payment;
pub use point_transaction::Entity as PointTransaction;
pub use program::Entity as Program;
pub use reservation::Entity as Reservation;
pub use user::Entity as User;
