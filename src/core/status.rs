//! Status vocabulary shared across the lifecycle managers.
//!
//! Statuses are persisted as strings (matching the relational schema) and
//! handled as enums everywhere in the core, so transitions are checked
//! against a closed set instead of ad-hoc string comparisons.

use serde::Serialize;

/// Reservation lifecycle status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Created, awaiting payment
    Pending,
    /// Paid and confirmed
    Confirmed,
    /// Cancelled by the user or by deferred validation
    Cancelled,
    /// Experience date has passed with payment complete (derived, never persisted)
    Completed,
}

impl ReservationStatus {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parses the persisted string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Order lifecycle status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Created, awaiting payment
    Pending,
    /// Paid
    Paid,
    /// Cancelled after payment, prior to fulfillment
    Cancelled,
    /// Refunded
    Refunded,
}

impl OrderStatus {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Parses the persisted string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            "REFUNDED" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// Payment row status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Successful payment
    Paid,
    /// Payment reversed by a refund
    Refunded,
}

impl PaymentStatus {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Refunded => "REFUNDED",
        }
    }
}

/// Payment state of a target as derived from its payment rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DerivedPaymentStatus {
    /// No payment recorded
    Unpaid,
    /// A successful payment exists
    Paid,
    /// The payment was refunded
    Refunded,
}

/// Kind of target a payment or point transaction refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceType {
    /// A farm experience reservation
    Reservation,
    /// A product store order
    Order,
}

impl SourceType {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reservation => "RESERVATION",
            Self::Order => "ORDER",
        }
    }
}

/// Kind of a point ledger entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PointKind {
    /// Accrual on a successful payment
    Earned,
    /// Clawback on a refund
    Refunded,
}

impl PointKind {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earned => "EARNED",
            Self::Refunded => "REFUNDED",
        }
    }
}

/// Kind of a reservation audit event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// Payment recorded against the reservation
    Payment,
    /// Cancellation requested by the user
    UserCancel,
    /// Cancellation applied by deferred validation
    SystemCancel,
    /// Simulated payment failure recorded without a status change
    PaymentFailed,
}

impl AuditKind {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::UserCancel => "user_cancel",
            Self::SystemCancel => "system_cancel",
            Self::PaymentFailed => "payment_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_status_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Completed,
        ] {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("unknown"), None);
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("paid"), None);
    }
}
