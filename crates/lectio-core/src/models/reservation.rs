//! Reservation model
//!
//! One reservation row represents a student's claim on a seat (and
//! optionally a locker) for exactly one billing cycle. A multi-cycle booking
//! creates one row per cycle, all inside one transaction.
//!
//! Invariant: for any fixed seat or locker, reservations with an open status
//! (`pending` or `active`) are pairwise non-overlapping in `[start, end)`.
//! Terminal reservations are excluded and may overlap freely.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, waiting for payment confirmation
    #[default]
    Pending,
    /// Paid and in effect
    Active,
    /// Cancelled by staff before or during its period
    Cancelled,
    /// Ended by time
    Expired,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Active => write!(f, "active"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
            ReservationStatus::Expired => write!(f, "expired"),
        }
    }
}

impl ReservationStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ReservationStatus::Pending),
            "active" => Some(ReservationStatus::Active),
            "cancelled" => Some(ReservationStatus::Cancelled),
            "expired" => Some(ReservationStatus::Expired),
            _ => None,
        }
    }

    /// Check if the reservation still holds its resources
    ///
    /// Open reservations participate in the non-overlap invariant.
    pub fn is_open(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Active)
    }

    /// Check if the reservation is finished
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Booking student
    pub student_id: i32,

    /// Branch of the booked resources
    pub branch_id: i32,

    /// Plan this cycle was booked under
    pub plan_id: i32,

    /// Booked seat, if any
    pub seat_id: Option<i32>,

    /// Booked locker, if any
    pub locker_id: Option<i32>,

    /// Current status
    pub status: ReservationStatus,

    /// Cycle start (inclusive)
    pub start_date: DateTime<Utc>,

    /// Cycle end (exclusive)
    pub end_date: DateTime<Utc>,

    /// This cycle's share of the payment total
    pub amount: Decimal,

    /// Whether a locker is part of this reservation
    pub has_locker: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Half-open interval overlap test against `[start, end)`
    ///
    /// Adjacent periods (this.end == start) do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_date < end && self.end_date > start
    }

    /// Check if the reservation covers the given instant
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at < self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn march_reservation() -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            student_id: 1,
            branch_id: 1,
            plan_id: 1,
            seat_id: Some(10),
            locker_id: None,
            status: ReservationStatus::Active,
            start_date: date(2024, 3, 1),
            end_date: date(2024, 4, 1),
            amount: dec!(1000.00),
            has_locker: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_predicates() {
        assert!(ReservationStatus::Pending.is_open());
        assert!(ReservationStatus::Active.is_open());
        assert!(!ReservationStatus::Cancelled.is_open());
        assert!(!ReservationStatus::Expired.is_open());
        assert!(ReservationStatus::Expired.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            ReservationStatus::from_str("active"),
            Some(ReservationStatus::Active)
        );
        assert_eq!(
            ReservationStatus::from_str("Cancelled"),
            Some(ReservationStatus::Cancelled)
        );
        assert_eq!(ReservationStatus::from_str("done"), None);
    }

    #[test]
    fn test_overlap_inside() {
        let r = march_reservation();
        assert!(r.overlaps(date(2024, 3, 10), date(2024, 3, 20)));
        assert!(r.overlaps(date(2024, 2, 15), date(2024, 3, 15)));
        assert!(r.overlaps(date(2024, 3, 15), date(2024, 4, 15)));
        assert!(r.overlaps(date(2024, 2, 1), date(2024, 5, 1)));
    }

    #[test]
    fn test_adjacent_periods_do_not_overlap() {
        let r = march_reservation();
        assert!(!r.overlaps(date(2024, 4, 1), date(2024, 5, 1)));
        assert!(!r.overlaps(date(2024, 2, 1), date(2024, 3, 1)));
    }

    #[test]
    fn test_covers() {
        let r = march_reservation();
        assert!(r.covers(date(2024, 3, 1)));
        assert!(r.covers(date(2024, 3, 31)));
        assert!(!r.covers(date(2024, 4, 1)));
    }
}
