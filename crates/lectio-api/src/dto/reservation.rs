//! Reservation DTOs

use chrono::{DateTime, Utc};
use lectio_core::models::Reservation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::common::PaginationParams;

/// Reservation list query
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReservationFilterParams {
    /// Pagination
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,

    /// Student whose reservations to list
    // Flattened query structs buffer every value as a string, so the id
    // needs the same lenient parsing as the pagination fields.
    #[serde(deserialize_with = "deserialize_i32_from_string")]
    pub student_id: i32,
}

/// Deserialize an i32 from either a string or a number
fn deserialize_i32_from_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct I32OrStringVisitor;

    impl<'de> Visitor<'de> for I32OrStringVisitor {
        type Value = i32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<i32, E>
        where
            E: de::Error,
        {
            i32::try_from(value).map_err(de::Error::custom)
        }

        fn visit_u64<E>(self, value: u64) -> Result<i32, E>
        where
            E: de::Error,
        {
            i32::try_from(value).map_err(de::Error::custom)
        }

        fn visit_str<E>(self, value: &str) -> Result<i32, E>
        where
            E: de::Error,
        {
            value.parse::<i32>().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(I32OrStringVisitor)
}

/// Reservation response
#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    /// Reservation id
    pub id: Uuid,
    /// Booking student
    pub student_id: i32,
    /// Branch of the booked resources
    pub branch_id: i32,
    /// Plan booked under
    pub plan_id: i32,
    /// Booked seat, if any
    pub seat_id: Option<i32>,
    /// Booked locker, if any
    pub locker_id: Option<i32>,
    /// Current status
    pub status: String,
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
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        ReservationResponse {
            id: reservation.id,
            student_id: reservation.student_id,
            branch_id: reservation.branch_id,
            plan_id: reservation.plan_id,
            seat_id: reservation.seat_id,
            locker_id: reservation.locker_id,
            status: reservation.status.to_string(),
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            amount: reservation.amount,
            has_locker: reservation.has_locker,
            created_at: reservation.created_at,
        }
    }
}
