//! Payment model
//!
//! One payment funds every reservation row of a booking. Only the first
//! reservation is linked structurally via `reservation_id`; the remaining
//! cycles are associated by having been created in the same transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ReservationStatus;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting gateway confirmation
    #[default]
    Pending,
    /// Confirmed (manual/staff entries are recorded completed immediately)
    Completed,
    /// Manual transfer proof uploaded, awaiting staff verification
    PendingVerification,
    /// Gateway rejected or verification failed; terminal
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::PendingVerification => write!(f, "pending_verification"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "pending_verification" => Some(PaymentStatus::PendingVerification),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    /// Check if this payment can never fund a booking
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, PaymentStatus::Failed)
    }

    /// Status the funded reservations are created with
    ///
    /// A confirmed payment activates its reservations immediately; anything
    /// still awaiting confirmation leaves them pending.
    pub fn reservation_status(&self) -> ReservationStatus {
        match self {
            PaymentStatus::Completed => ReservationStatus::Active,
            _ => ReservationStatus::Pending,
        }
    }
}

/// Payment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Paying student
    pub student_id: i32,

    /// Branch the booking was made at
    pub branch_id: i32,

    /// Total payable for all cycles
    pub amount: Decimal,

    /// Discount applied to reach `amount`
    pub discount_amount: Decimal,

    /// Current status
    pub status: PaymentStatus,

    /// Generated unique invoice number
    pub invoice_no: String,

    /// First reservation of the funded booking
    pub reservation_id: Option<Uuid>,

    /// Payment method / gateway provider, recorded verbatim
    pub method: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Generate a unique invoice number: `{prefix}-{YYYYMMDD}-{6 hex chars}`
    pub fn generate_invoice_no(prefix: &str) -> String {
        let date = Utc::now().format("%Y%m%d");
        let token = Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", prefix, date, token[..6].to_uppercase())
    }
}
