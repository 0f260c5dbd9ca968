//! Fee model
//!
//! Add-on fees selected at booking time (registration, locker deposit, card
//! issuance). Like plans, a fee scoped to a branch applies only there; a fee
//! with no branch is library-global.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee billing cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeeBillType {
    /// Charged once per billing cycle
    #[default]
    OneTime,
    /// Charged per calendar month of the cycle (scales with monthly plans)
    Monthly,
}

impl fmt::Display for FeeBillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeBillType::OneTime => write!(f, "one_time"),
            FeeBillType::Monthly => write!(f, "monthly"),
        }
    }
}

impl FeeBillType {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "one_time" => Some(FeeBillType::OneTime),
            "monthly" => Some(FeeBillType::Monthly),
            _ => None,
        }
    }
}

/// Add-on fee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fee {
    /// Unique fee ID
    pub id: i32,

    /// Branch this fee is restricted to; None = applies at every branch
    pub branch_id: Option<i32>,

    /// Human-readable fee name
    pub name: String,

    /// Fee amount
    pub amount: Decimal,

    /// Billing cadence
    pub bill_type: FeeBillType,

    /// Whether this fee is selectable
    pub enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Fee {
    /// Whether the fee can be applied at the given branch
    pub fn applies_at(&self, branch_id: i32) -> bool {
        self.branch_id.is_none() || self.branch_id == Some(branch_id)
    }
}
