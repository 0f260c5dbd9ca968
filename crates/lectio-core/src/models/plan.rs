//! Plan model
//!
//! Plans define what a student buys: a per-cycle price and the cycle length
//! (duration + unit). A plan scoped to a branch is only bookable there; a
//! plan with no branch is library-global.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Billing cycle length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    /// Cycle length counted in calendar days
    Days,
    /// Cycle length counted in weeks (7-day blocks)
    Weeks,
    /// Cycle length counted in calendar months
    #[default]
    Months,
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Days => write!(f, "days"),
            DurationUnit::Weeks => write!(f, "weeks"),
            DurationUnit::Months => write!(f, "months"),
        }
    }
}

impl DurationUnit {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "days" | "day" => Some(DurationUnit::Days),
            "weeks" | "week" => Some(DurationUnit::Weeks),
            "months" | "month" => Some(DurationUnit::Months),
            _ => None,
        }
    }
}

/// Plan entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan ID
    pub id: i32,

    /// Branch this plan is restricted to; None = available at every branch
    pub branch_id: Option<i32>,

    /// Human-readable plan name (e.g., "Mensual Sala Silenciosa")
    pub name: String,

    /// Price per billing cycle
    pub price: Decimal,

    /// Cycle length value
    pub duration: i32,

    /// Cycle length unit
    pub duration_unit: DurationUnit,

    /// Whether the plan entitles the student to a locker
    pub includes_locker: bool,

    /// Whether this plan is active/selectable
    pub enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Check if plan is valid for use
    pub fn is_active(&self) -> bool {
        self.enabled
    }

    /// Whether the plan bills in calendar months
    pub fn is_monthly(&self) -> bool {
        matches!(self.duration_unit, DurationUnit::Months)
    }

    /// Whether the plan can be booked at the given branch
    pub fn available_at(&self, branch_id: i32) -> bool {
        self.branch_id.is_none() || self.branch_id == Some(branch_id)
    }

    /// Validate plan configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Plan name cannot be empty".to_string());
        }

        if self.price < Decimal::ZERO {
            return Err("Plan price cannot be negative".to_string());
        }

        if self.duration <= 0 {
            return Err("Plan duration must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_plan(duration: i32, unit: DurationUnit) -> Plan {
        Plan {
            id: 1,
            branch_id: None,
            name: "Test Plan".to_string(),
            price: dec!(1000.00),
            duration,
            duration_unit: unit,
            includes_locker: false,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_monthly_plan_validation() {
        let plan = create_test_plan(1, DurationUnit::Months);
        assert!(plan.validate().is_ok());
        assert!(plan.is_monthly());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let plan = create_test_plan(0, DurationUnit::Days);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut plan = create_test_plan(1, DurationUnit::Months);
        plan.price = dec!(-10.00);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_branch_scoping() {
        let mut plan = create_test_plan(1, DurationUnit::Months);
        assert!(plan.available_at(3));

        plan.branch_id = Some(2);
        assert!(plan.available_at(2));
        assert!(!plan.available_at(3));
    }

    #[test]
    fn test_duration_unit_parsing() {
        assert_eq!(DurationUnit::from_str("days"), Some(DurationUnit::Days));
        assert_eq!(DurationUnit::from_str("Week"), Some(DurationUnit::Weeks));
        assert_eq!(DurationUnit::from_str("MONTHS"), Some(DurationUnit::Months));
        assert_eq!(DurationUnit::from_str("fortnight"), None);
    }
}
