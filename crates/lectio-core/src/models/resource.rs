//! Resource model
//!
//! A resource is any time-exclusive allocation unit at a branch. Seats and
//! lockers are distinguished only for display and validation; conflict
//! detection treats them identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of bookable resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Reading seat
    #[default]
    Seat,
    /// Storage locker
    Locker,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Seat => write!(f, "seat"),
            ResourceKind::Locker => write!(f, "locker"),
        }
    }
}

impl ResourceKind {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "seat" => Some(ResourceKind::Seat),
            "locker" => Some(ResourceKind::Locker),
            _ => None,
        }
    }
}

/// Bookable resource entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource ID
    pub id: i32,

    /// Owning branch
    pub branch_id: i32,

    /// Resource kind
    pub kind: ResourceKind,

    /// Human-facing number (e.g., "A-12", "L-03"), unique per branch and kind
    pub label: String,

    /// Whether the resource can be booked
    pub enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Check if the resource can be booked at the given branch
    pub fn is_bookable_at(&self, branch_id: i32) -> bool {
        self.enabled && self.branch_id == branch_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ResourceKind::from_str("seat"), Some(ResourceKind::Seat));
        assert_eq!(ResourceKind::from_str("Locker"), Some(ResourceKind::Locker));
        assert_eq!(ResourceKind::from_str("table"), None);
    }

    #[test]
    fn test_bookable_at() {
        let resource = Resource {
            id: 1,
            branch_id: 2,
            kind: ResourceKind::Seat,
            label: "A-12".to_string(),
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(resource.is_bookable_at(2));
        assert!(!resource.is_bookable_at(3));

        let disabled = Resource {
            enabled: false,
            ..resource
        };
        assert!(!disabled.is_bookable_at(2));
    }
}
