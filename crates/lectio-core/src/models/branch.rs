//! Branch model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Library branch entity
///
/// Every resource, reservation, and payment belongs to exactly one branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Unique branch ID
    pub id: i32,

    /// Human-readable branch name
    pub name: String,

    /// Unique short code (e.g., "CEN", "NORTE")
    pub code: String,

    /// Optional street address
    pub address: Option<String>,

    /// Whether this branch accepts new bookings
    pub enabled: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Branch {
    /// Check if branch accepts new bookings
    pub fn is_active(&self) -> bool {
        self.enabled
    }
}
