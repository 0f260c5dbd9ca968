//! Resource DTOs

use chrono::{DateTime, Utc};
use lectio_core::models::Resource;
use serde::{Deserialize, Serialize};

/// Availability window query for listing free resources
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityWindowQuery {
    /// Window start (inclusive)
    pub from: DateTime<Utc>,
    /// Window end (exclusive)
    pub to: DateTime<Utc>,
    /// Restrict to one resource kind ("seat" or "locker")
    pub kind: Option<String>,
}

/// Resource response
#[derive(Debug, Clone, Serialize)]
pub struct ResourceResponse {
    /// Resource id
    pub id: i32,
    /// Owning branch
    pub branch_id: i32,
    /// Resource kind
    pub kind: String,
    /// Human-facing label
    pub label: String,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        ResourceResponse {
            id: resource.id,
            branch_id: resource.branch_id,
            kind: resource.kind.to_string(),
            label: resource.label,
        }
    }
}
