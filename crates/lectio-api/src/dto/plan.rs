//! Plan DTOs

use chrono::{DateTime, Utc};
use lectio_core::models::Plan;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Plan list query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanListQuery {
    /// Restrict to plans visible at this branch (branch-scoped plus global)
    pub branch_id: Option<i32>,
}

/// Plan response
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    /// Plan id
    pub id: i32,
    /// Owning branch; null for library-global plans
    pub branch_id: Option<i32>,
    /// Plan name
    pub name: String,
    /// Price per cycle
    pub price: Decimal,
    /// Cycle length value
    pub duration: i32,
    /// Cycle length unit
    pub duration_unit: String,
    /// Whether a locker is included
    pub includes_locker: bool,
    /// Whether the plan is selectable
    pub enabled: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        PlanResponse {
            id: plan.id,
            branch_id: plan.branch_id,
            name: plan.name,
            price: plan.price,
            duration: plan.duration,
            duration_unit: plan.duration_unit.to_string(),
            includes_locker: plan.includes_locker,
            enabled: plan.enabled,
            created_at: plan.created_at,
        }
    }
}
