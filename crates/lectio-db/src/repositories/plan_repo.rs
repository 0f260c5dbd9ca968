//! Plan repository implementation
//!
//! Plans are scoped by a nullable branch id: a row with `branch_id IS NULL`
//! is library-global. Lookups run as one merged query instead of separate
//! branch-then-global fallbacks.

use chrono::{DateTime, Utc};
use lectio_core::{
    models::{DurationUnit, Plan},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};

/// Database row representation of a plan
#[derive(Debug, FromRow)]
struct PlanRow {
    id: i32,
    branch_id: Option<i32>,
    name: String,
    price: Decimal,
    duration: i32,
    duration_unit: String,
    includes_locker: bool,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlanRow> for Plan {
    fn from(row: PlanRow) -> Self {
        Plan {
            id: row.id,
            branch_id: row.branch_id,
            name: row.name,
            price: row.price,
            duration: row.duration,
            duration_unit: DurationUnit::from_str(&row.duration_unit)
                .unwrap_or(DurationUnit::Months),
            includes_locker: row.includes_locker,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of Plan repository
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    /// Create a new plan repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find plan by ID
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Plan>> {
        debug!("Finding plan by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, PlanRow>(
            r#"
            SELECT
                id, branch_id, name, price, duration, duration_unit,
                includes_locker, enabled, created_at, updated_at
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding plan {}: {}", id, e);
            AppError::Database(format!("Failed to find plan: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// List plans visible at a branch (branch-scoped plus global), or every
    /// plan when no branch is given
    #[instrument(skip(self))]
    pub async fn list(&self, branch_id: Option<i32>) -> AppResult<Vec<Plan>> {
        debug!("Listing plans for branch {:?}", branch_id);

        let rows = sqlx::query_as::<sqlx::Postgres, PlanRow>(
            r#"
            SELECT
                id, branch_id, name, price, duration, duration_unit,
                includes_locker, enabled, created_at, updated_at
            FROM plans
            WHERE $1::INTEGER IS NULL OR branch_id = $1 OR branch_id IS NULL
            ORDER BY branch_id NULLS LAST, name
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing plans: {}", e);
            AppError::Database(format!("Failed to list plans: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List only active/enabled plans visible at a branch
    #[instrument(skip(self))]
    pub async fn list_active(&self, branch_id: Option<i32>) -> AppResult<Vec<Plan>> {
        debug!("Listing active plans for branch {:?}", branch_id);

        let rows = sqlx::query_as::<sqlx::Postgres, PlanRow>(
            r#"
            SELECT
                id, branch_id, name, price, duration, duration_unit,
                includes_locker, enabled, created_at, updated_at
            FROM plans
            WHERE enabled = true
                AND ($1::INTEGER IS NULL OR branch_id = $1 OR branch_id IS NULL)
            ORDER BY branch_id NULLS LAST, name
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing active plans: {}", e);
            AppError::Database(format!("Failed to list active plans: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
