//! Resource repository implementation
//!
//! Besides plain lookups, this repository answers the read-only face of
//! conflict detection: which resources of a branch are free over a window.

use chrono::{DateTime, Utc};
use lectio_core::{
    models::{Resource, ResourceKind},
    AppError, AppResult,
};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Database row representation of a resource
#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id: i32,
    branch_id: i32,
    kind: String,
    label: String,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Resource {
            id: row.id,
            branch_id: row.branch_id,
            kind: ResourceKind::from_str(&row.kind).unwrap_or(ResourceKind::Seat),
            label: row.label,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of Resource repository
pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    /// Create a new resource repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find resource by ID
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Resource>> {
        debug!("Finding resource by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ResourceRow>(
            r#"
            SELECT id, branch_id, kind, label, enabled, created_at, updated_at
            FROM resources
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding resource {}: {}", id, e);
            AppError::Database(format!("Failed to find resource: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// List enabled resources of a branch with no open reservation
    /// overlapping `[from, to)`, optionally restricted to one kind
    #[instrument(skip(self))]
    pub async fn list_available(
        &self,
        branch_id: i32,
        kind: Option<ResourceKind>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Resource>> {
        debug!(
            "Listing available resources for branch {} over [{}, {})",
            branch_id, from, to
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ResourceRow>(
            r#"
            SELECT r.id, r.branch_id, r.kind, r.label, r.enabled,
                   r.created_at, r.updated_at
            FROM resources r
            WHERE r.branch_id = $1
                AND r.enabled = true
                AND ($2::TEXT IS NULL OR r.kind = $2)
                AND NOT EXISTS (
                    SELECT 1
                    FROM reservations res
                    WHERE (res.seat_id = r.id OR res.locker_id = r.id)
                        AND res.status IN ('pending', 'active')
                        AND res.start_date < $4
                        AND res.end_date > $3
                )
            ORDER BY r.kind, r.label
            "#,
        )
        .bind(branch_id)
        .bind(kind.map(|k| k.to_string()))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing available resources: {}", e);
            AppError::Database(format!("Failed to list available resources: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
