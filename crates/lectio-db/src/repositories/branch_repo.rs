//! Branch repository implementation

use chrono::{DateTime, Utc};
use lectio_core::{models::Branch, AppError, AppResult};
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Database row representation of a branch
#[derive(Debug, sqlx::FromRow)]
struct BranchRow {
    id: i32,
    name: String,
    code: String,
    address: Option<String>,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BranchRow> for Branch {
    fn from(row: BranchRow) -> Self {
        Branch {
            id: row.id,
            name: row.name,
            code: row.code,
            address: row.address,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of Branch repository
pub struct PgBranchRepository {
    pool: PgPool,
}

impl PgBranchRepository {
    /// Create a new branch repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find branch by ID
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Branch>> {
        debug!("Finding branch by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BranchRow>(
            r#"
            SELECT id, name, code, address, enabled, created_at, updated_at
            FROM branches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding branch {}: {}", id, e);
            AppError::Database(format!("Failed to find branch: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    /// List all enabled branches
    #[instrument(skip(self))]
    pub async fn list_enabled(&self) -> AppResult<Vec<Branch>> {
        debug!("Listing enabled branches");

        let rows = sqlx::query_as::<sqlx::Postgres, BranchRow>(
            r#"
            SELECT id, name, code, address, enabled, created_at, updated_at
            FROM branches
            WHERE enabled = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing branches: {}", e);
            AppError::Database(format!("Failed to list branches: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
