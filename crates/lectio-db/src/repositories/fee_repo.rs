//! Fee repository implementation

use chrono::{DateTime, Utc};
use lectio_core::{
    models::{Fee, FeeBillType},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// Database row representation of a fee
#[derive(Debug, sqlx::FromRow)]
struct FeeRow {
    id: i32,
    branch_id: Option<i32>,
    name: String,
    amount: Decimal,
    bill_type: String,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FeeRow> for Fee {
    fn from(row: FeeRow) -> Self {
        Fee {
            id: row.id,
            branch_id: row.branch_id,
            name: row.name,
            amount: row.amount,
            bill_type: FeeBillType::from_str(&row.bill_type).unwrap_or(FeeBillType::OneTime),
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of Fee repository
pub struct PgFeeRepository {
    pool: PgPool,
}

impl PgFeeRepository {
    /// Create a new fee repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the selected fees, restricted to enabled rows that apply at the
    /// branch (branch-scoped or global)
    ///
    /// Returns fewer rows than ids when a selection was unknown, disabled,
    /// or scoped to another branch; the caller decides whether that is an
    /// error.
    #[instrument(skip(self))]
    pub async fn find_selected(&self, ids: &[i32], branch_id: i32) -> AppResult<Vec<Fee>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Fetching {} selected fees for branch {}", ids.len(), branch_id);

        let rows = sqlx::query_as::<sqlx::Postgres, FeeRow>(
            r#"
            SELECT id, branch_id, name, amount, bill_type, enabled,
                   created_at, updated_at
            FROM fees
            WHERE id = ANY($1)
                AND enabled = true
                AND (branch_id = $2 OR branch_id IS NULL)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error fetching fees: {}", e);
            AppError::Database(format!("Failed to fetch fees: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
