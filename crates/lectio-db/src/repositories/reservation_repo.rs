//! Reservation repository implementation
//!
//! Provides PostgreSQL-backed storage for reservations with the interval
//! queries the booking flow depends on: the optimistic overlap pre-check
//! and the chaining anchor (latest open end date per student and branch).

use chrono::{DateTime, Utc};
use lectio_core::{
    models::{Reservation, ReservationStatus},
    traits::ReservationRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// PostgreSQL implementation of ReservationRepository
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new reservation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse reservation status from string
    fn parse_status(s: &str) -> ReservationStatus {
        ReservationStatus::from_str(s).unwrap_or(ReservationStatus::Pending)
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        debug!("Finding reservation by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ReservationRow>(
            r#"
            SELECT
                id, student_id, branch_id, plan_id,
                seat_id, locker_id, status,
                start_date, end_date, amount, has_locker,
                created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding reservation {}: {}", id, e);
            AppError::Database(format!("Failed to find reservation: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_for_student(
        &self,
        student_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        debug!(
            "Listing reservations for student {} with limit {} offset {}",
            student_id, limit, offset
        );

        let rows = sqlx::query_as::<sqlx::Postgres, ReservationRow>(
            r#"
            SELECT
                id, student_id, branch_id, plan_id,
                seat_id, locker_id, status,
                start_date, end_date, amount, has_locker,
                created_at, updated_at
            FROM reservations
            WHERE student_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing reservations: {}", e);
            AppError::Database(format!("Failed to list reservations: {}", e))
        })?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE student_id = $1")
                .bind(student_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting reservations: {}", e);
                    AppError::Database(format!("Failed to count reservations: {}", e))
                })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn has_open_conflict(
        &self,
        resource_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<bool> {
        debug!(
            "Checking open conflicts on resource {} over [{}, {})",
            resource_id, start, end
        );

        // Half-open interval overlap over the full candidate span. The same
        // predicate runs again inside the commit transaction after the
        // resource rows are locked; this call is only the fast path.
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM reservations
                WHERE (seat_id = $1 OR locker_id = $1)
                    AND status IN ('pending', 'active')
                    AND start_date < $3
                    AND end_date > $2
            )
            "#,
        )
        .bind(resource_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking conflicts: {}", e);
            AppError::Database(format!("Failed to check resource conflicts: {}", e))
        })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn latest_open_end(
        &self,
        student_id: i32,
        branch_id: i32,
    ) -> AppResult<Option<DateTime<Utc>>> {
        debug!(
            "Finding latest open reservation end for student {} at branch {}",
            student_id, branch_id
        );

        let result: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT end_date
            FROM reservations
            WHERE student_id = $1
                AND branch_id = $2
                AND status IN ('pending', 'active')
                AND end_date > NOW()
            ORDER BY end_date DESC
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .bind(branch_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding latest open end: {}", e);
            AppError::Database(format!("Failed to find latest reservation: {}", e))
        })?;

        Ok(result.map(|r| r.0))
    }

    #[instrument(skip(self))]
    async fn has_open_reservation(&self, student_id: i32, branch_id: i32) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM reservations
                WHERE student_id = $1
                    AND branch_id = $2
                    AND status IN ('pending', 'active')
                    AND end_date > NOW()
            )
            "#,
        )
        .bind(student_id)
        .bind(branch_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking open reservations: {}", e);
            AppError::Database(format!("Failed to check open reservations: {}", e))
        })?;

        Ok(result.0)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    student_id: i32,
    branch_id: i32,
    plan_id: i32,
    seat_id: Option<i32>,
    locker_id: Option<i32>,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    amount: Decimal,
    has_locker: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            branch_id: row.branch_id,
            plan_id: row.plan_id,
            seat_id: row.seat_id,
            locker_id: row.locker_id,
            status: PgReservationRepository::parse_status(&row.status),
            start_date: row.start_date,
            end_date: row.end_date,
            amount: row.amount,
            has_locker: row.has_locker,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgReservationRepository::parse_status("active"),
            ReservationStatus::Active
        );
        assert_eq!(
            PgReservationRepository::parse_status("cancelled"),
            ReservationStatus::Cancelled
        );
        // Unknown statuses degrade to pending rather than failing the read
        assert_eq!(
            PgReservationRepository::parse_status("???"),
            ReservationStatus::Pending
        );
    }
}
