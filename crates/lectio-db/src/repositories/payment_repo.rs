//! Payment repository implementation
//!
//! Read side only: payment rows are written by the booking ledger inside
//! its transaction, never through this repository.

use chrono::{DateTime, Utc};
use lectio_core::{
    models::{Payment, PaymentStatus},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Database row representation of a payment
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    student_id: i32,
    branch_id: i32,
    amount: Decimal,
    discount_amount: Decimal,
    status: String,
    invoice_no: String,
    reservation_id: Option<Uuid>,
    method: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.id,
            student_id: row.student_id,
            branch_id: row.branch_id,
            amount: row.amount,
            discount_amount: row.discount_amount,
            status: PaymentStatus::from_str(&row.status).unwrap_or(PaymentStatus::Pending),
            invoice_no: row.invoice_no,
            reservation_id: row.reservation_id,
            method: row.method,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL implementation of Payment repository
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find payment by ID
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        debug!("Finding payment by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, PaymentRow>(
            r#"
            SELECT id, student_id, branch_id, amount, discount_amount,
                   status, invoice_no, reservation_id, method,
                   created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding payment {}: {}", id, e);
            AppError::Database(format!("Failed to find payment: {}", e))
        })?;

        Ok(result.map(Into::into))
    }
}
