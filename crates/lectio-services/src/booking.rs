//! Booking orchestration and the transactional reservation ledger
//!
//! `BookingService` drives a booking attempt through its stages:
//! validation, chaining, cycle expansion, conflict pre-check, pricing, and
//! the atomic commit. The commit writes the payment, one reservation per
//! cycle, the payment link, and the student's current-branch pointer inside
//! a single transaction; any failure rolls back all of it.
//!
//! The optimistic conflict pre-check runs outside the transaction for
//! latency. Inside the transaction the booked resource rows are locked with
//! `SELECT ... FOR UPDATE` and the overlap predicate re-runs, so the second
//! of two racing bookings re-detects the conflict and aborts.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lectio_core::{
    config::BookingConfig,
    models::{Branch, Fee, Payment, PaymentStatus, Plan, Resource, ResourceKind, Student},
    traits::{
        ContactInfo, CouponValidator, IdentityResolver, ReceiptData, ReceiptDispatcher,
        ReservationRepository, StudentRepository,
    },
    AppError, AppResult,
};
use lectio_db::{
    PgBranchRepository, PgFeeRepository, PgPaymentRepository, PgPlanRepository,
    PgReservationRepository, PgResourceRepository, PgStudentRepository,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::pricing::{self, PriceBreakdown};
use crate::schedule::{expand_cycles, BillingCycle};

/// Staff-entered payment: the amount is authoritative, no calculation
#[derive(Debug, Clone)]
pub struct ManualPayment {
    /// Amount actually collected
    pub amount: Decimal,
    /// Discount granted, recorded as supplied
    pub discount: Decimal,
    /// Payment method note (e.g., "cash", "yape")
    pub method: Option<String>,
}

/// Staff/internal booking command
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub student_id: i32,
    pub branch_id: i32,
    pub plan_id: i32,
    pub seat_id: Option<i32>,
    pub locker_id: Option<i32>,
    pub fee_ids: Vec<i32>,
    pub cycle_count: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub existing_payment_id: Option<Uuid>,
    pub manual_payment: Option<ManualPayment>,
}

/// Public self-service booking command
#[derive(Debug, Clone)]
pub struct CreatePublicBooking {
    pub contact: ContactInfo,
    pub branch_id: i32,
    pub plan_id: i32,
    pub seat_id: Option<i32>,
    pub locker_id: Option<i32>,
    pub fee_ids: Vec<i32>,
    pub cycle_count: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub coupon_code: Option<String>,
    pub gateway_provider: String,
    /// Manual transfer proof reference; its presence puts the payment into
    /// pending_verification instead of pending
    pub manual_proof: Option<String>,
}

/// Result of a committed booking
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub reservation_ids: Vec<Uuid>,
    pub payment_id: Uuid,
    pub invoice_no: String,
    pub amount: Decimal,
    pub discount: Decimal,
    pub seat_label: Option<String>,
}

/// Determine when the first cycle starts
///
/// The end of the student's latest open reservation at the branch wins over
/// whatever the caller asked for: renewals chain seamlessly and a student
/// can never hold two open reservations at one branch.
pub fn effective_start(
    chained_end: Option<DateTime<Utc>>,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    chained_end.unwrap_or_else(|| requested.unwrap_or(now))
}

/// Fully validated booking, ready for pricing and commit
struct BookingOrder {
    student: Student,
    branch: Branch,
    plan: Plan,
    seat: Option<Resource>,
    locker: Option<Resource>,
    fees: Vec<Fee>,
    cycle_count: i32,
    requested_start: Option<DateTime<Utc>>,
    coupon_code: Option<String>,
    manual_payment: Option<ManualPayment>,
    existing_payment: Option<Payment>,
    payment_status: PaymentStatus,
    method: Option<String>,
}

/// Booking orchestrator
///
/// Owns the repositories it reads through and the collaborators it calls
/// out to; writes happen through its own transactional ledger.
pub struct BookingService<R: ReservationRepository, S: StudentRepository> {
    pool: PgPool,
    reservations: Arc<R>,
    students: Arc<S>,
    coupons: Arc<dyn CouponValidator>,
    receipts: Arc<dyn ReceiptDispatcher>,
    identities: Arc<dyn IdentityResolver>,
    config: BookingConfig,
}

/// The orchestrator wired to the PostgreSQL repositories
pub type AppBookingService = BookingService<PgReservationRepository, PgStudentRepository>;

impl<R: ReservationRepository, S: StudentRepository> BookingService<R, S> {
    /// Create a new booking service
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        reservations: Arc<R>,
        students: Arc<S>,
        coupons: Arc<dyn CouponValidator>,
        receipts: Arc<dyn ReceiptDispatcher>,
        identities: Arc<dyn IdentityResolver>,
        config: BookingConfig,
    ) -> Self {
        Self {
            pool,
            reservations,
            students,
            coupons,
            receipts,
            identities,
            config,
        }
    }

    /// Create a booking for a known student (staff/internal flow)
    #[instrument(skip(self, cmd), fields(student_id = cmd.student_id, branch_id = cmd.branch_id))]
    pub async fn create_booking(&self, cmd: CreateBooking) -> AppResult<BookingConfirmation> {
        let student = self
            .students
            .find_by_id(cmd.student_id)
            .await?
            .ok_or_else(|| AppError::StudentNotFound(cmd.student_id.to_string()))?;

        let existing_payment = match cmd.existing_payment_id {
            Some(payment_id) => {
                let payment = PgPaymentRepository::new(self.pool.clone())
                    .find_by_id(payment_id)
                    .await?
                    .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))?;

                if payment.status.is_terminal_failure() {
                    return Err(AppError::InvalidPaymentState(format!(
                        "Payment {} is {}",
                        payment.id, payment.status
                    )));
                }

                Some(payment)
            }
            None => None,
        };

        // A staff-entered amount is money already in hand; a fresh payment
        // with no manual entry waits for confirmation.
        let payment_status = match (&existing_payment, &cmd.manual_payment) {
            (Some(payment), _) => payment.status,
            (None, Some(_)) => PaymentStatus::Completed,
            (None, None) => PaymentStatus::Pending,
        };

        let method = cmd.manual_payment.as_ref().and_then(|m| m.method.clone());

        let order = self
            .validate_order(
                student,
                cmd.branch_id,
                cmd.plan_id,
                cmd.seat_id,
                cmd.locker_id,
                cmd.fee_ids,
                cmd.cycle_count,
                cmd.start_date,
                None,
                cmd.manual_payment,
                existing_payment,
                payment_status,
                method,
            )
            .await?;

        self.place_booking(order).await
    }

    /// Create a booking from the public self-service flow
    ///
    /// Resolves the contact into a student first, then runs the same
    /// pipeline as the staff flow.
    #[instrument(skip(self, cmd), fields(branch_id = cmd.branch_id, plan_id = cmd.plan_id))]
    pub async fn create_public_booking(
        &self,
        cmd: CreatePublicBooking,
    ) -> AppResult<BookingConfirmation> {
        if cmd.contact.full_name.trim().is_empty() {
            return Err(AppError::MissingField("full_name".to_string()));
        }
        if cmd.contact.phone.trim().is_empty() {
            return Err(AppError::MissingField("phone".to_string()));
        }

        let student = self.identities.resolve(&cmd.contact).await?;

        let payment_status = if cmd.manual_proof.is_some() {
            PaymentStatus::PendingVerification
        } else {
            PaymentStatus::Pending
        };

        let order = self
            .validate_order(
                student,
                cmd.branch_id,
                cmd.plan_id,
                cmd.seat_id,
                cmd.locker_id,
                cmd.fee_ids,
                cmd.cycle_count,
                cmd.start_date,
                cmd.coupon_code,
                None,
                None,
                payment_status,
                Some(cmd.gateway_provider),
            )
            .await?;

        self.place_booking(order).await
    }

    /// Whether the student currently holds an open reservation at the branch
    #[instrument(skip(self))]
    pub async fn check_availability(&self, student_id: i32, branch_id: i32) -> AppResult<bool> {
        self.students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| AppError::StudentNotFound(student_id.to_string()))?;

        self.reservations
            .has_open_reservation(student_id, branch_id)
            .await
    }

    /// Resolve and validate every referenced entity before any write
    #[allow(clippy::too_many_arguments)]
    async fn validate_order(
        &self,
        student: Student,
        branch_id: i32,
        plan_id: i32,
        seat_id: Option<i32>,
        locker_id: Option<i32>,
        fee_ids: Vec<i32>,
        cycle_count: i32,
        requested_start: Option<DateTime<Utc>>,
        coupon_code: Option<String>,
        manual_payment: Option<ManualPayment>,
        existing_payment: Option<Payment>,
        payment_status: PaymentStatus,
        method: Option<String>,
    ) -> AppResult<BookingOrder> {
        if cycle_count < 1 || cycle_count > self.config.max_cycles {
            return Err(AppError::InvalidInput(format!(
                "Cycle count must be between 1 and {}, got {}",
                self.config.max_cycles, cycle_count
            )));
        }

        let branch = PgBranchRepository::new(self.pool.clone())
            .find_by_id(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound(branch_id))?;
        if !branch.is_active() {
            return Err(AppError::Validation(format!(
                "Branch {} is not accepting bookings",
                branch.name
            )));
        }

        let plan = PgPlanRepository::new(self.pool.clone())
            .find_by_id(plan_id)
            .await?
            .ok_or(AppError::PlanNotFound(plan_id))?;
        if !plan.is_active() {
            return Err(AppError::Validation(format!("Plan {} is not active", plan.name)));
        }
        if !plan.available_at(branch.id) {
            return Err(AppError::Validation(format!(
                "Plan {} is not available at branch {}",
                plan.name, branch.name
            )));
        }

        let resources = PgResourceRepository::new(self.pool.clone());

        let seat = match seat_id {
            Some(id) => Some(self.resolve_resource(&resources, id, &branch, ResourceKind::Seat).await?),
            None => None,
        };

        let locker = match locker_id {
            Some(id) => {
                if !plan.includes_locker {
                    return Err(AppError::InvalidInput(format!(
                        "Plan {} does not include a locker",
                        plan.name
                    )));
                }
                Some(self.resolve_resource(&resources, id, &branch, ResourceKind::Locker).await?)
            }
            None => None,
        };

        let mut unique_fee_ids = fee_ids;
        unique_fee_ids.sort_unstable();
        unique_fee_ids.dedup();

        let fees = PgFeeRepository::new(self.pool.clone())
            .find_selected(&unique_fee_ids, branch.id)
            .await?;
        if fees.len() != unique_fee_ids.len() {
            let found: HashSet<i32> = fees.iter().map(|f| f.id).collect();
            let missing = unique_fee_ids
                .iter()
                .find(|id| !found.contains(id))
                .copied()
                .unwrap_or_default();
            return Err(AppError::NotFound(format!(
                "Fee {} is unknown or not applicable at branch {}",
                missing, branch.name
            )));
        }

        Ok(BookingOrder {
            student,
            branch,
            plan,
            seat,
            locker,
            fees,
            cycle_count,
            requested_start,
            coupon_code,
            manual_payment,
            existing_payment,
            payment_status,
            method,
        })
    }

    async fn resolve_resource(
        &self,
        resources: &PgResourceRepository,
        id: i32,
        branch: &Branch,
        expected_kind: ResourceKind,
    ) -> AppResult<Resource> {
        let resource = resources
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound(id))?;

        if !resource.is_bookable_at(branch.id) {
            return Err(AppError::Validation(format!(
                "Resource {} is not bookable at branch {}",
                resource.label, branch.name
            )));
        }
        if resource.kind != expected_kind {
            return Err(AppError::InvalidInput(format!(
                "Resource {} is a {}, expected a {}",
                resource.label, resource.kind, expected_kind
            )));
        }

        Ok(resource)
    }

    /// Run the chained stages after validation: expansion, conflict
    /// pre-check, pricing, commit, receipt dispatch
    async fn place_booking(&self, order: BookingOrder) -> AppResult<BookingConfirmation> {
        // Chaining: a renewal starts where the student's open reservation
        // ends, regardless of the requested date.
        let chained_end = self
            .reservations
            .latest_open_end(order.student.id, order.branch.id)
            .await?;
        let start = effective_start(chained_end, order.requested_start, Utc::now());

        let cycles = expand_cycles(start, order.plan.duration, order.plan.duration_unit, order.cycle_count)?;
        let span_start = cycles
            .first()
            .map(|c| c.start)
            .ok_or_else(|| AppError::Internal("Empty cycle expansion".to_string()))?;
        let span_end = cycles
            .last()
            .map(|c| c.end)
            .ok_or_else(|| AppError::Internal("Empty cycle expansion".to_string()))?;

        // Optimistic pre-check over the whole span, before any transactional
        // resource is held. The ledger re-checks under row locks.
        for resource in [order.seat.as_ref(), order.locker.as_ref()].into_iter().flatten() {
            if self
                .reservations
                .has_open_conflict(resource.id, span_start, span_end)
                .await?
            {
                info!(
                    "Conflict pre-check rejected {} {} over [{}, {})",
                    resource.kind, resource.label, span_start, span_end
                );
                return Err(AppError::ResourceUnavailable(format!(
                    "{} {}",
                    resource.kind, resource.label
                )));
            }
        }

        let breakdown = self.price_order(&order).await?;

        let confirmation = match tokio::time::timeout(
            Duration::from_secs(self.config.tx_timeout_secs),
            self.run_ledger(&order, &cycles, &breakdown, span_start, span_end),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                // Dropping the in-flight future aborts the transaction; the
                // connection rolls back when it returns to the pool.
                error!(
                    "Booking transaction exceeded {}s and was rolled back",
                    self.config.tx_timeout_secs
                );
                Err(AppError::TransactionTimeout)
            }
        }?;

        info!(
            "Booking committed: invoice {} with {} cycle(s) for student {}",
            confirmation.invoice_no,
            confirmation.reservation_ids.len(),
            order.student.id
        );

        self.dispatch_receipt(&order, &confirmation, span_start, span_end);

        Ok(confirmation)
    }

    /// Price the order: manual and pre-existing payments are authoritative,
    /// everything else goes through the calculator (and the coupon
    /// validator when a code was supplied)
    async fn price_order(&self, order: &BookingOrder) -> AppResult<PriceBreakdown> {
        if let Some(payment) = &order.existing_payment {
            return pricing::manual_breakdown(
                payment.amount,
                payment.discount_amount,
                order.cycle_count,
            );
        }

        if let Some(manual) = &order.manual_payment {
            return pricing::manual_breakdown(manual.amount, manual.discount, order.cycle_count);
        }

        let base = pricing::quote(&order.plan, &order.fees, order.cycle_count, None)?;

        match &order.coupon_code {
            Some(code) => {
                let decision = self
                    .coupons
                    .validate(
                        code,
                        base.subtotal,
                        order.student.id,
                        order.plan.id,
                        order.branch.id,
                    )
                    .await?;

                if !decision.valid {
                    return Err(AppError::InvalidInput(format!(
                        "Coupon {} is not applicable to this booking",
                        code
                    )));
                }

                pricing::quote(
                    &order.plan,
                    &order.fees,
                    order.cycle_count,
                    Some(decision.final_amount),
                )
            }
            None => Ok(base),
        }
    }

    /// The transactional ledger: everything in here commits or rolls back
    /// as one unit
    async fn run_ledger(
        &self,
        order: &BookingOrder,
        cycles: &[BillingCycle],
        breakdown: &PriceBreakdown,
        span_start: DateTime<Utc>,
        span_end: DateTime<Utc>,
    ) -> AppResult<BookingConfirmation> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Lock the booked resource rows, seat first, then locker, so
        // concurrent bookings always lock in one order. With the rows held,
        // the overlap re-check is authoritative: the loser of a race sees
        // the winner's committed reservations here.
        for resource in [order.seat.as_ref(), order.locker.as_ref()].into_iter().flatten() {
            sqlx::query("SELECT id FROM resources WHERE id = $1 FOR UPDATE")
                .bind(resource.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to lock resource {}: {}", resource.id, e);
                    AppError::Database(format!("Failed to lock resource: {}", e))
                })?;

            let conflict: (bool,) = sqlx::query_as(
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
            .bind(resource.id)
            .bind(span_start)
            .bind(span_end)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to re-check conflicts: {}", e);
                AppError::Database(format!("Failed to re-check conflicts: {}", e))
            })?;

            if conflict.0 {
                warn!(
                    "In-transaction re-check found a conflict on {} {}",
                    resource.kind, resource.label
                );
                return Err(AppError::ResourceUnavailable(format!(
                    "{} {}",
                    resource.kind, resource.label
                )));
            }
        }

        // Payment row: reuse the referenced one or create a fresh one with
        // a new invoice number.
        let (payment_id, invoice_no) = match &order.existing_payment {
            Some(payment) => (payment.id, payment.invoice_no.clone()),
            None => {
                let payment_id = Uuid::new_v4();
                let invoice_no = Payment::generate_invoice_no(&self.config.invoice_prefix);

                sqlx::query(
                    r#"
                    INSERT INTO payments (
                        id, student_id, branch_id, amount, discount_amount,
                        status, invoice_no, method
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(payment_id)
                .bind(order.student.id)
                .bind(order.branch.id)
                .bind(breakdown.total)
                .bind(breakdown.discount)
                .bind(order.payment_status.to_string())
                .bind(&invoice_no)
                .bind(&order.method)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to create payment: {}", e);
                    AppError::Database(format!("Failed to create payment: {}", e))
                })?;

                (payment_id, invoice_no)
            }
        };

        // One reservation row per cycle, status mirrored from the payment.
        let reservation_status = order.payment_status.reservation_status();
        let mut reservation_ids = Vec::with_capacity(cycles.len());

        for (cycle, amount) in cycles.iter().zip(&breakdown.cycle_amounts) {
            let reservation_id = Uuid::new_v4();

            sqlx::query(
                r#"
                INSERT INTO reservations (
                    id, student_id, branch_id, plan_id, seat_id, locker_id,
                    status, start_date, end_date, amount, has_locker
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(reservation_id)
            .bind(order.student.id)
            .bind(order.branch.id)
            .bind(order.plan.id)
            .bind(order.seat.as_ref().map(|r| r.id))
            .bind(order.locker.as_ref().map(|r| r.id))
            .bind(reservation_status.to_string())
            .bind(cycle.start)
            .bind(cycle.end)
            .bind(amount)
            .bind(order.locker.is_some())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to create reservation: {}", e);
                AppError::Database(format!("Failed to create reservation: {}", e))
            })?;

            reservation_ids.push(reservation_id);
        }

        // Link the payment to the first cycle's reservation.
        let first_reservation_id = reservation_ids
            .first()
            .copied()
            .ok_or_else(|| AppError::Internal("No reservations created".to_string()))?;

        sqlx::query("UPDATE payments SET reservation_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(payment_id)
            .bind(first_reservation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to link payment to reservation: {}", e);
                AppError::Database(format!("Failed to link payment: {}", e))
            })?;

        // Current-branch projection, last write wins, same transaction.
        if reservation_status.is_open() {
            sqlx::query("UPDATE students SET current_branch_id = $2, updated_at = NOW() WHERE id = $1")
                .bind(order.student.id)
                .bind(order.branch.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to update current branch: {}", e);
                    AppError::Database(format!("Failed to update current branch: {}", e))
                })?;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(BookingConfirmation {
            reservation_ids,
            payment_id,
            invoice_no,
            amount: breakdown.total,
            discount: breakdown.discount,
            seat_label: order.seat.as_ref().map(|r| r.label.clone()),
        })
    }

    /// Fire-and-forget receipt dispatch; failures are logged, never
    /// propagated to the committed booking
    fn dispatch_receipt(
        &self,
        order: &BookingOrder,
        confirmation: &BookingConfirmation,
        span_start: DateTime<Utc>,
        span_end: DateTime<Utc>,
    ) {
        let receipt = ReceiptData {
            invoice_no: confirmation.invoice_no.clone(),
            student_name: order.student.full_name.clone(),
            student_email: order.student.email.clone(),
            branch_name: order.branch.name.clone(),
            amount: confirmation.amount,
            discount: confirmation.discount,
            period_start: span_start,
            period_end: span_end,
            seat_label: confirmation.seat_label.clone(),
        };

        let receipts = Arc::clone(&self.receipts);
        tokio::spawn(async move {
            if let Err(e) = receipts.dispatch(receipt).await {
                warn!("Receipt dispatch failed (booking already committed): {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_chained_end_overrides_requested_start() {
        let start = effective_start(
            Some(date(2024, 4, 1)),
            Some(date(2024, 3, 1)),
            date(2024, 2, 20),
        );
        assert_eq!(start, date(2024, 4, 1));
    }

    #[test]
    fn test_requested_start_used_without_history() {
        let start = effective_start(None, Some(date(2024, 3, 1)), date(2024, 2, 20));
        assert_eq!(start, date(2024, 3, 1));
    }

    #[test]
    fn test_defaults_to_now() {
        let now = date(2024, 2, 20);
        assert_eq!(effective_start(None, None, now), now);
    }
}
