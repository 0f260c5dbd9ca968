//! Common traits for repositories and external collaborators
//!
//! Defines abstractions for database access and the narrow interfaces the
//! booking core consumes from the outside world (coupon validation, receipt
//! dispatch, identity resolution).

use crate::error::AppError;
use crate::models::{Reservation, Student};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Student repository trait
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find student by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Student>, AppError>;

    /// Find student by phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Student>, AppError>;

    /// Create a new student
    async fn create(
        &self,
        full_name: &str,
        phone: &str,
        email: Option<&str>,
    ) -> Result<Student, AppError>;
}

/// Reservation repository trait with the queries the booking flow needs
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Find reservation by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, AppError>;

    /// List a student's reservations, newest first, with total count
    async fn list_for_student(
        &self,
        student_id: i32,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Reservation>, i64), AppError>;

    /// Optimistic overlap check: does any open reservation on the resource
    /// intersect `[start, end)`?
    async fn has_open_conflict(
        &self,
        resource_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// End date of the student's latest open reservation at the branch that
    /// ends in the future, if any (the chaining anchor)
    async fn latest_open_end(
        &self,
        student_id: i32,
        branch_id: i32,
    ) -> Result<Option<DateTime<Utc>>, AppError>;

    /// Whether the student currently holds any open reservation at the branch
    async fn has_open_reservation(
        &self,
        student_id: i32,
        branch_id: i32,
    ) -> Result<bool, AppError>;
}

/// Outcome of external coupon validation
#[derive(Debug, Clone)]
pub struct CouponDecision {
    /// Whether the coupon applies to this booking
    pub valid: bool,
    /// Total payable after the coupon (equals subtotal when invalid)
    pub final_amount: Decimal,
}

/// Coupon validation collaborator
///
/// Campaign rules live outside this core; the booking flow only consumes
/// the decision.
#[async_trait]
pub trait CouponValidator: Send + Sync {
    /// Validate a coupon code against a booking subtotal
    async fn validate(
        &self,
        code: &str,
        subtotal: Decimal,
        student_id: i32,
        plan_id: i32,
        branch_id: i32,
    ) -> Result<CouponDecision, AppError>;
}

/// Data handed to the receipt dispatcher after a successful commit
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptData {
    /// Invoice number of the payment
    pub invoice_no: String,
    /// Student display name
    pub student_name: String,
    /// Student email, when known
    pub student_email: Option<String>,
    /// Branch display name
    pub branch_name: String,
    /// Total paid
    pub amount: Decimal,
    /// Discount applied
    pub discount: Decimal,
    /// First cycle start
    pub period_start: DateTime<Utc>,
    /// Last cycle end
    pub period_end: DateTime<Utc>,
    /// Booked seat label, if a seat was assigned
    pub seat_label: Option<String>,
}

/// Receipt dispatch collaborator
///
/// Invoked fire-and-forget after the booking transaction commits. Failures
/// are logged by the caller and never affect the committed booking.
#[async_trait]
pub trait ReceiptDispatcher: Send + Sync {
    /// Deliver the receipt
    async fn dispatch(&self, receipt: ReceiptData) -> Result<(), AppError>;
}

/// Contact details supplied by the public self-service flow
#[derive(Debug, Clone)]
pub struct ContactInfo {
    /// Full name
    pub full_name: String,
    /// Phone number (identity key)
    pub phone: String,
    /// Optional email
    pub email: Option<String>,
}

/// Identity resolution collaborator for the public flow
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve contact details to an existing or newly created student
    async fn resolve(&self, contact: &ContactInfo) -> Result<Student, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000); // per_page capped at 1000
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(100, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}
