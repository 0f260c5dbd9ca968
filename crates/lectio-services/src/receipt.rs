//! Default collaborator implementations
//!
//! The booking core consumes coupons, receipts, and identity resolution
//! through narrow traits. These are the stock implementations wired up by
//! the binary: a log-only receipt dispatcher, a coupon validator that
//! accepts nothing (campaigns live in an external service), and an
//! identity resolver backed by the student repository.

use std::sync::Arc;

use async_trait::async_trait;
use lectio_core::{
    models::Student,
    traits::{
        ContactInfo, CouponDecision, CouponValidator, IdentityResolver, ReceiptData,
        ReceiptDispatcher, StudentRepository,
    },
    AppResult,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

/// Receipt dispatcher that only logs
///
/// Stands in until a mail/messaging integration is wired up; keeps the
/// post-commit hook path exercised either way.
pub struct LogReceiptDispatcher;

#[async_trait]
impl ReceiptDispatcher for LogReceiptDispatcher {
    async fn dispatch(&self, receipt: ReceiptData) -> AppResult<()> {
        info!(
            invoice_no = %receipt.invoice_no,
            amount = %receipt.amount,
            "Receipt ready for {}",
            receipt.student_name
        );
        Ok(())
    }
}

/// Coupon validator that declines every code
pub struct RejectAllCoupons;

#[async_trait]
impl CouponValidator for RejectAllCoupons {
    async fn validate(
        &self,
        code: &str,
        subtotal: Decimal,
        _student_id: i32,
        _plan_id: i32,
        _branch_id: i32,
    ) -> AppResult<CouponDecision> {
        debug!("Declining coupon {} (no campaign backend configured)", code);

        Ok(CouponDecision {
            valid: false,
            final_amount: subtotal,
        })
    }
}

/// Identity resolver backed by the student repository
///
/// Finds the student by phone or creates a new row; used by the public
/// self-service flow.
pub struct DbIdentityResolver<S: StudentRepository> {
    students: Arc<S>,
}

impl<S: StudentRepository> DbIdentityResolver<S> {
    /// Create a new resolver over the given repository
    pub fn new(students: Arc<S>) -> Self {
        Self { students }
    }
}

#[async_trait]
impl<S: StudentRepository> IdentityResolver for DbIdentityResolver<S> {
    #[instrument(skip(self, contact))]
    async fn resolve(&self, contact: &ContactInfo) -> AppResult<Student> {
        if let Some(student) = self.students.find_by_phone(&contact.phone).await? {
            debug!("Resolved existing student {}", student.id);
            return Ok(student);
        }

        let student = self
            .students
            .create(
                &contact.full_name,
                &contact.phone,
                contact.email.as_deref(),
            )
            .await?;

        info!("Registered new student {} for public booking", student.id);
        Ok(student)
    }
}
