//! Booking request and response DTOs

use chrono::{DateTime, Utc};
use lectio_core::traits::ContactInfo;
use lectio_services::booking::{
    BookingConfirmation, CreateBooking, CreatePublicBooking, ManualPayment,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_cycle_count() -> i32 {
    1
}

/// Staff-entered payment details
#[derive(Debug, Clone, Deserialize)]
pub struct ManualPaymentRequest {
    /// Amount collected
    pub amount: Decimal,
    /// Discount granted
    #[serde(default)]
    pub discount: Decimal,
    /// Payment method note
    pub method: Option<String>,
}

impl From<ManualPaymentRequest> for ManualPayment {
    fn from(req: ManualPaymentRequest) -> Self {
        ManualPayment {
            amount: req.amount,
            discount: req.discount,
            method: req.method,
        }
    }
}

/// Staff/internal booking creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Booking student
    pub student_id: i32,
    /// Branch to book at
    pub branch_id: i32,
    /// Plan to book
    pub plan_id: i32,
    /// Seat to allocate, if any
    pub seat_id: Option<i32>,
    /// Locker to allocate, if any
    pub locker_id: Option<i32>,
    /// Selected add-on fees
    #[serde(default)]
    pub fee_ids: Vec<i32>,
    /// Number of billing cycles
    #[serde(default = "default_cycle_count")]
    #[validate(range(min = 1, max = 36))]
    pub cycle_count: i32,
    /// Requested first-cycle start (overridden by chaining)
    pub start_date: Option<DateTime<Utc>>,
    /// Existing payment to attach the reservations to
    pub existing_payment_id: Option<Uuid>,
    /// Staff-entered payment; bypasses price calculation
    pub manual_payment: Option<ManualPaymentRequest>,
}

impl From<CreateBookingRequest> for CreateBooking {
    fn from(req: CreateBookingRequest) -> Self {
        CreateBooking {
            student_id: req.student_id,
            branch_id: req.branch_id,
            plan_id: req.plan_id,
            seat_id: req.seat_id,
            locker_id: req.locker_id,
            fee_ids: req.fee_ids,
            cycle_count: req.cycle_count,
            start_date: req.start_date,
            existing_payment_id: req.existing_payment_id,
            manual_payment: req.manual_payment.map(Into::into),
        }
    }
}

/// Public self-service booking creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublicBookingRequest {
    /// Requester's full name
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    /// Requester's phone (identity key)
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
    /// Requester's email
    #[validate(email)]
    pub email: Option<String>,
    /// Branch to book at
    pub branch_id: i32,
    /// Plan to book
    pub plan_id: i32,
    /// Seat to allocate, if any
    pub seat_id: Option<i32>,
    /// Locker to allocate, if any
    pub locker_id: Option<i32>,
    /// Selected add-on fees
    #[serde(default)]
    pub fee_ids: Vec<i32>,
    /// Number of billing cycles
    #[serde(default = "default_cycle_count")]
    #[validate(range(min = 1, max = 36))]
    pub cycle_count: i32,
    /// Requested first-cycle start (overridden by chaining)
    pub start_date: Option<DateTime<Utc>>,
    /// Coupon code, validated externally
    pub coupon_code: Option<String>,
    /// Payment gateway provider chosen by the requester
    #[validate(length(min = 1, max = 40))]
    pub gateway_provider: String,
    /// Manual transfer proof reference, if paying by transfer
    pub manual_proof: Option<String>,
}

impl From<PublicBookingRequest> for CreatePublicBooking {
    fn from(req: PublicBookingRequest) -> Self {
        CreatePublicBooking {
            contact: ContactInfo {
                full_name: req.full_name,
                phone: req.phone,
                email: req.email,
            },
            branch_id: req.branch_id,
            plan_id: req.plan_id,
            seat_id: req.seat_id,
            locker_id: req.locker_id,
            fee_ids: req.fee_ids,
            cycle_count: req.cycle_count,
            start_date: req.start_date,
            coupon_code: req.coupon_code,
            gateway_provider: req.gateway_provider,
            manual_proof: req.manual_proof,
        }
    }
}

/// Committed booking response
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    /// Created reservation ids, one per cycle, in cycle order
    pub reservation_ids: Vec<Uuid>,
    /// Funding payment id
    pub payment_id: Uuid,
    /// Generated invoice number
    pub invoice_no: String,
    /// Total paid
    pub amount: Decimal,
    /// Discount applied
    pub discount: Decimal,
    /// Booked seat label, when a seat was assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_label: Option<String>,
}

impl From<BookingConfirmation> for BookingResponse {
    fn from(confirmation: BookingConfirmation) -> Self {
        BookingResponse {
            reservation_ids: confirmation.reservation_ids,
            payment_id: confirmation.payment_id,
            invoice_no: confirmation.invoice_no,
            amount: confirmation.amount,
            discount: confirmation.discount,
            seat_label: confirmation.seat_label,
        }
    }
}

/// Availability check response
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    /// Whether the student holds an open reservation at the branch
    pub has_active_reservation: bool,
}
