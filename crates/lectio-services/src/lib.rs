//! Business logic services for Lectio Booking
//!
//! This crate contains the booking engine: billing cycle expansion, price
//! calculation, conflict-free resource allocation, and the transactional
//! ledger that commits a payment plus its reservations atomically.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Pure calculation lives in free functions (`schedule`, `pricing`)
//! - `BookingService` owns its repositories and external collaborators
//! - Services are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! # Modules
//!
//! - `schedule` - billing cycle expansion with calendar arithmetic
//! - `pricing` - plan + fee + coupon price computation
//! - `booking` - the orchestrator and its transactional ledger
//! - `receipt` - default collaborator implementations

pub mod booking;
pub mod pricing;
pub mod receipt;
pub mod schedule;

pub use booking::{
    AppBookingService, BookingConfirmation, BookingService, CreateBooking, CreatePublicBooking,
    ManualPayment,
};
pub use pricing::PriceBreakdown;
pub use receipt::{DbIdentityResolver, LogReceiptDispatcher, RejectAllCoupons};
pub use schedule::BillingCycle;
