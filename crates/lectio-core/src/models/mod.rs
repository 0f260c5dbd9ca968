//! Domain models for Lectio Booking
//!
//! This module contains all the core domain models used throughout the application.

pub mod branch;
pub mod fee;
pub mod payment;
pub mod plan;
pub mod reservation;
pub mod resource;
pub mod student;

pub use branch::Branch;
pub use fee::{Fee, FeeBillType};
pub use payment::{Payment, PaymentStatus};
pub use plan::{DurationUnit, Plan};
pub use reservation::{Reservation, ReservationStatus};
pub use resource::{Resource, ResourceKind};
pub use student::Student;
