//! API layer for Lectio Booking
//!
//! HTTP API handlers for creating bookings and reading the plan,
//! reservation, and resource catalogues.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs
)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_bookings, configure_plans, configure_reservations, configure_resources,
};
