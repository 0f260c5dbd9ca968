//! HTTP handlers for Lectio Booking

pub mod booking;
pub mod plan;
pub mod reservation;
pub mod resource;

pub use booking::configure as configure_bookings;
pub use plan::configure as configure_plans;
pub use reservation::configure as configure_reservations;
pub use resource::configure as configure_resources;
