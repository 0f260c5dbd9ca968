//! Data Transfer Objects (DTOs) for API requests and responses

pub mod booking;
pub mod common;
pub mod plan;
pub mod reservation;
pub mod resource;

pub use booking::*;
pub use common::*;
pub use plan::*;
pub use reservation::*;
pub use resource::*;
