//! Lectio Booking Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the Lectio booking system. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for all domain entities
//! - The interval-overlap queries backing conflict detection
//! - Embedded migrations

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use lectio_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};

/// Embedded database migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
