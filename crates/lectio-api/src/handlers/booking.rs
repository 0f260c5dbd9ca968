//! Booking handlers
//!
//! HTTP entry points into the booking orchestrator: the staff flow, the
//! public self-service flow, and the availability convenience check.

use crate::dto::booking::{AvailabilityResponse, BookingResponse, CreateBookingRequest, PublicBookingRequest};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use lectio_core::AppError;
use lectio_services::AppBookingService;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Create a booking for a known student (staff flow)
///
/// POST /api/v1/bookings
#[instrument(skip(service, req))]
pub async fn create_booking(
    service: web::Data<AppBookingService>,
    req: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Booking request validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let confirmation = service.create_booking(req.into_inner().into()).await?;

    info!(
        invoice_no = %confirmation.invoice_no,
        "Booking created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        BookingResponse::from(confirmation),
        "Booking created successfully",
    )))
}

/// Create a booking from the public self-service flow
///
/// POST /api/v1/public/bookings
#[instrument(skip(service, req))]
pub async fn create_public_booking(
    service: web::Data<AppBookingService>,
    req: web::Json<PublicBookingRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Public booking request validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let confirmation = service.create_public_booking(req.into_inner().into()).await?;

    info!(
        invoice_no = %confirmation.invoice_no,
        "Public booking created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        BookingResponse::from(confirmation),
        "Booking created successfully",
    )))
}

/// Check whether a student holds an open reservation at a branch
///
/// GET /api/v1/students/{student_id}/branches/{branch_id}/availability
#[instrument(skip(service))]
pub async fn check_availability(
    service: web::Data<AppBookingService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, AppError> {
    let (student_id, branch_id) = path.into_inner();

    let has_active_reservation = service.check_availability(student_id, branch_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(AvailabilityResponse {
        has_active_reservation,
    })))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/bookings").route("", web::post().to(create_booking)))
        .service(web::scope("/public").route("/bookings", web::post().to(create_public_booking)))
        .service(
            web::resource("/students/{student_id}/branches/{branch_id}/availability")
                .route(web::get().to(check_availability)),
        );
}
