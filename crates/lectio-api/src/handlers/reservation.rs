//! Reservation handlers
//!
//! Read-only reservation queries. Reservation rows are written only by the
//! booking ledger.

use crate::dto::reservation::{ReservationFilterParams, ReservationResponse};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use lectio_core::traits::ReservationRepository;
use lectio_core::AppError;
use lectio_db::PgReservationRepository;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// List a student's reservations, newest first
///
/// GET /api/v1/reservations?student_id=&page=&per_page=
#[instrument(skip(pool))]
pub async fn list_reservations(
    pool: web::Data<PgPool>,
    query: web::Query<ReservationFilterParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Reservation list validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    debug!(student_id = query.student_id, "Listing reservations");

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let (reservations, total) = repo
        .list_for_student(
            query.student_id,
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let data: Vec<ReservationResponse> = reservations.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(query.pagination.paginate(data, total)))
}

/// Get a single reservation by ID
///
/// GET /api/v1/reservations/{id}
#[instrument(skip(pool))]
pub async fn get_reservation(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let reservation_id = path.into_inner();
    debug!(id = %reservation_id, "Getting reservation");

    let repo = PgReservationRepository::new(pool.get_ref().clone());
    let reservation = repo
        .find_by_id(reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", reservation_id)))?;

    let response = ReservationResponse::from(reservation);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure reservation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .route("", web::get().to(list_reservations))
            .route("/{id}", web::get().to(get_reservation)),
    );
}
