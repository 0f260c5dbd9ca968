//! Resource handlers
//!
//! The read-only face of conflict detection: which seats or lockers of a
//! branch are free over a window.

use crate::dto::resource::{AvailabilityWindowQuery, ResourceResponse};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use lectio_core::models::ResourceKind;
use lectio_core::AppError;
use lectio_db::PgResourceRepository;
use sqlx::PgPool;
use tracing::{debug, instrument};

/// List resources of a branch with no open reservation over the window
///
/// GET /api/v1/branches/{id}/resources/available?from=&to=&kind=
#[instrument(skip(pool))]
pub async fn list_available_resources(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    query: web::Query<AvailabilityWindowQuery>,
) -> Result<HttpResponse, AppError> {
    let branch_id = path.into_inner();
    let query = query.into_inner();

    if query.from >= query.to {
        return Err(AppError::InvalidInput(
            "Window start must precede window end".to_string(),
        ));
    }

    let kind = match query.kind.as_deref() {
        Some(raw) => Some(ResourceKind::from_str(raw).ok_or_else(|| {
            AppError::InvalidInput(format!("Unknown resource kind: {}", raw))
        })?),
        None => None,
    };

    debug!(
        branch_id,
        "Listing available resources over [{}, {})", query.from, query.to
    );

    let repo = PgResourceRepository::new(pool.get_ref().clone());
    let resources = repo
        .list_available(branch_id, kind, query.from, query.to)
        .await?;

    let response_data: Vec<ResourceResponse> = resources.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(response_data)))
}

/// Configure resource routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/branches/{id}/resources/available")
            .route(web::get().to(list_available_resources)),
    );
}
