//! Plan handlers
//!
//! Read-only plan catalogue endpoints. Plans are managed out of band; the
//! booking service only ever reads them.

use crate::dto::plan::{PlanListQuery, PlanResponse};
use crate::dto::ApiResponse;
use actix_web::{web, HttpResponse};
use lectio_core::AppError;
use lectio_db::PgPlanRepository;
use sqlx::PgPool;
use tracing::{debug, instrument};

/// List plans visible at a branch (or all plans)
///
/// GET /api/v1/plans
#[instrument(skip(pool))]
pub async fn list_plans(
    pool: web::Data<PgPool>,
    query: web::Query<PlanListQuery>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing plans");

    let repo = PgPlanRepository::new(pool.get_ref().clone());
    let plans = repo.list(query.branch_id).await?;

    let response_data: Vec<PlanResponse> = plans.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(response_data)))
}

/// List only active plans
///
/// GET /api/v1/plans/active
#[instrument(skip(pool))]
pub async fn list_active_plans(
    pool: web::Data<PgPool>,
    query: web::Query<PlanListQuery>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing active plans");

    let repo = PgPlanRepository::new(pool.get_ref().clone());
    let plans = repo.list_active(query.branch_id).await?;

    let response_data: Vec<PlanResponse> = plans.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(response_data)))
}

/// Get a single plan by ID
///
/// GET /api/v1/plans/{id}
#[instrument(skip(pool))]
pub async fn get_plan(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let plan_id = path.into_inner();
    debug!(id = plan_id, "Getting plan");

    let repo = PgPlanRepository::new(pool.get_ref().clone());
    let plan = repo
        .find_by_id(plan_id)
        .await?
        .ok_or(AppError::PlanNotFound(plan_id))?;

    let response = PlanResponse::from(plan);
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure plan routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/plans")
            .route("", web::get().to(list_plans))
            .route("/active", web::get().to(list_active_plans))
            .route("/{id}", web::get().to(get_plan)),
    );
}
