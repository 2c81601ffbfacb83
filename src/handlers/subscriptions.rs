// src/handlers/subscriptions.rs
// DOCUMENTATION: HTTP handlers for listing subscription plans
// PURPOSE: Public plan catalogue, super admin plan management

use crate::db::SubscriptionRepository;
use crate::errors::ApiError;
use crate::models::{CreatePlanRequest, PlanListQuery, UpdatePlanRequest};
use crate::services::{AuthUser, MaybeUser};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /subscriptions/plans
/// Inactive plans are listed only for a super admin who asks for them
pub async fn list_plans(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<PlanListQuery>,
) -> Result<impl Responder, ApiError> {
    let include_inactive =
        query.include_inactive && viewer.0.as_ref().map_or(false, |u| u.is_super_admin());

    let plans = SubscriptionRepository::list(pool.get_ref(), include_inactive).await?;
    Ok(HttpResponse::Ok().json(plans))
}

/// POST /subscriptions/plans
pub async fn create_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreatePlanRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let plan = SubscriptionRepository::create(pool.get_ref(), user.0.id, &req).await?;
    log::info!("Subscription plan {} ({}) created", plan.id, plan.name);
    Ok(HttpResponse::Created().json(plan))
}

/// PUT /subscriptions/plans/{id}
pub async fn update_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdatePlanRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let plan = SubscriptionRepository::update(pool.get_ref(), path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(plan))
}

/// DELETE /subscriptions/plans/{id}
/// Plans already used by a listing are deactivated instead
pub async fn delete_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let id = path.into_inner();
    SubscriptionRepository::find_by_id(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription plan".to_string()))?;

    let deleted = SubscriptionRepository::delete(pool.get_ref(), id).await?;
    log::info!(
        "Subscription plan {} {}",
        id,
        if deleted { "deleted" } else { "deactivated" }
    );
    Ok(HttpResponse::Ok().json(json!({ "id": id, "deleted": deleted, "deactivated": !deleted })))
}

/// Configuration for subscription plan routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions/plans")
            .route("", web::get().to(list_plans))
            .route("", web::post().to(create_plan))
            .route("/{id}", web::put().to(update_plan))
            .route("/{id}", web::delete().to(delete_plan)),
    );
}
