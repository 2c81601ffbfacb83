// src/handlers/boost.rs
// DOCUMENTATION: HTTP handlers for boost plans and boost requests
// PURPOSE: Plan catalogue, owner requests/payments, super admin review, featured list

use crate::db::BoostRepository;
use crate::errors::ApiError;
use crate::models::*;
use crate::services::{AuthUser, BoostService, MaybeUser, RazorpayClient};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /boost/plans
pub async fn list_plans(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<PlanListQuery>,
) -> Result<impl Responder, ApiError> {
    let include_inactive =
        query.include_inactive && viewer.0.as_ref().map_or(false, |u| u.is_super_admin());

    let plans = BoostRepository::list_plans(pool.get_ref(), include_inactive).await?;
    Ok(HttpResponse::Ok().json(plans))
}

/// POST /boost/plans
pub async fn create_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateBoostPlanRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let plan = BoostRepository::create_plan(pool.get_ref(), user.0.id, &req).await?;
    log::info!("Boost plan {} ({}) created", plan.id, plan.name);
    Ok(HttpResponse::Created().json(plan))
}

/// PUT /boost/plans/{id}
pub async fn update_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateBoostPlanRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let plan = BoostRepository::update_plan(pool.get_ref(), path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(plan))
}

/// DELETE /boost/plans/{id}
/// Plans with requests are marked inactive instead
pub async fn delete_plan(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let id = path.into_inner();
    BoostRepository::find_plan(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Boost plan".to_string()))?;

    let deleted = BoostRepository::delete_plan(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": id, "deleted": deleted, "deactivated": !deleted })))
}

/// POST /boost/request
pub async fn create_request(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateBoostRequest>,
) -> Result<impl Responder, ApiError> {
    let request = BoostService::request(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Created().json(request))
}

/// GET /boost/my-requests
pub async fn my_requests(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let requests = BoostRepository::list_by_owner(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// POST /boost/request/{id}/order
pub async fn order_request(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let order =
        BoostService::create_order(pool.get_ref(), &razorpay, &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// PUT /boost/request/{id}/pay
pub async fn pay_request(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<PayBoostRequest>,
) -> Result<impl Responder, ApiError> {
    let request =
        BoostService::pay(pool.get_ref(), &razorpay, &user.0, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// GET /boost/requests?status_filter=
pub async fn list_requests(
    pool: web::Data<PgPool>,
    user: AuthUser,
    query: web::Query<BoostRequestQuery>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let requests = BoostRepository::list_all(pool.get_ref(), query.status_filter).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// PUT /boost/requests/{id}/approve
pub async fn approve_request(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: Option<web::Json<ApproveBoostRequest>>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let body = req.map(web::Json::into_inner).unwrap_or_default();
    let request = BoostService::approve(pool.get_ref(), &user.0, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// PUT /boost/requests/{id}/reject
pub async fn reject_request(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<RejectBoostRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let request = BoostService::reject(pool.get_ref(), &user.0, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// GET /boost/featured?venue_type=
pub async fn featured(
    pool: web::Data<PgPool>,
    query: web::Query<FeaturedQuery>,
) -> Result<impl Responder, ApiError> {
    let boosts = BoostRepository::list_featured(pool.get_ref(), query.venue_type).await?;
    Ok(HttpResponse::Ok().json(boosts))
}

/// Configuration for boost routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/boost")
            .route("/plans", web::get().to(list_plans))
            .route("/plans", web::post().to(create_plan))
            .route("/plans/{id}", web::put().to(update_plan))
            .route("/plans/{id}", web::delete().to(delete_plan))
            .route("/request", web::post().to(create_request))
            .route("/request/{id}/order", web::post().to(order_request))
            .route("/request/{id}/pay", web::put().to(pay_request))
            .route("/my-requests", web::get().to(my_requests))
            .route("/requests", web::get().to(list_requests))
            .route("/requests/{id}/approve", web::put().to(approve_request))
            .route("/requests/{id}/reject", web::put().to(reject_request))
            .route("/featured", web::get().to(featured)),
    );
}
