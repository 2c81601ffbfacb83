// src/handlers/cabins.rs
// DOCUMENTATION: HTTP handlers for managing existing cabins
// PURPOSE: Single and bulk updates, bulk deletion by the room owner

use crate::errors::ApiError;
use crate::models::{BulkCabinDeleteRequest, BulkCabinUpdateRequest, UpdateCabinRequest};
use crate::services::{AuthUser, CabinService};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// PUT /cabins/{id}
pub async fn update_cabin(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCabinRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let cabin = CabinService::update(pool.get_ref(), &user.0, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(cabin))
}

/// PATCH /cabins/bulk
pub async fn bulk_update(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<BulkCabinUpdateRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let result = CabinService::bulk_update(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /cabins/bulk-delete
pub async fn bulk_delete(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<BulkCabinDeleteRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let deleted = CabinService::bulk_delete(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": deleted })))
}

/// Configuration for cabin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cabins")
            .route("/bulk", web::patch().to(bulk_update))
            .route("/bulk-delete", web::post().to(bulk_delete))
            .route("/{id}", web::put().to(update_cabin)),
    );
}
