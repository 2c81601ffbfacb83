// src/handlers/users.rs
// DOCUMENTATION: HTTP handlers for user administration
// PURPOSE: Super admin listing and editing of accounts

use crate::db::UserRepository;
use crate::errors::ApiError;
use crate::models::{AdminUserUpdate, UserListQuery, UserResponse};
use crate::services::AuthUser;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /users?role=
pub async fn list_users(
    pool: web::Data<PgPool>,
    user: AuthUser,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let users: Vec<UserResponse> = UserRepository::list(pool.get_ref(), query.role)
        .await?
        .iter()
        .map(|u| u.to_response())
        .collect();
    Ok(HttpResponse::Ok().json(users))
}

/// GET /users/{id}
/// Own account, or any account for admins
pub async fn get_user(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    if user.0.id != id {
        user.require_admin()?;
    }

    let found = UserRepository::get_by_id(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(found.to_response()))
}

/// PUT /users/{id}
pub async fn update_user(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<AdminUserUpdate>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let id = path.into_inner();
    let updated = UserRepository::update(pool.get_ref(), id, &req).await?;

    log::info!("User {} updated by super admin {}", id, user.0.id);
    Ok(HttpResponse::Ok().json(updated.to_response()))
}

/// Configuration for user routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user)),
    );
}
