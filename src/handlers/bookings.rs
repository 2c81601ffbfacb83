// src/handlers/bookings.rs
// DOCUMENTATION: HTTP handlers for cabin holds and bookings
// PURPOSE: Hold -> confirm flow, direct bookings, cancel/extend and lookups

use crate::errors::ApiError;
use crate::models::{ConfirmQuery, CreateBookingRequest, ExtendBookingRequest, HoldRequest};
use crate::services::{AuthUser, BookingService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// POST /bookings/hold
/// Reserves the cabin for 10 minutes
pub async fn hold_cabin(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<HoldRequest>,
) -> Result<impl Responder, ApiError> {
    let booking = BookingService::hold(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Created().json(booking))
}

/// POST /bookings/{id}/confirm?payment_id=
pub async fn confirm_booking(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<ConfirmQuery>,
) -> Result<impl Responder, ApiError> {
    let booking = BookingService::confirm(
        pool.get_ref(),
        &user.0,
        path.into_inner(),
        query.payment_id.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /bookings/{id}/cancel
pub async fn cancel_booking(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let booking = BookingService::cancel(pool.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /bookings/extend
pub async fn extend_booking(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<ExtendBookingRequest>,
) -> Result<impl Responder, ApiError> {
    let booking = BookingService::extend(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// POST /bookings
pub async fn create_booking(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateBookingRequest>,
) -> Result<impl Responder, ApiError> {
    let booking = BookingService::create(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Created().json(booking))
}

/// GET /bookings
pub async fn list_bookings(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let bookings = BookingService::list(pool.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(bookings))
}

/// GET /bookings/{id}
pub async fn get_booking(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let booking = BookingService::get(pool.get_ref(), &user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(booking))
}

/// Configuration for booking routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::get().to(list_bookings))
            .route("", web::post().to(create_booking))
            .route("/hold", web::post().to(hold_cabin))
            .route("/extend", web::post().to(extend_booking))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/confirm", web::post().to(confirm_booking))
            .route("/{id}/cancel", web::post().to(cancel_booking)),
    );
}
