// src/handlers/payments.rs
// DOCUMENTATION: HTTP handlers for checkout payments and venue subscriptions
// PURPOSE: Order creation, signature verification, payment history and /payments/venue/*

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::*;
use crate::services::{AuthUser, PaymentService, RazorpayClient};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// POST /payments/create-order
/// `amount` in rupees, or a `booking_id` to pay for; the response carries paise
pub async fn create_order(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    user: AuthUser,
    req: web::Json<CreateOrderRequest>,
) -> Result<impl Responder, ApiError> {
    let order =
        PaymentService::create_order(pool.get_ref(), &razorpay, &user.0, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /payments/verify
pub async fn verify_payment(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    user: AuthUser,
    req: web::Json<VerifyPaymentRequest>,
) -> Result<impl Responder, ApiError> {
    let result = PaymentService::verify(pool.get_ref(), &razorpay, &user.0, &req).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /payments/user/payment-history
pub async fn payment_history(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let history = PaymentService::history(pool.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// GET /payments/owner/payment-history
pub async fn owner_payment_history(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    user.require_admin()?;

    let history = PaymentService::owner_history(pool.get_ref(), &user.0).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// POST /payments/venue/create-order
pub async fn create_venue_order(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    config: web::Data<Config>,
    user: AuthUser,
    req: web::Json<VenueOrderRequest>,
) -> Result<impl Responder, ApiError> {
    let order =
        PaymentService::create_venue_order(pool.get_ref(), &razorpay, &config, &user.0, &req)
            .await?;
    Ok(HttpResponse::Ok().json(order))
}

/// POST /payments/venue/verify
pub async fn verify_venue_payment(
    pool: web::Data<PgPool>,
    razorpay: web::Data<RazorpayClient>,
    config: web::Data<Config>,
    user: AuthUser,
    req: web::Json<VerifyVenuePaymentRequest>,
) -> Result<impl Responder, ApiError> {
    let result =
        PaymentService::verify_venue_payment(pool.get_ref(), &razorpay, &config, &user.0, &req)
            .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /payments/venue/dev-bypass
pub async fn dev_bypass(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthUser,
    req: web::Json<DevBypassRequest>,
) -> Result<impl Responder, ApiError> {
    let result = PaymentService::dev_bypass(pool.get_ref(), &config, &user.0, &req).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /payments/venue/status/{venue_id}?venue_type=
pub async fn venue_status(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<VenueStatusQuery>,
) -> Result<impl Responder, ApiError> {
    let status =
        PaymentService::venue_status(pool.get_ref(), &user.0, path.into_inner(), query.venue_type)
            .await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Configuration for payment routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/create-order", web::post().to(create_order))
            .route("/verify", web::post().to(verify_payment))
            .route("/user/payment-history", web::get().to(payment_history))
            .route("/owner/payment-history", web::get().to(owner_payment_history))
            .service(
                web::scope("/venue")
                    .route("/create-order", web::post().to(create_venue_order))
                    .route("/verify", web::post().to(verify_venue_payment))
                    .route("/dev-bypass", web::post().to(dev_bypass))
                    .route("/status/{venue_id}", web::get().to(venue_status)),
            ),
    );
}
