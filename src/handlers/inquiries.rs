// src/handlers/inquiries.rs
// DOCUMENTATION: HTTP handlers for accommodation inquiries
// PURPOSE: Students ask or request visits, owners reply; notifications are logged

use crate::db::{AccommodationRepository, InquiryRepository};
use crate::errors::ApiError;
use crate::models::*;
use crate::services::AuthUser;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /inquiries
pub async fn create_inquiry(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateInquiryRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    req.check_visit_details().map_err(ApiError::ValidationError)?;

    let accommodation = AccommodationRepository::get_by_id(pool.get_ref(), req.accommodation_id).await?;
    let inquiry =
        InquiryRepository::create(pool.get_ref(), user.0.id, accommodation.owner_id, &req).await?;

    log::info!(
        "Notify owner {}: new {:?} inquiry {} about '{}'",
        accommodation.owner_id,
        inquiry.type_field,
        inquiry.id,
        accommodation.name
    );
    Ok(HttpResponse::Created().json(inquiry))
}

/// GET /inquiries/my
pub async fn my_inquiries(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let inquiries = InquiryRepository::list_by_student(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(inquiries))
}

/// GET /inquiries/received
pub async fn received_inquiries(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let inquiries = InquiryRepository::list_by_owner(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(inquiries))
}

/// PUT /inquiries/{id}/reply
pub async fn reply_inquiry(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<ReplyRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let inquiry = InquiryRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    if inquiry.owner_id != user.0.id {
        return Err(ApiError::Forbidden(
            "Only the accommodation owner can reply".to_string(),
        ));
    }
    if inquiry.status == InquiryStatus::Closed {
        return Err(ApiError::Conflict("Inquiry is closed".to_string()));
    }

    InquiryRepository::reply(pool.get_ref(), inquiry.id, req.reply.trim()).await?;
    let updated = InquiryRepository::get_by_id(pool.get_ref(), inquiry.id).await?;

    log::info!(
        "Notify student {}: reply to inquiry {}",
        updated.student_id,
        updated.id
    );
    Ok(HttpResponse::Ok().json(updated))
}

/// PUT /inquiries/{id}/close
pub async fn close_inquiry(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let inquiry = InquiryRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    if inquiry.owner_id != user.0.id && inquiry.student_id != user.0.id {
        return Err(ApiError::Forbidden(
            "You are not part of this inquiry".to_string(),
        ));
    }

    InquiryRepository::set_status(pool.get_ref(), inquiry.id, InquiryStatus::Closed).await?;
    let updated = InquiryRepository::get_by_id(pool.get_ref(), inquiry.id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// GET /inquiries/count/pending
pub async fn pending_count(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let count = InquiryRepository::count_pending(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(PendingCountResponse { count }))
}

/// Configuration for inquiry routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/inquiries")
            .route("", web::post().to(create_inquiry))
            .route("/my", web::get().to(my_inquiries))
            .route("/received", web::get().to(received_inquiries))
            .route("/count/pending", web::get().to(pending_count))
            .route("/{id}/reply", web::put().to(reply_inquiry))
            .route("/{id}/close", web::put().to(close_inquiry)),
    );
}
