// src/handlers/listing.rs
// DOCUMENTATION: Lifecycle routes shared by /reading-rooms and /accommodations
// PURPOSE: Submit-for-verification, super admin review and deletion
//
// Each listing scope registers its `VenueType` as scope-level app data, so
// the same handlers serve both kinds.

use crate::errors::ApiError;
use crate::models::{ListingStatus, RejectRequest, ReviewChecklist, VenueType};
use crate::services::{AuthUser, ListingService};
use actix_web::{web, HttpResponse, Responder, Scope};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Response for every status change
#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub id: Uuid,
    pub status: ListingStatus,
    pub message: String,
}

fn changed(id: Uuid, status: ListingStatus, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(StatusChangeResponse {
        id,
        status,
        message: message.to_string(),
    })
}

/// PUT /{id}/submit-payment
pub async fn submit_payment(
    pool: web::Data<PgPool>,
    kind: web::Data<VenueType>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    let status =
        ListingService::submit_for_verification(pool.get_ref(), **kind, id, &user.0).await?;
    Ok(changed(id, status, "Submitted for verification"))
}

/// PUT /{id}/verify
/// Body: {documents_checked, location_checked}
pub async fn verify(
    pool: web::Data<PgPool>,
    kind: web::Data<VenueType>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<ReviewChecklist>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let id = path.into_inner();
    ListingService::verify(pool.get_ref(), **kind, id, &user.0, &req).await?;
    Ok(changed(id, ListingStatus::Live, "Listing verified and live"))
}

/// PUT /{id}/reject
pub async fn reject(
    pool: web::Data<PgPool>,
    kind: web::Data<VenueType>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<RejectRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;
    req.validate()?;

    let id = path.into_inner();
    ListingService::reject(pool.get_ref(), **kind, id, &user.0, &req.reason).await?;
    Ok(changed(id, ListingStatus::Rejected, "Listing rejected"))
}

/// PUT /{id}/suspend
pub async fn suspend(
    pool: web::Data<PgPool>,
    kind: web::Data<VenueType>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let id = path.into_inner();
    let status = ListingService::set_suspended(pool.get_ref(), **kind, id, &user.0, true).await?;
    Ok(changed(id, status, "Listing suspended"))
}

/// PUT /{id}/reinstate
pub async fn reinstate(
    pool: web::Data<PgPool>,
    kind: web::Data<VenueType>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    user.require_super_admin()?;

    let id = path.into_inner();
    let status = ListingService::set_suspended(pool.get_ref(), **kind, id, &user.0, false).await?;
    Ok(changed(id, status, "Listing reinstated"))
}

/// DELETE /{id}
pub async fn delete(
    pool: web::Data<PgPool>,
    kind: web::Data<VenueType>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    ListingService::delete(pool.get_ref(), **kind, id, &user.0).await?;

    log::info!("{} {} deleted by owner {}", kind.as_str(), id, user.0.id);
    Ok(HttpResponse::NoContent().finish())
}

/// Attach the lifecycle routes and the venue kind to a listing scope
pub fn lifecycle_routes(scope: Scope, kind: VenueType) -> Scope {
    scope
        .app_data(web::Data::new(kind))
        .route("/{id}", web::delete().to(delete))
        .route("/{id}/submit-payment", web::put().to(submit_payment))
        .route("/{id}/verify", web::put().to(verify))
        .route("/{id}/reject", web::put().to(reject))
        .route("/{id}/suspend", web::put().to(suspend))
        .route("/{id}/reinstate", web::put().to(reinstate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::{http::StatusCode, test, App};

    #[actix_rt::test]
    async fn test_review_routes_require_login() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(Config::for_tests()))
                .service(lifecycle_routes(
                    web::scope("/reading-rooms"),
                    VenueType::ReadingRoom,
                )),
        )
        .await;

        let id = Uuid::new_v4();
        for action in ["submit-payment", "verify", "reject", "suspend", "reinstate"] {
            let req = test::TestRequest::put()
                .uri(&format!("/reading-rooms/{}/{}", id, action))
                .set_json(serde_json::json!({}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", action);
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_verify_with_empty_body_is_rejected(pool: PgPool) {
        let config = Config::for_tests();
        let owner = crate::test_support::user(&pool, crate::models::UserRole::Admin).await;
        let reviewer = crate::test_support::user(&pool, crate::models::UserRole::SuperAdmin).await;
        let room =
            crate::test_support::reading_room(&pool, &owner, ListingStatus::VerificationPending)
                .await;
        let token = crate::services::auth::create_token(reviewer.id, &config).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(config))
                .service(lifecycle_routes(
                    web::scope("/reading-rooms"),
                    VenueType::ReadingRoom,
                )),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/reading-rooms/{}/verify", room))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            crate::test_support::listing_status(&pool, room).await,
            ListingStatus::VerificationPending
        );
    }
}
