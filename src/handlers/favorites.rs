// src/handlers/favorites.rs
// DOCUMENTATION: HTTP handlers for saved listings
// PURPOSE: Add, list, check and remove favorites

use crate::db::FavoriteRepository;
use crate::errors::ApiError;
use crate::models::{FavoriteCheckResponse, FavoriteTarget, VenueType};
use crate::services::{AuthUser, ListingService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

fn resolve(target: &FavoriteTarget) -> Result<(VenueType, Uuid), ApiError> {
    target.resolve().ok_or_else(|| {
        ApiError::InvalidInput(
            "Provide exactly one of accommodation_id or reading_room_id".to_string(),
        )
    })
}

/// POST /favorites
/// Only listings the caller can see may be saved
pub async fn add_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<FavoriteTarget>,
) -> Result<impl Responder, ApiError> {
    let (kind, item_id) = resolve(&req)?;
    ListingService::get_visible(pool.get_ref(), kind, item_id, Some(&user.0)).await?;

    let favorite = FavoriteRepository::create(pool.get_ref(), user.0.id, kind, item_id).await?;
    Ok(HttpResponse::Created().json(favorite))
}

/// GET /favorites
pub async fn list_favorites(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let favorites = FavoriteRepository::list_by_user(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

/// GET /favorites/check?accommodation_id= | reading_room_id=
pub async fn check_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    query: web::Query<FavoriteTarget>,
) -> Result<impl Responder, ApiError> {
    let (kind, item_id) = resolve(&query)?;
    let favorite_id = FavoriteRepository::find(pool.get_ref(), user.0.id, kind, item_id).await?;

    Ok(HttpResponse::Ok().json(FavoriteCheckResponse {
        is_favorited: favorite_id.is_some(),
        favorite_id,
    }))
}

/// DELETE /favorites/{id}
pub async fn remove_favorite(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    FavoriteRepository::delete(pool.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for favorite routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/favorites")
            .route("", web::post().to(add_favorite))
            .route("", web::get().to(list_favorites))
            .route("/check", web::get().to(check_favorite))
            .route("/{id}", web::delete().to(remove_favorite)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{ListingStatus, UserRole};
    use crate::services::auth::create_token;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_unpublished_listing_cannot_be_saved(pool: PgPool) {
        let settings = Config::for_tests();
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let student = test_support::user(&pool, UserRole::Student).await;
        let draft = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;
        let live = test_support::reading_room(&pool, &owner, ListingStatus::Live).await;
        let token = create_token(student.id, &settings).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(settings))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/favorites")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "reading_room_id": draft }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/favorites")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({ "reading_room_id": live }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
