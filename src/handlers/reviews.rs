// src/handlers/reviews.rs
// DOCUMENTATION: HTTP handlers for venue reviews
// PURPOSE: Eligibility check, review creation and public review lists

use crate::db::ReviewRepository;
use crate::errors::ApiError;
use crate::models::{CreateReviewRequest, FavoriteTarget, ReviewListQuery, ReviewSummary};
use crate::services::{AuthUser, ReviewService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// GET /reviews/eligibility?reading_room_id= | accommodation_id=
pub async fn eligibility(
    pool: web::Data<PgPool>,
    user: AuthUser,
    query: web::Query<FavoriteTarget>,
) -> Result<impl Responder, ApiError> {
    let (kind, venue_id) = query.resolve().ok_or_else(|| {
        ApiError::InvalidInput(
            "Provide exactly one of reading_room_id or accommodation_id".to_string(),
        )
    })?;

    let result = ReviewService::eligibility(pool.get_ref(), &user.0, kind, venue_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /reviews
pub async fn create_review(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateReviewRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let review = ReviewService::create(pool.get_ref(), &user.0, &req).await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /reviews?reading_room_id= | accommodation_id= | user_id=
pub async fn list_reviews(
    pool: web::Data<PgPool>,
    query: web::Query<ReviewListQuery>,
) -> Result<impl Responder, ApiError> {
    if query.is_empty() {
        return Err(ApiError::InvalidInput(
            "Filter by reading_room_id, accommodation_id or user_id".to_string(),
        ));
    }

    let reviews = ReviewRepository::list(pool.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(ReviewSummary::new(reviews)))
}

/// Configuration for review routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .route("", web::get().to(list_reviews))
            .route("", web::post().to(create_review))
            .route("/eligibility", web::get().to(eligibility)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use actix_web::{http::StatusCode, test, App};

    #[actix_rt::test]
    async fn test_list_needs_a_filter() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(Config::for_tests()))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/reviews").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/reviews")
            .set_json(serde_json::json!({ "rating": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
