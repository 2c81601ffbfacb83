// src/handlers/accommodations.rs
// DOCUMENTATION: HTTP handlers for PG and hostel listings
// PURPOSE: Search, owner CRUD; lifecycle routes come from handlers::listing

use crate::db::AccommodationRepository;
use crate::errors::ApiError;
use crate::handlers::listing::lifecycle_routes;
use crate::models::*;
use crate::services::{AuthUser, ListingService, MaybeUser};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const KIND: VenueType = VenueType::Accommodation;

fn responses(items: Vec<Accommodation>) -> Vec<AccommodationResponse> {
    items.into_iter().map(Accommodation::to_response).collect()
}

/// GET /accommodations
/// Query: location, price_max, gender, type, limit, offset, include_unverified
pub async fn search_accommodations(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<AccommodationListQuery>,
) -> Result<impl Responder, ApiError> {
    if query.price_max.map_or(false, |p| p < 0.0) {
        return Err(ApiError::InvalidInput(
            "price_max must not be negative".to_string(),
        ));
    }

    let visibility = ListingVisibility::new(viewer.0.as_ref(), query.include_unverified);
    let items = AccommodationRepository::search(pool.get_ref(), visibility, &query).await?;
    Ok(HttpResponse::Ok().json(responses(items)))
}

/// GET /accommodations/my
pub async fn my_accommodations(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let items = AccommodationRepository::list_by_owner(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(responses(items)))
}

/// POST /accommodations
pub async fn create_accommodation(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateAccommodationRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_admin()?;
    req.validate()?;

    let city = req.city.as_deref().map(normalize_city);
    let item = AccommodationRepository::create(pool.get_ref(), user.0.id, &req, city).await?;

    log::info!("Accommodation {} created by {}", item.id, user.0.id);
    Ok(HttpResponse::Created().json(item.to_response()))
}

/// GET /accommodations/{id}
pub async fn get_accommodation(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let item = AccommodationRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;

    if !can_view_listing(viewer.0.as_ref(), item.owner_id, item.status) {
        return Err(ApiError::Forbidden(
            "This accommodation is not published".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(item.to_response()))
}

/// PUT /accommodations/{id}
pub async fn update_accommodation(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateAccommodationRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let id = path.into_inner();
    ListingService::get_owned(pool.get_ref(), KIND, id, &user.0).await?;

    let city = req.city.as_deref().map(normalize_city);
    let item = AccommodationRepository::update(pool.get_ref(), id, &req, city).await?;
    Ok(HttpResponse::Ok().json(item.to_response()))
}

/// Configuration for accommodation routes
pub fn config(cfg: &mut web::ServiceConfig) {
    let scope = web::scope("/accommodations")
        .route("", web::get().to(search_accommodations))
        .route("", web::post().to(create_accommodation))
        .route("/my", web::get().to(my_accommodations))
        .route("/{id}", web::get().to(get_accommodation))
        .route("/{id}", web::put().to(update_accommodation));

    cfg.service(lifecycle_routes(scope, KIND));
}
