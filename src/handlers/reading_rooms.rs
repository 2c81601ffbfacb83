// src/handlers/reading_rooms.rs
// DOCUMENTATION: HTTP handlers for reading rooms and their cabins
// PURPOSE: Parse requests, call repositories/services, return responses

use crate::db::ReadingRoomRepository;
use crate::errors::ApiError;
use crate::handlers::listing::lifecycle_routes;
use crate::models::*;
use crate::services::geo::{self, DEFAULT_RADIUS_KM};
use crate::services::{AuthUser, ListingService, MaybeUser};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const KIND: VenueType = VenueType::ReadingRoom;

/// Rooms plus optional nearest-first radius filtering
fn near(
    rooms: Vec<ReadingRoom>,
    query: &ReadingRoomListQuery,
) -> Result<Vec<ReadingRoomResponse>, ApiError> {
    if query.lat.is_none() && query.long.is_none() {
        return Ok(rooms.into_iter().map(|r| r.to_response(None)).collect());
    }

    let center = geo::valid_point(query.lat, query.long).ok_or_else(|| {
        ApiError::InvalidInput("lat and long must both be valid coordinates".to_string())
    })?;
    let radius = query.radius.unwrap_or(DEFAULT_RADIUS_KM);
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ApiError::InvalidInput("radius must be positive".to_string()));
    }

    Ok(
        geo::within_radius(rooms, center, radius, |r| geo::valid_point(r.latitude, r.longitude))
            .into_iter()
            .map(|(room, distance)| room.to_response(Some(distance)))
            .collect(),
    )
}

/// GET /reading-rooms
/// Query: lat, long, radius (km), include_unverified
pub async fn list_rooms(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    query: web::Query<ReadingRoomListQuery>,
) -> Result<impl Responder, ApiError> {
    let visibility = ListingVisibility::new(viewer.0.as_ref(), query.include_unverified);
    let rooms = ReadingRoomRepository::list_visible(pool.get_ref(), visibility).await?;
    Ok(HttpResponse::Ok().json(near(rooms, &query)?))
}

/// GET /reading-rooms/my-venues
pub async fn my_venues(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    let rooms: Vec<ReadingRoomResponse> =
        ReadingRoomRepository::list_by_owner(pool.get_ref(), user.0.id)
            .await?
            .into_iter()
            .map(|r| r.to_response(None))
            .collect();
    Ok(HttpResponse::Ok().json(rooms))
}

/// POST /reading-rooms
/// New rooms start as DRAFT
pub async fn create_room(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<CreateReadingRoomRequest>,
) -> Result<impl Responder, ApiError> {
    user.require_admin()?;
    req.validate()?;

    let city = req.city.as_deref().map(normalize_city);
    let room = ReadingRoomRepository::create(pool.get_ref(), user.0.id, &req, city).await?;

    log::info!("Reading room {} created by {}", room.id, user.0.id);
    Ok(HttpResponse::Created().json(room.to_response(None)))
}

/// GET /reading-rooms/{id}
pub async fn get_room(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let room = ReadingRoomRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;

    if !can_view_listing(viewer.0.as_ref(), room.owner_id, room.status) {
        return Err(ApiError::Forbidden(
            "This reading room is not published".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(room.to_response(None)))
}

/// PUT /reading-rooms/{id}
/// Partial update by the owner; never changes status
pub async fn update_room(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateReadingRoomRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let id = path.into_inner();
    ListingService::get_owned(pool.get_ref(), KIND, id, &user.0).await?;

    let city = req.city.as_deref().map(normalize_city);
    let room = ReadingRoomRepository::update(pool.get_ref(), id, &req, city).await?;
    Ok(HttpResponse::Ok().json(room.to_response(None)))
}

/// GET /reading-rooms/{id}/cabins
pub async fn list_cabins(
    pool: web::Data<PgPool>,
    viewer: MaybeUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let room = ReadingRoomRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    if !can_view_listing(viewer.0.as_ref(), room.owner_id, room.status) {
        return Err(ApiError::Forbidden(
            "This reading room is not published".to_string(),
        ));
    }

    let cabins = ReadingRoomRepository::list_cabins(pool.get_ref(), room.id).await?;
    Ok(HttpResponse::Ok().json(cabins))
}

/// POST /reading-rooms/{id}/cabins
pub async fn create_cabin(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<CreateCabinRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let room_id = path.into_inner();
    ListingService::get_owned(pool.get_ref(), KIND, room_id, &user.0).await?;

    let cabin = ReadingRoomRepository::create_cabin(pool.get_ref(), room_id, &req).await?;
    Ok(HttpResponse::Created().json(cabin))
}

/// POST /reading-rooms/{id}/cabins/batch
/// Creates cabins `prefix + n` for n in start..=end
pub async fn create_cabin_batch(
    pool: web::Data<PgPool>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<CabinBatchRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    let numbers = req.numbers().map_err(ApiError::InvalidInput)?;

    let room_id = path.into_inner();
    ListingService::get_owned(pool.get_ref(), KIND, room_id, &user.0).await?;

    let cabins =
        ReadingRoomRepository::create_cabins(pool.get_ref(), room_id, &numbers, &req).await?;

    log::info!("Created {} cabins in reading room {}", cabins.len(), room_id);
    Ok(HttpResponse::Created().json(cabins))
}

/// GET /reading-rooms/my-students
/// Students who booked cabins in any of the caller's rooms
pub async fn my_students(
    pool: web::Data<PgPool>,
    user: AuthUser,
) -> Result<impl Responder, ApiError> {
    user.require_admin()?;

    let students = ReadingRoomRepository::list_students(pool.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(students))
}

/// GET /reading-rooms/{id}/active-students
pub async fn active_students(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let room = ReadingRoomRepository::get_by_id(pool.get_ref(), path.into_inner()).await?;
    let active_students = ReadingRoomRepository::count_active_students(pool.get_ref(), room.id).await?;

    Ok(HttpResponse::Ok().json(ActiveStudentsResponse {
        reading_room_id: room.id,
        active_students,
    }))
}

/// Configuration for reading room routes
pub fn config(cfg: &mut web::ServiceConfig) {
    let scope = web::scope("/reading-rooms")
        .route("", web::get().to(list_rooms))
        .route("", web::post().to(create_room))
        .route("/my-venues", web::get().to(my_venues))
        .route("/my-students", web::get().to(my_students))
        .route("/{id}", web::get().to(get_room))
        .route("/{id}", web::put().to(update_room))
        .route("/{id}/cabins", web::get().to(list_cabins))
        .route("/{id}/cabins", web::post().to(create_cabin))
        .route("/{id}/cabins/batch", web::post().to(create_cabin_batch))
        .route("/{id}/active-students", web::get().to(active_students));

    cfg.service(lifecycle_routes(scope, KIND));
}
