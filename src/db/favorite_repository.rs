// src/db/favorite_repository.rs
// DOCUMENTATION: Database operations for favorites
// PURPOSE: Save, list, check and remove favorite listings

use crate::db::user_repository::is_unique_violation;
use crate::errors::ApiError;
use crate::models::{Favorite, VenueType};
use sqlx::PgPool;
use uuid::Uuid;

/// Favorite columns enriched from whichever listing the row points at
const FAVORITE_SELECT: &str = r#"
    SELECT f.id, f.user_id, f.accommodation_id, f.reading_room_id, f.created_at,
           COALESCE(a.name, r.name) AS item_name,
           CASE WHEN f.accommodation_id IS NOT NULL THEN 'accommodation'::venue_type
                ELSE 'reading_room'::venue_type END AS item_type,
           COALESCE(a.images[1], r.images[1]) AS item_image,
           COALESCE(a.price, r.price_start) AS item_price,
           COALESCE(a.city, r.city) AS item_city
    FROM favorites f
    LEFT JOIN accommodations a ON a.id = f.accommodation_id
    LEFT JOIN reading_rooms r ON r.id = f.reading_room_id
"#;

fn target_column(kind: VenueType) -> &'static str {
    match kind {
        VenueType::ReadingRoom => "reading_room_id",
        VenueType::Accommodation => "accommodation_id",
    }
}

pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Save an item; saving it twice maps to AlreadyExists
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        kind: VenueType,
        item_id: Uuid,
    ) -> Result<Favorite, ApiError> {
        let sql = format!(
            "INSERT INTO favorites (id, user_id, {}) VALUES ($1, $2, $3) RETURNING id",
            target_column(kind)
        );

        let (id,): (Uuid,) = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(item_id)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return ApiError::AlreadyExists("Item already in favorites".to_string());
                }
                log::error!("Failed to create favorite: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        let sql = format!("{} WHERE f.id = $1", FAVORITE_SELECT);
        sqlx::query_as::<_, Favorite>(&sql)
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to reload favorite {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Favorite>, ApiError> {
        let sql = format!(
            "{} WHERE f.user_id = $1 ORDER BY f.created_at DESC",
            FAVORITE_SELECT
        );

        sqlx::query_as::<_, Favorite>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list favorites of user {}: {}", user_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Id of the user's favorite for the item, if saved
    pub async fn find(
        pool: &PgPool,
        user_id: Uuid,
        kind: VenueType,
        item_id: Uuid,
    ) -> Result<Option<Uuid>, ApiError> {
        let sql = format!(
            "SELECT id FROM favorites WHERE user_id = $1 AND {} = $2",
            target_column(kind)
        );

        let row: Option<(Uuid,)> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to check favorite: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok(row.map(|(id,)| id))
    }

    /// Remove one of the user's favorites; other users' rows are never touched
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM favorites WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to delete favorite {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Favorite".to_string()));
        }
        Ok(())
    }
}
