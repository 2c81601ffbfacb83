// src/db/review_repository.rs
// DOCUMENTATION: Database operations for venue reviews
// PURPOSE: Insert reviews, list them by venue or author, and check stay history

use crate::db::user_repository::is_unique_violation;
use crate::errors::ApiError;
use crate::models::*;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const REVIEW_SELECT: &str = "SELECT rv.id, rv.user_id, u.name AS user_name, rv.reading_room_id, \
     rv.accommodation_id, rv.rating, rv.comment, rv.created_at \
     FROM reviews rv JOIN users u ON u.id = rv.user_id";

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    log::error!("{}: {}", context, e);
    ApiError::DatabaseError(e.to_string())
}

fn target_columns(kind: VenueType, id: Uuid) -> (Option<Uuid>, Option<Uuid>) {
    match kind {
        VenueType::ReadingRoom => (Some(id), None),
        VenueType::Accommodation => (None, Some(id)),
    }
}

pub struct ReviewRepository;

impl ReviewRepository {
    /// Insert a review; accommodation ratings are recomputed in the same transaction
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        kind: VenueType,
        venue_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, ApiError> {
        let (room_id, accommodation_id) = target_columns(kind, venue_id);
        let id = Uuid::new_v4();

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin review", e))?;

        sqlx::query(
            "INSERT INTO reviews (id, user_id, reading_room_id, accommodation_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(user_id)
        .bind(room_id)
        .bind(accommodation_id)
        .bind(rating)
        .bind(comment)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyExists("You have already reviewed this venue".to_string())
            } else {
                db_error("Failed to insert review", e)
            }
        })?;

        if let Some(accommodation_id) = accommodation_id {
            sqlx::query(
                "UPDATE accommodations SET rating = (
                    SELECT ROUND(AVG(rating)::numeric, 1)::double precision
                    FROM reviews WHERE accommodation_id = $1
                 )
                 WHERE id = $1",
            )
            .bind(accommodation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to update accommodation rating", e))?;
        }

        let sql = format!("{} WHERE rv.id = $1", REVIEW_SELECT);
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to load review", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit review", e))?;

        log::info!("Review {} of {} {} by {}", id, kind.as_str(), venue_id, user_id);
        Ok(review)
    }

    pub async fn list(pool: &PgPool, query: &ReviewListQuery) -> Result<Vec<Review>, ApiError> {
        let sql = format!(
            "{} WHERE ($1::uuid IS NULL OR rv.reading_room_id = $1)
               AND ($2::uuid IS NULL OR rv.accommodation_id = $2)
               AND ($3::uuid IS NULL OR rv.user_id = $3)
             ORDER BY rv.created_at DESC",
            REVIEW_SELECT
        );

        sqlx::query_as::<_, Review>(&sql)
            .bind(query.reading_room_id)
            .bind(query.accommodation_id)
            .bind(query.user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Failed to list reviews", e))
    }

    pub async fn has_reviewed(
        pool: &PgPool,
        user_id: Uuid,
        kind: VenueType,
        venue_id: Uuid,
    ) -> Result<bool, ApiError> {
        let (room_id, accommodation_id) = target_columns(kind, venue_id);
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM reviews
                WHERE user_id = $1 AND (reading_room_id = $2 OR accommodation_id = $3)
             )",
        )
        .bind(user_id)
        .bind(room_id)
        .bind(accommodation_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Failed to check existing review", e))?;

        Ok(exists)
    }

    /// A paid ACTIVE or EXPIRED booking at the venue that started before `cutoff`
    pub async fn has_stay(
        pool: &PgPool,
        user_id: Uuid,
        kind: VenueType,
        venue_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let (room_id, accommodation_id) = target_columns(kind, venue_id);
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM bookings b
                LEFT JOIN cabins c ON c.id = b.cabin_id
                WHERE b.user_id = $1
                  AND b.status IN ('ACTIVE', 'EXPIRED')
                  AND b.payment_status = 'PAID'
                  AND b.start_date <= $4
                  AND (c.reading_room_id = $2 OR b.accommodation_id = $3)
            )
            "#,
        )
        .bind(user_id)
        .bind(room_id)
        .bind(accommodation_id)
        .bind(cutoff)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Failed to check stay history", e))?;

        Ok(exists)
    }
}
