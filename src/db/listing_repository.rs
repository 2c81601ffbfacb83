// src/db/listing_repository.rs
// DOCUMENTATION: Lifecycle queries shared by reading_rooms and accommodations
// PURPOSE: Status transitions, payment recording and deletion guards for any listing

use crate::errors::ApiError;
use crate::models::{ListingStatus, ListingSummary, VenueType};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// ListingRepository: queries parameterized by listing table
/// DOCUMENTATION: Table and column names come from `VenueType`, never from input.
/// Every status change carries the expected current status in its WHERE clause,
/// so a concurrent change makes the update a no-op instead of a bad transition.
pub struct ListingRepository;

impl ListingRepository {
    pub async fn get_summary(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
    ) -> Result<Option<ListingSummary>, ApiError> {
        let sql = format!(
            "SELECT id, owner_id, name, address, city, contact_phone, images, status,
                    payment_id, payment_date, subscription_plan_id, {price} AS price
             FROM {table} WHERE id = $1",
            price = kind.price_column(),
            table = kind.table()
        );

        sqlx::query_as::<_, ListingSummary>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to load {} {}: {}", kind.as_str(), id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Move a listing from `from` to `to`; false when the listing was not in `from`
    pub async fn update_status(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> Result<bool, ApiError> {
        let sql = format!(
            "UPDATE {} SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to update {} {} status: {}", kind.as_str(), id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() == 1)
    }

    /// VERIFICATION_PENDING -> LIVE with the verified flag set
    pub async fn mark_verified(pool: &PgPool, kind: VenueType, id: Uuid) -> Result<bool, ApiError> {
        let sql = format!(
            "UPDATE {} SET status = 'LIVE', is_verified = TRUE, rejection_reason = NULL, updated_at = NOW()
             WHERE id = $1 AND status = 'VERIFICATION_PENDING'",
            kind.table()
        );

        let result = sqlx::query(&sql).bind(id).execute(pool).await.map_err(|e| {
            log::error!("Failed to verify {} {}: {}", kind.as_str(), id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected() == 1)
    }

    /// VERIFICATION_PENDING -> REJECTED with the reason stored
    pub async fn mark_rejected(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        reason: &str,
    ) -> Result<bool, ApiError> {
        let sql = format!(
            "UPDATE {} SET status = 'REJECTED', is_verified = FALSE, rejection_reason = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'VERIFICATION_PENDING'",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(reason)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to reject {} {}: {}", kind.as_str(), id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() == 1)
    }

    /// Store the subscription payment and move the listing to VERIFICATION_PENDING
    /// DOCUMENTATION: Runs on the caller's transaction so the ledger row and the
    /// status change commit together
    pub async fn record_payment(
        conn: &mut PgConnection,
        kind: VenueType,
        id: Uuid,
        from: ListingStatus,
        plan_id: Uuid,
        payment_id: &str,
    ) -> Result<bool, ApiError> {
        let sql = format!(
            "UPDATE {} SET status = 'VERIFICATION_PENDING', subscription_plan_id = $3,
                    payment_id = $4, payment_date = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = $2",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(from)
            .bind(plan_id)
            .bind(payment_id)
            .execute(conn)
            .await
            .map_err(|e| {
                log::error!("Failed to record payment for {} {}: {}", kind.as_str(), id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() == 1)
    }

    /// Whether any booking references the listing (or its cabins)
    pub async fn has_bookings(pool: &PgPool, kind: VenueType, id: Uuid) -> Result<bool, ApiError> {
        let sql = match kind {
            VenueType::ReadingRoom => {
                "SELECT EXISTS(
                    SELECT 1 FROM bookings b JOIN cabins c ON c.id = b.cabin_id
                    WHERE c.reading_room_id = $1
                 )"
            }
            VenueType::Accommodation => {
                "SELECT EXISTS(SELECT 1 FROM bookings WHERE accommodation_id = $1)"
            }
        };

        let (exists,): (bool,) = sqlx::query_as(sql)
            .bind(id)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to check bookings for {} {}: {}", kind.as_str(), id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        Ok(exists)
    }

    /// Hard delete; cabins, favorites and inquiries cascade
    pub async fn delete(pool: &PgPool, kind: VenueType, id: Uuid) -> Result<(), ApiError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());

        let result = sqlx::query(&sql).bind(id).execute(pool).await.map_err(|e| {
            log::error!("Failed to delete {} {}: {}", kind.as_str(), id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(kind.label().to_string()));
        }

        log::info!("Deleted {} {}", kind.as_str(), id);
        Ok(())
    }
}
