// src/db/booking_repository.rs
// DOCUMENTATION: Database operations for bookings and cabin occupancy
// PURPOSE: Row-locked hold/confirm flow, direct bookings and hold expiry

use crate::errors::ApiError;
use crate::models::*;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, user_id, cabin_id, accommodation_id, start_date, end_date, \
     amount, status, payment_status, transaction_id, expires_at, created_at";

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    log::error!("{}: {}", context, e);
    ApiError::DatabaseError(e.to_string())
}

pub struct BookingRepository;

impl BookingRepository {
    /// Lock a cabin row for the rest of the transaction
    async fn lock_cabin(
        tx: &mut Transaction<'_, Postgres>,
        cabin_id: Uuid,
    ) -> Result<CabinStatus, ApiError> {
        let row: Option<(CabinStatus,)> =
            sqlx::query_as("SELECT status FROM cabins WHERE id = $1 FOR UPDATE")
                .bind(cabin_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| db_error("Failed to lock cabin", e))?;

        row.map(|(status,)| status)
            .ok_or_else(|| ApiError::NotFound("Cabin".to_string()))
    }

    async fn set_cabin(
        tx: &mut Transaction<'_, Postgres>,
        cabin_id: Uuid,
        status: CabinStatus,
        occupant: Option<Uuid>,
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE cabins SET status = $2, current_occupant_id = $3 WHERE id = $1")
            .bind(cabin_id)
            .bind(status)
            .bind(occupant)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to update cabin", e))?;
        Ok(())
    }

    /// Reserve an AVAILABLE cabin and create a HELD booking that expires
    /// after `HOLD_MINUTES`
    pub async fn hold(pool: &PgPool, user_id: Uuid, req: &HoldRequest) -> Result<Booking, ApiError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin hold", e))?;

        let status = Self::lock_cabin(&mut tx, req.cabin_id).await?;
        if status != CabinStatus::Available {
            return Err(ApiError::Conflict("Cabin is not available".to_string()));
        }

        Self::set_cabin(&mut tx, req.cabin_id, CabinStatus::Reserved, None).await?;

        let sql = format!(
            "INSERT INTO bookings (id, user_id, cabin_id, start_date, end_date, amount, status, payment_status, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, 'HELD', 'PENDING', $7)
             RETURNING {}",
            BOOKING_COLUMNS
        );

        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(req.cabin_id)
            .bind(req.start_date)
            .bind(req.end_date)
            .bind(req.amount)
            .bind(Utc::now() + Duration::minutes(HOLD_MINUTES))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert held booking", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit hold", e))?;

        log::info!("Cabin {} held by user {} (booking {})", req.cabin_id, user_id, booking.id);
        Ok(booking)
    }

    /// Turn the caller's HELD booking into an ACTIVE, PAID one
    pub async fn confirm(
        pool: &PgPool,
        booking_id: Uuid,
        user_id: Uuid,
        transaction_id: Option<&str>,
    ) -> Result<Booking, ApiError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin confirm", e))?;

        let confirmed = Self::confirm_in(&mut tx, booking_id, user_id, transaction_id).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit confirm", e))?;

        log::info!("Booking {} confirmed for user {}", booking_id, user_id);
        Ok(confirmed)
    }

    /// Confirm on the caller's transaction; the booking row stays locked until commit
    pub async fn confirm_in(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        user_id: Uuid,
        transaction_id: Option<&str>,
    ) -> Result<Booking, ApiError> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1 FOR UPDATE", BOOKING_COLUMNS);
        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to lock booking", e))?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound("Booking".to_string()))?;

        if booking.status != BookingStatus::Held {
            return Err(ApiError::Conflict("Booking is not on hold".to_string()));
        }
        if !booking.is_confirmable(Utc::now()) {
            return Err(ApiError::Conflict("Booking hold has expired".to_string()));
        }

        let sql = format!(
            "UPDATE bookings SET status = 'ACTIVE', payment_status = 'PAID',
                    transaction_id = COALESCE($2, transaction_id), expires_at = NULL
             WHERE id = $1
             RETURNING {}",
            BOOKING_COLUMNS
        );
        let confirmed = sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .bind(transaction_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to confirm booking", e))?;

        if let Some(cabin_id) = confirmed.cabin_id {
            Self::set_cabin(tx, cabin_id, CabinStatus::Occupied, Some(user_id)).await?;
        }

        Ok(confirmed)
    }

    async fn lock_booking(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
    ) -> Result<Booking, ApiError> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1 FOR UPDATE", BOOKING_COLUMNS);
        sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| db_error("Failed to lock booking", e))?
            .ok_or_else(|| ApiError::NotFound("Booking".to_string()))
    }

    /// Cancel the caller's booking and free its cabin
    pub async fn cancel(pool: &PgPool, booking_id: Uuid, user_id: Uuid) -> Result<Booking, ApiError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin cancel", e))?;

        let booking = Self::lock_booking(&mut tx, booking_id).await?;
        if booking.user_id != user_id {
            return Err(ApiError::Forbidden(
                "You can only cancel your own bookings".to_string(),
            ));
        }
        if let Some(reason) = booking.cancel_refusal() {
            return Err(ApiError::InvalidInput(reason.to_string()));
        }

        let sql = format!(
            "UPDATE bookings SET status = 'CANCELLED', expires_at = NULL
             WHERE id = $1
             RETURNING {}",
            BOOKING_COLUMNS
        );
        let cancelled = sqlx::query_as::<_, Booking>(&sql)
            .bind(booking_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to cancel booking", e))?;

        if let Some(cabin_id) = cancelled.cabin_id {
            sqlx::query(
                "UPDATE cabins SET status = 'AVAILABLE', current_occupant_id = NULL
                 WHERE id = $1 AND (status = 'RESERVED' OR current_occupant_id = $2)",
            )
            .bind(cabin_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to release cabin", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit cancel", e))?;

        log::info!("Booking {} cancelled by user {}", booking_id, user_id);
        Ok(cancelled)
    }

    /// Push out the end date of the caller's active booking and add the extension price
    pub async fn extend(
        pool: &PgPool,
        user_id: Uuid,
        req: &ExtendBookingRequest,
    ) -> Result<Booking, ApiError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin extension", e))?;

        let booking = Self::lock_booking(&mut tx, req.booking_id).await?;
        if booking.user_id != user_id {
            return Err(ApiError::Forbidden(
                "You can only extend your own bookings".to_string(),
            ));
        }
        req.check(&booking).map_err(ApiError::InvalidInput)?;

        let sql = format!(
            "UPDATE bookings SET end_date = $2, amount = amount + $3
             WHERE id = $1
             RETURNING {}",
            BOOKING_COLUMNS
        );
        let extended = sqlx::query_as::<_, Booking>(&sql)
            .bind(req.booking_id)
            .bind(req.new_end_date)
            .bind(req.extension_amount)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to extend booking", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit extension", e))?;

        log::info!(
            "Booking {} extended to {} (+{:.2})",
            extended.id,
            extended.end_date,
            req.extension_amount
        );
        Ok(extended)
    }

    /// Book a cabin or a LIVE accommodation in one step
    pub async fn create_direct(
        pool: &PgPool,
        user_id: Uuid,
        target: BookingTarget,
        req: &CreateBookingRequest,
    ) -> Result<Booking, ApiError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin booking", e))?;

        let (cabin_id, accommodation_id) = match target {
            BookingTarget::Cabin(cabin_id) => {
                let status = Self::lock_cabin(&mut tx, cabin_id).await?;
                if status != CabinStatus::Available {
                    return Err(ApiError::Conflict("Cabin is not available".to_string()));
                }
                Self::set_cabin(&mut tx, cabin_id, CabinStatus::Occupied, Some(user_id)).await?;
                (Some(cabin_id), None)
            }
            BookingTarget::Accommodation(accommodation_id) => {
                let row: Option<(ListingStatus,)> =
                    sqlx::query_as("SELECT status FROM accommodations WHERE id = $1 FOR SHARE")
                        .bind(accommodation_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| db_error("Failed to load accommodation", e))?;

                match row {
                    None => return Err(ApiError::NotFound("Accommodation".to_string())),
                    Some((ListingStatus::Live,)) => {}
                    Some(_) => {
                        return Err(ApiError::Conflict(
                            "Accommodation is not accepting bookings".to_string(),
                        ))
                    }
                }
                (None, Some(accommodation_id))
            }
        };

        let sql = format!(
            "INSERT INTO bookings (id, user_id, cabin_id, accommodation_id, start_date, end_date,
                                   amount, status, payment_status, transaction_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'ACTIVE', 'PAID', $8)
             RETURNING {}",
            BOOKING_COLUMNS
        );

        let booking = sqlx::query_as::<_, Booking>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(cabin_id)
            .bind(accommodation_id)
            .bind(req.start_date)
            .bind(req.end_date)
            .bind(req.amount)
            .bind(&req.transaction_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert booking", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit booking", e))?;

        log::info!("Booking {} created for user {}", booking.id, user_id);
        Ok(booking)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Booking>, ApiError> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);

        sqlx::query_as::<_, Booking>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Failed to fetch booking", e))
    }

    /// All bookings (`None`) or one user's, newest first
    pub async fn list(pool: &PgPool, user_id: Option<Uuid>) -> Result<Vec<Booking>, ApiError> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
            BOOKING_COLUMNS
        );

        sqlx::query_as::<_, Booking>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Failed to list bookings", e))
    }

    /// Expire lapsed holds and release their cabins; returns expired count
    pub async fn expire_holds(pool: &PgPool) -> Result<i64, ApiError> {
        let (expired,): (i64,) = sqlx::query_as(
            r#"
            WITH expired AS (
                UPDATE bookings SET status = 'EXPIRED'
                WHERE status = 'HELD' AND expires_at < NOW()
                RETURNING cabin_id
            ), released AS (
                UPDATE cabins SET status = 'AVAILABLE', current_occupant_id = NULL
                WHERE status = 'RESERVED'
                  AND id IN (SELECT cabin_id FROM expired WHERE cabin_id IS NOT NULL)
                RETURNING id
            )
            SELECT COUNT(*) FROM expired
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Failed to expire held bookings", e))?;

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    async fn held_cabin(pool: &PgPool) -> (User, Uuid, Booking) {
        let owner = test_support::user(pool, UserRole::Admin).await;
        let student = test_support::user(pool, UserRole::Student).await;
        let room = test_support::reading_room(pool, &owner, ListingStatus::Live).await;
        let cabin = test_support::cabin(pool, room).await;

        let start = Utc::now();
        let booking = BookingRepository::hold(
            pool,
            student.id,
            &HoldRequest {
                cabin_id: cabin,
                start_date: start,
                end_date: start + Duration::days(30),
                amount: 1500.0,
            },
        )
        .await
        .unwrap();
        (student, cabin, booking)
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_lapsed_hold_releases_cabin(pool: PgPool) {
        let (_, cabin, booking) = held_cabin(&pool).await;
        assert_eq!(test_support::cabin_status(&pool, cabin).await, CabinStatus::Reserved);

        sqlx::query("UPDATE bookings SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
            .bind(booking.id)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(BookingRepository::expire_holds(&pool).await.unwrap(), 1);
        assert_eq!(test_support::cabin_status(&pool, cabin).await, CabinStatus::Available);

        let expired = BookingRepository::find_by_id(&pool, booking.id).await.unwrap().unwrap();
        assert_eq!(expired.status, BookingStatus::Expired);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_second_hold_on_reserved_cabin_conflicts(pool: PgPool) {
        let (student, cabin, booking) = held_cabin(&pool).await;

        let again = BookingRepository::hold(
            &pool,
            student.id,
            &HoldRequest {
                cabin_id: cabin,
                start_date: booking.start_date,
                end_date: booking.end_date,
                amount: 1500.0,
            },
        )
        .await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_cancel_frees_cabin_once(pool: PgPool) {
        let (student, cabin, booking) = held_cabin(&pool).await;
        BookingRepository::confirm(&pool, booking.id, student.id, Some("pay_1"))
            .await
            .unwrap();
        assert_eq!(test_support::cabin_status(&pool, cabin).await, CabinStatus::Occupied);

        let stranger = test_support::user(&pool, UserRole::Student).await;
        assert!(matches!(
            BookingRepository::cancel(&pool, booking.id, stranger.id).await,
            Err(ApiError::Forbidden(_))
        ));

        let cancelled = BookingRepository::cancel(&pool, booking.id, student.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(test_support::cabin_status(&pool, cabin).await, CabinStatus::Available);

        assert!(matches!(
            BookingRepository::cancel(&pool, booking.id, student.id).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_extend_adds_amount(pool: PgPool) {
        let (student, _, booking) = held_cabin(&pool).await;
        BookingRepository::confirm(&pool, booking.id, student.id, Some("pay_1"))
            .await
            .unwrap();

        let extended = BookingRepository::extend(
            &pool,
            student.id,
            &ExtendBookingRequest {
                booking_id: booking.id,
                new_end_date: booking.end_date + Duration::days(15),
                extension_amount: 750.0,
            },
        )
        .await
        .unwrap();

        assert_eq!(extended.amount, 2250.0);
        assert!(extended.end_date > booking.end_date);
    }
}
