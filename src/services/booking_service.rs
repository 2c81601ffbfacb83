// src/services/booking_service.rs
// DOCUMENTATION: Booking rules on top of BookingRepository
// PURPOSE: Input checks, per-caller access and the hold-expiry sweeper

use crate::db::{BookingRepository, BoostRepository};
use crate::errors::ApiError;
use crate::models::*;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

pub struct BookingService;

impl BookingService {
    pub async fn hold(pool: &PgPool, user: &User, req: &HoldRequest) -> Result<Booking, ApiError> {
        validate_period(req.start_date, req.end_date, req.amount).map_err(ApiError::ValidationError)?;
        BookingRepository::hold(pool, user.id, req).await
    }

    pub async fn confirm(
        pool: &PgPool,
        user: &User,
        booking_id: Uuid,
        payment_id: Option<&str>,
    ) -> Result<Booking, ApiError> {
        let payment_id = payment_id.map(str::trim).filter(|p| !p.is_empty());
        BookingRepository::confirm(pool, booking_id, user.id, payment_id).await
    }

    pub async fn create(
        pool: &PgPool,
        user: &User,
        req: &CreateBookingRequest,
    ) -> Result<Booking, ApiError> {
        let target = req.target().map_err(ApiError::InvalidInput)?;
        validate_period(req.start_date, req.end_date, req.amount).map_err(ApiError::ValidationError)?;
        BookingRepository::create_direct(pool, user.id, target, req).await
    }

    pub async fn cancel(pool: &PgPool, user: &User, id: Uuid) -> Result<Booking, ApiError> {
        BookingRepository::cancel(pool, id, user.id).await
    }

    pub async fn extend(
        pool: &PgPool,
        user: &User,
        req: &ExtendBookingRequest,
    ) -> Result<Booking, ApiError> {
        BookingRepository::extend(pool, user.id, req).await
    }

    /// Super admins see every booking, everyone else their own
    pub async fn list(pool: &PgPool, user: &User) -> Result<Vec<Booking>, ApiError> {
        let scope = if user.is_super_admin() {
            None
        } else {
            Some(user.id)
        };
        BookingRepository::list(pool, scope).await
    }

    pub async fn get(pool: &PgPool, user: &User, id: Uuid) -> Result<Booking, ApiError> {
        let booking = BookingRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking".to_string()))?;

        if booking.user_id != user.id && !user.is_super_admin() {
            return Err(ApiError::Forbidden(
                "You cannot view this booking".to_string(),
            ));
        }
        Ok(booking)
    }
}

/// One pass of the periodic cleanup: lapsed holds and boosts
pub async fn sweep_expired(pool: &PgPool) {
    match BookingRepository::expire_holds(pool).await {
        Ok(0) => {}
        Ok(n) => log::info!("Expired {} held bookings", n),
        Err(e) => log::error!("Hold expiry sweep failed: {}", e),
    }

    match BoostRepository::expire_boosts(pool).await {
        Ok(0) => {}
        Ok(n) => log::info!("Expired {} boosts", n),
        Err(e) => log::error!("Boost expiry sweep failed: {}", e),
    }
}

/// Start the background sweeper
/// DOCUMENTATION: Runs `sweep_expired` every `interval_seconds`
pub fn start_sweeper_task(pool: PgPool, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            sweep_expired(&pool).await;
        }
    });
}
