// src/models/booking.rs
// DOCUMENTATION: Cabin and accommodation bookings
// PURPOSE: Maps the bookings table, hold/confirm payloads and booking rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Minutes a HELD booking keeps its cabin reserved
pub const HOLD_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Active,
    Expired,
    Cancelled,
    Held,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Refunded,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cabin_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// A hold that can still be confirmed at `now`
    pub fn is_confirmable(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Held && self.expires_at.map_or(false, |at| at > now)
    }

    /// Why the booking cannot be cancelled, if it cannot
    pub fn cancel_refusal(&self) -> Option<&'static str> {
        match self.status {
            BookingStatus::Cancelled => Some("Booking is already cancelled"),
            BookingStatus::Expired => Some("Booking has already expired"),
            BookingStatus::Active | BookingStatus::Held => None,
        }
    }
}

/// Body of POST /bookings/extend
#[derive(Debug, Deserialize)]
pub struct ExtendBookingRequest {
    pub booking_id: Uuid,
    pub new_end_date: DateTime<Utc>,
    pub extension_amount: f64,
}

impl ExtendBookingRequest {
    /// Checks against the booking being extended
    pub fn check(&self, booking: &Booking) -> Result<(), String> {
        if booking.status != BookingStatus::Active {
            return Err("Only active bookings can be extended".to_string());
        }
        if self.new_end_date <= booking.end_date {
            return Err("new_end_date must be after the current end date".to_string());
        }
        if !self.extension_amount.is_finite() || self.extension_amount <= 0.0 {
            return Err("extension_amount must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Request DTO for POST /bookings/hold
#[derive(Debug, Deserialize)]
pub struct HoldRequest {
    pub cabin_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: f64,
}

/// Request DTO for POST /bookings (direct, already-paid booking)
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub cabin_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: f64,
    pub transaction_id: Option<String>,
}

/// What a booking reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTarget {
    Cabin(Uuid),
    Accommodation(Uuid),
}

impl CreateBookingRequest {
    pub fn target(&self) -> Result<BookingTarget, String> {
        match (self.cabin_id, self.accommodation_id) {
            (Some(cabin), None) => Ok(BookingTarget::Cabin(cabin)),
            (None, Some(accommodation)) => Ok(BookingTarget::Accommodation(accommodation)),
            _ => Err("Provide exactly one of cabin_id or accommodation_id".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub payment_id: Option<String>,
}

/// Checks shared by holds and direct bookings
pub fn validate_period(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    amount: f64,
) -> Result<(), String> {
    if end <= start {
        return Err("end_date must be after start_date".to_string());
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err("amount must not be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn held(expires_in: Duration) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            cabin_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            start_date: now,
            end_date: now + Duration::days(30),
            amount: 1500.0,
            status: BookingStatus::Held,
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            expires_at: Some(now + expires_in),
            created_at: now,
        }
    }

    #[test]
    fn test_hold_confirmable_until_expiry() {
        let now = Utc::now();
        assert!(held(Duration::minutes(5)).is_confirmable(now));
        assert!(!held(Duration::minutes(-1)).is_confirmable(now));

        let mut active = held(Duration::minutes(5));
        active.status = BookingStatus::Active;
        assert!(!active.is_confirmable(now));
    }

    #[test]
    fn test_cancel_refusal() {
        let mut booking = held(Duration::minutes(5));
        assert!(booking.cancel_refusal().is_none());

        booking.status = BookingStatus::Active;
        assert!(booking.cancel_refusal().is_none());

        booking.status = BookingStatus::Cancelled;
        assert_eq!(booking.cancel_refusal(), Some("Booking is already cancelled"));

        booking.status = BookingStatus::Expired;
        assert!(booking.cancel_refusal().is_some());
    }

    #[test]
    fn test_extension_checks() {
        let mut booking = held(Duration::minutes(5));
        let req = ExtendBookingRequest {
            booking_id: booking.id,
            new_end_date: booking.end_date + Duration::days(30),
            extension_amount: 1500.0,
        };
        assert!(req.check(&booking).is_err());

        booking.status = BookingStatus::Active;
        assert!(req.check(&booking).is_ok());

        let shorter = ExtendBookingRequest {
            new_end_date: booking.end_date - Duration::days(1),
            ..req
        };
        assert!(shorter.check(&booking).is_err());

        let free = ExtendBookingRequest {
            booking_id: booking.id,
            new_end_date: booking.end_date + Duration::days(1),
            extension_amount: 0.0,
        };
        assert!(free.check(&booking).is_err());
    }

    #[test]
    fn test_validate_period() {
        let start = Utc::now();
        assert!(validate_period(start, start + Duration::days(1), 0.0).is_ok());
        assert!(validate_period(start, start, 10.0).is_err());
        assert!(validate_period(start, start + Duration::days(1), -1.0).is_err());
    }

    #[test]
    fn test_booking_target() {
        let mut req = CreateBookingRequest {
            cabin_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(1),
            amount: 100.0,
            transaction_id: None,
        };
        assert!(matches!(req.target(), Ok(BookingTarget::Cabin(_))));

        req.accommodation_id = Some(Uuid::new_v4());
        assert!(req.target().is_err());

        req.cabin_id = None;
        assert!(matches!(req.target(), Ok(BookingTarget::Accommodation(_))));
    }
}
