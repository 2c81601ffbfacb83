// src/models/reading_room.rs
// DOCUMENTATION: Reading room (venue) and cabin data structures
// PURPOSE: Maps reading_rooms/cabins tables and their endpoint payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::listing::{optional_string_list, string_list, ListingStatus};

/// Largest range accepted by POST /reading-rooms/{id}/cabins/batch
pub const MAX_CABIN_BATCH: i64 = 500;

/// Represents a reading room record from the database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReadingRoom {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub contact_phone: Option<String>,
    pub price_start: Option<f64>,
    pub status: ListingStatus,
    pub is_verified: bool,
    pub is_sponsored: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub locality: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub subscription_plan_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReadingRoom {
    pub fn to_response(self, distance_km: Option<f64>) -> ReadingRoomResponse {
        ReadingRoomResponse {
            image_url: self.images.first().cloned(),
            distance_km: distance_km.map(|d| (d * 100.0).round() / 100.0),
            room: self,
        }
    }
}

/// API view: the record plus the cover image and optional distance
#[derive(Debug, Serialize)]
pub struct ReadingRoomResponse {
    #[serde(flatten)]
    pub room: ReadingRoom,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Request DTO for POST /reading-rooms
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReadingRoomRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 500))]
    pub address: String,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub amenities: Vec<String>,

    pub contact_phone: Option<String>,

    #[validate(range(min = 0.0))]
    pub price_start: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub city: Option<String>,
    pub area: Option<String>,
    pub locality: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
}

/// Request DTO for PUT /reading-rooms/{id}; every field optional
/// DOCUMENTATION: Saves wizard drafts. Status is not part of this payload.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateReadingRoomRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "optional_string_list")]
    pub images: Option<Vec<String>>,

    #[serde(default, deserialize_with = "optional_string_list")]
    pub amenities: Option<Vec<String>>,

    pub contact_phone: Option<String>,

    #[validate(range(min = 0.0))]
    pub price_start: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub city: Option<String>,
    pub area: Option<String>,
    pub locality: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
}

/// Query parameters for GET /reading-rooms
#[derive(Debug, Default, Deserialize)]
pub struct ReadingRoomListQuery {
    pub lat: Option<f64>,
    pub long: Option<f64>,
    /// Search radius in kilometers
    pub radius: Option<f64>,
    #[serde(default)]
    pub include_unverified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cabin_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

impl CabinStatus {
    /// Booked cabins change status only through bookings
    pub fn is_booked(self) -> bool {
        matches!(self, CabinStatus::Occupied | CabinStatus::Reserved)
    }

    /// Owners may only open a free cabin or take it out for maintenance
    pub fn owner_may_set(from: CabinStatus, to: CabinStatus) -> bool {
        !from.is_booked() && !to.is_booked()
    }
}

/// A bookable seat inside a reading room
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cabin {
    pub id: Uuid,
    pub reading_room_id: Uuid,
    pub number: String,
    pub floor: i32,
    pub amenities: Vec<String>,
    pub price: f64,
    pub status: CabinStatus,
    pub current_occupant_id: Option<Uuid>,
    pub zone: Option<String>,
    pub row_label: Option<String>,
}

/// Request DTO for POST /reading-rooms/{id}/cabins
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCabinRequest {
    #[validate(length(min = 1, max = 20))]
    pub number: String,

    #[serde(default)]
    pub floor: i32,

    #[serde(default, deserialize_with = "string_list")]
    pub amenities: Vec<String>,

    #[validate(range(min = 0.0))]
    pub price: f64,

    pub zone: Option<String>,
    pub row_label: Option<String>,
}

/// Request DTO for POST /reading-rooms/{id}/cabins/batch
/// DOCUMENTATION: Creates cabins numbered `prefix + n` for n in start..=end
#[derive(Debug, Deserialize, Validate)]
pub struct CabinBatchRequest {
    #[validate(range(min = 0))]
    pub start: i64,

    #[validate(range(min = 0))]
    pub end: i64,

    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub floor: i32,

    #[serde(default, deserialize_with = "string_list")]
    pub amenities: Vec<String>,

    #[validate(range(min = 0.0))]
    pub price: f64,

    pub zone: Option<String>,
    pub row_label: Option<String>,
}

impl CabinBatchRequest {
    /// Cabin numbers this batch expands to, or an error message
    pub fn numbers(&self) -> Result<Vec<String>, String> {
        if self.end < self.start {
            return Err("end must not be smaller than start".to_string());
        }
        let count = self.end - self.start + 1;
        if count > MAX_CABIN_BATCH {
            return Err(format!(
                "At most {} cabins can be created at once",
                MAX_CABIN_BATCH
            ));
        }
        Ok((self.start..=self.end)
            .map(|n| format!("{}{}", self.prefix, n))
            .collect())
    }
}

/// Request DTO for PUT /cabins/{id}; every field optional
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCabinRequest {
    #[validate(length(min = 1, max = 20))]
    pub number: Option<String>,

    pub floor: Option<i32>,

    #[serde(default, deserialize_with = "optional_string_list")]
    pub amenities: Option<Vec<String>>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    pub status: Option<CabinStatus>,
    pub zone: Option<String>,
    pub row_label: Option<String>,
}

/// Request DTO for PATCH /cabins/bulk
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCabinUpdateRequest {
    #[validate(length(min = 1, max = 500))]
    pub cabin_ids: Vec<Uuid>,

    pub status: Option<CabinStatus>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
}

/// Request DTO for POST /cabins/bulk-delete
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCabinDeleteRequest {
    #[validate(length(min = 1, max = 500))]
    pub cabin_ids: Vec<Uuid>,
}

/// A cabin with the owner of its reading room
#[derive(Debug, Clone, FromRow)]
pub struct CabinOwnership {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub status: CabinStatus,
}

#[derive(Debug, Serialize)]
pub struct BulkCabinResult {
    pub updated: u64,
}

/// A student with bookings on an owner's cabins
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RoomStudent {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub active_bookings: i64,
    pub last_booking_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ActiveStudentsResponse {
    pub reading_room_id: Uuid,
    pub active_students: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(start: i64, end: i64) -> CabinBatchRequest {
        CabinBatchRequest {
            start,
            end,
            prefix: "A-".to_string(),
            floor: 1,
            amenities: vec![],
            price: 1200.0,
            zone: None,
            row_label: None,
        }
    }

    #[test]
    fn test_batch_numbers() {
        assert_eq!(batch(1, 3).numbers().unwrap(), vec!["A-1", "A-2", "A-3"]);
        assert_eq!(batch(7, 7).numbers().unwrap(), vec!["A-7"]);
    }

    #[test]
    fn test_batch_limits() {
        assert!(batch(5, 4).numbers().is_err());
        assert_eq!(batch(1, 500).numbers().unwrap().len(), 500);
        assert!(batch(1, 501).numbers().is_err());
    }

    #[test]
    fn test_owner_cabin_status_changes() {
        use CabinStatus::*;
        assert!(CabinStatus::owner_may_set(Available, Maintenance));
        assert!(CabinStatus::owner_may_set(Maintenance, Available));
        assert!(!CabinStatus::owner_may_set(Occupied, Available));
        assert!(!CabinStatus::owner_may_set(Available, Reserved));
        assert!(!CabinStatus::owner_may_set(Reserved, Maintenance));
    }

    #[test]
    fn test_update_request_has_no_status() {
        let req: UpdateReadingRoomRequest =
            serde_json::from_str(r#"{"name": "Quiet Corner", "status": "LIVE"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Quiet Corner"));
        assert!(req.images.is_none());
    }
}
