// src/models/accommodation.rs
// DOCUMENTATION: PG/hostel accommodation data structures
// PURPOSE: Maps the accommodations table and its endpoint payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::listing::{optional_string_list, string_list, ListingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "accommodation_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccommodationType {
    Pg,
    Hostel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Unisex,
}

/// Represents an accommodation record from the database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Accommodation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub type_field: AccommodationType,
    pub gender: Gender,
    pub address: String,
    pub price: f64,
    pub sharing: String,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub contact_phone: Option<String>,
    pub rating: f64,
    pub status: ListingStatus,
    pub is_verified: bool,
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

impl Accommodation {
    pub fn to_response(self) -> AccommodationResponse {
        AccommodationResponse {
            image_url: self.images.first().cloned(),
            accommodation: self,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccommodationResponse {
    #[serde(flatten)]
    pub accommodation: Accommodation,
    pub image_url: Option<String>,
}

/// Request DTO for POST /accommodations
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccommodationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[serde(rename = "type")]
    pub type_field: AccommodationType,

    pub gender: Gender,

    #[validate(length(min = 1, max = 500))]
    pub address: String,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(length(min = 1, max = 50))]
    pub sharing: String,

    #[serde(default, deserialize_with = "string_list")]
    pub amenities: Vec<String>,

    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,

    pub contact_phone: Option<String>,

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

/// Request DTO for PUT /accommodations/{id}; status is never accepted here
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccommodationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub type_field: Option<AccommodationType>,

    pub gender: Option<Gender>,

    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(length(min = 1, max = 50))]
    pub sharing: Option<String>,

    #[serde(default, deserialize_with = "optional_string_list")]
    pub amenities: Option<Vec<String>>,

    #[serde(default, deserialize_with = "optional_string_list")]
    pub images: Option<Vec<String>>,

    pub contact_phone: Option<String>,

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

/// Query parameters for GET /accommodations
#[derive(Debug, Default, Deserialize)]
pub struct AccommodationListQuery {
    /// Case-insensitive match against address, city or area
    pub location: Option<String>,
    pub price_max: Option<f64>,
    pub gender: Option<Gender>,
    #[serde(rename = "type")]
    pub type_field: Option<AccommodationType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub include_unverified: bool,
}

impl AccommodationListQuery {
    /// Page size clamped to 1..=100 (default 50)
    pub fn page_limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn page_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_wire_names() {
        let req: CreateAccommodationRequest = serde_json::from_str(
            r#"{
                "name": "Sunrise PG",
                "type": "PG",
                "gender": "FEMALE",
                "address": "4 Park Street",
                "price": 8500,
                "sharing": "Double",
                "amenities": "wifi,food"
            }"#,
        )
        .unwrap();
        assert_eq!(req.type_field, AccommodationType::Pg);
        assert_eq!(req.gender, Gender::Female);
        assert_eq!(req.amenities, vec!["wifi", "food"]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_page_bounds() {
        let mut query = AccommodationListQuery::default();
        assert_eq!(query.page_limit(), 50);
        query.limit = Some(500);
        assert_eq!(query.page_limit(), 100);
        query.limit = Some(0);
        assert_eq!(query.page_limit(), 1);
        query.offset = Some(-3);
        assert_eq!(query.page_offset(), 0);
    }
}
