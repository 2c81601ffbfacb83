// src/models/listing.rs
// DOCUMENTATION: Types shared by reading rooms and accommodations
// PURPOSE: Listing lifecycle status, venue kind, review payloads and input helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::user::User;

/// Photos a listing needs before it can be submitted for review
pub const MINIMUM_IMAGES: usize = 4;

/// Listing lifecycle. Only the transitions in `can_transition_to` are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "listing_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Draft,
    PaymentPending,
    VerificationPending,
    Live,
    Rejected,
    Suspended,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Draft => "DRAFT",
            ListingStatus::PaymentPending => "PAYMENT_PENDING",
            ListingStatus::VerificationPending => "VERIFICATION_PENDING",
            ListingStatus::Live => "LIVE",
            ListingStatus::Rejected => "REJECTED",
            ListingStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn can_transition_to(self, next: ListingStatus) -> bool {
        use ListingStatus::*;
        matches!(
            (self, next),
            (Draft, PaymentPending)
                | (Draft, VerificationPending)
                | (PaymentPending, VerificationPending)
                | (Rejected, PaymentPending)
                | (Rejected, VerificationPending)
                | (VerificationPending, Live)
                | (VerificationPending, Rejected)
                | (Live, Suspended)
                | (Suspended, Live)
        )
    }

    /// Statuses reached only after the listing fee was paid
    pub fn is_paid(self) -> bool {
        matches!(
            self,
            ListingStatus::VerificationPending | ListingStatus::Live | ListingStatus::Suspended
        )
    }

    /// Statuses from which the owner may start a payment
    pub fn accepts_payment(self) -> bool {
        matches!(
            self,
            ListingStatus::Draft | ListingStatus::Rejected | ListingStatus::PaymentPending
        )
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which listing table a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "venue_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    ReadingRoom,
    Accommodation,
}

impl VenueType {
    pub fn as_str(self) -> &'static str {
        match self {
            VenueType::ReadingRoom => "reading_room",
            VenueType::Accommodation => "accommodation",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            VenueType::ReadingRoom => "reading_rooms",
            VenueType::Accommodation => "accommodations",
        }
    }

    /// Column holding the headline price of the listing
    pub fn price_column(self) -> &'static str {
        match self {
            VenueType::ReadingRoom => "price_start",
            VenueType::Accommodation => "price",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VenueType::ReadingRoom => "Reading room",
            VenueType::Accommodation => "Accommodation",
        }
    }
}

/// Columns common to both listing tables
/// DOCUMENTATION: Loaded by the lifecycle and payment flows, which never need
/// the kind-specific columns
#[derive(Debug, Clone, FromRow)]
pub struct ListingSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub contact_phone: Option<String>,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub payment_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub subscription_plan_id: Option<Uuid>,
    pub price: Option<f64>,
}

impl ListingSummary {
    /// Names of the details still missing before review can start
    pub fn missing_details(&self, kind: VenueType) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.name.trim().is_empty() {
            missing.push("Name");
        }
        if self.address.trim().is_empty() {
            missing.push("Address");
        }
        if is_blank(self.city.as_deref()) {
            missing.push("City");
        }
        if is_blank(self.contact_phone.as_deref()) {
            missing.push("Phone");
        }
        if kind == VenueType::Accommodation && self.price.map_or(true, |p| p <= 0.0) {
            missing.push("Price");
        }

        let usable_images = self.images.iter().filter(|i| !i.trim().is_empty()).count();
        if usable_images < MINIMUM_IMAGES {
            missing.push("Minimum 4 Images");
        }

        missing
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Who is browsing a listing index
/// DOCUMENTATION: Anonymous callers see LIVE listings, signed-in callers also
/// their own, and a super admin asking for unverified listings sees everything
/// past the payment step
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingVisibility {
    pub viewer_id: Option<Uuid>,
    pub include_unverified: bool,
}

impl ListingVisibility {
    pub fn new(viewer: Option<&User>, include_unverified: bool) -> Self {
        ListingVisibility {
            viewer_id: viewer.map(|u| u.id),
            include_unverified: include_unverified && viewer.map_or(false, User::is_super_admin),
        }
    }

    /// Same rule as the SQL filter used by the list queries
    pub fn admits(&self, owner_id: Uuid, status: ListingStatus) -> bool {
        status == ListingStatus::Live
            || self.viewer_id == Some(owner_id)
            || (self.include_unverified
                && !matches!(status, ListingStatus::Draft | ListingStatus::PaymentPending))
    }
}

/// SQL predicate matching `ListingVisibility::admits`; binds $1 viewer id, $2 flag
pub const VISIBILITY_PREDICATE: &str = "(status = 'LIVE' OR owner_id = $1 \
     OR ($2 AND status NOT IN ('DRAFT', 'PAYMENT_PENDING')))";

/// Single-listing access: LIVE, the owner, or a super admin
pub fn can_view_listing(viewer: Option<&User>, owner_id: Uuid, status: ListingStatus) -> bool {
    status == ListingStatus::Live
        || viewer.map_or(false, |u| u.id == owner_id || u.is_super_admin())
}

/// Body of PUT /{id}/verify: both review checks must be ticked
#[derive(Debug, Deserialize)]
pub struct ReviewChecklist {
    #[serde(default)]
    pub documents_checked: bool,
    #[serde(default)]
    pub location_checked: bool,
}

impl ReviewChecklist {
    pub fn is_complete(&self) -> bool {
        self.documents_checked && self.location_checked
    }
}

/// Body of PUT /{id}/reject
#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

/// Title-case a city name ("new  delhi" -> "New Delhi")
pub fn normalize_city(city: &str) -> String {
    city.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts a JSON array, a JSON-encoded array string or a comma-separated string
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string_list(deserializer)?.unwrap_or_default())
}

/// Same as `string_list` but keeps "absent/null" distinct from an empty list
pub fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrString {
        List(Vec<String>),
        Text(String),
    }

    let raw = Option::<ListOrString>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        ListOrString::List(items) => clean_list(items),
        ListOrString::Text(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('[') {
                if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
                    return clean_list(items);
                }
            }
            clean_list(trimmed.split(',').map(str::to_string).collect())
        }
    }))
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{UserRole, VerificationStatus};

    fn summary() -> ListingSummary {
        ListingSummary {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Focus Hub".to_string(),
            address: "12 MG Road".to_string(),
            city: Some("Pune".to_string()),
            contact_phone: Some("9876543210".to_string()),
            images: (0..4).map(|i| format!("https://img/{}.jpg", i)).collect(),
            status: ListingStatus::Draft,
            payment_id: None,
            payment_date: None,
            subscription_plan_id: None,
            price: Some(1500.0),
        }
    }

    #[test]
    fn test_allowed_transitions() {
        use ListingStatus::*;
        assert!(Draft.can_transition_to(VerificationPending));
        assert!(Draft.can_transition_to(PaymentPending));
        assert!(PaymentPending.can_transition_to(VerificationPending));
        assert!(VerificationPending.can_transition_to(Live));
        assert!(VerificationPending.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(VerificationPending));
        assert!(Live.can_transition_to(Suspended));
        assert!(Suspended.can_transition_to(Live));
    }

    #[test]
    fn test_forbidden_transitions() {
        use ListingStatus::*;
        assert!(!Draft.can_transition_to(Live));
        assert!(!PaymentPending.can_transition_to(Live));
        assert!(!Live.can_transition_to(Draft));
        assert!(!Rejected.can_transition_to(Live));
        assert!(!Suspended.can_transition_to(VerificationPending));
        assert!(!Live.can_transition_to(Live));
    }

    #[test]
    fn test_complete_listing_has_no_missing_details() {
        assert!(summary().missing_details(VenueType::ReadingRoom).is_empty());
        assert!(summary().missing_details(VenueType::Accommodation).is_empty());
    }

    #[test]
    fn test_missing_details_reported_in_order() {
        let mut listing = summary();
        listing.city = Some("  ".to_string());
        listing.contact_phone = None;
        listing.images.truncate(3);

        assert_eq!(
            listing.missing_details(VenueType::ReadingRoom),
            vec!["City", "Phone", "Minimum 4 Images"]
        );
    }

    #[test]
    fn test_accommodation_requires_price() {
        let mut listing = summary();
        listing.price = Some(0.0);
        assert_eq!(listing.missing_details(VenueType::Accommodation), vec!["Price"]);
        // Reading rooms advertise an optional starting price
        assert!(listing.missing_details(VenueType::ReadingRoom).is_empty());
    }

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            hashed_password: String::new(),
            name: "Someone".to_string(),
            role,
            verification_status: VerificationStatus::NotRequired,
            avatar_url: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_visibility_rules() {
        let owner = user(UserRole::Admin);
        let student = user(UserRole::Student);
        let reviewer = user(UserRole::SuperAdmin);

        let anonymous = ListingVisibility::new(None, true);
        assert!(anonymous.admits(owner.id, ListingStatus::Live));
        assert!(!anonymous.admits(owner.id, ListingStatus::VerificationPending));

        let own = ListingVisibility::new(Some(&owner), false);
        assert!(own.admits(owner.id, ListingStatus::Draft));
        assert!(!own.admits(student.id, ListingStatus::Draft));

        // Only a super admin may widen the index
        assert!(!ListingVisibility::new(Some(&student), true).include_unverified);

        let review = ListingVisibility::new(Some(&reviewer), true);
        assert!(review.admits(owner.id, ListingStatus::VerificationPending));
        assert!(review.admits(owner.id, ListingStatus::Suspended));
        assert!(!review.admits(owner.id, ListingStatus::Draft));
        assert!(!review.admits(owner.id, ListingStatus::PaymentPending));
    }

    #[test]
    fn test_single_listing_access() {
        let owner = user(UserRole::Admin);
        let stranger = user(UserRole::Student);
        let reviewer = user(UserRole::SuperAdmin);

        assert!(can_view_listing(None, owner.id, ListingStatus::Live));
        assert!(!can_view_listing(None, owner.id, ListingStatus::Draft));
        assert!(can_view_listing(Some(&owner), owner.id, ListingStatus::Draft));
        assert!(!can_view_listing(Some(&stranger), owner.id, ListingStatus::Suspended));
        assert!(can_view_listing(Some(&reviewer), owner.id, ListingStatus::Draft));
    }

    #[test]
    fn test_normalize_city() {
        assert_eq!(normalize_city("  new   delhi "), "New Delhi");
        assert_eq!(normalize_city("PUNE"), "Pune");
        assert_eq!(normalize_city(""), "");
    }

    #[derive(Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "string_list")]
        images: Vec<String>,
        #[serde(default, deserialize_with = "optional_string_list")]
        amenities: Option<Vec<String>>,
    }

    #[test]
    fn test_string_list_accepts_all_shapes() {
        let p: Payload =
            serde_json::from_str(r#"{"images": ["a.jpg", " b.jpg "], "amenities": "wifi, ac,"}"#)
                .unwrap();
        assert_eq!(p.images, vec!["a.jpg", "b.jpg"]);
        assert_eq!(p.amenities, Some(vec!["wifi".to_string(), "ac".to_string()]));

        let p: Payload = serde_json::from_str(r#"{"images": "[\"x.jpg\",\"y.jpg\"]"}"#).unwrap();
        assert_eq!(p.images, vec!["x.jpg", "y.jpg"]);
        assert!(p.amenities.is_none());
    }
}
