// src/models/boost.rs
// DOCUMENTATION: Paid featured placement for listings
// PURPOSE: Boost plans, owner boost requests and their review payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::listing::VenueType;

pub const APPLICABLE_TO: [&str; 3] = ["reading_room", "accommodation", "both"];
pub const PLACEMENTS: [&str; 3] = ["featured_section", "top_list", "banner"];
pub const PLAN_STATUSES: [&str; 3] = ["draft", "active", "inactive"];

fn one_of(value: &str, allowed: &[&str], code: &'static str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(code))
    }
}

fn validate_applicable_to(value: &str) -> Result<(), ValidationError> {
    one_of(value, &APPLICABLE_TO, "applicable_to")
}

fn validate_placement(value: &str) -> Result<(), ValidationError> {
    one_of(value, &PLACEMENTS, "placement")
}

fn validate_plan_status(value: &str) -> Result<(), ValidationError> {
    one_of(value, &PLAN_STATUSES, "status")
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoostPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub applicable_to: String,
    pub placement: String,
    pub visibility_weight: i32,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoostPlan {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn applies_to(&self, venue_type: VenueType) -> bool {
        self.applicable_to == "both" || self.applicable_to == venue_type.as_str()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoostPlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(range(min = 1, max = 365))]
    pub duration_days: i32,

    #[validate(custom = "validate_applicable_to")]
    #[serde(default = "default_applicable_to")]
    pub applicable_to: String,

    #[validate(custom = "validate_placement")]
    #[serde(default = "default_placement")]
    pub placement: String,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_weight")]
    pub visibility_weight: i32,

    #[validate(custom = "validate_plan_status")]
    #[serde(default = "default_plan_status")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoostPlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(range(min = 1, max = 365))]
    pub duration_days: Option<i32>,

    #[validate(custom = "validate_applicable_to")]
    pub applicable_to: Option<String>,

    #[validate(custom = "validate_placement")]
    pub placement: Option<String>,

    #[validate(range(min = 1, max = 100))]
    pub visibility_weight: Option<i32>,

    #[validate(custom = "validate_plan_status")]
    pub status: Option<String>,
}

fn default_applicable_to() -> String {
    "both".to_string()
}

fn default_placement() -> String {
    "featured_section".to_string()
}

fn default_weight() -> i32 {
    1
}

fn default_plan_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "boost_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BoostRequestStatus {
    Initiated,
    PaymentPending,
    Paid,
    AdminReview,
    Approved,
    Rejected,
    Active,
    Expired,
}

impl BoostRequestStatus {
    /// Requests that still block a new request for the same venue
    pub const OPEN: [BoostRequestStatus; 6] = [
        BoostRequestStatus::Initiated,
        BoostRequestStatus::PaymentPending,
        BoostRequestStatus::Paid,
        BoostRequestStatus::AdminReview,
        BoostRequestStatus::Approved,
        BoostRequestStatus::Active,
    ];

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }

    /// Statuses a super admin can still approve or reject
    pub fn is_reviewable(self) -> bool {
        matches!(
            self,
            BoostRequestStatus::Initiated
                | BoostRequestStatus::PaymentPending
                | BoostRequestStatus::Paid
                | BoostRequestStatus::AdminReview
        )
    }

    pub fn is_payable(self) -> bool {
        matches!(
            self,
            BoostRequestStatus::Initiated | BoostRequestStatus::PaymentPending
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoostRequest {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_name: Option<String>,
    pub venue_id: Uuid,
    pub venue_type: VenueType,
    pub venue_name: Option<String>,
    pub boost_plan_id: Uuid,
    pub plan_name: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub placement: Option<String>,
    pub payment_id: Option<String>,
    pub status: BoostRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBoostRequest {
    pub venue_id: Uuid,
    pub venue_type: VenueType,
    pub boost_plan_id: Uuid,
}

/// Body of PUT /boost/request/{id}/pay
#[derive(Debug, Deserialize)]
pub struct PayBoostRequest {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveBoostRequest {
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectBoostRequest {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BoostRequestQuery {
    pub status_filter: Option<BoostRequestStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeaturedQuery {
    pub venue_type: Option<VenueType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(applicable_to: &str) -> BoostPlan {
        BoostPlan {
            id: Uuid::new_v4(),
            name: "Spotlight".to_string(),
            description: None,
            price: 499.0,
            duration_days: 7,
            applicable_to: applicable_to.to_string(),
            placement: "top_list".to_string(),
            visibility_weight: 3,
            status: "active".to_string(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plan_applicability() {
        assert!(plan("both").applies_to(VenueType::ReadingRoom));
        assert!(plan("both").applies_to(VenueType::Accommodation));
        assert!(plan("accommodation").applies_to(VenueType::Accommodation));
        assert!(!plan("accommodation").applies_to(VenueType::ReadingRoom));
    }

    #[test]
    fn test_plan_request_rejects_unknown_placement() {
        let req: CreateBoostPlanRequest = serde_json::from_str(
            r#"{"name": "Spotlight", "price": 499, "duration_days": 7, "placement": "sidebar"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateBoostPlanRequest = serde_json::from_str(
            r#"{"name": "Spotlight", "price": 499, "duration_days": 7, "placement": "banner"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.status, "draft");
    }

    #[test]
    fn test_request_status_groups() {
        assert!(BoostRequestStatus::Approved.is_open());
        assert!(!BoostRequestStatus::Rejected.is_open());
        assert!(!BoostRequestStatus::Expired.is_open());
        assert!(BoostRequestStatus::Paid.is_reviewable());
        assert!(!BoostRequestStatus::Approved.is_reviewable());
        assert!(!BoostRequestStatus::Paid.is_payable());
    }
}
