// src/models/subscription.rs
// DOCUMENTATION: Listing subscription plans managed by the super admin
// PURPOSE: Maps the subscription_plans table and its payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::listing::{optional_string_list, string_list};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price before GST, in rupees
    pub price: f64,
    pub duration_days: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(range(min = 1, max = 3650))]
    #[serde(default = "default_duration")]
    pub duration_days: i32,

    #[serde(default, deserialize_with = "string_list")]
    pub features: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(range(min = 1, max = 3650))]
    pub duration_days: Option<i32>,

    #[serde(default, deserialize_with = "optional_string_list")]
    pub features: Option<Vec<String>>,

    pub is_active: Option<bool>,

    pub is_default: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

fn default_duration() -> i32 {
    30
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_defaults() {
        let req: CreatePlanRequest =
            serde_json::from_str(r#"{"name": "Basic", "price": 999}"#).unwrap();
        assert_eq!(req.duration_days, 30);
        assert!(req.is_active);
        assert!(!req.is_default);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_plan_rejects_zero_duration() {
        let req: CreatePlanRequest =
            serde_json::from_str(r#"{"name": "Broken", "price": 10, "duration_days": 0}"#)
                .unwrap();
        assert!(req.validate().is_err());
    }
}
