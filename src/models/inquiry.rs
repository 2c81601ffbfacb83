// src/models/inquiry.rs
// DOCUMENTATION: Student questions and visit requests about accommodations
// PURPOSE: Maps the inquiries table and its payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inquiry_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryStatus {
    Pending,
    Replied,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inquiry_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryType {
    #[default]
    Question,
    Visit,
}

/// Inquiry row joined with the accommodation name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inquiry {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub student_id: Uuid,
    pub owner_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub type_field: InquiryType,
    pub question: String,
    pub student_name: String,
    pub student_phone: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub reply: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub replied_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub accommodation_name: Option<String>,
}

/// Request DTO for POST /inquiries
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInquiryRequest {
    pub accommodation_id: Uuid,

    #[serde(default, rename = "type")]
    pub type_field: InquiryType,

    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    #[validate(length(min = 1, max = 100))]
    pub student_name: String,

    pub student_phone: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
}

impl CreateInquiryRequest {
    /// Visit requests must say when the student wants to come
    pub fn check_visit_details(&self) -> Result<(), String> {
        let has_date = self
            .preferred_date
            .as_deref()
            .map_or(false, |d| !d.trim().is_empty());
        if self.type_field == InquiryType::Visit && !has_date {
            return Err("preferred_date is required for visit requests".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyRequest {
    #[validate(length(min = 1, max = 2000))]
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct PendingCountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: InquiryType, date: Option<&str>) -> CreateInquiryRequest {
        CreateInquiryRequest {
            accommodation_id: Uuid::new_v4(),
            type_field: kind,
            question: "Is food included?".to_string(),
            student_name: "Asha".to_string(),
            student_phone: None,
            preferred_date: date.map(str::to_string),
            preferred_time: None,
        }
    }

    #[test]
    fn test_visit_requires_date() {
        assert!(request(InquiryType::Visit, None).check_visit_details().is_err());
        assert!(request(InquiryType::Visit, Some(" ")).check_visit_details().is_err());
        assert!(request(InquiryType::Visit, Some("2026-11-02"))
            .check_visit_details()
            .is_ok());
        assert!(request(InquiryType::Question, None).check_visit_details().is_ok());
    }

    #[test]
    fn test_type_defaults_to_question() {
        let req: CreateInquiryRequest = serde_json::from_str(&format!(
            r#"{{"accommodation_id": "{}", "question": "Wifi?", "student_name": "Ravi"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(req.type_field, InquiryType::Question);
    }
}
