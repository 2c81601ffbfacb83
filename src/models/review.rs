// src/models/review.rs
// DOCUMENTATION: Student reviews of venues they stayed at
// PURPOSE: Maps the reviews table, review payloads and the eligibility rule

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::listing::VenueType;

/// Hours a stay must have lasted before it can be reviewed
pub const REVIEW_MIN_STAY_HOURS: i64 = 48;

/// Bookings that started before this instant count as a stay
pub fn stay_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(REVIEW_MIN_STAY_HOURS)
}

/// Review row with the reviewer's display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub reading_room_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of POST /reviews
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub reading_room_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn target(&self) -> Option<(VenueType, Uuid)> {
        match (self.reading_room_id, self.accommodation_id) {
            (Some(id), None) => Some((VenueType::ReadingRoom, id)),
            (None, Some(id)) => Some((VenueType::Accommodation, id)),
            _ => None,
        }
    }
}

/// Query of GET /reviews; at least one filter is required
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub reading_room_id: Option<Uuid>,
    pub accommodation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl ReviewListQuery {
    pub fn is_empty(&self) -> bool {
        self.reading_room_id.is_none() && self.accommodation_id.is_none() && self.user_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEligibility {
    pub eligible: bool,
    pub has_reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReviewEligibility {
    /// A finished or ongoing stay of at least `REVIEW_MIN_STAY_HOURS`, reviewed once
    pub fn decide(has_stay: bool, has_reviewed: bool) -> Self {
        let reason = if has_reviewed {
            Some("You have already reviewed this venue".to_string())
        } else if !has_stay {
            Some(format!(
                "Reviews open {} hours after your booking starts",
                REVIEW_MIN_STAY_HOURS
            ))
        } else {
            None
        };

        Self {
            eligible: reason.is_none(),
            has_reviewed,
            reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    pub total_count: usize,
    pub average_rating: Option<f64>,
}

impl ReviewSummary {
    pub fn new(reviews: Vec<Review>) -> Self {
        let average_rating = if reviews.is_empty() {
            None
        } else {
            let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
            Some(((sum as f64 / reviews.len() as f64) * 10.0).round() / 10.0)
        };
        Self {
            total_count: reviews.len(),
            average_rating,
            reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i32) -> Review {
        Review {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_name: Some("Asha".to_string()),
            reading_room_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            rating,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_eligibility() {
        assert!(ReviewEligibility::decide(true, false).eligible);

        let early = ReviewEligibility::decide(false, false);
        assert!(!early.eligible);
        assert!(early.reason.unwrap().contains("48 hours"));

        let repeat = ReviewEligibility::decide(true, true);
        assert!(!repeat.eligible);
        assert!(repeat.has_reviewed);
    }

    #[test]
    fn test_stay_cutoff() {
        let now = Utc::now();
        assert_eq!(now - stay_cutoff(now), Duration::hours(48));
    }

    #[test]
    fn test_rating_bounds() {
        let mut req = CreateReviewRequest {
            reading_room_id: Some(Uuid::new_v4()),
            accommodation_id: None,
            rating: 5,
            comment: Some("Quiet and clean".to_string()),
        };
        assert!(req.validate().is_ok());

        req.rating = 0;
        assert!(req.validate().is_err());
        req.rating = 6;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_single_target() {
        let mut req = CreateReviewRequest {
            reading_room_id: Some(Uuid::new_v4()),
            accommodation_id: Some(Uuid::new_v4()),
            rating: 4,
            comment: None,
        };
        assert!(req.target().is_none());

        req.reading_room_id = None;
        assert!(matches!(req.target(), Some((VenueType::Accommodation, _))));
    }

    #[test]
    fn test_summary_average() {
        let summary = ReviewSummary::new(vec![review(5), review(4), review(4)]);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.average_rating, Some(4.3));
        assert_eq!(ReviewSummary::new(vec![]).average_rating, None);
    }
}
