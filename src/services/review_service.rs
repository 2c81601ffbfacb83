// src/services/review_service.rs
// DOCUMENTATION: Who may review which venue
// PURPOSE: Eligibility from stay history, then a single review per venue

use crate::db::ReviewRepository;
use crate::errors::ApiError;
use crate::models::*;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ReviewService;

impl ReviewService {
    pub async fn eligibility(
        pool: &PgPool,
        user: &User,
        kind: VenueType,
        venue_id: Uuid,
    ) -> Result<ReviewEligibility, ApiError> {
        let has_reviewed = ReviewRepository::has_reviewed(pool, user.id, kind, venue_id).await?;
        let has_stay =
            ReviewRepository::has_stay(pool, user.id, kind, venue_id, stay_cutoff(Utc::now()))
                .await?;
        Ok(ReviewEligibility::decide(has_stay, has_reviewed))
    }

    pub async fn create(
        pool: &PgPool,
        user: &User,
        req: &CreateReviewRequest,
    ) -> Result<Review, ApiError> {
        let (kind, venue_id) = req.target().ok_or_else(|| {
            ApiError::InvalidInput(
                "Provide exactly one of reading_room_id or accommodation_id".to_string(),
            )
        })?;

        let eligibility = Self::eligibility(pool, user, kind, venue_id).await?;
        if let Some(reason) = eligibility.reason {
            return Err(ApiError::InvalidInput(reason));
        }

        let comment = req
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        ReviewRepository::create(pool, user.id, kind, venue_id, req.rating, comment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use chrono::Duration;

    async fn booked_stay(pool: &PgPool, student: &User, room: Uuid, started_hours_ago: i64) {
        let cabin = test_support::cabin(pool, room).await;
        let start = Utc::now() - Duration::hours(started_hours_ago);
        sqlx::query(
            "INSERT INTO bookings (id, user_id, cabin_id, start_date, end_date, amount, status, payment_status)
             VALUES ($1, $2, $3, $4, $5, 1500, 'ACTIVE', 'PAID')",
        )
        .bind(Uuid::new_v4())
        .bind(student.id)
        .bind(cabin)
        .bind(start)
        .bind(start + Duration::days(30))
        .execute(pool)
        .await
        .unwrap();
    }

    fn review_of(room: Uuid) -> CreateReviewRequest {
        CreateReviewRequest {
            reading_room_id: Some(room),
            accommodation_id: None,
            rating: 4,
            comment: Some("  Good lighting  ".to_string()),
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_recent_booking_cannot_review(pool: PgPool) {
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let student = test_support::user(&pool, UserRole::Student).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Live).await;
        booked_stay(&pool, &student, room, 2).await;

        let eligibility = ReviewService::eligibility(&pool, &student, VenueType::ReadingRoom, room)
            .await
            .unwrap();
        assert!(!eligibility.eligible);
        assert!(matches!(
            ReviewService::create(&pool, &student, &review_of(room)).await,
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_one_review_per_stay(pool: PgPool) {
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let student = test_support::user(&pool, UserRole::Student).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Live).await;
        booked_stay(&pool, &student, room, 72).await;

        let review = ReviewService::create(&pool, &student, &review_of(room))
            .await
            .unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(review.comment.as_deref(), Some("Good lighting"));

        let eligibility = ReviewService::eligibility(&pool, &student, VenueType::ReadingRoom, room)
            .await
            .unwrap();
        assert!(eligibility.has_reviewed);
        assert!(ReviewService::create(&pool, &student, &review_of(room))
            .await
            .is_err());
    }
}
