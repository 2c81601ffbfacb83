// src/db/inquiry_repository.rs
// DOCUMENTATION: Database operations for accommodation inquiries
// PURPOSE: Create, list, reply to and close inquiries

use crate::errors::ApiError;
use crate::models::{CreateInquiryRequest, Inquiry, InquiryStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Inquiry columns plus the joined accommodation name
const INQUIRY_SELECT: &str = "SELECT i.id, i.accommodation_id, i.student_id, i.owner_id, i.type, \
     i.question, i.student_name, i.student_phone, i.preferred_date, i.preferred_time, i.reply, \
     i.status, i.created_at, i.replied_at, a.name AS accommodation_name \
     FROM inquiries i LEFT JOIN accommodations a ON a.id = i.accommodation_id";

pub struct InquiryRepository;

impl InquiryRepository {
    pub async fn create(
        pool: &PgPool,
        student_id: Uuid,
        owner_id: Uuid,
        req: &CreateInquiryRequest,
    ) -> Result<Inquiry, ApiError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO inquiries (
                id, accommodation_id, student_id, owner_id, type, question,
                student_name, student_phone, preferred_date, preferred_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.accommodation_id)
        .bind(student_id)
        .bind(owner_id)
        .bind(req.type_field)
        .bind(&req.question)
        .bind(&req.student_name)
        .bind(&req.student_phone)
        .bind(&req.preferred_date)
        .bind(&req.preferred_time)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to create inquiry: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Self::get_by_id(pool, id).await
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Inquiry, ApiError> {
        let sql = format!("{} WHERE i.id = $1", INQUIRY_SELECT);

        sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch inquiry {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Inquiry".to_string()))
    }

    /// Inquiries sent by a student, newest first
    pub async fn list_by_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<Inquiry>, ApiError> {
        let sql = format!(
            "{} WHERE i.student_id = $1 ORDER BY i.created_at DESC",
            INQUIRY_SELECT
        );

        sqlx::query_as::<_, Inquiry>(&sql)
            .bind(student_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list inquiries of student {}: {}", student_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Inquiries received by an owner, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Inquiry>, ApiError> {
        let sql = format!(
            "{} WHERE i.owner_id = $1 ORDER BY i.created_at DESC",
            INQUIRY_SELECT
        );

        sqlx::query_as::<_, Inquiry>(&sql)
            .bind(owner_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list inquiries of owner {}: {}", owner_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn reply(pool: &PgPool, id: Uuid, reply: &str) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE inquiries SET reply = $2, status = 'REPLIED', replied_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(reply)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to reply to inquiry {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?;
        Ok(())
    }

    pub async fn set_status(pool: &PgPool, id: Uuid, status: InquiryStatus) -> Result<(), ApiError> {
        sqlx::query("UPDATE inquiries SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to update inquiry {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?;
        Ok(())
    }

    pub async fn count_pending(pool: &PgPool, owner_id: Uuid) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM inquiries WHERE owner_id = $1 AND status = 'PENDING'",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to count pending inquiries: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(count)
    }
}
