// src/db/boost_repository.rs
// DOCUMENTATION: Database operations for boost plans and boost requests
// PURPOSE: Plan catalogue, request lifecycle and expiry of approved boosts

use crate::errors::ApiError;
use crate::models::*;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const PLAN_COLUMNS: &str = "id, name, description, price, duration_days, applicable_to, \
     placement, visibility_weight, status, created_by, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, owner_id, owner_name, venue_id, venue_type, venue_name, \
     boost_plan_id, plan_name, price, duration_days, placement, payment_id, status, \
     requested_at, paid_at, approved_at, approved_by, expiry_date, admin_notes, rejection_reason";

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    log::error!("{}: {}", context, e);
    ApiError::DatabaseError(e.to_string())
}

pub struct BoostRepository;

impl BoostRepository {
    pub async fn list_plans(pool: &PgPool, include_inactive: bool) -> Result<Vec<BoostPlan>, ApiError> {
        let sql = format!(
            "SELECT {} FROM boost_plans WHERE ($1 OR status = 'active') ORDER BY price ASC",
            PLAN_COLUMNS
        );

        sqlx::query_as::<_, BoostPlan>(&sql)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Failed to list boost plans", e))
    }

    pub async fn find_plan(pool: &PgPool, id: Uuid) -> Result<Option<BoostPlan>, ApiError> {
        let sql = format!("SELECT {} FROM boost_plans WHERE id = $1", PLAN_COLUMNS);

        sqlx::query_as::<_, BoostPlan>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Failed to fetch boost plan", e))
    }

    pub async fn create_plan(
        pool: &PgPool,
        created_by: Uuid,
        req: &CreateBoostPlanRequest,
    ) -> Result<BoostPlan, ApiError> {
        let sql = format!(
            "INSERT INTO boost_plans (id, name, description, price, duration_days, applicable_to,
                                      placement, visibility_weight, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            PLAN_COLUMNS
        );

        let plan = sqlx::query_as::<_, BoostPlan>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.duration_days)
            .bind(&req.applicable_to)
            .bind(&req.placement)
            .bind(req.visibility_weight)
            .bind(&req.status)
            .bind(created_by)
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Failed to create boost plan", e))?;

        log::info!("Created boost plan {} ({})", plan.name, plan.id);
        Ok(plan)
    }

    pub async fn update_plan(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateBoostPlanRequest,
    ) -> Result<BoostPlan, ApiError> {
        let sql = format!(
            "UPDATE boost_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                duration_days = COALESCE($5, duration_days),
                applicable_to = COALESCE($6, applicable_to),
                placement = COALESCE($7, placement),
                visibility_weight = COALESCE($8, visibility_weight),
                status = COALESCE($9, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            PLAN_COLUMNS
        );

        sqlx::query_as::<_, BoostPlan>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.duration_days)
            .bind(&req.applicable_to)
            .bind(&req.placement)
            .bind(req.visibility_weight)
            .bind(&req.status)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Failed to update boost plan", e))?
            .ok_or_else(|| ApiError::NotFound("Boost plan".to_string()))
    }

    /// Plans with requests are marked inactive instead of being deleted
    pub async fn delete_plan(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let (in_use,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM boost_requests WHERE boost_plan_id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await
                .map_err(|e| db_error("Failed to check boost plan usage", e))?;

        let sql = if in_use {
            "UPDATE boost_plans SET status = 'inactive', updated_at = NOW() WHERE id = $1"
        } else {
            "DELETE FROM boost_plans WHERE id = $1"
        };

        let result = sqlx::query(sql)
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| db_error("Failed to delete boost plan", e))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Boost plan".to_string()));
        }
        Ok(!in_use)
    }

    /// Whether the venue already has a request in an open status
    pub async fn has_open_request(pool: &PgPool, venue_id: Uuid) -> Result<bool, ApiError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM boost_requests
                WHERE venue_id = $1
                  AND status IN ('initiated', 'payment_pending', 'paid', 'admin_review', 'approved', 'active')
            )
            "#,
        )
        .bind(venue_id)
        .fetch_one(pool)
        .await
        .map_err(|e| db_error("Failed to check open boost requests", e))?;

        Ok(exists)
    }

    pub async fn create_request(
        pool: &PgPool,
        owner: &User,
        venue: &ListingSummary,
        venue_type: VenueType,
        plan: &BoostPlan,
    ) -> Result<BoostRequest, ApiError> {
        let sql = format!(
            "INSERT INTO boost_requests (
                id, owner_id, owner_name, venue_id, venue_type, venue_name, boost_plan_id,
                plan_name, price, duration_days, placement, status
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'payment_pending')
             RETURNING {}",
            REQUEST_COLUMNS
        );

        let request = sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner.id)
            .bind(&owner.name)
            .bind(venue.id)
            .bind(venue_type)
            .bind(&venue.name)
            .bind(plan.id)
            .bind(&plan.name)
            .bind(plan.price)
            .bind(plan.duration_days)
            .bind(&plan.placement)
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Failed to create boost request", e))?;

        log::info!(
            "Boost request {} created for {} {}",
            request.id,
            venue_type.as_str(),
            venue.id
        );
        Ok(request)
    }

    pub async fn find_request(pool: &PgPool, id: Uuid) -> Result<Option<BoostRequest>, ApiError> {
        let sql = format!("SELECT {} FROM boost_requests WHERE id = $1", REQUEST_COLUMNS);

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Failed to fetch boost request", e))
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<BoostRequest>, ApiError> {
        let sql = format!(
            "SELECT {} FROM boost_requests WHERE owner_id = $1 ORDER BY requested_at DESC",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(owner_id)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Failed to list boost requests", e))
    }

    pub async fn list_all(
        pool: &PgPool,
        status: Option<BoostRequestStatus>,
    ) -> Result<Vec<BoostRequest>, ApiError> {
        let sql = format!(
            "SELECT {} FROM boost_requests
             WHERE ($1::boost_request_status IS NULL OR status = $1)
             ORDER BY requested_at DESC",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(status)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Failed to list boost requests", e))
    }

    /// Mark a payable request as paid on the caller's transaction
    pub async fn mark_paid(
        conn: &mut PgConnection,
        id: Uuid,
        payment_id: &str,
    ) -> Result<Option<BoostRequest>, ApiError> {
        let sql = format!(
            "UPDATE boost_requests SET status = 'paid', payment_id = $2, paid_at = NOW()
             WHERE id = $1 AND status IN ('initiated', 'payment_pending')
             RETURNING {}",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(id)
            .bind(payment_id)
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("Failed to mark boost request paid", e))
    }

    /// Approve a reviewable request; the boost runs for the plan's duration
    pub async fn approve(
        pool: &PgPool,
        id: Uuid,
        approved_by: Uuid,
        admin_notes: Option<&str>,
    ) -> Result<Option<BoostRequest>, ApiError> {
        let sql = format!(
            "UPDATE boost_requests SET status = 'approved', approved_at = NOW(), approved_by = $2,
                    expiry_date = NOW() + make_interval(days => duration_days),
                    admin_notes = COALESCE($3, admin_notes)
             WHERE id = $1 AND status IN ('initiated', 'payment_pending', 'paid', 'admin_review')
             RETURNING {}",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(id)
            .bind(approved_by)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Failed to approve boost request", e))
    }

    pub async fn reject(
        pool: &PgPool,
        id: Uuid,
        reason: &str,
        admin_notes: Option<&str>,
    ) -> Result<Option<BoostRequest>, ApiError> {
        let sql = format!(
            "UPDATE boost_requests SET status = 'rejected', rejection_reason = $2,
                    admin_notes = COALESCE($3, admin_notes)
             WHERE id = $1 AND status IN ('initiated', 'payment_pending', 'paid', 'admin_review')
             RETURNING {}",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(id)
            .bind(reason)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
            .map_err(|e| db_error("Failed to reject boost request", e))
    }

    /// Approved boosts that have not expired yet, highest plan price first
    pub async fn list_featured(
        pool: &PgPool,
        venue_type: Option<VenueType>,
    ) -> Result<Vec<BoostRequest>, ApiError> {
        let sql = format!(
            "SELECT {} FROM boost_requests
             WHERE status IN ('approved', 'active') AND expiry_date > NOW()
               AND ($1::venue_type IS NULL OR venue_type = $1)
             ORDER BY price DESC, approved_at ASC",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, BoostRequest>(&sql)
            .bind(venue_type)
            .fetch_all(pool)
            .await
            .map_err(|e| db_error("Failed to list featured boosts", e))
    }

    /// Expire approved boosts past their expiry date; returns the count
    pub async fn expire_boosts(pool: &PgPool) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE boost_requests SET status = 'expired'
             WHERE status IN ('approved', 'active') AND expiry_date <= NOW()",
        )
        .execute(pool)
        .await
        .map_err(|e| db_error("Failed to expire boosts", e))?;

        Ok(result.rows_affected())
    }
}
