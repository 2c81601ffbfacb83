// src/db/subscription_repository.rs
// DOCUMENTATION: Database operations for listing subscription plans
// PURPOSE: Plan catalogue managed by the super admin

use crate::errors::ApiError;
use crate::models::{CreatePlanRequest, SubscriptionPlan, UpdatePlanRequest};
use sqlx::PgPool;
use uuid::Uuid;

const PLAN_COLUMNS: &str = "id, name, description, price, duration_days, features, is_active, \
     is_default, created_by, created_at, updated_at";

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// Plans ordered by price; inactive ones only when asked for
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<SubscriptionPlan>, ApiError> {
        let sql = format!(
            "SELECT {} FROM subscription_plans WHERE ($1 OR is_active) ORDER BY price ASC",
            PLAN_COLUMNS
        );

        sqlx::query_as::<_, SubscriptionPlan>(&sql)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list subscription plans: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<SubscriptionPlan>, ApiError> {
        let sql = format!("SELECT {} FROM subscription_plans WHERE id = $1", PLAN_COLUMNS);

        sqlx::query_as::<_, SubscriptionPlan>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch subscription plan {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn create(
        pool: &PgPool,
        created_by: Uuid,
        req: &CreatePlanRequest,
    ) -> Result<SubscriptionPlan, ApiError> {
        let sql = format!(
            "INSERT INTO subscription_plans (id, name, description, price, duration_days, features, is_active, is_default, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            PLAN_COLUMNS
        );

        let plan = sqlx::query_as::<_, SubscriptionPlan>(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.duration_days)
            .bind(&req.features)
            .bind(req.is_active)
            .bind(req.is_default)
            .bind(created_by)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to create subscription plan: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::info!("Created subscription plan {} ({})", plan.name, plan.id);
        Ok(plan)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdatePlanRequest,
    ) -> Result<SubscriptionPlan, ApiError> {
        let sql = format!(
            "UPDATE subscription_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                duration_days = COALESCE($5, duration_days),
                features = COALESCE($6, features),
                is_active = COALESCE($7, is_active),
                is_default = COALESCE($8, is_default),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            PLAN_COLUMNS
        );

        sqlx::query_as::<_, SubscriptionPlan>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.duration_days)
            .bind(&req.features)
            .bind(req.is_active)
            .bind(req.is_default)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to update subscription plan {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Subscription plan".to_string()))
    }

    /// Plans referenced by listings are deactivated instead of deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let (in_use,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM reading_rooms WHERE subscription_plan_id = $1)
                OR EXISTS(SELECT 1 FROM accommodations WHERE subscription_plan_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to check plan usage {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let sql = if in_use {
            "UPDATE subscription_plans SET is_active = FALSE, updated_at = NOW() WHERE id = $1"
        } else {
            "DELETE FROM subscription_plans WHERE id = $1"
        };

        let result = sqlx::query(sql).bind(id).execute(pool).await.map_err(|e| {
            log::error!("Failed to delete subscription plan {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Subscription plan".to_string()));
        }
        Ok(!in_use)
    }
}
