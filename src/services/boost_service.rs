// src/services/boost_service.rs
// DOCUMENTATION: Paid featured placement for listings
// PURPOSE: Boost request creation, payment, super admin review and the featured list

use crate::db::{BoostRepository, PaymentRepository};
use crate::errors::ApiError;
use crate::models::*;
use crate::services::listing_service::ListingService;
use crate::services::payment_service::{redeem_order, PaymentService, DEFAULT_CURRENCY};
use crate::services::razorpay_client::RazorpayClient;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct BoostService;

/// Why a plan cannot be bought for a venue type, if it cannot
pub fn plan_unavailable(plan: &BoostPlan, venue_type: VenueType) -> Option<String> {
    if !plan.is_active() {
        return Some("Boost plan is not active".to_string());
    }
    if !plan.applies_to(venue_type) {
        return Some(format!(
            "Boost plan does not apply to {} listings",
            venue_type.as_str()
        ));
    }
    None
}

fn not_reviewable(request: &BoostRequest, action: &str) -> ApiError {
    ApiError::Conflict(format!(
        "Boost request cannot be {} from status {:?}",
        action, request.status
    ))
}

impl BoostService {
    pub async fn request(
        pool: &PgPool,
        owner: &User,
        req: &CreateBoostRequest,
    ) -> Result<BoostRequest, ApiError> {
        let plan = BoostRepository::find_plan(pool, req.boost_plan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Boost plan".to_string()))?;

        if let Some(reason) = plan_unavailable(&plan, req.venue_type) {
            return Err(ApiError::InvalidInput(reason));
        }

        let venue = ListingService::get_owned(pool, req.venue_type, req.venue_id, owner).await?;

        if BoostRepository::has_open_request(pool, venue.id).await? {
            return Err(ApiError::Conflict(
                "This venue already has an open boost request".to_string(),
            ));
        }

        BoostRepository::create_request(pool, owner, &venue, req.venue_type, &plan).await
    }

    async fn get_request(pool: &PgPool, id: Uuid) -> Result<BoostRequest, ApiError> {
        BoostRepository::find_request(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Boost request".to_string()))
    }

    /// Gateway order for a boost request, priced from the request
    pub async fn create_order(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        owner: &User,
        id: Uuid,
    ) -> Result<OrderResponse, ApiError> {
        let request = Self::get_request(pool, id).await?;
        if request.owner_id != owner.id {
            return Err(ApiError::Forbidden(
                "You do not own this boost request".to_string(),
            ));
        }
        if !request.status.is_payable() {
            return Err(not_reviewable(&request, "paid"));
        }

        let receipt = format!("boost_{}", request.id.simple());
        let notes = json!({
            "boost_request_id": request.id,
            "venue_id": request.venue_id,
            "owner_id": owner.id,
        });

        PaymentService::issue_order(
            pool,
            razorpay,
            request.price,
            DEFAULT_CURRENCY,
            &receipt,
            notes,
            &OrderBinding::boost(owner.id, &request),
        )
        .await
    }

    /// Verify the checkout callback and mark the request paid with its ledger row
    /// DOCUMENTATION: The order must come from `create_order` for this request
    pub async fn pay(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        owner: &User,
        id: Uuid,
        req: &PayBoostRequest,
    ) -> Result<BoostRequest, ApiError> {
        let request = Self::get_request(pool, id).await?;
        if request.owner_id != owner.id {
            return Err(ApiError::Forbidden(
                "You do not own this boost request".to_string(),
            ));
        }
        if !request.status.is_payable() {
            return Err(not_reviewable(&request, "paid"));
        }

        let gateway = razorpay.verify_signature(&req.order_id, &req.payment_id, &req.signature)?;

        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to begin boost payment: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        redeem_order(
            &mut *tx,
            &req.order_id,
            &req.payment_id,
            &OrderBinding::boost(owner.id, &request),
        )
        .await?;

        let paid = BoostRepository::mark_paid(&mut *tx, id, &req.payment_id)
            .await?
            .ok_or_else(|| not_reviewable(&request, "paid"))?;

        PaymentRepository::insert(
            &mut *tx,
            &NewTransaction {
                user_id: owner.id,
                kind: TransactionKind::Boost,
                gateway,
                order_id: Some(req.order_id.clone()),
                gateway_payment_id: req.payment_id.clone(),
                amount: paid.price,
                venue_id: Some(paid.venue_id),
                venue_type: Some(paid.venue_type),
                booking_id: None,
                boost_request_id: Some(paid.id),
                description: paid.plan_name.as_ref().map(|name| format!("Boost: {}", name)),
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit boost payment {}: {}", id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Boost request {} paid ({})", id, req.payment_id);
        Ok(paid)
    }

    pub async fn approve(
        pool: &PgPool,
        reviewer: &User,
        id: Uuid,
        req: &ApproveBoostRequest,
    ) -> Result<BoostRequest, ApiError> {
        let request = Self::get_request(pool, id).await?;
        let approved = BoostRepository::approve(pool, id, reviewer.id, req.admin_notes.as_deref())
            .await?
            .ok_or_else(|| not_reviewable(&request, "approved"))?;

        log::info!("Boost request {} approved by {}", id, reviewer.id);
        log::info!(
            "Notify owner {}: boost for {} is live until {:?}",
            approved.owner_id,
            approved.venue_name.as_deref().unwrap_or("venue"),
            approved.expiry_date
        );
        Ok(approved)
    }

    pub async fn reject(
        pool: &PgPool,
        reviewer: &User,
        id: Uuid,
        req: &RejectBoostRequest,
    ) -> Result<BoostRequest, ApiError> {
        let reason = req.reason.trim();
        if reason.is_empty() {
            return Err(ApiError::ValidationError(
                "A rejection reason is required".to_string(),
            ));
        }

        let request = Self::get_request(pool, id).await?;
        let rejected = BoostRepository::reject(pool, id, reason, req.admin_notes.as_deref())
            .await?
            .ok_or_else(|| not_reviewable(&request, "rejected"))?;

        log::info!("Boost request {} rejected by {}: {}", id, reviewer.id, reason);
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plan(applicable_to: &str, status: &str) -> BoostPlan {
        BoostPlan {
            id: Uuid::new_v4(),
            name: "Weekly spotlight".to_string(),
            description: None,
            price: 499.0,
            duration_days: 7,
            applicable_to: applicable_to.to_string(),
            placement: "featured_section".to_string(),
            visibility_weight: 1,
            status: status.to_string(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_inactive_plan_unavailable() {
        let draft = plan("both", "draft");
        assert_eq!(
            plan_unavailable(&draft, VenueType::ReadingRoom).as_deref(),
            Some("Boost plan is not active")
        );
    }

    #[test]
    fn test_plan_scope_checked() {
        let rooms_only = plan("reading_room", "active");
        assert!(plan_unavailable(&rooms_only, VenueType::ReadingRoom).is_none());
        assert!(plan_unavailable(&rooms_only, VenueType::Accommodation).is_some());

        let both = plan("both", "active");
        assert!(plan_unavailable(&both, VenueType::Accommodation).is_none());
    }
}
