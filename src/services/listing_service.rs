// src/services/listing_service.rs
// DOCUMENTATION: Listing lifecycle shared by reading rooms and accommodations
// PURPOSE: Ownership checks, completeness validation and every status transition

use crate::db::{ListingRepository, PaymentRepository};
use crate::errors::ApiError;
use crate::models::*;
use crate::services::payment_service::redeem_order;
use sqlx::PgPool;
use uuid::Uuid;

/// ListingService: the only code path that changes a listing's status
/// DOCUMENTATION: Each operation checks the transition table on
/// `ListingStatus::can_transition_to` before touching the row, and the row
/// update itself is conditional on the status it read
pub struct ListingService;

/// Fails unless `from -> to` is a legal transition
pub fn ensure_transition(from: ListingStatus, to: ListingStatus) -> Result<(), ApiError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ApiError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Fails with the list of missing details when the listing cannot be reviewed yet
pub fn ensure_complete(listing: &ListingSummary, kind: VenueType) -> Result<(), ApiError> {
    let missing = listing.missing_details(kind);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "Incomplete Details: {}",
            missing.join(", ")
        )))
    }
}

fn changed_underneath(kind: VenueType, id: Uuid) -> ApiError {
    log::warn!("{} {} changed status during a transition", kind.as_str(), id);
    ApiError::Conflict("Listing status changed, please retry".to_string())
}

/// What a confirmed subscription payment carries into `ListingService::mark_paid`
pub struct SubscriptionPayment<'a> {
    pub plan: &'a SubscriptionPlan,
    pub amount: f64,
    pub payment_id: &'a str,
    pub order_id: Option<&'a str>,
    pub gateway: PaymentGateway,
}

impl ListingService {
    pub async fn get_summary(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
    ) -> Result<ListingSummary, ApiError> {
        ListingRepository::get_summary(pool, kind, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(kind.label().to_string()))
    }

    /// Load a listing the viewer may see: LIVE ones, or any for its owner
    /// and super admins
    pub async fn get_visible(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        viewer: Option<&User>,
    ) -> Result<ListingSummary, ApiError> {
        let listing = Self::get_summary(pool, kind, id).await?;
        if !can_view_listing(viewer, listing.owner_id, listing.status) {
            return Err(ApiError::Forbidden(format!(
                "This {} is not published",
                kind.label().to_lowercase()
            )));
        }
        Ok(listing)
    }

    /// Load a listing the user owns; anybody else gets 403
    pub async fn get_owned(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        user: &User,
    ) -> Result<ListingSummary, ApiError> {
        let listing = Self::get_summary(pool, kind, id).await?;
        if listing.owner_id != user.id {
            log::warn!(
                "User {} tried to manage {} {} owned by {}",
                user.id,
                kind.as_str(),
                id,
                listing.owner_id
            );
            return Err(ApiError::Forbidden(
                "You do not own this listing".to_string(),
            ));
        }
        Ok(listing)
    }

    /// Owner asks for review. Unpaid listings are parked in PAYMENT_PENDING.
    pub async fn submit_for_verification(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        user: &User,
    ) -> Result<ListingStatus, ApiError> {
        let listing = Self::get_owned(pool, kind, id, user).await?;
        ensure_complete(&listing, kind)?;

        let paid = listing
            .payment_id
            .as_deref()
            .map_or(false, |p| !p.trim().is_empty());

        if !paid {
            if listing.status != ListingStatus::PaymentPending {
                ensure_transition(listing.status, ListingStatus::PaymentPending)?;
                let parked = ListingRepository::update_status(
                    pool,
                    kind,
                    id,
                    listing.status,
                    ListingStatus::PaymentPending,
                )
                .await?;
                if !parked {
                    return Err(changed_underneath(kind, id));
                }
                log::info!("{} {} is waiting for payment", kind.as_str(), id);
            }
            return Err(ApiError::InvalidInput(
                "Payment not completed. Please complete the subscription payment to submit for verification"
                    .to_string(),
            ));
        }

        ensure_transition(listing.status, ListingStatus::VerificationPending)?;
        let moved = ListingRepository::update_status(
            pool,
            kind,
            id,
            listing.status,
            ListingStatus::VerificationPending,
        )
        .await?;
        if !moved {
            return Err(changed_underneath(kind, id));
        }

        log::info!("{} {} submitted for verification", kind.as_str(), id);
        Ok(ListingStatus::VerificationPending)
    }

    /// Record a confirmed subscription payment and queue the listing for review
    /// DOCUMENTATION: Completeness and the transition are checked first. The
    /// gateway order (when there is one) is redeemed, the status changed and
    /// the ledger row written in one transaction
    pub async fn mark_paid(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        user: &User,
        payment: SubscriptionPayment<'_>,
    ) -> Result<VenuePaymentResult, ApiError> {
        let listing = Self::get_owned(pool, kind, id, user).await?;
        ensure_complete(&listing, kind)?;
        ensure_transition(listing.status, ListingStatus::VerificationPending)?;

        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to begin payment transaction: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        if let Some(order_id) = payment.order_id {
            let expected = OrderBinding::subscription(
                user.id,
                id,
                kind,
                payment.plan.id,
                to_paise(payment.amount),
            );
            redeem_order(&mut *tx, order_id, payment.payment_id, &expected).await?;
        }

        let moved = ListingRepository::record_payment(
            &mut *tx,
            kind,
            id,
            listing.status,
            payment.plan.id,
            payment.payment_id,
        )
        .await?;
        if !moved {
            return Err(changed_underneath(kind, id));
        }

        PaymentRepository::insert(
            &mut *tx,
            &NewTransaction {
                user_id: user.id,
                kind: TransactionKind::Subscription,
                gateway: payment.gateway,
                order_id: payment.order_id.map(str::to_string),
                gateway_payment_id: payment.payment_id.to_string(),
                amount: payment.amount,
                venue_id: Some(id),
                venue_type: Some(kind),
                booking_id: None,
                boost_request_id: None,
                description: Some(format!("{} subscription for {}", payment.plan.name, listing.name)),
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit payment for {} {}: {}", kind.as_str(), id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!(
            "{} {} paid ({:?}, {}) and queued for verification",
            kind.as_str(),
            id,
            payment.gateway,
            payment.payment_id
        );

        Ok(VenuePaymentResult {
            venue_id: id,
            venue_type: kind,
            status: ListingStatus::VerificationPending,
            payment_id: payment.payment_id.to_string(),
            message: "Payment verified. Listing submitted for verification".to_string(),
        })
    }

    /// Super admin approval after both review checks
    pub async fn verify(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        reviewer: &User,
        checklist: &ReviewChecklist,
    ) -> Result<(), ApiError> {
        if !checklist.is_complete() {
            return Err(ApiError::ValidationError(
                "Both documents and location must be checked before verifying".to_string(),
            ));
        }

        let listing = Self::get_summary(pool, kind, id).await?;
        ensure_transition(listing.status, ListingStatus::Live)?;

        if !ListingRepository::mark_verified(pool, kind, id).await? {
            return Err(changed_underneath(kind, id));
        }

        log::info!("{} {} verified by {}", kind.as_str(), id, reviewer.id);
        log::info!(
            "Notify owner {}: '{}' is now live",
            listing.owner_id,
            listing.name
        );
        Ok(())
    }

    pub async fn reject(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        reviewer: &User,
        reason: &str,
    ) -> Result<(), ApiError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ApiError::ValidationError(
                "A rejection reason is required".to_string(),
            ));
        }

        let listing = Self::get_summary(pool, kind, id).await?;
        ensure_transition(listing.status, ListingStatus::Rejected)?;

        if !ListingRepository::mark_rejected(pool, kind, id, reason).await? {
            return Err(changed_underneath(kind, id));
        }

        log::info!("{} {} rejected by {}: {}", kind.as_str(), id, reviewer.id, reason);
        log::info!(
            "Notify owner {}: '{}' was rejected ({})",
            listing.owner_id,
            listing.name,
            reason
        );
        Ok(())
    }

    /// LIVE -> SUSPENDED or SUSPENDED -> LIVE
    pub async fn set_suspended(
        pool: &PgPool,
        kind: VenueType,
        id: Uuid,
        reviewer: &User,
        suspended: bool,
    ) -> Result<ListingStatus, ApiError> {
        let target = if suspended {
            ListingStatus::Suspended
        } else {
            ListingStatus::Live
        };

        let listing = Self::get_summary(pool, kind, id).await?;
        ensure_transition(listing.status, target)?;

        if !ListingRepository::update_status(pool, kind, id, listing.status, target).await? {
            return Err(changed_underneath(kind, id));
        }

        log::info!("{} {} set to {} by {}", kind.as_str(), id, target, reviewer.id);
        Ok(target)
    }

    /// Owner deletion, refused while bookings reference the listing
    pub async fn delete(pool: &PgPool, kind: VenueType, id: Uuid, user: &User) -> Result<(), ApiError> {
        Self::get_owned(pool, kind, id, user).await?;

        if ListingRepository::has_bookings(pool, kind, id).await? {
            return Err(ApiError::Conflict(format!(
                "{} has bookings and cannot be deleted",
                kind.label()
            )));
        }

        ListingRepository::delete(pool, kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn listing(status: ListingStatus) -> ListingSummary {
        ListingSummary {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Quiet Corner".to_string(),
            address: "7 FC Road".to_string(),
            city: Some("Pune".to_string()),
            contact_phone: Some("9999999999".to_string()),
            images: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            status,
            payment_id: None,
            payment_date: None,
            subscription_plan_id: None,
            price: None,
        }
    }

    #[test]
    fn test_draft_cannot_go_live() {
        let err = ensure_transition(ListingStatus::Draft, ListingStatus::Live).unwrap_err();
        assert_eq!(err.to_string(), "Cannot move listing from DRAFT to LIVE");
    }

    #[test]
    fn test_every_illegal_transition_rejected() {
        use ListingStatus::*;
        let all = [Draft, PaymentPending, VerificationPending, Live, Rejected, Suspended];
        for from in all {
            for to in all {
                let result = ensure_transition(from, to);
                assert_eq!(result.is_ok(), from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_incomplete_listing_message() {
        let mut room = listing(ListingStatus::Draft);
        room.contact_phone = None;
        room.images.pop();

        let err = ensure_complete(&room, VenueType::ReadingRoom).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(
            err.to_string(),
            "Invalid input: Incomplete Details: Phone, Minimum 4 Images"
        );
    }

    #[test]
    fn test_accommodation_completeness_needs_price() {
        let mut pg = listing(ListingStatus::Draft);
        assert!(ensure_complete(&pg, VenueType::ReadingRoom).is_ok());
        assert!(ensure_complete(&pg, VenueType::Accommodation).is_err());

        pg.price = Some(7500.0);
        assert!(ensure_complete(&pg, VenueType::Accommodation).is_ok());
    }

    #[test]
    fn test_checklist_needs_both_checks() {
        let only_documents = ReviewChecklist {
            documents_checked: true,
            location_checked: false,
        };
        assert!(!only_documents.is_complete());

        let both = ReviewChecklist {
            documents_checked: true,
            location_checked: true,
        };
        assert!(both.is_complete());
    }

    #[actix_rt::test]
    async fn test_verify_refused_before_loading_listing() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap();
        let reviewer = User {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            hashed_password: String::new(),
            name: "Reviewer".to_string(),
            role: UserRole::SuperAdmin,
            verification_status: VerificationStatus::Verified,
            avatar_url: None,
            phone: None,
            created_at: chrono::Utc::now(),
        };
        let checklist = ReviewChecklist {
            documents_checked: false,
            location_checked: true,
        };

        let err = ListingService::verify(
            &pool,
            VenueType::ReadingRoom,
            Uuid::new_v4(),
            &reviewer,
            &checklist,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_unpaid_submit_parks_listing(pool: PgPool) {
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;

        let err = ListingService::submit_for_verification(&pool, VenueType::ReadingRoom, room, &owner)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Payment not completed"));
        assert_eq!(
            test_support::listing_status(&pool, room).await,
            ListingStatus::PaymentPending
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_stale_status_update_is_reported(pool: PgPool) {
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Rejected).await;

        let moved = ListingRepository::update_status(
            &pool,
            VenueType::ReadingRoom,
            room,
            ListingStatus::Draft,
            ListingStatus::PaymentPending,
        )
        .await
        .unwrap();
        assert!(!moved);
        assert_eq!(
            test_support::listing_status(&pool, room).await,
            ListingStatus::Rejected
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_verify_with_empty_checklist_leaves_listing(pool: PgPool) {
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let reviewer = test_support::user(&pool, UserRole::SuperAdmin).await;
        let room =
            test_support::reading_room(&pool, &owner, ListingStatus::VerificationPending).await;

        let checklist = ReviewChecklist {
            documents_checked: false,
            location_checked: false,
        };
        let result =
            ListingService::verify(&pool, VenueType::ReadingRoom, room, &reviewer, &checklist).await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
        assert_eq!(
            test_support::listing_status(&pool, room).await,
            ListingStatus::VerificationPending
        );
    }
}
