// src/services/payment_service.rs
// DOCUMENTATION: Checkout orders, payment verification and venue subscription payments
// PURPOSE: Glue between the Razorpay client, the listing lifecycle and the ledger

use crate::config::Config;
use crate::db::{BookingRepository, PaymentOrderRepository, PaymentRepository, SubscriptionRepository};
use crate::errors::ApiError;
use crate::models::*;
use crate::services::listing_service::{ListingService, SubscriptionPayment};
use crate::services::razorpay_client::RazorpayClient;
use serde_json::{json, Value};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub const DEFAULT_CURRENCY: &str = "INR";

pub struct PaymentService;

/// Fails unless `order` is unused, belongs to the payer and was issued for `expected`
pub fn ensure_order_matches(order: &PaymentOrder, expected: &OrderBinding) -> Result<(), ApiError> {
    if order.consumed_at.is_some() {
        return Err(ApiError::Conflict(
            "Payment order has already been used".to_string(),
        ));
    }
    if order.user_id != expected.user_id {
        log::warn!(
            "User {} tried to redeem order {} issued to {}",
            expected.user_id,
            order.order_id,
            order.user_id
        );
        return Err(ApiError::Forbidden(
            "Payment order belongs to another account".to_string(),
        ));
    }

    let bound = order.binding();
    if !bound.same_target(expected) {
        log::warn!(
            "Order {} was issued for {:?}, redeemed for {:?}",
            order.order_id,
            bound,
            expected
        );
        return Err(ApiError::InvalidInput(
            "Payment order was created for a different purchase".to_string(),
        ));
    }
    if bound.amount != expected.amount {
        return Err(ApiError::InvalidInput(format!(
            "Payment amount {} does not match the expected {} paise",
            bound.amount, expected.amount
        )));
    }
    Ok(())
}

/// Lock `order_id` on the caller's transaction, check it against `expected`
/// and mark it used by `payment_id`
pub async fn redeem_order(
    conn: &mut PgConnection,
    order_id: &str,
    payment_id: &str,
    expected: &OrderBinding,
) -> Result<PaymentOrder, ApiError> {
    let order = PaymentOrderRepository::lock(&mut *conn, order_id).await?;
    ensure_order_matches(&order, expected)?;
    PaymentOrderRepository::consume(conn, order_id, payment_id).await?;
    Ok(order)
}

impl PaymentService {
    /// Create a gateway order and remember what it pays for
    pub async fn issue_order(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        amount: f64,
        currency: &str,
        receipt: &str,
        notes: Value,
        binding: &OrderBinding,
    ) -> Result<OrderResponse, ApiError> {
        let order = razorpay.create_order(amount, currency, receipt, notes).await?;
        PaymentOrderRepository::insert(pool, &order.id, &order.currency, binding).await?;
        Ok(order)
    }

    /// Checkout order. With `booking_id` it is priced from, and bound to,
    /// the caller's held booking.
    pub async fn create_order(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        user: &User,
        req: CreateOrderRequest,
    ) -> Result<OrderResponse, ApiError> {
        let currency = req.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
        let receipt = req
            .receipt
            .clone()
            .unwrap_or_else(|| format!("rcpt_{}", chrono::Utc::now().timestamp_millis()));

        let Some(booking_id) = req.booking_id else {
            let amount = req.amount.ok_or_else(|| {
                ApiError::InvalidInput("Provide an amount or a booking_id".to_string())
            })?;
            let notes = req.notes.unwrap_or_else(|| json!({ "user_id": user.id }));
            return razorpay.create_order(amount, currency, &receipt, notes).await;
        };

        let booking = BookingRepository::find_by_id(pool, booking_id)
            .await?
            .filter(|b| b.user_id == user.id)
            .ok_or_else(|| ApiError::NotFound("Booking".to_string()))?;
        if !booking.is_confirmable(chrono::Utc::now()) {
            return Err(ApiError::Conflict(
                "Booking is not awaiting payment".to_string(),
            ));
        }
        if let Some(amount) = req.amount {
            if to_paise(amount) != to_paise(booking.amount) {
                log::info!(
                    "Ignoring client amount {} for booking {} ({})",
                    amount,
                    booking.id,
                    booking.amount
                );
            }
        }

        let notes = req
            .notes
            .unwrap_or_else(|| json!({ "user_id": user.id, "booking_id": booking.id }));
        let binding = OrderBinding::booking(user.id, booking.id, to_paise(booking.amount));

        Self::issue_order(pool, razorpay, booking.amount, currency, &receipt, notes, &binding).await
    }

    /// Verify a checkout callback and, when it names one, confirm the held booking
    /// DOCUMENTATION: The booking confirmation and its BOOKING ledger row are
    /// written in one transaction
    pub async fn verify(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        user: &User,
        req: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, ApiError> {
        let gateway = razorpay.verify_signature(
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &req.razorpay_signature,
        )?;

        let booking = match req.booking_id {
            Some(booking_id) => Some(
                Self::confirm_booking(pool, user, booking_id, gateway, req).await?,
            ),
            None => None,
        };

        Ok(VerifyPaymentResponse {
            verified: true,
            order_id: req.razorpay_order_id.clone(),
            payment_id: req.razorpay_payment_id.clone(),
            booking,
        })
    }

    async fn confirm_booking(
        pool: &PgPool,
        user: &User,
        booking_id: Uuid,
        gateway: PaymentGateway,
        req: &VerifyPaymentRequest,
    ) -> Result<Booking, ApiError> {
        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to begin booking payment: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        let booking = BookingRepository::confirm_in(
            &mut tx,
            booking_id,
            user.id,
            Some(&req.razorpay_payment_id),
        )
        .await?;

        redeem_order(
            &mut *tx,
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &OrderBinding::booking(user.id, booking.id, to_paise(booking.amount)),
        )
        .await?;

        PaymentRepository::insert(
            &mut *tx,
            &NewTransaction {
                user_id: user.id,
                kind: TransactionKind::Booking,
                gateway,
                order_id: Some(req.razorpay_order_id.clone()),
                gateway_payment_id: req.razorpay_payment_id.clone(),
                amount: booking.amount,
                venue_id: booking.accommodation_id,
                venue_type: booking.accommodation_id.map(|_| VenueType::Accommodation),
                booking_id: Some(booking.id),
                boost_request_id: None,
                description: Some("Booking payment".to_string()),
            },
        )
        .await?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit booking payment {}: {}", booking_id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        log::info!("Booking {} paid with {}", booking_id, req.razorpay_payment_id);
        Ok(booking)
    }

    pub async fn history(pool: &PgPool, user: &User) -> Result<PaymentHistoryResponse, ApiError> {
        let transactions = PaymentRepository::list_by_user(pool, user.id).await?;
        Ok(PaymentHistoryResponse::new(transactions))
    }

    /// Booking payments received on the owner's venues
    pub async fn owner_history(
        pool: &PgPool,
        owner: &User,
    ) -> Result<OwnerPaymentHistoryResponse, ApiError> {
        let payments = PaymentRepository::list_for_owner(pool, owner.id).await?;
        Ok(OwnerPaymentHistoryResponse::new(payments))
    }

    async fn active_plan(pool: &PgPool, plan_id: Uuid) -> Result<SubscriptionPlan, ApiError> {
        let plan = SubscriptionRepository::find_by_id(pool, plan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Subscription plan".to_string()))?;

        if !plan.is_active {
            return Err(ApiError::InvalidInput(
                "Subscription plan is not active".to_string(),
            ));
        }
        Ok(plan)
    }

    /// Order for a listing subscription; the amount is computed here, never taken from the client
    pub async fn create_venue_order(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        config: &Config,
        user: &User,
        req: &VenueOrderRequest,
    ) -> Result<VenueOrderResponse, ApiError> {
        let plan = Self::active_plan(pool, req.subscription_plan_id).await?;
        let listing = ListingService::get_owned(pool, req.venue_type, req.venue_id, user).await?;

        if !listing.status.accepts_payment() {
            return Err(ApiError::InvalidTransition {
                from: listing.status.to_string(),
                to: ListingStatus::VerificationPending.to_string(),
            });
        }

        let amount = price_with_gst(plan.price, config.gst_rate);
        let receipt = format!("venue_{}", listing.id.simple());
        let notes = json!({
            "venue_id": listing.id,
            "venue_type": req.venue_type,
            "subscription_plan_id": plan.id,
            "owner_id": user.id,
        });

        let binding = OrderBinding::subscription(
            user.id,
            listing.id,
            req.venue_type,
            plan.id,
            to_paise(amount),
        );
        let order = Self::issue_order(
            pool,
            razorpay,
            amount,
            DEFAULT_CURRENCY,
            &receipt,
            notes,
            &binding,
        )
        .await?;

        log::info!(
            "Venue order {} for {} {} ({} paise)",
            order.id,
            req.venue_type.as_str(),
            listing.id,
            order.amount
        );

        Ok(VenueOrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            razorpay_key_id: order.key_id,
            is_demo: order.is_demo,
            subscription_plan: plan,
        })
    }

    /// Signature check, then the listing moves to VERIFICATION_PENDING
    /// DOCUMENTATION: The order must have been issued by `create_venue_order`
    /// for this venue and plan; it is redeemed in the same transaction
    pub async fn verify_venue_payment(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        config: &Config,
        user: &User,
        req: &VerifyVenuePaymentRequest,
    ) -> Result<VenuePaymentResult, ApiError> {
        let gateway = razorpay.verify_signature(
            &req.razorpay_order_id,
            &req.razorpay_payment_id,
            &req.razorpay_signature,
        )?;

        let plan = SubscriptionRepository::find_by_id(pool, req.subscription_plan_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Subscription plan".to_string()))?;

        ListingService::mark_paid(
            pool,
            req.venue_type,
            req.venue_id,
            user,
            SubscriptionPayment {
                plan: &plan,
                amount: price_with_gst(plan.price, config.gst_rate),
                payment_id: &req.razorpay_payment_id,
                order_id: Some(&req.razorpay_order_id),
                gateway,
            },
        )
        .await
    }

    /// Skip the gateway entirely; only outside production or in demo mode
    pub async fn dev_bypass(
        pool: &PgPool,
        config: &Config,
        user: &User,
        req: &DevBypassRequest,
    ) -> Result<VenuePaymentResult, ApiError> {
        if !bypass_allowed(config) {
            log::warn!("Payment bypass attempted by {} in production", user.id);
            return Err(ApiError::Forbidden(
                "Payment bypass is disabled in production".to_string(),
            ));
        }

        let plan = Self::active_plan(pool, req.subscription_plan_id).await?;
        let payment_id = format!("dev_bypass_{}", chrono::Utc::now().timestamp_millis());

        ListingService::mark_paid(
            pool,
            req.venue_type,
            req.venue_id,
            user,
            SubscriptionPayment {
                plan: &plan,
                amount: price_with_gst(plan.price, config.gst_rate),
                payment_id: &payment_id,
                order_id: None,
                gateway: PaymentGateway::Manual,
            },
        )
        .await
    }

    /// Payment state of a listing, for its owner or a super admin
    pub async fn venue_status(
        pool: &PgPool,
        user: &User,
        venue_id: Uuid,
        kind: VenueType,
    ) -> Result<VenuePaymentStatusResponse, ApiError> {
        let listing = ListingService::get_summary(pool, kind, venue_id).await?;
        if listing.owner_id != user.id && !user.is_super_admin() {
            return Err(ApiError::Forbidden(
                "You do not own this listing".to_string(),
            ));
        }

        Ok(VenuePaymentStatusResponse {
            venue_id: listing.id,
            status: listing.status,
            payment_status: VenuePaymentStatusResponse::payment_label(listing.status),
            payment_id: listing.payment_id,
            payment_date: listing.payment_date,
            subscription_plan_id: listing.subscription_plan_id,
        })
    }
}

fn bypass_allowed(config: &Config) -> bool {
    config.is_payment_demo() || !config.is_production()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_bypass_allowed_outside_production() {
        let config = Config::for_tests();
        assert!(bypass_allowed(&config));
    }

    #[test]
    fn test_bypass_refused_in_live_production() {
        let mut config = Config::for_tests();
        config.environment = "production".to_string();
        config.payment_demo_mode = false;
        config.razorpay_key_id = "rzp_live_key".to_string();
        config.razorpay_key_secret = "rzp_live_secret".to_string();
        assert!(!bypass_allowed(&config));

        config.payment_demo_mode = true;
        assert!(bypass_allowed(&config));
    }

    fn issued(binding: &OrderBinding) -> PaymentOrder {
        PaymentOrder {
            order_id: "order_demo_1_abcd".to_string(),
            user_id: binding.user_id,
            purpose: binding.purpose,
            amount: binding.amount,
            currency: DEFAULT_CURRENCY.to_string(),
            venue_id: binding.venue_id,
            venue_type: binding.venue_type,
            subscription_plan_id: binding.subscription_plan_id,
            booking_id: binding.booking_id,
            boost_request_id: binding.boost_request_id,
            payment_id: None,
            consumed_at: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_order_redeemable_for_its_purchase() {
        let binding = OrderBinding::subscription(
            Uuid::new_v4(),
            Uuid::new_v4(),
            VenueType::ReadingRoom,
            Uuid::new_v4(),
            117882,
        );
        assert!(ensure_order_matches(&issued(&binding), &binding).is_ok());
    }

    #[test]
    fn test_used_order_rejected() {
        let binding = OrderBinding::booking(Uuid::new_v4(), Uuid::new_v4(), 150000);
        let mut order = issued(&binding);
        order.consumed_at = Some(chrono::Utc::now());

        let err = ensure_order_matches(&order, &binding).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_order_of_another_user_rejected() {
        let binding = OrderBinding::booking(Uuid::new_v4(), Uuid::new_v4(), 150000);
        let mut expected = binding.clone();
        expected.user_id = Uuid::new_v4();

        let err = ensure_order_matches(&issued(&binding), &expected).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_order_for_other_venue_or_plan_rejected() {
        let user = Uuid::new_v4();
        let plan = Uuid::new_v4();
        let paid_for =
            OrderBinding::subscription(user, Uuid::new_v4(), VenueType::ReadingRoom, plan, 117882);

        let other_venue =
            OrderBinding::subscription(user, Uuid::new_v4(), VenueType::ReadingRoom, plan, 117882);
        assert!(matches!(
            ensure_order_matches(&issued(&paid_for), &other_venue),
            Err(ApiError::InvalidInput(_))
        ));

        let mut other_plan = paid_for.clone();
        other_plan.subscription_plan_id = Some(Uuid::new_v4());
        assert!(matches!(
            ensure_order_matches(&issued(&paid_for), &other_plan),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_booking_order_cannot_pay_subscription() {
        let user = Uuid::new_v4();
        let booking = OrderBinding::booking(user, Uuid::new_v4(), 100);
        let subscription = OrderBinding::subscription(
            user,
            Uuid::new_v4(),
            VenueType::Accommodation,
            Uuid::new_v4(),
            100,
        );

        let err = ensure_order_matches(&issued(&booking), &subscription).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: Payment order was created for a different purchase"
        );
    }

    #[test]
    fn test_underpaid_order_rejected() {
        let expected = OrderBinding::booking(Uuid::new_v4(), Uuid::new_v4(), 150000);
        let mut cheap = expected.clone();
        cheap.amount = 100;

        let err = ensure_order_matches(&issued(&cheap), &expected).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_venue_amount_includes_gst() {
        assert_eq!(price_with_gst(999.0, 0.18), 1178.82);
        assert_eq!(to_paise(price_with_gst(999.0, 0.18)), 117882);
    }

    async fn venue_order(
        pool: &PgPool,
        razorpay: &RazorpayClient,
        owner: &User,
        room: Uuid,
        plan: &SubscriptionPlan,
    ) -> VenueOrderResponse {
        PaymentService::create_venue_order(
            pool,
            razorpay,
            &Config::for_tests(),
            owner,
            &VenueOrderRequest {
                venue_id: room,
                venue_type: VenueType::ReadingRoom,
                subscription_plan_id: plan.id,
            },
        )
        .await
        .unwrap()
    }

    fn callback(
        room: Uuid,
        plan: &SubscriptionPlan,
        order_id: &str,
        payment_id: &str,
    ) -> VerifyVenuePaymentRequest {
        VerifyVenuePaymentRequest {
            venue_id: room,
            venue_type: VenueType::ReadingRoom,
            subscription_plan_id: plan.id,
            razorpay_order_id: order_id.to_string(),
            razorpay_payment_id: payment_id.to_string(),
            razorpay_signature: String::new(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_venue_payment_queues_listing_once(pool: PgPool) {
        let config = Config::for_tests();
        let razorpay = RazorpayClient::new(&config);
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;
        let plan = test_support::plan(&pool, &owner, 999.0).await;

        let order = venue_order(&pool, &razorpay, &owner, room, &plan).await;
        assert_eq!(order.amount, 117882);

        let paid = PaymentService::verify_venue_payment(
            &pool,
            &razorpay,
            &config,
            &owner,
            &callback(room, &plan, &order.order_id, "pay_demo_1"),
        )
        .await
        .unwrap();
        assert_eq!(paid.status, ListingStatus::VerificationPending);
        assert_eq!(
            test_support::listing_status(&pool, room).await,
            ListingStatus::VerificationPending
        );

        let replay = PaymentService::verify_venue_payment(
            &pool,
            &razorpay,
            &config,
            &owner,
            &callback(room, &plan, &order.order_id, "pay_demo_2"),
        )
        .await;
        assert!(replay.is_err());

        let history = PaymentService::history(&pool, &owner).await.unwrap();
        assert_eq!(history.total_count, 1);
        assert_eq!(history.total_amount, 1178.82);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_order_cannot_pay_another_venue(pool: PgPool) {
        let config = Config::for_tests();
        let razorpay = RazorpayClient::new(&config);
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let plan = test_support::plan(&pool, &owner, 999.0).await;
        let paid_for = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;
        let other = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;

        let order = venue_order(&pool, &razorpay, &owner, paid_for, &plan).await;
        let result = PaymentService::verify_venue_payment(
            &pool,
            &razorpay,
            &config,
            &owner,
            &callback(other, &plan, &order.order_id, "pay_demo_1"),
        )
        .await;

        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(
            test_support::listing_status(&pool, other).await,
            ListingStatus::Draft
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_generic_order_cannot_pay_venue(pool: PgPool) {
        let config = Config::for_tests();
        let razorpay = RazorpayClient::new(&config);
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;
        let plan = test_support::plan(&pool, &owner, 999.0).await;

        let cheap = PaymentService::create_order(
            &pool,
            &razorpay,
            &owner,
            CreateOrderRequest {
                amount: Some(1.0),
                booking_id: None,
                currency: None,
                receipt: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let result = PaymentService::verify_venue_payment(
            &pool,
            &razorpay,
            &config,
            &owner,
            &callback(room, &plan, &cheap.id, "pay_demo_1"),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(
            test_support::listing_status(&pool, room).await,
            ListingStatus::Draft
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_incomplete_listing_stays_draft(pool: PgPool) {
        let config = Config::for_tests();
        let razorpay = RazorpayClient::new(&config);
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Draft).await;
        let plan = test_support::plan(&pool, &owner, 999.0).await;
        let order = venue_order(&pool, &razorpay, &owner, room, &plan).await;

        sqlx::query("UPDATE reading_rooms SET contact_phone = NULL WHERE id = $1")
            .bind(room)
            .execute(&pool)
            .await
            .unwrap();

        let result = PaymentService::verify_venue_payment(
            &pool,
            &razorpay,
            &config,
            &owner,
            &callback(room, &plan, &order.order_id, "pay_demo_1"),
        )
        .await;

        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(
            test_support::listing_status(&pool, room).await,
            ListingStatus::Draft
        );
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn test_booking_order_confirms_held_booking(pool: PgPool) {
        let config = Config::for_tests();
        let razorpay = RazorpayClient::new(&config);
        let owner = test_support::user(&pool, UserRole::Admin).await;
        let student = test_support::user(&pool, UserRole::Student).await;
        let room = test_support::reading_room(&pool, &owner, ListingStatus::Live).await;
        let cabin = test_support::cabin(&pool, room).await;

        let start = chrono::Utc::now();
        let booking = BookingRepository::hold(
            &pool,
            student.id,
            &HoldRequest {
                cabin_id: cabin,
                start_date: start,
                end_date: start + chrono::Duration::days(30),
                amount: 1500.0,
            },
        )
        .await
        .unwrap();

        let order = PaymentService::create_order(
            &pool,
            &razorpay,
            &student,
            CreateOrderRequest {
                amount: Some(1.0),
                booking_id: Some(booking.id),
                currency: None,
                receipt: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(order.amount, 150000);

        let verified = PaymentService::verify(
            &pool,
            &razorpay,
            &student,
            &VerifyPaymentRequest {
                razorpay_order_id: order.id.clone(),
                razorpay_payment_id: "pay_demo_1".to_string(),
                razorpay_signature: String::new(),
                booking_id: Some(booking.id),
            },
        )
        .await
        .unwrap();

        let confirmed = verified.booking.unwrap();
        assert_eq!(confirmed.status, BookingStatus::Active);
        assert_eq!(test_support::cabin_status(&pool, cabin).await, CabinStatus::Occupied);
    }
}
