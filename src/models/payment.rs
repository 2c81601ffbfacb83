// src/models/payment.rs
// DOCUMENTATION: Payment orders, verification payloads and the transaction ledger
// PURPOSE: Shared by booking, listing subscription and boost payments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use super::boost::BoostRequest;
use super::listing::{ListingStatus, VenueType};
use super::subscription::SubscriptionPlan;
use super::Booking;

/// Prefix of synthetic orders issued while payments run in demo mode
pub const DEMO_ORDER_PREFIX: &str = "order_demo_";

/// Rupees to paise, rounded to the nearest paisa
pub fn to_paise(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Plan price plus GST, rounded to two decimals
pub fn price_with_gst(price: f64, gst_rate: f64) -> f64 {
    (price * (1.0 + gst_rate) * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Subscription,
    Booking,
    Boost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_gateway", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentGateway {
    Razorpay,
    Demo,
    Manual,
}

/// Ledger row written for every confirmed payment
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub gateway: PaymentGateway,
    pub order_id: Option<String>,
    pub gateway_payment_id: String,
    pub amount: f64,
    pub venue_id: Option<Uuid>,
    pub venue_type: Option<VenueType>,
    pub booking_id: Option<Uuid>,
    pub boost_request_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the ledger
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub gateway: PaymentGateway,
    pub order_id: Option<String>,
    pub gateway_payment_id: String,
    pub amount: f64,
    pub venue_id: Option<Uuid>,
    pub venue_type: Option<VenueType>,
    pub booking_id: Option<Uuid>,
    pub boost_request_id: Option<Uuid>,
    pub description: Option<String>,
}

/// What a gateway order was issued for
/// DOCUMENTATION: Stored when the order is created and compared field by
/// field when a payment for it is redeemed. `amount` is in paise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBinding {
    pub user_id: Uuid,
    pub purpose: TransactionKind,
    pub amount: i64,
    pub venue_id: Option<Uuid>,
    pub venue_type: Option<VenueType>,
    pub subscription_plan_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub boost_request_id: Option<Uuid>,
}

impl OrderBinding {
    pub fn subscription(
        user_id: Uuid,
        venue_id: Uuid,
        venue_type: VenueType,
        plan_id: Uuid,
        amount: i64,
    ) -> Self {
        Self {
            user_id,
            purpose: TransactionKind::Subscription,
            amount,
            venue_id: Some(venue_id),
            venue_type: Some(venue_type),
            subscription_plan_id: Some(plan_id),
            booking_id: None,
            boost_request_id: None,
        }
    }

    pub fn booking(user_id: Uuid, booking_id: Uuid, amount: i64) -> Self {
        Self {
            user_id,
            purpose: TransactionKind::Booking,
            amount,
            venue_id: None,
            venue_type: None,
            subscription_plan_id: None,
            booking_id: Some(booking_id),
            boost_request_id: None,
        }
    }

    pub fn boost(user_id: Uuid, request: &BoostRequest) -> Self {
        Self {
            user_id,
            purpose: TransactionKind::Boost,
            amount: to_paise(request.price),
            venue_id: Some(request.venue_id),
            venue_type: Some(request.venue_type),
            subscription_plan_id: None,
            booking_id: None,
            boost_request_id: Some(request.id),
        }
    }

    /// Same purchase, ignoring the amount
    pub fn same_target(&self, other: &OrderBinding) -> bool {
        self.purpose == other.purpose
            && self.venue_id == other.venue_id
            && self.venue_type == other.venue_type
            && self.subscription_plan_id == other.subscription_plan_id
            && self.booking_id == other.booking_id
            && self.boost_request_id == other.boost_request_id
    }
}

/// Row of `payment_orders`
#[derive(Debug, Clone, FromRow)]
pub struct PaymentOrder {
    pub order_id: String,
    pub user_id: Uuid,
    pub purpose: TransactionKind,
    pub amount: i64,
    pub currency: String,
    pub venue_id: Option<Uuid>,
    pub venue_type: Option<VenueType>,
    pub subscription_plan_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub boost_request_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PaymentOrder {
    pub fn binding(&self) -> OrderBinding {
        OrderBinding {
            user_id: self.user_id,
            purpose: self.purpose,
            amount: self.amount,
            venue_id: self.venue_id,
            venue_type: self.venue_type,
            subscription_plan_id: self.subscription_plan_id,
            booking_id: self.booking_id,
            boost_request_id: self.boost_request_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentHistoryResponse {
    pub transactions: Vec<PaymentTransaction>,
    pub total_count: usize,
    pub total_amount: f64,
}

impl PaymentHistoryResponse {
    pub fn new(transactions: Vec<PaymentTransaction>) -> Self {
        let total_amount = transactions.iter().map(|t| t.amount).sum();
        Self {
            total_count: transactions.len(),
            total_amount,
            transactions,
        }
    }
}

/// A paid booking on one of an owner's venues
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnerPaymentRecord {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub venue_name: Option<String>,
    pub cabin_number: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OwnerPaymentHistoryResponse {
    pub payments: Vec<OwnerPaymentRecord>,
    pub total_count: usize,
    pub total_amount: f64,
}

impl OwnerPaymentHistoryResponse {
    pub fn new(payments: Vec<OwnerPaymentRecord>) -> Self {
        Self {
            total_count: payments.len(),
            total_amount: payments.iter().map(|p| p.amount).sum(),
            payments,
        }
    }
}

/// Body of POST /payments/create-order; `amount` is in rupees
/// DOCUMENTATION: With `booking_id` the amount comes from the held booking
/// and the order is bound to it; without one the order can be verified but
/// pays for nothing
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: Option<f64>,
    pub booking_id: Option<Uuid>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<Value>,
}

/// Order as handed to the client checkout; `amount` is in paise
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub is_demo: bool,
}

/// Checkout callback fields, also used by POST /payments/verify
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub verified: bool,
    pub order_id: String,
    pub payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

#[derive(Debug, Deserialize)]
pub struct VenueOrderRequest {
    pub venue_id: Uuid,
    pub venue_type: VenueType,
    pub subscription_plan_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct VenueOrderResponse {
    pub order_id: String,
    /// Plan price including GST, in paise
    pub amount: i64,
    pub currency: String,
    pub razorpay_key_id: String,
    pub is_demo: bool,
    pub subscription_plan: SubscriptionPlan,
}

#[derive(Debug, Deserialize)]
pub struct VerifyVenuePaymentRequest {
    pub venue_id: Uuid,
    pub venue_type: VenueType,
    pub subscription_plan_id: Uuid,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Body of POST /payments/venue/dev-bypass
#[derive(Debug, Deserialize)]
pub struct DevBypassRequest {
    pub venue_id: Uuid,
    pub venue_type: VenueType,
    pub subscription_plan_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct VenueStatusQuery {
    pub venue_type: VenueType,
}

#[derive(Debug, Serialize)]
pub struct VenuePaymentResult {
    pub venue_id: Uuid,
    pub venue_type: VenueType,
    pub status: ListingStatus,
    pub payment_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VenuePaymentStatusResponse {
    pub venue_id: Uuid,
    pub status: ListingStatus,
    pub payment_status: &'static str,
    pub payment_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub subscription_plan_id: Option<Uuid>,
}

impl VenuePaymentStatusResponse {
    pub fn payment_label(status: ListingStatus) -> &'static str {
        if status.is_paid() {
            "paid"
        } else {
            "unpaid"
        }
    }
}
