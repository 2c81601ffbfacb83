// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod auth;
pub mod booking_service;
pub mod boost_service;
pub mod cabin_service;
pub mod cache;
pub mod gemini_client;
pub mod geo;
pub mod geocoding_client;
pub mod listing_service;
pub mod payment_service;
pub mod razorpay_client;
pub mod review_service;
pub mod rate_limit;

pub use auth::{AuthUser, MaybeUser};
pub use booking_service::*;
pub use boost_service::*;
pub use cabin_service::*;
pub use cache::*;
pub use gemini_client::*;
pub use geocoding_client::*;
pub use listing_service::*;
pub use payment_service::*;
pub use razorpay_client::*;
pub use review_service::*;
pub use rate_limit::RateLimits;
