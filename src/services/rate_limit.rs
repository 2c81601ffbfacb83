// src/services/rate_limit.rs
// DOCUMENTATION: Request rate limits backed by governor
// PURPOSE: Per-IP login throttling and a service-wide Location Scout budget

use crate::errors::ApiError;
use governor::{DefaultDirectRateLimiter, DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

fn per_minute(limit: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN))
}

/// Shared limiters, registered once as app data
pub struct RateLimits {
    login: DefaultKeyedRateLimiter<String>,
    scout: DefaultDirectRateLimiter,
}

impl RateLimits {
    pub fn new(login_per_minute: u32, scout_per_minute: u32) -> Self {
        Self {
            login: RateLimiter::keyed(per_minute(login_per_minute)),
            scout: RateLimiter::direct(per_minute(scout_per_minute)),
        }
    }

    pub fn check_login(&self, client_ip: &str) -> Result<(), ApiError> {
        self.login.check_key(&client_ip.to_string()).map_err(|_| {
            log::warn!("Login rate limit hit for {}", client_ip);
            ApiError::RateLimitExceeded
        })
    }

    pub fn check_scout(&self) -> Result<(), ApiError> {
        self.scout.check().map_err(|_| {
            log::warn!("Location Scout rate limit hit");
            ApiError::RateLimitExceeded
        })
    }

    /// Forget idle login keys
    pub fn shrink(&self) {
        self.login.retain_recent();
        self.login.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_login_limited_per_ip() {
        let limits = RateLimits::new(2, 10);
        assert!(limits.check_login("10.0.0.1").is_ok());
        assert!(limits.check_login("10.0.0.1").is_ok());
        assert!(matches!(
            limits.check_login("10.0.0.1"),
            Err(ApiError::RateLimitExceeded)
        ));
        assert!(limits.check_login("10.0.0.2").is_ok());
    }

    #[test]
    fn test_scout_budget_is_global() {
        let limits = RateLimits::new(10, 1);
        assert_ok!(limits.check_scout());
        assert_err!(limits.check_scout());
    }

    #[test]
    fn test_zero_limit_still_allows_one() {
        let limits = RateLimits::new(0, 0);
        assert_ok!(limits.check_login("10.0.0.1"));
        assert_ok!(limits.check_scout());
    }
}
