// src/services/auth.rs
// DOCUMENTATION: Password hashing, access tokens and the authenticated-user extractors
// PURPOSE: Everything between an Authorization header and a loaded `User`

use crate::config::Config;
use crate::db::{NewUser, UserRepository};
use crate::errors::ApiError;
use crate::models::{User, UserRole, VerificationStatus};
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Password hashing failed: {}", e);
            ApiError::InternalError
        })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Issue an HS256 access token for a user
pub fn create_token(user_id: Uuid, config: &Config) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + chrono::Duration::minutes(config.access_token_expire_minutes)).timestamp()
            as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.signing_secret().as_bytes()),
    )
    .map_err(|e| {
        log::error!("Token encoding failed: {}", e);
        ApiError::InternalError
    })
}

/// Validate a token and return the user id it was issued for
pub fn decode_token(token: &str, config: &Config) -> Result<Uuid, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.signing_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        log::debug!("Token validation failed: {}", e);
        ApiError::Unauthorized
    })?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::Unauthorized)
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve the bearer token of a request to a freshly loaded user
/// DOCUMENTATION: The user row is read on every request so role changes and
/// deletions apply to tokens that were already issued
async fn load_user(req: HttpRequest) -> Result<Option<User>, ApiError> {
    let Some(token) = bearer_token(&req) else {
        return Ok(None);
    };

    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or(ApiError::InternalError)?;
    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or(ApiError::InternalError)?;

    let user_id = decode_token(&token, config)?;
    let user = UserRepository::find_by_id(pool.get_ref(), user_id).await?;
    if user.is_none() {
        log::warn!("Token presented for unknown user {}", user_id);
    }
    user.map(Some).ok_or(ApiError::Unauthorized)
}

/// Create the configured super admin account if it does not exist yet
pub async fn ensure_super_admin(pool: &PgPool, config: &Config) -> Result<(), ApiError> {
    let email = config.super_admin_email.trim().to_lowercase();
    if email.is_empty() || config.super_admin_password.is_empty() {
        log::info!("SUPER_ADMIN_EMAIL/SUPER_ADMIN_PASSWORD not set - skipping bootstrap");
        return Ok(());
    }

    if let Some(existing) = UserRepository::find_by_email(pool, &email).await? {
        if !existing.is_super_admin() {
            log::warn!("{} exists but is not a super admin", email);
        }
        return Ok(());
    }

    let hashed = hash_password(&config.super_admin_password)?;
    let user = UserRepository::create(
        pool,
        NewUser {
            email: &email,
            hashed_password: &hashed,
            name: "Super Admin",
            role: UserRole::SuperAdmin,
            verification_status: VerificationStatus::Verified,
            avatar_url: None,
            phone: None,
        },
    )
    .await?;

    log::info!("Bootstrapped super admin {}", user.id);
    Ok(())
}

/// Extractor for endpoints that require a signed-in user
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn require_super_admin(&self) -> Result<(), ApiError> {
        if self.0.is_super_admin() {
            Ok(())
        } else {
            log::warn!("User {} attempted a super admin action", self.0.id);
            Err(ApiError::Forbidden("Super admin access required".to_string()))
        }
    }

    /// Venue owners (ADMIN) and super admins
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.0.role.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match load_user(req).await? {
                Some(user) => Ok(AuthUser(user)),
                None => Err(ApiError::Unauthorized),
            }
        })
    }
}

/// Extractor for public endpoints whose output depends on the caller
/// DOCUMENTATION: A missing or invalid token yields an anonymous caller
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match load_user(req).await {
                Ok(user) => Ok(MaybeUser(user)),
                Err(ApiError::Unauthorized) => Ok(MaybeUser(None)),
                Err(e) => Err(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_token_roundtrip() {
        let config = Config::for_tests();
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, &config).unwrap();
        assert_eq!(decode_token(&token, &config).unwrap(), user_id);
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = Config::for_tests();
        let mut other = Config::for_tests();
        other.jwt_secret = "a-completely-different-secret-value!!".to_string();

        let token = create_token(Uuid::new_v4(), &other).unwrap();
        assert!(matches!(
            decode_token(&token, &config),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = Config::for_tests();
        config.access_token_expire_minutes = -10;
        let token = create_token(Uuid::new_v4(), &config).unwrap();
        assert!(decode_token(&token, &config).is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic Zm9vOmJhcg=="))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        let req = TestRequest::default().to_http_request();
        assert!(bearer_token(&req).is_none());
    }

    #[actix_rt::test]
    async fn test_anonymous_request_is_not_authenticated() {
        let req = TestRequest::default().to_http_request();
        let result = AuthUser::extract(&req).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));

        let maybe = MaybeUser::extract(&req).await.unwrap();
        assert!(maybe.0.is_none());
    }
}
