// src/handlers/auth.rs
// DOCUMENTATION: HTTP handlers for registration, login and the current user
// PURPOSE: Issue bearer tokens and expose the signed-in account

use crate::config::Config;
use crate::db::{NewUser, UserRepository};
use crate::errors::ApiError;
use crate::models::{LoginForm, RegisterRequest, TokenResponse, User, UserRole, VerificationStatus};
use crate::services::auth::{create_token, hash_password, verify_password};
use crate::services::{AuthUser, RateLimits};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

fn token_response(user: &User, config: &Config) -> Result<TokenResponse, ApiError> {
    Ok(TokenResponse {
        access_token: create_token(user.id, config)?,
        token_type: "bearer",
        user_id: user.id,
        role: user.role,
        name: user.name.clone(),
        email: user.email.clone(),
        avatar_url: user.avatar_url.clone(),
    })
}

/// Venue owners start unverified; students need no verification
fn initial_verification(role: UserRole) -> VerificationStatus {
    match role {
        UserRole::Admin => VerificationStatus::Pending,
        _ => VerificationStatus::NotRequired,
    }
}

/// POST /auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;

    let role = req.role.unwrap_or(UserRole::Student);
    if role == UserRole::SuperAdmin {
        log::warn!("Refused self-registration as super admin for {}", req.email);
        return Err(ApiError::Forbidden(
            "Super admin accounts cannot be registered".to_string(),
        ));
    }

    let hashed = hash_password(&req.password)?;
    let email = req.email.trim().to_lowercase();

    let user = UserRepository::create(
        pool.get_ref(),
        NewUser {
            email: &email,
            hashed_password: &hashed,
            name: req.name.trim(),
            role,
            verification_status: initial_verification(role),
            avatar_url: req.avatar_url.as_deref(),
            phone: req.phone.as_deref(),
        },
    )
    .await?;

    log::info!("Registered {:?} {}", user.role, user.id);
    Ok(HttpResponse::Created().json(token_response(&user, &config)?))
}

/// POST /auth/login
/// Form fields `username` (email) and `password`
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    limits: web::Data<RateLimits>,
    http: HttpRequest,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, ApiError> {
    let client_ip = http
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    limits.check_login(&client_ip)?;

    let user = UserRepository::find_by_email(pool.get_ref(), form.username.trim()).await?;

    match user {
        Some(user) if verify_password(&form.password, &user.hashed_password) => {
            log::info!("User {} logged in", user.id);
            Ok(HttpResponse::Ok().json(token_response(&user, &config)?))
        }
        _ => {
            log::info!("Failed login for {}", form.username.trim());
            Err(ApiError::Unauthorized)
        }
    }
}

/// GET /auth/me
pub async fn me(user: AuthUser) -> Result<impl Responder, ApiError> {
    Ok(HttpResponse::Ok().json(user.0.to_response()))
}

/// Configuration for auth routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::extractor_config;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::App;

    fn lazy_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap()
    }

    #[test]
    fn test_initial_verification() {
        assert_eq!(initial_verification(UserRole::Admin), VerificationStatus::Pending);
        assert_eq!(
            initial_verification(UserRole::Student),
            VerificationStatus::NotRequired
        );
    }

    #[actix_rt::test]
    async fn test_me_requires_token() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(Config::for_tests()))
                .configure(config),
        )
        .await;

        let req = TestRequest::get().uri("/auth/me").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get()
            .uri("/auth/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_malformed_body_uses_error_envelope() {
        let app = init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(Config::for_tests()))
                .app_data(web::Data::new(RateLimits::new(10, 10)))
                .configure(extractor_config)
                .configure(config),
        )
        .await;

        let req = TestRequest::post()
            .uri("/auth/register")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert!(body["error"]["timestamp"].is_string());

        let req = TestRequest::post()
            .uri("/auth/login")
            .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
            .set_payload("password=only")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }
}
