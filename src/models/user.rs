// src/models/user.rs
// DOCUMENTATION: User accounts and authentication DTOs
// PURPOSE: Maps the users table and the auth/user endpoint payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Account role. ADMIN is a venue owner; SUPER_ADMIN runs the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Student,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
    NotRequired,
}

/// Represents a user record from the database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub name: String,
    pub role: UserRole,
    pub verification_status: VerificationStatus,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            verification_status: self.verification_status,
            avatar_url: self.avatar_url.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of a user (never exposes the password hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub verification_status: VerificationStatus,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for POST /auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default)]
    pub role: Option<UserRole>,

    pub avatar_url: Option<String>,

    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
}

/// OAuth2-style login form; `username` carries the email
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Token payload returned by register and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: Uuid,
    pub role: UserRole,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Super admin update of any user field; unset fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct AdminUserUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub role: Option<UserRole>,

    pub avatar_url: Option<String>,

    pub phone: Option<String>,

    pub verification_status: Option<VerificationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
}
