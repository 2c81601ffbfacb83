// src/db/user_repository.rs
// DOCUMENTATION: Database operations for user accounts
// PURPOSE: Create, look up and administer users

use crate::errors::ApiError;
use crate::models::{AdminUserUpdate, User, UserRole, VerificationStatus};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, hashed_password, name, role, verification_status, \
                            avatar_url, phone, created_at";

/// Insert payload; the password is already hashed
pub struct NewUser<'a> {
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub name: &'a str,
    pub role: UserRole,
    pub verification_status: VerificationStatus,
    pub avatar_url: Option<&'a str>,
    pub phone: Option<&'a str>,
}

pub struct UserRepository;

impl UserRepository {
    /// Create a user; a duplicate email maps to AlreadyExists
    pub async fn create(pool: &PgPool, user: NewUser<'_>) -> Result<User, ApiError> {
        let sql = format!(
            "INSERT INTO users (id, email, hashed_password, name, role, verification_status, avatar_url, phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.email)
            .bind(user.hashed_password)
            .bind(user.name)
            .bind(user.role)
            .bind(user.verification_status)
            .bind(user.avatar_url)
            .bind(user.phone)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return ApiError::AlreadyExists("Email already registered".to_string());
                }
                log::error!("Failed to create user {}: {}", user.email, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to look up user by email: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch user {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<User, ApiError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))
    }

    /// List users, optionally filtered by role, newest first
    pub async fn list(pool: &PgPool, role: Option<UserRole>) -> Result<Vec<User>, ApiError> {
        let sql = format!(
            "SELECT {} FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY created_at DESC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list users: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Partial update; NULL parameters keep the stored value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: &AdminUserUpdate,
    ) -> Result<User, ApiError> {
        let sql = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                avatar_url = COALESCE($5, avatar_url),
                phone = COALESCE($6, phone),
                verification_status = COALESCE($7, verification_status)
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(&update.email)
            .bind(update.role)
            .bind(&update.avatar_url)
            .bind(&update.phone)
            .bind(update.verification_status)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return ApiError::AlreadyExists("Email already registered".to_string());
                }
                log::error!("Failed to update user {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))
    }
}

/// True when the error is a Postgres unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
