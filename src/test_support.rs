// src/test_support.rs
// DOCUMENTATION: Fixtures for database-backed tests
// PURPOSE: Insert users, listings, plans and cabins into a `#[sqlx::test]` database
//
// Tests using these run against Postgres (`DATABASE_URL`) and are ignored by
// default; run them with `cargo test -- --ignored`.

use crate::db::{NewUser, SubscriptionRepository, UserRepository};
use crate::models::*;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn user(pool: &PgPool, role: UserRole) -> User {
    let email = format!("{}@example.com", Uuid::new_v4().simple());
    UserRepository::create(
        pool,
        NewUser {
            email: &email,
            hashed_password: "not-a-real-hash",
            name: "Fixture User",
            role,
            verification_status: VerificationStatus::Verified,
            avatar_url: None,
            phone: Some("9876543210"),
        },
    )
    .await
    .unwrap()
}

/// A reading room with every detail review needs, in `status`
pub async fn reading_room(pool: &PgPool, owner: &User, status: ListingStatus) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO reading_rooms (id, owner_id, name, address, city, contact_phone, images, status)
         VALUES ($1, $2, 'Quiet Corner', '7 FC Road', 'Pune', '9876543210', $3, $4)",
    )
    .bind(id)
    .bind(owner.id)
    .bind(
        ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<String>>(),
    )
    .bind(status)
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn listing_status(pool: &PgPool, id: Uuid) -> ListingStatus {
    let (status,): (ListingStatus,) =
        sqlx::query_as("SELECT status FROM reading_rooms WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap();
    status
}

pub async fn plan(pool: &PgPool, creator: &User, price: f64) -> SubscriptionPlan {
    SubscriptionRepository::create(
        pool,
        creator.id,
        &CreatePlanRequest {
            name: "Basic".to_string(),
            description: None,
            price,
            duration_days: 365,
            features: vec![],
            is_active: true,
            is_default: false,
        },
    )
    .await
    .unwrap()
}

pub async fn cabin(pool: &PgPool, room_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO cabins (id, reading_room_id, number, floor, price)
         VALUES ($1, $2, 'A-1', 0, 1500)",
    )
    .bind(id)
    .bind(room_id)
    .execute(pool)
    .await
    .unwrap();
    id
}

pub async fn cabin_status(pool: &PgPool, id: Uuid) -> CabinStatus {
    let (status,): (CabinStatus,) = sqlx::query_as("SELECT status FROM cabins WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap();
    status
}
