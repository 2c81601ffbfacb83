// src/db/payment_repository.rs
// DOCUMENTATION: Payment transaction ledger
// PURPOSE: Append confirmed payments and read a user's history

use crate::db::user_repository::is_unique_violation;
use crate::errors::ApiError;
use crate::models::{NewTransaction, OwnerPaymentRecord, PaymentTransaction};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const TRANSACTION_COLUMNS: &str = "id, user_id, kind, gateway, order_id, gateway_payment_id, \
     amount, venue_id, venue_type, booking_id, boost_request_id, description, created_at";

pub struct PaymentRepository;

impl PaymentRepository {
    /// Append a ledger row on the given connection or transaction
    pub async fn insert(
        conn: &mut PgConnection,
        tx: &NewTransaction,
    ) -> Result<PaymentTransaction, ApiError> {
        let sql = format!(
            "INSERT INTO payment_transactions (
                id, user_id, kind, gateway, order_id, gateway_payment_id, amount,
                venue_id, venue_type, booking_id, boost_request_id, description
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {}",
            TRANSACTION_COLUMNS
        );

        let row = sqlx::query_as::<_, PaymentTransaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(tx.user_id)
            .bind(tx.kind)
            .bind(tx.gateway)
            .bind(&tx.order_id)
            .bind(&tx.gateway_payment_id)
            .bind(tx.amount)
            .bind(tx.venue_id)
            .bind(tx.venue_type)
            .bind(tx.booking_id)
            .bind(tx.boost_request_id)
            .bind(&tx.description)
            .fetch_one(conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    log::warn!("Payment {} was already recorded", tx.gateway_payment_id);
                    return ApiError::Conflict("Payment has already been recorded".to_string());
                }
                log::error!("Failed to record payment {}: {}", tx.gateway_payment_id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::info!(
            "Recorded {:?} payment {} ({:.2}) for user {}",
            row.kind,
            row.gateway_payment_id,
            row.amount,
            row.user_id
        );
        Ok(row)
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<PaymentTransaction>, ApiError> {
        let sql = format!(
            "SELECT {} FROM payment_transactions WHERE user_id = $1 ORDER BY created_at DESC",
            TRANSACTION_COLUMNS
        );

        sqlx::query_as::<_, PaymentTransaction>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to load payment history of {}: {}", user_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Paid bookings on cabins and accommodations the owner lists
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<OwnerPaymentRecord>, ApiError> {
        sqlx::query_as::<_, OwnerPaymentRecord>(
            r#"
            SELECT b.id AS booking_id, b.user_id, u.name AS user_name, u.email AS user_email,
                   b.amount, b.created_at AS date,
                   COALESCE(r.name, a.name) AS venue_name,
                   c.number AS cabin_number,
                   b.transaction_id
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            LEFT JOIN cabins c ON c.id = b.cabin_id
            LEFT JOIN reading_rooms r ON r.id = c.reading_room_id
            LEFT JOIN accommodations a ON a.id = b.accommodation_id
            WHERE b.payment_status = 'PAID'
              AND (r.owner_id = $1 OR a.owner_id = $1)
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to load payments received by {}: {}", owner_id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }
}
