// src/db/payment_order_repository.rs
// DOCUMENTATION: Gateway orders issued by this service
// PURPOSE: Remember what each order pays for and let it be redeemed once

use crate::errors::ApiError;
use crate::models::{OrderBinding, PaymentOrder};
use sqlx::{PgConnection, PgPool};

const ORDER_COLUMNS: &str = "order_id, user_id, purpose, amount, currency, venue_id, venue_type, \
     subscription_plan_id, booking_id, boost_request_id, payment_id, consumed_at, created_at";

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    log::error!("{}: {}", context, e);
    ApiError::DatabaseError(e.to_string())
}

pub struct PaymentOrderRepository;

impl PaymentOrderRepository {
    pub async fn insert(
        pool: &PgPool,
        order_id: &str,
        currency: &str,
        binding: &OrderBinding,
    ) -> Result<PaymentOrder, ApiError> {
        let sql = format!(
            "INSERT INTO payment_orders (
                order_id, user_id, purpose, amount, currency, venue_id, venue_type,
                subscription_plan_id, booking_id, boost_request_id
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            ORDER_COLUMNS
        );

        sqlx::query_as::<_, PaymentOrder>(&sql)
            .bind(order_id)
            .bind(binding.user_id)
            .bind(binding.purpose)
            .bind(binding.amount)
            .bind(currency)
            .bind(binding.venue_id)
            .bind(binding.venue_type)
            .bind(binding.subscription_plan_id)
            .bind(binding.booking_id)
            .bind(binding.boost_request_id)
            .fetch_one(pool)
            .await
            .map_err(|e| db_error("Failed to store payment order", e))
    }

    /// Lock an order row for the rest of the caller's transaction
    pub async fn lock(conn: &mut PgConnection, order_id: &str) -> Result<PaymentOrder, ApiError> {
        let sql = format!(
            "SELECT {} FROM payment_orders WHERE order_id = $1 FOR UPDATE",
            ORDER_COLUMNS
        );

        sqlx::query_as::<_, PaymentOrder>(&sql)
            .bind(order_id)
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("Failed to lock payment order", e))?
            .ok_or_else(|| ApiError::NotFound("Payment order".to_string()))
    }

    /// Mark an unused order as paid by `payment_id`
    pub async fn consume(
        conn: &mut PgConnection,
        order_id: &str,
        payment_id: &str,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE payment_orders SET consumed_at = NOW(), payment_id = $2
             WHERE order_id = $1 AND consumed_at IS NULL",
        )
        .bind(order_id)
        .bind(payment_id)
        .execute(conn)
        .await
        .map_err(|e| db_error("Failed to consume payment order", e))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::Conflict(
                "Payment order has already been used".to_string(),
            ));
        }
        Ok(())
    }
}
