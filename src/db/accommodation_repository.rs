// src/db/accommodation_repository.rs
// DOCUMENTATION: Database operations for PG/hostel accommodations
// PURPOSE: CRUD and filtered search for accommodation listings

use crate::errors::ApiError;
use crate::models::*;
use sqlx::PgPool;
use uuid::Uuid;

const ACCOMMODATION_COLUMNS: &str = "id, owner_id, name, type, gender, address, price, sharing, \
     amenities, images, contact_phone, rating, status, is_verified, latitude, longitude, city, \
     area, locality, pincode, state, subscription_plan_id, payment_id, payment_date, \
     rejection_reason, created_at, updated_at";

pub struct AccommodationRepository;

impl AccommodationRepository {
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        req: &CreateAccommodationRequest,
        city: Option<String>,
    ) -> Result<Accommodation, ApiError> {
        let sql = format!(
            "INSERT INTO accommodations (
                id, owner_id, name, type, gender, address, price, sharing, amenities, images,
                contact_phone, latitude, longitude, city, area, locality, pincode, state
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING {}",
            ACCOMMODATION_COLUMNS
        );

        let accommodation = sqlx::query_as::<_, Accommodation>(&sql)
            .bind(Uuid::new_v4()) // $1
            .bind(owner_id) // $2
            .bind(&req.name) // $3
            .bind(req.type_field) // $4
            .bind(req.gender) // $5
            .bind(&req.address) // $6
            .bind(req.price) // $7
            .bind(&req.sharing) // $8
            .bind(&req.amenities) // $9
            .bind(&req.images) // $10
            .bind(&req.contact_phone) // $11
            .bind(req.latitude) // $12
            .bind(req.longitude) // $13
            .bind(city) // $14
            .bind(&req.area) // $15
            .bind(&req.locality) // $16
            .bind(&req.pincode) // $17
            .bind(&req.state) // $18
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to create accommodation: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::info!(
            "Created accommodation {} for owner {}",
            accommodation.id,
            owner_id
        );
        Ok(accommodation)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Accommodation>, ApiError> {
        let sql = format!(
            "SELECT {} FROM accommodations WHERE id = $1",
            ACCOMMODATION_COLUMNS
        );

        sqlx::query_as::<_, Accommodation>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch accommodation {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Accommodation, ApiError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Accommodation".to_string()))
    }

    /// Filtered, paginated search over the listings the viewer may see
    /// DOCUMENTATION: NULL filter parameters are ignored by the WHERE clause
    pub async fn search(
        pool: &PgPool,
        visibility: ListingVisibility,
        query: &AccommodationListQuery,
    ) -> Result<Vec<Accommodation>, ApiError> {
        let location = query
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| format!("%{}%", l.replace('%', "\\%").replace('_', "\\_")));

        let sql = format!(
            "SELECT {} FROM accommodations
             WHERE {}
               AND ($3::text IS NULL OR address ILIKE $3 OR city ILIKE $3 OR area ILIKE $3)
               AND ($4::float8 IS NULL OR price <= $4)
               AND ($5::gender IS NULL OR gender = $5)
               AND ($6::accommodation_type IS NULL OR type = $6)
             ORDER BY created_at DESC
             LIMIT $7 OFFSET $8",
            ACCOMMODATION_COLUMNS, VISIBILITY_PREDICATE
        );

        sqlx::query_as::<_, Accommodation>(&sql)
            .bind(visibility.viewer_id) // $1
            .bind(visibility.include_unverified) // $2
            .bind(location) // $3
            .bind(query.price_max) // $4
            .bind(query.gender) // $5
            .bind(query.type_field) // $6
            .bind(query.page_limit()) // $7
            .bind(query.page_offset()) // $8
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to search accommodations: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<Accommodation>, ApiError> {
        let sql = format!(
            "SELECT {} FROM accommodations WHERE owner_id = $1 ORDER BY created_at DESC",
            ACCOMMODATION_COLUMNS
        );

        sqlx::query_as::<_, Accommodation>(&sql)
            .bind(owner_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list accommodations of owner {}: {}", owner_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Partial update of the editable columns; status is untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateAccommodationRequest,
        city: Option<String>,
    ) -> Result<Accommodation, ApiError> {
        let sql = format!(
            "UPDATE accommodations SET
                name = COALESCE($2, name),
                type = COALESCE($3, type),
                gender = COALESCE($4, gender),
                address = COALESCE($5, address),
                price = COALESCE($6, price),
                sharing = COALESCE($7, sharing),
                amenities = COALESCE($8, amenities),
                images = COALESCE($9, images),
                contact_phone = COALESCE($10, contact_phone),
                latitude = COALESCE($11, latitude),
                longitude = COALESCE($12, longitude),
                city = COALESCE($13, city),
                area = COALESCE($14, area),
                locality = COALESCE($15, locality),
                pincode = COALESCE($16, pincode),
                state = COALESCE($17, state),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            ACCOMMODATION_COLUMNS
        );

        sqlx::query_as::<_, Accommodation>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(req.type_field)
            .bind(req.gender)
            .bind(&req.address)
            .bind(req.price)
            .bind(&req.sharing)
            .bind(&req.amenities)
            .bind(&req.images)
            .bind(&req.contact_phone)
            .bind(req.latitude)
            .bind(req.longitude)
            .bind(city)
            .bind(&req.area)
            .bind(&req.locality)
            .bind(&req.pincode)
            .bind(&req.state)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to update accommodation {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Accommodation".to_string()))
    }
}
