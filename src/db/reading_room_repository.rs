// src/db/reading_room_repository.rs
// DOCUMENTATION: Database operations for reading rooms and their cabins
// PURPOSE: CRUD for venues, cabin inventory and occupancy counts

use crate::errors::ApiError;
use crate::models::*;
use sqlx::PgPool;
use uuid::Uuid;

const ROOM_COLUMNS: &str = "id, owner_id, name, address, description, images, amenities, \
     contact_phone, price_start, status, is_verified, is_sponsored, latitude, longitude, \
     city, area, locality, pincode, state, subscription_plan_id, payment_id, payment_date, \
     rejection_reason, created_at, updated_at";

const CABIN_COLUMNS: &str =
    "id, reading_room_id, number, floor, amenities, price, status, current_occupant_id, zone, row_label";

pub struct ReadingRoomRepository;

impl ReadingRoomRepository {
    /// Insert a new room in DRAFT; `city` arrives already normalized
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        req: &CreateReadingRoomRequest,
        city: Option<String>,
    ) -> Result<ReadingRoom, ApiError> {
        let sql = format!(
            "INSERT INTO reading_rooms (
                id, owner_id, name, address, description, images, amenities, contact_phone,
                price_start, latitude, longitude, city, area, locality, pincode, state
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {}",
            ROOM_COLUMNS
        );

        let room = sqlx::query_as::<_, ReadingRoom>(&sql)
            .bind(Uuid::new_v4()) // $1
            .bind(owner_id) // $2
            .bind(&req.name) // $3
            .bind(&req.address) // $4
            .bind(&req.description) // $5
            .bind(&req.images) // $6
            .bind(&req.amenities) // $7
            .bind(&req.contact_phone) // $8
            .bind(req.price_start) // $9
            .bind(req.latitude) // $10
            .bind(req.longitude) // $11
            .bind(city) // $12
            .bind(&req.area) // $13
            .bind(&req.locality) // $14
            .bind(&req.pincode) // $15
            .bind(&req.state) // $16
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to create reading room: {}", e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::info!("Created reading room {} for owner {}", room.id, owner_id);
        Ok(room)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ReadingRoom>, ApiError> {
        let sql = format!("SELECT {} FROM reading_rooms WHERE id = $1", ROOM_COLUMNS);

        sqlx::query_as::<_, ReadingRoom>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch reading room {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<ReadingRoom, ApiError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Reading room".to_string()))
    }

    /// Rooms visible to the viewer, sponsored first then by name
    pub async fn list_visible(
        pool: &PgPool,
        visibility: ListingVisibility,
    ) -> Result<Vec<ReadingRoom>, ApiError> {
        let sql = format!(
            "SELECT {} FROM reading_rooms WHERE {} ORDER BY is_sponsored DESC, name ASC",
            ROOM_COLUMNS, VISIBILITY_PREDICATE
        );

        sqlx::query_as::<_, ReadingRoom>(&sql)
            .bind(visibility.viewer_id)
            .bind(visibility.include_unverified)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list reading rooms: {}", e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<ReadingRoom>, ApiError> {
        let sql = format!(
            "SELECT {} FROM reading_rooms WHERE owner_id = $1 ORDER BY created_at DESC",
            ROOM_COLUMNS
        );

        sqlx::query_as::<_, ReadingRoom>(&sql)
            .bind(owner_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list rooms of owner {}: {}", owner_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Partial update of the editable columns; status is untouched
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateReadingRoomRequest,
        city: Option<String>,
    ) -> Result<ReadingRoom, ApiError> {
        let sql = format!(
            "UPDATE reading_rooms SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                description = COALESCE($4, description),
                images = COALESCE($5, images),
                amenities = COALESCE($6, amenities),
                contact_phone = COALESCE($7, contact_phone),
                price_start = COALESCE($8, price_start),
                latitude = COALESCE($9, latitude),
                longitude = COALESCE($10, longitude),
                city = COALESCE($11, city),
                area = COALESCE($12, area),
                locality = COALESCE($13, locality),
                pincode = COALESCE($14, pincode),
                state = COALESCE($15, state),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            ROOM_COLUMNS
        );

        sqlx::query_as::<_, ReadingRoom>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.address)
            .bind(&req.description)
            .bind(&req.images)
            .bind(&req.amenities)
            .bind(&req.contact_phone)
            .bind(req.price_start)
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
                log::error!("Failed to update reading room {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::NotFound("Reading room".to_string()))
    }

    pub async fn list_cabins(pool: &PgPool, room_id: Uuid) -> Result<Vec<Cabin>, ApiError> {
        let sql = format!(
            "SELECT {} FROM cabins WHERE reading_room_id = $1 ORDER BY floor, number",
            CABIN_COLUMNS
        );

        sqlx::query_as::<_, Cabin>(&sql)
            .bind(room_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list cabins of room {}: {}", room_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    pub async fn create_cabin(
        pool: &PgPool,
        room_id: Uuid,
        req: &CreateCabinRequest,
    ) -> Result<Cabin, ApiError> {
        let sql = format!(
            "INSERT INTO cabins (id, reading_room_id, number, floor, amenities, price, zone, row_label)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            CABIN_COLUMNS
        );

        sqlx::query_as::<_, Cabin>(&sql)
            .bind(Uuid::new_v4())
            .bind(room_id)
            .bind(&req.number)
            .bind(req.floor)
            .bind(&req.amenities)
            .bind(req.price)
            .bind(&req.zone)
            .bind(&req.row_label)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to create cabin in room {}: {}", room_id, e);
                ApiError::DatabaseError(e.to_string())
            })
    }

    /// Insert one cabin per number in a single statement
    pub async fn create_cabins(
        pool: &PgPool,
        room_id: Uuid,
        numbers: &[String],
        req: &CabinBatchRequest,
    ) -> Result<Vec<Cabin>, ApiError> {
        let ids: Vec<Uuid> = numbers.iter().map(|_| Uuid::new_v4()).collect();

        let sql = format!(
            "INSERT INTO cabins (id, reading_room_id, number, floor, amenities, price, zone, row_label)
             SELECT t.id, $2, t.number, $4, $5, $6, $7, $8
             FROM UNNEST($1::uuid[], $3::text[]) AS t(id, number)
             RETURNING {}",
            CABIN_COLUMNS
        );

        let cabins = sqlx::query_as::<_, Cabin>(&sql)
            .bind(&ids)
            .bind(room_id)
            .bind(numbers)
            .bind(req.floor)
            .bind(&req.amenities)
            .bind(req.price)
            .bind(&req.zone)
            .bind(&req.row_label)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to batch create cabins in room {}: {}", room_id, e);
                ApiError::DatabaseError(e.to_string())
            })?;

        log::info!("Created {} cabins in room {}", cabins.len(), room_id);
        Ok(cabins)
    }

    /// Cabins among `ids` with the owner of their room; unknown ids are skipped
    pub async fn cabin_ownership(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<CabinOwnership>, ApiError> {
        sqlx::query_as::<_, CabinOwnership>(
            r#"
            SELECT c.id, r.owner_id, c.status
            FROM cabins c
            JOIN reading_rooms r ON r.id = c.reading_room_id
            WHERE c.id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to load cabin owners: {}", e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Partial cabin update; status only moves while the cabin is not booked
    pub async fn update_cabin(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateCabinRequest,
    ) -> Result<Cabin, ApiError> {
        let sql = format!(
            "UPDATE cabins SET
                number = COALESCE($2, number),
                floor = COALESCE($3, floor),
                amenities = COALESCE($4, amenities),
                price = COALESCE($5, price),
                status = COALESCE($6, status),
                zone = COALESCE($7, zone),
                row_label = COALESCE($8, row_label)
             WHERE id = $1
               AND ($6::cabin_status IS NULL OR status NOT IN ('OCCUPIED', 'RESERVED'))
             RETURNING {}",
            CABIN_COLUMNS
        );

        sqlx::query_as::<_, Cabin>(&sql)
            .bind(id)
            .bind(&req.number)
            .bind(req.floor)
            .bind(&req.amenities)
            .bind(req.price)
            .bind(req.status)
            .bind(&req.zone)
            .bind(&req.row_label)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to update cabin {}: {}", id, e);
                ApiError::DatabaseError(e.to_string())
            })?
            .ok_or_else(|| ApiError::Conflict("Cabin is booked, status cannot change".to_string()))
    }

    /// Set status and/or price on many cabins; booked cabins keep their status
    pub async fn bulk_update_cabins(
        pool: &PgPool,
        ids: &[Uuid],
        status: Option<CabinStatus>,
        price: Option<f64>,
    ) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE cabins SET
                status = CASE
                    WHEN $2::cabin_status IS NULL OR status IN ('OCCUPIED', 'RESERVED') THEN status
                    ELSE $2
                END,
                price = COALESCE($3, price)
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(status)
        .bind(price)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to bulk update cabins: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected())
    }

    pub async fn cabins_have_bookings(pool: &PgPool, ids: &[Uuid]) -> Result<bool, ApiError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM bookings WHERE cabin_id = ANY($1))")
                .bind(ids)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    log::error!("Failed to check cabin bookings: {}", e);
                    ApiError::DatabaseError(e.to_string())
                })?;
        Ok(exists)
    }

    pub async fn delete_cabins(pool: &PgPool, ids: &[Uuid]) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "DELETE FROM cabins WHERE id = ANY($1) AND status NOT IN ('OCCUPIED', 'RESERVED')",
        )
        .bind(ids)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to delete cabins: {}", e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected())
    }

    /// Students who ever booked a cabin in one of the owner's rooms
    pub async fn list_students(pool: &PgPool, owner_id: Uuid) -> Result<Vec<RoomStudent>, ApiError> {
        sqlx::query_as::<_, RoomStudent>(
            r#"
            SELECT u.id, u.name, u.email, u.phone, u.avatar_url,
                   COUNT(*) FILTER (WHERE b.status = 'ACTIVE' AND b.end_date > NOW()) AS active_bookings,
                   MAX(b.created_at) AS last_booking_at
            FROM bookings b
            JOIN cabins c ON c.id = b.cabin_id
            JOIN reading_rooms r ON r.id = c.reading_room_id
            JOIN users u ON u.id = b.user_id
            WHERE r.owner_id = $1
            GROUP BY u.id, u.name, u.email, u.phone, u.avatar_url
            ORDER BY last_booking_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to list students of owner {}: {}", owner_id, e);
            ApiError::DatabaseError(e.to_string())
        })
    }

    /// Distinct students with an ACTIVE, unexpired booking on the room's cabins
    pub async fn count_active_students(pool: &PgPool, room_id: Uuid) -> Result<i64, ApiError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT b.user_id)
            FROM bookings b
            JOIN cabins c ON c.id = b.cabin_id
            WHERE c.reading_room_id = $1
              AND b.status = 'ACTIVE'
              AND b.end_date > NOW()
            "#,
        )
        .bind(room_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to count active students of room {}: {}", room_id, e);
            ApiError::DatabaseError(e.to_string())
        })?;

        Ok(count)
    }
}
