// src/services/cabin_service.rs
// DOCUMENTATION: Owner management of existing cabins
// PURPOSE: Ownership and occupancy checks in front of cabin updates and deletes

use crate::db::ReadingRoomRepository;
use crate::errors::ApiError;
use crate::models::*;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

pub struct CabinService;

/// Fails unless every id was found and every cabin belongs to `owner`
pub fn ensure_owns_all(
    ids: &[Uuid],
    found: &[CabinOwnership],
    owner: &User,
) -> Result<(), ApiError> {
    let wanted: HashSet<Uuid> = ids.iter().copied().collect();
    let known: HashSet<Uuid> = found.iter().map(|c| c.id).collect();
    if wanted != known {
        return Err(ApiError::NotFound("Cabin".to_string()));
    }

    if found.iter().any(|c| c.owner_id != owner.id) {
        log::warn!("User {} tried to manage cabins of another owner", owner.id);
        return Err(ApiError::Forbidden(
            "You do not own all of these cabins".to_string(),
        ));
    }
    Ok(())
}

fn ensure_status_change(from: CabinStatus, to: Option<CabinStatus>) -> Result<(), ApiError> {
    match to {
        Some(to) if !CabinStatus::owner_may_set(from, to) => Err(ApiError::Conflict(format!(
            "Cabin status cannot change from {:?} to {:?}",
            from, to
        ))),
        _ => Ok(()),
    }
}

impl CabinService {
    async fn owned(pool: &PgPool, ids: &[Uuid], owner: &User) -> Result<Vec<CabinOwnership>, ApiError> {
        let found = ReadingRoomRepository::cabin_ownership(pool, ids).await?;
        ensure_owns_all(ids, &found, owner)?;
        Ok(found)
    }

    pub async fn update(
        pool: &PgPool,
        owner: &User,
        id: Uuid,
        req: &UpdateCabinRequest,
    ) -> Result<Cabin, ApiError> {
        let found = Self::owned(pool, &[id], owner).await?;
        for cabin in &found {
            ensure_status_change(cabin.status, req.status)?;
        }
        ReadingRoomRepository::update_cabin(pool, id, req).await
    }

    pub async fn bulk_update(
        pool: &PgPool,
        owner: &User,
        req: &BulkCabinUpdateRequest,
    ) -> Result<BulkCabinResult, ApiError> {
        if req.status.is_none() && req.price.is_none() {
            return Err(ApiError::InvalidInput(
                "Provide a status or a price to apply".to_string(),
            ));
        }

        let found = Self::owned(pool, &req.cabin_ids, owner).await?;
        for cabin in &found {
            ensure_status_change(cabin.status, req.status)?;
        }

        let updated =
            ReadingRoomRepository::bulk_update_cabins(pool, &req.cabin_ids, req.status, req.price)
                .await?;
        log::info!("Owner {} updated {} cabins", owner.id, updated);
        Ok(BulkCabinResult { updated })
    }

    /// Delete cabins that are free and were never booked
    pub async fn bulk_delete(
        pool: &PgPool,
        owner: &User,
        req: &BulkCabinDeleteRequest,
    ) -> Result<u64, ApiError> {
        let found = Self::owned(pool, &req.cabin_ids, owner).await?;

        let booked = found.iter().filter(|c| c.status.is_booked()).count();
        if booked > 0 {
            return Err(ApiError::InvalidInput(format!(
                "{} of the selected cabins are occupied or reserved",
                booked
            )));
        }
        if ReadingRoomRepository::cabins_have_bookings(pool, &req.cabin_ids).await? {
            return Err(ApiError::Conflict(
                "Cabins with booking history cannot be deleted".to_string(),
            ));
        }

        let deleted = ReadingRoomRepository::delete_cabins(pool, &req.cabin_ids).await?;
        log::info!("Owner {} deleted {} cabins", owner.id, deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn owner() -> User {
        User {
            id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            hashed_password: String::new(),
            name: "Owner".to_string(),
            role: UserRole::Admin,
            verification_status: VerificationStatus::Verified,
            avatar_url: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn cabin(owner_id: Uuid, status: CabinStatus) -> CabinOwnership {
        CabinOwnership {
            id: Uuid::new_v4(),
            owner_id,
            status,
        }
    }

    #[test]
    fn test_owner_of_every_cabin_passes() {
        let me = owner();
        let found = vec![cabin(me.id, CabinStatus::Available), cabin(me.id, CabinStatus::Occupied)];
        let ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
        assert!(ensure_owns_all(&ids, &found, &me).is_ok());
    }

    #[test]
    fn test_foreign_cabin_forbidden() {
        let me = owner();
        let found = vec![
            cabin(me.id, CabinStatus::Available),
            cabin(Uuid::new_v4(), CabinStatus::Available),
        ];
        let ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
        assert!(matches!(
            ensure_owns_all(&ids, &found, &me),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_unknown_cabin_not_found() {
        let me = owner();
        let found = vec![cabin(me.id, CabinStatus::Available)];
        let ids = vec![found[0].id, Uuid::new_v4()];
        assert!(matches!(
            ensure_owns_all(&ids, &found, &me),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_booked_cabin_status_locked() {
        assert!(ensure_status_change(CabinStatus::Occupied, None).is_ok());
        assert!(ensure_status_change(CabinStatus::Available, Some(CabinStatus::Maintenance)).is_ok());
        assert!(matches!(
            ensure_status_change(CabinStatus::Reserved, Some(CabinStatus::Available)),
            Err(ApiError::Conflict(_))
        ));
    }
}
