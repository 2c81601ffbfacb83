// src/models/favorite.rs
// DOCUMENTATION: Saved accommodations and reading rooms
// PURPOSE: Maps the favorites table with item details for display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::listing::VenueType;

/// Favorite row enriched with the saved item's display fields
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub accommodation_id: Option<Uuid>,
    pub reading_room_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub item_name: Option<String>,
    pub item_type: Option<VenueType>,
    pub item_image: Option<String>,
    pub item_price: Option<f64>,
    pub item_city: Option<String>,
}

/// Body of POST /favorites and query of GET /favorites/check
#[derive(Debug, Default, Deserialize)]
pub struct FavoriteTarget {
    pub accommodation_id: Option<Uuid>,
    pub reading_room_id: Option<Uuid>,
}

impl FavoriteTarget {
    /// The single item this target names
    pub fn resolve(&self) -> Option<(VenueType, Uuid)> {
        match (self.accommodation_id, self.reading_room_id) {
            (Some(id), None) => Some((VenueType::Accommodation, id)),
            (None, Some(id)) => Some((VenueType::ReadingRoom, id)),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoriteCheckResponse {
    pub is_favorited: bool,
    pub favorite_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_target() {
        let id = Uuid::new_v4();
        let target = FavoriteTarget {
            accommodation_id: Some(id),
            reading_room_id: None,
        };
        assert_eq!(target.resolve(), Some((VenueType::Accommodation, id)));

        assert!(FavoriteTarget::default().resolve().is_none());
        let both = FavoriteTarget {
            accommodation_id: Some(id),
            reading_room_id: Some(id),
        };
        assert!(both.resolve().is_none());
    }
}
