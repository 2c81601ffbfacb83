// src/services/geo.rs
// DOCUMENTATION: Great-circle distance and radius filtering
// PURPOSE: Nearest-first "venues near me" search over listing coordinates

use geo_types::Point;

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default search radius for GET /reading-rooms
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Build a point from latitude/longitude (x = longitude, y = latitude)
pub fn point(latitude: f64, longitude: f64) -> Point<f64> {
    Point::new(longitude, latitude)
}

/// Haversine distance between two points in kilometers
pub fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Keep items whose coordinates lie within `radius_km` of `center`
/// DOCUMENTATION: Items without coordinates are dropped. Result is sorted
/// nearest first and paired with the distance.
pub fn within_radius<T, F>(items: Vec<T>, center: Point<f64>, radius_km: f64, coords: F) -> Vec<(T, f64)>
where
    F: Fn(&T) -> Option<Point<f64>>,
{
    let mut nearby: Vec<(T, f64)> = items
        .into_iter()
        .filter_map(|item| {
            let distance = haversine_km(center, coords(&item)?);
            (distance <= radius_km).then_some((item, distance))
        })
        .collect();

    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
    nearby
}

/// Coordinates when both halves are present and in range
pub fn valid_point(latitude: Option<f64>, longitude: Option<f64>) -> Option<Point<f64>> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) => {
            Some(point(lat, lng))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = point(18.5204, 73.8567);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Pune to Mumbai is roughly 120 km as the crow flies
        let pune = point(18.5204, 73.8567);
        let mumbai = point(19.0760, 72.8777);
        let d = haversine_km(pune, mumbai);
        assert!(d > 110.0 && d < 130.0, "distance was {}", d);
    }

    #[test]
    fn test_within_radius_sorted_and_filtered() {
        let center = point(18.5204, 73.8567);
        let items = vec![
            ("far", Some(point(19.0760, 72.8777))),
            ("near", Some(point(18.5300, 73.8500))),
            ("nowhere", None),
            ("nearest", Some(point(18.5210, 73.8570))),
        ];

        let result = within_radius(items, center, DEFAULT_RADIUS_KM, |(_, p)| *p);
        let names: Vec<&str> = result.iter().map(|((name, _), _)| *name).collect();
        assert_eq!(names, vec!["nearest", "near"]);
        assert!(result[0].1 <= result[1].1);
    }

    #[test]
    fn test_valid_point() {
        assert!(valid_point(Some(18.5), Some(73.8)).is_some());
        assert!(valid_point(Some(91.0), Some(73.8)).is_none());
        assert!(valid_point(None, Some(73.8)).is_none());
    }
}
