// src/services/geocoding_client.rs
// DOCUMENTATION: Google Geocoding API client
// PURPOSE: Address <-> coordinates lookups for the listing wizard, with caching

use crate::errors::ApiError;
use crate::models::GeocodeResult;
use crate::services::cache::GeocodeCache;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

/// Google Geocoding API client
/// DOCUMENTATION: Results are cached as JSON strings in the shared GeocodeCache
pub struct GeocodingClient {
    client: Client,
    api_key: String,
    base_url: String,
    cache: Arc<GeocodeCache>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleGeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeocodeResult {
    formatted_address: String,
    geometry: GoogleGeometry,
    #[serde(default)]
    address_components: Vec<GoogleAddressComponent>,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GoogleAddressComponent {
    long_name: String,
    types: Vec<String>,
}

impl GoogleGeocodeResult {
    fn component(&self, kinds: &[&str]) -> Option<String> {
        kinds.iter().find_map(|kind| {
            self.address_components
                .iter()
                .find(|c| c.types.iter().any(|t| t == kind))
                .map(|c| c.long_name.clone())
        })
    }

    fn into_result(self) -> GeocodeResult {
        GeocodeResult {
            city: self.component(&["locality", "administrative_area_level_2"]),
            area: self.component(&["sublocality_level_1", "sublocality", "neighborhood"]),
            state: self.component(&["administrative_area_level_1"]),
            pincode: self.component(&["postal_code"]),
            latitude: self.geometry.location.lat,
            longitude: self.geometry.location.lng,
            formatted_address: self.formatted_address,
        }
    }
}

impl GeocodingClient {
    pub fn new(api_key: String, cache: Arc<GeocodeCache>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            cache,
        }
    }

    /// Forward geocoding: address -> first match
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, ApiError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ApiError::InvalidInput("address is required".to_string()));
        }

        let key = GeocodeCache::address_key(address);
        self.cached_lookup(key, &[("address", address.to_string())])
            .await
    }

    /// Reverse geocoding: coordinates -> nearest address
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<GeocodeResult, ApiError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ApiError::InvalidInput("Coordinates out of range".to_string()));
        }

        let key = GeocodeCache::point_key(lat, lng);
        self.cached_lookup(key, &[("latlng", format!("{},{}", lat, lng))])
            .await
    }

    async fn cached_lookup(
        &self,
        key: String,
        params: &[(&str, String)],
    ) -> Result<GeocodeResult, ApiError> {
        if let Some(hit) = self.cache.get(&key).await {
            if let Ok(result) = serde_json::from_str::<GeocodeResult>(&hit) {
                return Ok(result);
            }
        }

        let result = self.request(params).await?;

        match serde_json::to_string(&result) {
            Ok(json) => self.cache.set(key, json).await,
            Err(e) => log::warn!("Failed to cache geocoding result: {}", e),
        }
        Ok(result)
    }

    async fn request(&self, params: &[(&str, String)]) -> Result<GeocodeResult, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::ServiceUnavailable(
                "Geocoding is not configured".to_string(),
            ));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Geocoding request failed: {}", e);
                ApiError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            log::error!("Geocoding API error {}", status);
            return Err(ApiError::ExternalApiError(format!("API error {}", status)));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse geocoding response: {}", e);
            ApiError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        Self::interpret(body)
    }

    fn interpret(body: GeocodeResponse) -> Result<GeocodeResult, ApiError> {
        match body.status.as_str() {
            "OK" => body
                .results
                .into_iter()
                .next()
                .map(GoogleGeocodeResult::into_result)
                .ok_or_else(|| ApiError::NotFound("Location".to_string())),
            "ZERO_RESULTS" => Err(ApiError::NotFound("Location".to_string())),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                log::error!("Geocoding API quota exceeded");
                Err(ApiError::RateLimitExceeded)
            }
            other => {
                let msg = body
                    .error_message
                    .unwrap_or_else(|| format!("Unknown status: {}", other));
                log::error!("Geocoding API returned {}: {}", other, msg);
                Err(ApiError::ExternalApiError(msg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "status": "OK",
        "results": [{
            "formatted_address": "FC Road, Shivajinagar, Pune, Maharashtra 411004, India",
            "geometry": {"location": {"lat": 18.5236, "lng": 73.8478}},
            "address_components": [
                {"long_name": "Shivajinagar", "short_name": "Shivajinagar", "types": ["sublocality_level_1", "sublocality", "political"]},
                {"long_name": "Pune", "short_name": "Pune", "types": ["locality", "political"]},
                {"long_name": "Maharashtra", "short_name": "MH", "types": ["administrative_area_level_1", "political"]},
                {"long_name": "411004", "short_name": "411004", "types": ["postal_code"]}
            ]
        }]
    }"#;

    #[test]
    fn test_parse_components() {
        let body: GeocodeResponse = serde_json::from_str(SAMPLE).unwrap();
        let result = GeocodingClient::interpret(body).unwrap();

        assert_eq!(result.city.as_deref(), Some("Pune"));
        assert_eq!(result.area.as_deref(), Some("Shivajinagar"));
        assert_eq!(result.state.as_deref(), Some("Maharashtra"));
        assert_eq!(result.pincode.as_deref(), Some("411004"));
        assert!((result.latitude - 18.5236).abs() < 1e-9);
    }

    #[test]
    fn test_zero_results_is_not_found() {
        let body: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(matches!(
            GeocodingClient::interpret(body),
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cache_served_without_api_key() {
        let cache = Arc::new(GeocodeCache::new(60));
        let client = GeocodingClient::new(String::new(), cache.clone());

        let cached = GeocodeResult {
            formatted_address: "Pune".to_string(),
            latitude: 18.52,
            longitude: 73.85,
            city: Some("Pune".to_string()),
            area: None,
            state: None,
            pincode: None,
        };
        cache
            .set(
                GeocodeCache::address_key("pune"),
                serde_json::to_string(&cached).unwrap(),
            )
            .await;

        assert_eq!(client.geocode("Pune").await.unwrap(), cached);
        assert!(matches!(
            client.geocode("Mumbai").await,
            Err(ApiError::ServiceUnavailable(_))
        ));
    }
}
