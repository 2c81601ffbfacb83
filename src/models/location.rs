// src/models/location.rs
// DOCUMENTATION: Geocoding and Location Scout payloads
// PURPOSE: Request/response shapes for the /locations endpoints

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub long: f64,
}

/// Normalized geocoding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub area: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Body of POST /locations/scout
#[derive(Debug, Deserialize, Validate)]
pub struct ScoutRequest {
    #[validate(length(min = 3, max = 1000))]
    pub question: String,

    pub city: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoutSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Serialize)]
pub struct ScoutResponse {
    pub answer: String,
    pub sources: Vec<ScoutSource>,
}
