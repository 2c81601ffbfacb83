// src/handlers/locations.rs
// DOCUMENTATION: HTTP handlers for geocoding and the Location Scout
// PURPOSE: Proxy Google Geocoding (cached) and Gemini grounded answers

use crate::errors::ApiError;
use crate::models::{GeocodeQuery, ReverseGeocodeQuery, ScoutRequest};
use crate::services::{GeminiClient, GeocodingClient, RateLimits};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// GET /locations/geocode?address=
pub async fn geocode(
    client: web::Data<GeocodingClient>,
    query: web::Query<GeocodeQuery>,
) -> Result<impl Responder, ApiError> {
    let result = client.geocode(&query.address).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /locations/reverse-geocode?lat=&long=
pub async fn reverse_geocode(
    client: web::Data<GeocodingClient>,
    query: web::Query<ReverseGeocodeQuery>,
) -> Result<impl Responder, ApiError> {
    let result = client.reverse_geocode(query.lat, query.long).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /locations/scout
/// Globally rate limited
pub async fn scout(
    client: web::Data<GeminiClient>,
    limits: web::Data<RateLimits>,
    req: web::Json<ScoutRequest>,
) -> Result<impl Responder, ApiError> {
    req.validate()?;
    limits.check_scout()?;

    let answer = client.scout(&req).await?;
    Ok(HttpResponse::Ok().json(answer))
}

/// Configuration for location routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/locations")
            .route("/geocode", web::get().to(geocode))
            .route("/reverse-geocode", web::get().to(reverse_geocode))
            .route("/scout", web::post().to(scout)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::GeocodeCache;
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    #[actix_rt::test]
    async fn test_scout_without_key_is_unavailable() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(GeminiClient::new(
                    String::new(),
                    "gemini-2.5-flash".to_string(),
                )))
                .app_data(web::Data::new(RateLimits::new(10, 10)))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/locations/scout")
            .set_json(serde_json::json!({ "question": "Is FC Road noisy?" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_rt::test]
    async fn test_reverse_geocode_rejects_bad_coordinates() {
        let cache = Arc::new(GeocodeCache::new(60));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(GeocodingClient::new(String::new(), cache)))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/locations/reverse-geocode?lat=123.0&long=73.8")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_unparseable_query_uses_error_envelope() {
        let cache = Arc::new(GeocodeCache::new(60));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(GeocodingClient::new(String::new(), cache)))
                .configure(crate::errors::extractor_config)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/locations/reverse-geocode?lat=north&long=73.8")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }
}
