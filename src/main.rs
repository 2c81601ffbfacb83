// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, background tasks and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{
    start_cleanup_task, start_sweeper_task, GeminiClient, GeocodeCache, GeocodingClient,
    RateLimits, RazorpayClient,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting study-space backend...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );
    if config.is_payment_demo() {
        log::warn!("Payments running in DEMO mode - no real charges will be made");
    }

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = services::auth::ensure_super_admin(&pool, &config).await {
        log::error!("Super admin bootstrap failed: {}", e);
    }

    // 5. Geocoding cache (1 hour TTL, swept every 5 minutes)
    let cache = Arc::new(GeocodeCache::new(3600));
    start_cleanup_task(cache.clone(), 300);
    log::info!("Started geocode cache cleanup task (interval: 5 minutes)");

    // 6. Expire stale holds and boosts every minute
    start_sweeper_task(pool.clone(), 60);

    // 7. Shared clients and rate limiters
    let razorpay = web::Data::new(RazorpayClient::new(&config));
    let geocoding = web::Data::new(GeocodingClient::new(
        config.google_maps_api_key.clone(),
        cache,
    ));
    let gemini = web::Data::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    let limits = web::Data::new(RateLimits::new(
        config.login_rate_per_minute,
        config.scout_rate_per_minute,
    ));

    let shrink_limits = limits.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(600));
        loop {
            ticker.tick().await;
            shrink_limits.shrink();
        }
    });

    // 8. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let pool = web::Data::new(pool);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            // Application state
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(razorpay.clone())
            .app_data(geocoding.clone())
            .app_data(gemini.clone())
            .app_data(limits.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Extractor errors share the API error body
            .configure(errors::extractor_config)
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::auth_config)
            .configure(handlers::users_config)
            .configure(handlers::reading_rooms_config)
            .configure(handlers::cabins_config)
            .configure(handlers::accommodations_config)
            .configure(handlers::bookings_config)
            .configure(handlers::payments_config)
            .configure(handlers::subscriptions_config)
            .configure(handlers::inquiries_config)
            .configure(handlers::favorites_config)
            .configure(handlers::reviews_config)
            .configure(handlers::boost_config)
            .configure(handlers::locations_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
