// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod accommodations;
pub mod auth;
pub mod bookings;
pub mod boost;
pub mod cabins;
pub mod favorites;
pub mod health;
pub mod inquiries;
pub mod listing;
pub mod locations;
pub mod payments;
pub mod reading_rooms;
pub mod reviews;
pub mod subscriptions;
pub mod users;

pub use accommodations::config as accommodations_config;
pub use auth::config as auth_config;
pub use bookings::config as bookings_config;
pub use boost::config as boost_config;
pub use cabins::config as cabins_config;
pub use favorites::config as favorites_config;
pub use health::config as health_config;
pub use inquiries::config as inquiries_config;
pub use locations::config as locations_config;
pub use payments::config as payments_config;
pub use reading_rooms::config as reading_rooms_config;
pub use reviews::config as reviews_config;
pub use subscriptions::config as subscriptions_config;
pub use users::config as users_config;
