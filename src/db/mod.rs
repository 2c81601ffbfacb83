// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export repositories for use across the application

pub mod accommodation_repository;
pub mod booking_repository;
pub mod boost_repository;
pub mod favorite_repository;
pub mod inquiry_repository;
pub mod listing_repository;
pub mod payment_order_repository;
pub mod payment_repository;
pub mod reading_room_repository;
pub mod review_repository;
pub mod subscription_repository;
pub mod user_repository;

pub use accommodation_repository::AccommodationRepository;
pub use booking_repository::BookingRepository;
pub use boost_repository::BoostRepository;
pub use favorite_repository::FavoriteRepository;
pub use inquiry_repository::InquiryRepository;
pub use listing_repository::ListingRepository;
pub use payment_order_repository::PaymentOrderRepository;
pub use payment_repository::PaymentRepository;
pub use reading_room_repository::ReadingRoomRepository;
pub use review_repository::ReviewRepository;
pub use subscription_repository::SubscriptionRepository;
pub use user_repository::{NewUser, UserRepository};
