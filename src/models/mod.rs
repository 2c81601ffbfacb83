// src/models/mod.rs
// DOCUMENTATION: Model module organization
// PURPOSE: Re-export records and DTOs for the rest of the crate

pub mod accommodation;
pub mod boost;
pub mod booking;
pub mod favorite;
pub mod inquiry;
pub mod listing;
pub mod location;
pub mod payment;
pub mod reading_room;
pub mod review;
pub mod subscription;
pub mod user;

pub use accommodation::*;
pub use boost::*;
pub use booking::*;
pub use favorite::*;
pub use inquiry::*;
pub use listing::*;
pub use location::*;
pub use payment::*;
pub use reading_room::*;
pub use review::*;
pub use subscription::*;
pub use user::*;
