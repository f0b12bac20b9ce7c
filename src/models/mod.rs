//! Data models for FillUp entities.
//!
//! Domain types are separated from the wire shapes they are parsed from;
//! wire structs keep the API's field names via serde renames.

pub mod profile;
pub mod station;

pub use profile::{AccountProfile, RegistrationData, SocialProfile, UserProfile};
pub use station::{haversine_km, Coordinates, FuelStation, NearbySearchResponse, PlaceResult};
