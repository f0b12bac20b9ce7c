//! HTTP client module for the places API.
//!
//! This module provides the `PlacesClient` for fetching nearby gas stations
//! and per-station details. The identity provider has its own client in
//! `crate::auth::provider`.

pub mod error;
pub mod places;

pub use error::ApiError;
pub use places::{PlaceDetails, PlacesClient};
