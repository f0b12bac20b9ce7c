//! Fuel station domain types and the places API response shapes they are
//! parsed from.

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers, for great-circle distance.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A nearby fuel station, ready for the map/list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct FuelStation {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub address: String,
    pub is_currently_selling: bool,
    /// Straight-line distance from the search origin, km, one decimal.
    pub distance_km: f64,
    pub rating: Option<f64>,
    pub open_now: Option<bool>,
    pub price_level: Option<u8>,
}

/// Great-circle distance between two coordinates in kilometers
/// (Haversine formula; not road distance).
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

// API response types for the nearby-search endpoint

#[derive(Debug, Clone, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub place_id: Option<String>,
    pub name: String,
    pub vicinity: Option<String>,
    pub business_status: Option<String>,
    pub geometry: PlaceGeometry,
    pub opening_hours: Option<OpeningHours>,
    pub rating: Option<f64>,
    pub price_level: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceGeometry {
    pub location: PlaceLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

impl PlaceResult {
    /// Convert to the domain type, ranking by distance from the search origin.
    /// `index` backs the id when the API omits a place id.
    pub fn to_station(&self, origin: Coordinates, index: usize) -> FuelStation {
        let coordinates = Coordinates {
            latitude: self.geometry.location.lat,
            longitude: self.geometry.location.lng,
        };
        let distance_km = (haversine_km(origin, coordinates) * 10.0).round() / 10.0;

        FuelStation {
            id: self
                .place_id
                .clone()
                .unwrap_or_else(|| format!("station-{}", index)),
            name: self.name.clone(),
            coordinates,
            address: self.vicinity.clone().unwrap_or_default(),
            is_currently_selling: self.business_status.as_deref() == Some("OPERATIONAL"),
            distance_km,
            rating: self.rating,
            open_now: self.opening_hours.as_ref().and_then(|h| h.open_now),
            price_level: self.price_level,
        }
    }
}
