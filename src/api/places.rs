//! Places API client for the nearby fuel station search.
//!
//! Station data comes from a third-party places HTTP API; results carry a
//! body-level status in addition to the HTTP status, and query-limit
//! responses are retried with exponential backoff.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::station::{Coordinates, FuelStation, NearbySearchResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the places API.
const PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Place type filter for the nearby search.
const PLACE_TYPE: &str = "gas_station";

/// Maximum number of retries when the API reports its query limit.
const MAX_QUERY_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for query-limit retries.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum concurrent place-details requests.
const MAX_CONCURRENT_DETAIL_REQUESTS: usize = 10;

/// Fields requested from the place-details endpoint.
const DETAIL_FIELDS: &str =
    "name,formatted_address,geometry,opening_hours,formatted_phone_number,rating,price_level,website";

/// Places API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, PLACES_BASE_URL)
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Fetch gas stations near `origin`, ranked by straight-line distance.
    pub async fn nearby_stations(
        &self,
        origin: Coordinates,
        radius_m: u32,
        region: &str,
        language: &str,
    ) -> Result<Vec<FuelStation>> {
        let url = format!(
            "{}/nearbysearch/json?location={},{}&radius={}&type={}&region={}&language={}&key={}",
            self.base_url,
            origin.latitude,
            origin.longitude,
            radius_m,
            PLACE_TYPE,
            region,
            language,
            self.api_key,
        );

        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .context("Failed to send nearby search request")?;

            let response = Self::check_response(response).await?;
            let body: NearbySearchResponse = response
                .json()
                .await
                .context("Failed to parse nearby search response")?;

            match body.status.as_str() {
                "OK" => {
                    debug!(count = body.results.len(), "Nearby stations fetched");
                    return Ok(body
                        .results
                        .iter()
                        .enumerate()
                        .map(|(i, place)| place.to_station(origin, i))
                        .collect());
                }
                "ZERO_RESULTS" => {
                    debug!("Nearby search returned no stations");
                    return Ok(vec![]);
                }
                "OVER_QUERY_LIMIT" => {
                    retries += 1;
                    if retries > MAX_QUERY_LIMIT_RETRIES {
                        return Err(ApiError::QueryLimit.into());
                    }
                    warn!(retry = retries, backoff_ms, "Query limit reached, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
                other => {
                    return Err(ApiError::from_places_status(other, body.error_message).into());
                }
            }
        }
    }

    /// Fetch detail fields for a single place.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        let url = format!(
            "{}/details/json?place_id={}&fields={}&key={}",
            self.base_url, place_id, DETAIL_FIELDS, self.api_key,
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send place details request")?;

        let response = Self::check_response(response).await?;
        let body: DetailsResponse = response
            .json()
            .await
            .context("Failed to parse place details response")?;

        match body.status.as_str() {
            "OK" => Ok(body.result),
            "NOT_FOUND" | "ZERO_RESULTS" => Ok(None),
            other => Err(ApiError::from_places_status(other, body.error_message).into()),
        }
    }

    /// Fetch details for several places with limited concurrency.
    /// Failures are logged and skipped; the map/list views degrade gracefully.
    pub async fn fetch_details(&self, place_ids: &[String]) -> Vec<(String, PlaceDetails)> {
        stream::iter(place_ids.iter().cloned())
            .map(|id| async move {
                match self.place_details(&id).await {
                    Ok(Some(details)) => Some((id, details)),
                    Ok(None) => None,
                    Err(e) => {
                        warn!(place_id = %id, error = %e, "Place details fetch failed");
                        None
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DETAIL_REQUESTS)
            .filter_map(|r| async move { r })
            .collect()
            .await
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DetailsResponse {
    status: String,
    error_message: Option<String>,
    result: Option<PlaceDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub rating: Option<f64>,
    pub price_level: Option<u8>,
    pub website: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_details_response() {
        let json = r#"{
            "status": "OK",
            "result": {
                "name": "Mobil Lekki",
                "formatted_address": "1 Admiralty Way, Lekki",
                "formatted_phone_number": "+234 801 234 5678",
                "rating": 3.9,
                "price_level": 1,
                "website": "https://example.com"
            }
        }"#;

        let parsed: DetailsResponse =
            serde_json::from_str(json).expect("Failed to parse details JSON");
        assert_eq!(parsed.status, "OK");
        let details = parsed.result.expect("details present");
        assert_eq!(details.name.as_deref(), Some("Mobil Lekki"));
        assert_eq!(details.price_level, Some(1));
    }

    #[test]
    fn test_parse_details_not_found() {
        let json = r#"{"status": "NOT_FOUND"}"#;
        let parsed: DetailsResponse =
            serde_json::from_str(json).expect("Failed to parse NOT_FOUND JSON");
        assert_eq!(parsed.status, "NOT_FOUND");
        assert!(parsed.result.is_none());
    }
}
