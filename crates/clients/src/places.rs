//! Nearby place search.

use async_trait::async_trait;
use serde::Deserialize;
use wayfarer_core::geo::{calculate_distance, Coordinates};
use wayfarer_core::intent::Intent;
use wayfarer_core::places::{demo_places, Place, MAX_PLACES};

use crate::http::{parse_response, ClientError, DEFAULT_TIMEOUT};

const PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Place type sent for search types outside the intent table.
const FALLBACK_PLACE_TYPE: &str = "point_of_interest";

/// Finds points of interest around a position.
///
/// Implementations never fail: when the upstream is unavailable they return
/// the demo places for `search_type` (possibly none).
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn nearby(&self, search_type: &str, origin: Coordinates, radius_m: u32) -> Vec<Place>;
}

/// Demo results for a free-form search type.
fn demo_for(search_type: &str) -> Vec<Place> {
    Intent::from_name(search_type)
        .map(demo_places)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    name: String,
    geometry: Geometry,
    vicinity: Option<String>,
    /// Unrated places come back as 0.
    #[serde(default)]
    rating: f64,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Turn a decoded response into at most [`MAX_PLACES`] places.
fn into_places(response: NearbyResponse, origin: Coordinates) -> Result<Vec<Place>, ClientError> {
    if response.status != "OK" {
        return Err(ClientError::Status(response.status));
    }

    Ok(response
        .results
        .into_iter()
        .take(MAX_PLACES)
        .map(|r| {
            let location = r.geometry.location;
            Place {
                name: r.name,
                lat: location.lat,
                lng: location.lng,
                address: r.vicinity.unwrap_or_else(|| "N/A".to_string()),
                distance: calculate_distance(
                    origin.latitude,
                    origin.longitude,
                    location.lat,
                    location.lng,
                ),
                rating: r.rating,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Google Places
// ---------------------------------------------------------------------------

/// Google Places nearby-search client.
///
/// Without an API key every search is answered from the demo table.
pub struct GooglePlacesClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: PLACES_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch(
        &self,
        api_key: &str,
        search_type: &str,
        origin: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Place>, ClientError> {
        let (place_type, keyword) = match Intent::from_name(search_type) {
            Ok(intent) => (intent.place_type(), intent.place_query()),
            Err(_) => (FALLBACK_PLACE_TYPE, search_type),
        };
        let location = format!("{},{}", origin.latitude, origin.longitude);
        let radius = radius_m.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", place_type),
                ("keyword", keyword),
                ("key", api_key),
            ])
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;

        let body: NearbyResponse = parse_response(response).await?;
        into_places(body, origin)
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    async fn nearby(&self, search_type: &str, origin: Coordinates, radius_m: u32) -> Vec<Place> {
        let Some(api_key) = self.api_key.as_deref() else {
            return demo_for(search_type);
        };

        match self.fetch(api_key, search_type, origin, radius_m).await {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!(error = %e, search_type, "Place search failed, serving demo data");
                demo_for(search_type)
            }
        }
    }
}
