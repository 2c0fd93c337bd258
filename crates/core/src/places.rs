//! Place records and the canned results served without a Maps API key.

use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Maximum number of places returned for a single search.
pub const MAX_PLACES: usize = 5;

/// Default nearby-search radius in metres.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 5000;

/// A point of interest returned by a place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    /// Distance from the searcher in kilometres.
    pub distance: f64,
    pub rating: f64,
}

/// Demo results for intents that have them; empty for the rest.
pub fn demo_places(intent: Intent) -> Vec<Place> {
    let demo = |name: &str, lat: f64, lng: f64, address: &str, distance: f64, rating: f64| Place {
        name: name.to_string(),
        lat,
        lng,
        address: address.to_string(),
        distance,
        rating,
    };

    match intent {
        Intent::Coffee => vec![demo("Brew Haven", 40.7138, -74.0059, "123 Main St", 0.5, 4.7)],
        Intent::Restaurant => vec![demo(
            "Italian Kitchen",
            40.7148,
            -74.0069,
            "456 Park Ave",
            0.8,
            4.8,
        )],
        Intent::Hotel => vec![demo("Grand Hotel", 40.7158, -74.0079, "789 Star Ave", 1.2, 4.9)],
        Intent::Beach => vec![demo("Sandy Cove", 40.7268, -74.0179, "Beach Rd", 5.0, 4.8)],
        _ => Vec::new(),
    }
}
