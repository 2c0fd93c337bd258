//! Outbound HTTP clients for the third-party APIs the service depends on.
//!
//! Every provider sits behind a trait so the API can swap in stubs:
//!
//! - [`PlaceSearch`]: Google Places nearby search, falling back to demo data.
//! - [`WeatherLookup`]: Open-Meteo current conditions.
//! - [`PhotoLookup`]: Unsplash photo search, falling back to a placeholder.
//! - [`LandmarkDetector`]: Google Vision landmark detection.

pub mod http;
pub mod photos;
pub mod places;
pub mod vision;
pub mod weather;

pub use http::ClientError;
pub use photos::{placeholder_url, PhotoLookup, UnsplashClient};
pub use places::{GooglePlacesClient, PlaceSearch};
pub use vision::{GoogleVisionClient, Landmark, LandmarkDetector};
pub use weather::{CurrentWeather, OpenMeteoClient, Weather, WeatherLookup};
