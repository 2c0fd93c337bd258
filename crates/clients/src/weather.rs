//! Current weather from Open-Meteo.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use wayfarer_core::geo::Coordinates;

use crate::http::{parse_response, ClientError, DEFAULT_TIMEOUT};

/// Public Open-Meteo forecast endpoint.
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,weather_code,wind_speed_10m,relative_humidity_2m";

/// Weather attached to a place or returned by the weather endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Weather {
    Current(CurrentWeather),
    Unavailable { status: &'static str, error: String },
}

impl Weather {
    pub fn unavailable(error: impl ToString) -> Self {
        Self::Unavailable {
            status: "unavailable",
            error: error.to_string(),
        }
    }
}

/// Readings the upstream omitted serialize as `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    #[serde(serialize_with = "or_na")]
    pub temperature_c: Option<f64>,
    #[serde(serialize_with = "or_na")]
    pub wind_speed: Option<f64>,
    #[serde(serialize_with = "or_na")]
    pub humidity: Option<f64>,
    pub timezone: String,
}

fn or_na<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str("N/A"),
    }
}

/// Looks up current conditions at a position. Never fails; problems are
/// reported through [`Weather::Unavailable`].
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn current(&self, at: Coordinates) -> Weather;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: CurrentBlock,
    timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    relative_humidity_2m: Option<f64>,
}

impl From<ForecastResponse> for CurrentWeather {
    fn from(body: ForecastResponse) -> Self {
        Self {
            temperature_c: body.current.temperature_2m,
            wind_speed: body.current.wind_speed_10m,
            humidity: body.current.relative_humidity_2m,
            timezone: body.timezone.unwrap_or_else(|| "UTC".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Open-Meteo
// ---------------------------------------------------------------------------

/// Open-Meteo forecast client. The API is keyless.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, at: Coordinates) -> Result<CurrentWeather, ClientError> {
        let latitude = at.latitude.to_string();
        let longitude = at.longitude.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("timezone", "auto"),
            ])
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?;

        let body: ForecastResponse = parse_response(response).await?;
        Ok(body.into())
    }
}

#[async_trait]
impl WeatherLookup for OpenMeteoClient {
    async fn current(&self, at: Coordinates) -> Weather {
        match self.fetch(at).await {
            Ok(current) => Weather::Current(current),
            Err(e) => {
                tracing::warn!(error = %e, lat = at.latitude, lng = at.longitude, "Weather lookup failed");
                Weather::unavailable(e)
            }
        }
    }
}
