//! Landmark detection with Google Vision.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::http::{parse_response, ClientError, VISION_TIMEOUT};

const VISION_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Number of labels kept from the label annotations.
const MAX_LABELS: usize = 5;

/// A landmark recognised in an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landmark {
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Lower-cased top labels for the whole image.
    pub labels: Vec<String>,
}

/// Recognises landmarks in raw image bytes.
///
/// `Ok(None)` means the image was analysed but contained no landmark.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Option<Landmark>, ClientError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotations>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotations {
    #[serde(default)]
    label_annotations: Vec<Annotation>,
    #[serde(default)]
    landmark_annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
struct Annotation {
    description: Option<String>,
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    lat_lng: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

fn annotate_request(image: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "requests": [{
            "image": {"content": STANDARD.encode(image)},
            "features": [
                {"type": "LABEL_DETECTION"},
                {"type": "LANDMARK_DETECTION"},
                {"type": "WEB_DETECTION"}
            ]
        }]
    })
}

/// Pick the first landmark with a location out of an annotate response.
fn first_landmark(body: AnnotateResponse) -> Result<Option<Landmark>, ClientError> {
    let Some(annotations) = body.responses.into_iter().next() else {
        return Ok(None);
    };
    let Some(landmark) = annotations.landmark_annotations.into_iter().next() else {
        return Ok(None);
    };
    let location = landmark
        .locations
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Malformed("landmark without location".to_string()))?;

    let labels = annotations
        .label_annotations
        .into_iter()
        .take(MAX_LABELS)
        .filter_map(|a| a.description)
        .map(|d| d.to_lowercase())
        .collect();

    Ok(Some(Landmark {
        description: landmark.description.unwrap_or_else(|| "Unknown".to_string()),
        latitude: location.lat_lng.latitude,
        longitude: location.lat_lng.longitude,
        labels,
    }))
}

/// Google Vision `images:annotate` client. Only constructed when a key is
/// configured.
pub struct GoogleVisionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleVisionClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: VISION_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LandmarkDetector for GoogleVisionClient {
    async fn detect(&self, image: &[u8]) -> Result<Option<Landmark>, ClientError> {
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&annotate_request(image))
            .timeout(VISION_TIMEOUT)
            .send()
            .await?;

        let body: AnnotateResponse = parse_response(response).await?;
        first_landmark(body)
    }
}
