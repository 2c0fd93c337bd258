//! Shared error type and response helpers for the upstream clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Timeout for places, weather and photo requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for vision requests, which upload the whole image.
pub const VISION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from an upstream API call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream returned a non-2xx status code.
    #[error("Upstream API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The upstream answered 2xx but reported a failure in its payload.
    #[error("Upstream reported status {0}")]
    Status(String),

    /// The response did not have the expected shape.
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

/// Ensure the response has a success status code.
///
/// Returns the response unchanged on success, or [`ClientError::ApiError`]
/// carrying the status and body text on failure.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ClientError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Check the status and deserialize the JSON body.
pub async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}
