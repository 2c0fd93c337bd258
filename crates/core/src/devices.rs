//! Cough monitor device identifiers, API keys and request limits.

use rand::Rng;

use crate::error::CoreError;

/// Prefix every sensor id carries.
pub const DEVICE_ID_PREFIX: &str = "ESP32_";

/// Length of a generated API key (alphanumeric characters).
pub const API_KEY_LENGTH: usize = 48;

/// Requests per minute a single client may make against the monitor routes.
pub const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 100;

/// Generate a random API key. Only its hash may be stored.
pub fn generate_api_key() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Ensure a device id is present.
pub fn require_device_id(device_id: &str) -> Result<&str, CoreError> {
    let trimmed = device_id.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Device ID is required".into()));
    }
    Ok(trimmed)
}

/// Check the `ESP32_[A-Z0-9_]+` shape required to log in.
pub fn validate_login_device_id(device_id: &str) -> Result<(), CoreError> {
    require_device_id(device_id)?;
    let valid = device_id
        .strip_prefix(DEVICE_ID_PREFIX)
        .is_some_and(|rest| {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        });
    if !valid {
        return Err(CoreError::Validation(
            "Invalid device ID format. Must start with ESP32_".into(),
        ));
    }
    Ok(())
}
