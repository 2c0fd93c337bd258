//! JWT-based device authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use wayfarer_core::error::CoreError;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Device authenticated by a Bearer token in the `Authorization` header.
///
/// Add it as a handler parameter to require a login:
///
/// ```ignore
/// async fn my_handler(device: AuthDevice) -> AppResult<Json<()>> {
///     tracing::info!(device_id = %device.device_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthDevice {
    /// The device the token was issued to (from `claims.sub`).
    pub device_id: String,
}

impl FromRequestParts<AppState> for AuthDevice {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthDevice {
            device_id: claims.sub,
        })
    }
}
