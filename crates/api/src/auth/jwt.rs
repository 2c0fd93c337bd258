//! HS256 bearer tokens issued to devices after an API key login.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Secret used when `JWT_SECRET` is not set. Replace it in production.
pub const DEFAULT_JWT_SECRET: &str =
    "airea-super-secret-key-change-this-in-production-minimum-256-bits";

/// Default token lifetime: one day.
pub const DEFAULT_JWT_EXPIRATION_MS: i64 = 86_400_000;

/// JWT claims embedded in every device token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the device id the token was issued to.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in milliseconds.
    pub expiration_ms: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            expiration_ms: DEFAULT_JWT_EXPIRATION_MS,
        }
    }
}

impl JwtConfig {
    /// Lifetime reported to clients, in whole seconds.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiration_ms / 1000
    }
}

/// Generate a token whose subject is `device_id`.
pub fn generate_token(
    device_id: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: device_id.to_string(),
        exp: now + config.expires_in_secs(),
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token's signature and expiry, returning its [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiration_ms: 60_000,
        }
    }

    #[test]
    fn generate_and_validate() {
        let config = test_config();
        let token = generate_token("ESP32_HALL", &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "ESP32_HALL");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn expired_token_fails() {
        let config = test_config();
        // Well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "ESP32_HALL".to_string(),
            exp: now - 300,
            iat: now - 600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn different_secrets_fail() {
        let token = generate_token("ESP32_HALL", &test_config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn default_lifetime_is_one_day() {
        assert_eq!(JwtConfig::default().expires_in_secs(), 86_400);
    }
}
