use std::path::PathBuf;

use axum::http::HeaderValue;
use wayfarer_clients::weather::OPEN_METEO_URL;
use wayfarer_core::devices::DEFAULT_RATE_LIMIT_PER_MIN;
use wayfarer_core::offline::DEFAULT_MAX_STORAGE_MB;

use crate::auth::jwt::{JwtConfig, DEFAULT_JWT_EXPIRATION_MS, DEFAULT_JWT_SECRET};

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Upstream API keys
/// are optional; each feature falls back to demo data without its key.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins from the comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Root of the per-user offline bundles.
    pub offline_cache_dir: PathBuf,
    /// Where uploaded images are stored.
    pub image_uploads_dir: PathBuf,
    /// Per-user offline storage allowance in MB.
    pub max_cache_mb: u64,
    pub google_maps_api_key: Option<String>,
    pub unsplash_access_key: Option<String>,
    pub google_vision_api_key: Option<String>,
    pub open_meteo_url: String,
    /// Signing settings for device tokens.
    pub jwt: JwtConfig,
    /// Requests per minute per client on the cough monitor routes.
    pub rate_limit_per_minute: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                  |
    /// |-------------------------|------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                |
    /// | `PORT`                  | `8000`                                   |
    /// | `CORS_ORIGINS`          | `*`                                      |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                     |
    /// | `DATABASE_URL`          | `sqlite://tourism.db?mode=rwc`           |
    /// | `OFFLINE_CACHE_DIR`     | `./data/offline_cache`                   |
    /// | `IMAGE_UPLOADS_DIR`     | `./uploads/images`                       |
    /// | `MAX_CACHE_MB`          | `500`                                    |
    /// | `GOOGLE_MAPS_API_KEY`   | unset                                    |
    /// | `UNSPLASH_ACCESS_KEY`   | unset                                    |
    /// | `GOOGLE_VISION_API_KEY` | unset                                    |
    /// | `OPEN_METEO_URL`        | `https://api.open-meteo.com/v1/forecast` |
    /// | `JWT_SECRET`            | development secret                       |
    /// | `JWT_EXPIRATION_MS`     | `86400000`                               |
    /// | `RATE_LIMIT_PER_MINUTE` | `100`                                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let secret = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse("PORT", "u16", var("PORT", "8000"))?;
        let request_timeout_secs = parse("REQUEST_TIMEOUT_SECS", "u64", var("REQUEST_TIMEOUT_SECS", "30"))?;
        let max_cache_mb = parse(
            "MAX_CACHE_MB",
            "u64",
            var("MAX_CACHE_MB", &DEFAULT_MAX_STORAGE_MB.to_string()),
        )?;

        let expiration_ms: i64 = parse(
            "JWT_EXPIRATION_MS",
            "positive integer",
            var("JWT_EXPIRATION_MS", &DEFAULT_JWT_EXPIRATION_MS.to_string()),
        )?;
        if expiration_ms <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_EXPIRATION_MS",
                expected: "positive integer",
                value: expiration_ms.to_string(),
            });
        }
        let rate_limit_per_minute: u32 = parse(
            "RATE_LIMIT_PER_MINUTE",
            "u32",
            var("RATE_LIMIT_PER_MINUTE", &DEFAULT_RATE_LIMIT_PER_MIN.to_string()),
        )?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in cors_origins.iter().filter(|o| o.as_str() != "*") {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    expected: "origin",
                    value: origin.clone(),
                });
            }
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            cors_origins,
            request_timeout_secs,
            database_url: var("DATABASE_URL", "sqlite://tourism.db?mode=rwc"),
            offline_cache_dir: var("OFFLINE_CACHE_DIR", "./data/offline_cache").into(),
            image_uploads_dir: var("IMAGE_UPLOADS_DIR", "./uploads/images").into(),
            max_cache_mb,
            google_maps_api_key: secret("GOOGLE_MAPS_API_KEY"),
            unsplash_access_key: secret("UNSPLASH_ACCESS_KEY"),
            google_vision_api_key: secret("GOOGLE_VISION_API_KEY"),
            open_meteo_url: var("OPEN_METEO_URL", OPEN_METEO_URL),
            jwt: JwtConfig {
                secret: secret("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
                expiration_ms,
            },
            rate_limit_per_minute,
        })
    }

    /// Whether CORS should accept any origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert!(config.allows_any_origin());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_cache_mb, 500);
        assert_eq!(config.offline_cache_dir, PathBuf::from("./data/offline_cache"));
        assert!(config.google_maps_api_key.is_none());
        assert_eq!(config.open_meteo_url, OPEN_METEO_URL);
        assert_eq!(config.jwt.secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.jwt.expires_in_secs(), 86_400);
        assert_eq!(config.rate_limit_per_minute, 100);
    }

    #[test]
    fn jwt_and_rate_limit_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRATION_MS", "3600000"),
            ("RATE_LIMIT_PER_MINUTE", "20"),
        ])
        .unwrap();
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.expires_in_secs(), 3600);
        assert_eq!(config.rate_limit_per_minute, 20);

        let blank = config_from(&[("JWT_SECRET", " ")]).unwrap();
        assert_eq!(blank.jwt.secret, DEFAULT_JWT_SECRET);

        assert_matches!(
            config_from(&[("JWT_EXPIRATION_MS", "0")]),
            Err(ConfigError::Invalid { var: "JWT_EXPIRATION_MS", .. })
        );
        assert_matches!(
            config_from(&[("RATE_LIMIT_PER_MINUTE", "lots")]),
            Err(ConfigError::Invalid { var: "RATE_LIMIT_PER_MINUTE", .. })
        );
    }

    #[test]
    fn overrides_and_blank_keys() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://localhost:5173, https://app.example.com"),
            ("MAX_CACHE_MB", "64"),
            ("GOOGLE_MAPS_API_KEY", "abc"),
            ("UNSPLASH_ACCESS_KEY", "  "),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins.len(), 2);
        assert!(!config.allows_any_origin());
        assert_eq!(config.max_cache_mb, 64);
        assert_eq!(config.google_maps_api_key.as_deref(), Some("abc"));
        assert!(config.unsplash_access_key.is_none());
    }

    #[test]
    fn invalid_numbers_are_reported() {
        assert_matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        );
        assert_matches!(
            config_from(&[("MAX_CACHE_MB", "-1")]),
            Err(ConfigError::Invalid { var: "MAX_CACHE_MB", .. })
        );
    }

    #[test]
    fn invalid_origin_is_reported() {
        assert_matches!(
            config_from(&[("CORS_ORIGINS", "http://ok.example,bad\norigin")]),
            Err(ConfigError::Invalid { var: "CORS_ORIGINS", .. })
        );
    }
}
