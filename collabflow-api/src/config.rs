//! API configuration.
//!
//! CORS, rate limiting, and server bind settings, loaded from environment
//! variables with development-friendly defaults.

use std::time::Duration;

/// API configuration for CORS, rate limiting, and the listen address.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: String,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Whether rate limiting is enabled.
    pub rate_limit_enabled: bool,

    /// Requests per minute per client IP.
    pub rate_limit_per_minute: u32,

    /// Burst capacity beyond the steady rate.
    pub rate_limit_burst: u32,

    /// Window size for rate limiting.
    pub rate_limit_window: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".to_string(),
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400,
            rate_limit_enabled: true,
            rate_limit_per_minute: 300,
            rate_limit_burst: 20,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `COLLABFLOW_BIND_ADDR`: Listen address (default: 0.0.0.0:4000)
    /// - `COLLABFLOW_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `COLLABFLOW_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `COLLABFLOW_RATE_LIMIT_ENABLED`: "true" or "false" (default: true)
    /// - `COLLABFLOW_RATE_LIMIT_PER_MINUTE`: Requests per minute per IP (default: 300)
    /// - `COLLABFLOW_RATE_LIMIT_BURST`: Burst capacity (default: 20)
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("COLLABFLOW_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:4000".to_string());

        let cors_origins = std::env::var("COLLABFLOW_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("COLLABFLOW_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let rate_limit_enabled = std::env::var("COLLABFLOW_RATE_LIMIT_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        let rate_limit_per_minute = std::env::var("COLLABFLOW_RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let rate_limit_burst = std::env::var("COLLABFLOW_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        Self {
            bind_addr,
            cors_origins,
            cors_max_age_secs,
            rate_limit_enabled,
            rate_limit_per_minute,
            rate_limit_burst,
            rate_limit_window: Duration::from_secs(60),
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }
        self.cors_origins.iter().any(|allowed| allowed == origin)
    }
}
