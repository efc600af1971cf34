use parcelhub_core::pin::DEFAULT_KDF_ITERATIONS;

use crate::auth::jwt::JwtConfig;

/// Default PIN validity window in hours.
const DEFAULT_PIN_TTL_HOURS: i64 = 24;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long a pickup PIN stays valid after generation.
    pub pin_ttl_hours: i64,
    /// KDF round count for PIN hashing. Stored per parcel so changing it
    /// never breaks verification of existing PINs.
    pub pin_kdf_iterations: u32,
    /// JWT token configuration for admin auth.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `PIN_TTL_HOURS`        | `24`      |
    /// | `PIN_KDF_ITERATIONS`   | `100000`  |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let pin_ttl_hours: i64 = std::env::var("PIN_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_PIN_TTL_HOURS.to_string())
            .parse()
            .expect("PIN_TTL_HOURS must be a valid i64");

        let pin_kdf_iterations: u32 = std::env::var("PIN_KDF_ITERATIONS")
            .unwrap_or_else(|_| DEFAULT_KDF_ITERATIONS.to_string())
            .parse()
            .expect("PIN_KDF_ITERATIONS must be a valid u32");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            pin_ttl_hours,
            pin_kdf_iterations,
            jwt,
        }
    }
}
