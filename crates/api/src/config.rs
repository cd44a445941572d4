use ventanilla_core::tracking::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PREFIX};
use ventanilla_db::DEFAULT_MAX_CONNECTIONS;

use crate::auth::jwt::JwtConfig;

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
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum pooled database connections (default: `20`).
    pub database_max_connections: u32,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Prefix of generated tracking numbers (default: `PQR`).
    pub tracking_prefix: String,
    /// Attempts at finding an unused tracking number before giving up.
    pub tracking_max_attempts: u32,
    /// Optional address that receives a copy of every creation notice.
    pub staff_inbox: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `DATABASE_MAX_CONNECTIONS`    | `20`                       |
    /// | `PQRSD_TRACKING_PREFIX`       | `PQR`                      |
    /// | `PQRSD_TRACKING_MAX_ATTEMPTS` | `10`                       |
    /// | `PQRSD_STAFF_INBOX`           | unset                      |
    ///
    /// # Panics
    ///
    /// Panics on unparseable numeric values and on a missing `JWT_SECRET`;
    /// misconfiguration should stop the process at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let tracking_prefix = std::env::var("PQRSD_TRACKING_PREFIX")
            .unwrap_or_else(|_| DEFAULT_PREFIX.into());

        let tracking_max_attempts: u32 = std::env::var("PQRSD_TRACKING_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
            .parse()
            .expect("PQRSD_TRACKING_MAX_ATTEMPTS must be a valid u32");
        assert!(
            tracking_max_attempts > 0,
            "PQRSD_TRACKING_MAX_ATTEMPTS must be at least 1"
        );

        let staff_inbox = std::env::var("PQRSD_STAFF_INBOX")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_max_connections,
            jwt,
            tracking_prefix,
            tracking_max_attempts,
            staff_inbox,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
