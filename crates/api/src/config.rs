//! Application configuration loaded from environment variables.

use std::str::FromStr;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "filling-station-dev-secret";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `"0.0.0.0"`)
/// - `PORT`: listen port (default `3000`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; the in-memory store is used when unset
/// - `JWT_SECRET`: HS256 signing secret (default [`DEV_JWT_SECRET`])
/// - `JWT_TTL_HOURS`: session token lifetime (default `24`)
/// - `RESET_TOKEN_TTL_MINUTES`: password reset token lifetime (default `30`)
/// - `BCRYPT_COST`: bcrypt work factor (default `10`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let jwt_secret = lookup("JWT_SECRET").filter(|s| !s.trim().is_empty());

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            jwt_secret: jwt_secret.unwrap_or(defaults.jwt_secret),
            jwt_ttl_hours: parsed(&lookup, "JWT_TTL_HOURS")
                .filter(|h| *h > 0)
                .unwrap_or(defaults.jwt_ttl_hours),
            reset_token_ttl_minutes: parsed(&lookup, "RESET_TOKEN_TTL_MINUTES")
                .filter(|m| *m > 0)
                .unwrap_or(defaults.reset_token_ttl_minutes),
            bcrypt_cost: parsed(&lookup, "BCRYPT_COST")
                .filter(|c| (4..=31).contains(c))
                .unwrap_or(defaults.bcrypt_cost),
        }
    }

    /// Whether tokens are signed with [`DEV_JWT_SECRET`].
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_hours: 24,
            reset_token_ttl_minutes: domain::staff::DEFAULT_RESET_TTL_MINUTES,
            bcrypt_cost: domain::staff::DEFAULT_COST,
        }
    }
}
