//! Runtime configuration read from the environment (and `.env` when present).

use crate::auth::JwtConfig;
use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Prefix every API route is nested under, e.g. "/api/v1".
    pub api_prefix: String,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read every setting.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let api_prefix = normalize_prefix(&get("API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.into()));
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), 5)?;
        let body_limit_bytes = parse_or("REQUEST_BODY_LIMIT_BYTES", get("REQUEST_BODY_LIMIT_BYTES"), 1024 * 1024)?;
        let access_ttl_minutes: i64 = parse_or("JWT_ACCESS_TTL_MINUTES", get("JWT_ACCESS_TTL_MINUTES"), 15)?;
        let refresh_ttl_minutes: i64 = parse_or("JWT_REFRESH_TTL_MINUTES", get("JWT_REFRESH_TTL_MINUTES"), 60 * 24 * 7)?;
        if access_ttl_minutes <= 0 || refresh_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_ACCESS_TTL_MINUTES",
                reason: "token lifetimes must be positive".into(),
            });
        }

        let secret = match get("JWT_SECRET") {
            Some(s) if s.len() >= MIN_SECRET_LEN => s,
            Some(_) => {
                return Err(ConfigError::Invalid {
                    name: "JWT_SECRET",
                    reason: format!("must be at least {} characters", MIN_SECRET_LEN),
                })
            }
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set; using a random key, tokens will not survive a restart");
                format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        Ok(AppConfig {
            database_url,
            bind_addr,
            api_prefix,
            max_connections,
            body_limit_bytes,
            jwt: JwtConfig {
                secret,
                issuer: get("JWT_ISSUER").unwrap_or_else(|| "restaurant-api".into()),
                access_ttl_minutes,
                refresh_ttl_minutes,
            },
        })
    }
}

fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

/// "/api/v1/" and "api/v1" both become "/api/v1"; an empty prefix stays empty.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
