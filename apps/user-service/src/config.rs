// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into an
//! immutable [`AppConfig`]. Nothing else reads the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8001` |
//! | `DATA_DIR` | Directory holding `users.redb` | `./data` |
//! | `JWT_SECRET_KEY` | HMAC secret for issuing and verifying tokens | Required |
//! | `JWT_EXPIRATION_MINUTES` | Token lifetime in minutes | `60` |
//! | `SIGNATURE_KEY` | Shared secret behind `X-Api-Key` | Required |
//! | `SEED_ADMIN_PASSWORD` | Creates user `admin` (role `ADMIN`) when set | Unset |
//! | `RATE_LIMIT_PER_SECOND` | Requests per second per client IP on `/api/v1/auth` | `10` |
//! | `RATE_LIMIT_BURST` | Requests a client IP may send at once | `20` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{num::NonZeroU32, path::PathBuf};

use chrono::TimeDelta;

use crate::logging::LogFormat;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const JWT_SECRET_KEY_ENV: &str = "JWT_SECRET_KEY";
pub const JWT_EXPIRATION_MINUTES_ENV: &str = "JWT_EXPIRATION_MINUTES";
pub const SIGNATURE_KEY_ENV: &str = "SIGNATURE_KEY";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const RATE_LIMIT_PER_SECOND_ENV: &str = "RATE_LIMIT_PER_SECOND";
pub const RATE_LIMIT_BURST_ENV: &str = "RATE_LIMIT_BURST";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_JWT_EXPIRATION_MINUTES: i64 = 60;
pub const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 10;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Service configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_ttl: TimeDelta,
    pub signature_key: String,
    pub seed_admin_password: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub log_format: LogFormat,
}

/// Per-client-IP request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_second: NonZeroU32,
    pub burst: NonZeroU32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: NonZeroU32::new(DEFAULT_RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN),
            burst: NonZeroU32::new(DEFAULT_RATE_LIMIT_BURST).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("jwt_ttl_minutes", &self.jwt_ttl.num_minutes())
            .field("seed_admin", &self.seed_admin_password.is_some())
            .field("rate_limit", &self.rate_limit)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Config with the given secrets and defaults for everything else.
    pub fn new(jwt_secret: impl Into<String>, signature_key: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            jwt_secret: jwt_secret.into(),
            jwt_ttl: TimeDelta::minutes(DEFAULT_JWT_EXPIRATION_MINUTES),
            signature_key: signature_key.into(),
            seed_admin_password: None,
            rate_limit: RateLimitConfig::default(),
            log_format: LogFormat::default(),
        }
    }

    pub fn with_rate_limit(mut self, per_second: NonZeroU32, burst: NonZeroU32) -> Self {
        self.rate_limit = RateLimitConfig { per_second, burst };
        self
    }

    pub fn with_seed_admin_password(mut self, password: impl Into<String>) -> Self {
        self.seed_admin_password = Some(password.into());
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let mut config = Self::new(require(JWT_SECRET_KEY_ENV)?, require(SIGNATURE_KEY_ENV)?);

        if let Some(host) = get(HOST_ENV) {
            config.host = host;
        }
        if let Some(port) = get(PORT_ENV) {
            config.port = parse(PORT_ENV, &port)?;
        }
        if let Some(dir) = get(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(minutes) = get(JWT_EXPIRATION_MINUTES_ENV) {
            let minutes: i64 = parse(JWT_EXPIRATION_MINUTES_ENV, &minutes)?;
            let invalid = |reason: &str| ConfigError::Invalid {
                name: JWT_EXPIRATION_MINUTES_ENV,
                value: minutes.to_string(),
                reason: reason.to_string(),
            };
            if minutes <= 0 {
                return Err(invalid("must be positive"));
            }
            config.jwt_ttl =
                TimeDelta::try_minutes(minutes).ok_or_else(|| invalid("out of range"))?;
        }
        if let Some(rate) = get(RATE_LIMIT_PER_SECOND_ENV) {
            config.rate_limit.per_second = parse(RATE_LIMIT_PER_SECOND_ENV, &rate)?;
        }
        if let Some(burst) = get(RATE_LIMIT_BURST_ENV) {
            config.rate_limit.burst = parse(RATE_LIMIT_BURST_ENV, &burst)?;
        }
        config.seed_admin_password = get(SEED_ADMIN_PASSWORD_ENV);
        if let Some(format) = get(LOG_FORMAT_ENV) {
            config.log_format = format.parse().map_err(|reason| ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                value: format.clone(),
                reason,
            })?;
        }

        Ok(config)
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [(JWT_SECRET_KEY_ENV, "jwt"), (SIGNATURE_KEY_ENV, "sig")];

    #[test]
    fn defaults_apply_when_only_secrets_set() {
        let config = AppConfig::from_lookup(lookup(&SECRETS)).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8001);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.jwt_ttl, TimeDelta::minutes(60));
        assert_eq!(config.jwt_secret, "jwt");
        assert_eq!(config.signature_key, "sig");
        assert!(config.seed_admin_password.is_none());
        assert_eq!(config.rate_limit, RateLimitConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8001");
    }

    #[test]
    fn missing_secrets_are_errors() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(SIGNATURE_KEY_ENV, "sig")])).unwrap_err(),
            ConfigError::Missing(JWT_SECRET_KEY_ENV)
        );
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(JWT_SECRET_KEY_ENV, "jwt"), (SIGNATURE_KEY_ENV, " ")]))
                .unwrap_err(),
            ConfigError::Missing(SIGNATURE_KEY_ENV)
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = SECRETS.to_vec();
        vars.extend([
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (DATA_DIR_ENV, "/var/lib/users"),
            (JWT_EXPIRATION_MINUTES_ENV, "15"),
            (SEED_ADMIN_PASSWORD_ENV, "admin123"),
            (RATE_LIMIT_PER_SECOND_ENV, "5"),
            (RATE_LIMIT_BURST_ENV, "7"),
            (LOG_FORMAT_ENV, "json"),
        ]);
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/users"));
        assert_eq!(config.jwt_ttl, TimeDelta::minutes(15));
        assert_eq!(config.seed_admin_password.as_deref(), Some("admin123"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rate_limit.per_second.get(), 5);
        assert_eq!(config.rate_limit.burst.get(), 7);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut vars = SECRETS.to_vec();
        vars.push((PORT_ENV, "eighty"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: PORT_ENV, .. })
        ));

        let mut vars = SECRETS.to_vec();
        vars.push((JWT_EXPIRATION_MINUTES_ENV, "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: JWT_EXPIRATION_MINUTES_ENV, .. })
        ));

        let mut vars = SECRETS.to_vec();
        vars.push((RATE_LIMIT_BURST_ENV, "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: RATE_LIMIT_BURST_ENV, .. })
        ));
    }

    #[test]
    fn huge_ttl_is_an_error_not_a_panic() {
        let max = i64::MAX.to_string();
        let mut vars = SECRETS.to_vec();
        vars.push((JWT_EXPIRATION_MINUTES_ENV, max.as_str()));

        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: JWT_EXPIRATION_MINUTES_ENV,
                value: max.clone(),
                reason: "out of range".to_string(),
            }
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig::new("top-jwt-secret", "top-signature-key")
            .with_seed_admin_password("admin-pass");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-jwt-secret"));
        assert!(!rendered.contains("top-signature-key"));
        assert!(!rendered.contains("admin-pass"));
    }
}
