//! Runtime configuration read from the environment.
//!
//! Every setting is read once at startup. Unset variables fall back to
//! defaults; set but unparsable ones are an error rather than a silent
//! default.

use crate::models::flow::DEFAULT_FLOW_LIMIT;
use crate::services::jwt_service::JwtService;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{0}")]
    Jwt(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub port: u16,
    /// PostgreSQL connection string; takes precedence over `flows_file`.
    pub database_url: Option<String>,
    /// JSON file backing the flow store when no database is configured.
    pub flows_file: Option<PathBuf>,
    pub flow_limit: usize,
    pub rate_limit_per_minute: u32,
    pub app_env: String,
    pub jwt_secret: Option<String>,
    /// Origins allowed by CORS; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            flows_file: None,
            flow_limit: DEFAULT_FLOW_LIMIT,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            app_env: "development".to_string(),
            jwt_secret: None,
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Read PORT, DATABASE_URL, FLOWS_FILE, FLOW_LIMIT, RATE_LIMIT_PER_MINUTE,
    /// APP_ENV, JWT_SECRET and CORS_ALLOWED_ORIGINS (comma separated).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            database_url: non_empty_var("DATABASE_URL"),
            flows_file: non_empty_var("FLOWS_FILE").map(PathBuf::from),
            flow_limit: parse_var("FLOW_LIMIT")?
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.flow_limit),
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE")?
                .unwrap_or(defaults.rate_limit_per_minute),
            app_env: non_empty_var("APP_ENV").unwrap_or(defaults.app_env),
            jwt_secret: non_empty_var("JWT_SECRET"),
            cors_origins: non_empty_var("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn is_development(&self) -> bool {
        matches!(
            self.app_env.to_lowercase().as_str(),
            "development" | "dev" | "local" | "test"
        )
    }

    /// JWT service for the configured secret. Outside development the
    /// secret is mandatory.
    pub fn jwt_service(&self) -> Result<JwtService, ConfigError> {
        JwtService::from_secret(self.jwt_secret.as_deref(), self.is_development())
            .map_err(ConfigError::Jwt)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
