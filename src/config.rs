//! Runtime configuration for Storage Crab Desktop.
//!
//! Values come from the environment (optionally seeded from `.env`), with
//! command-line flags taking precedence.

use std::time::Duration;

use thiserror::Error;

use crate::api::Endpoints;
use crate::session::REFRESH_INTERVAL;

const API_URL_VAR: &str = "STORAGE_CRAB_API_URL";
const REFRESH_INTERVAL_VAR: &str = "STORAGE_CRAB_REFRESH_INTERVAL_SECS";
const REQUEST_TIMEOUT_VAR: &str = "STORAGE_CRAB_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "STORAGE_CRAB_CONNECT_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:8080/api/";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("API URL must not be empty")]
    EmptyApiUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let refresh_interval = seconds(&lookup, REFRESH_INTERVAL_VAR, REFRESH_INTERVAL)?;
        let request_timeout = seconds(&lookup, REQUEST_TIMEOUT_VAR, DEFAULT_REQUEST_TIMEOUT)?;
        let connect_timeout = seconds(&lookup, CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT)?;

        Self {
            api_base_url,
            refresh_interval,
            request_timeout,
            connect_timeout,
        }
        .validated()
    }

    /// Apply command-line overrides on top of the environment values.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        refresh_interval_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = api_url {
            self.api_base_url = url;
        }
        if let Some(secs) = refresh_interval_secs {
            self.refresh_interval = Duration::from_secs(secs);
        }
        self.validated()
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_base(&self.api_base_url)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::Zero(REFRESH_INTERVAL_VAR));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Zero(REQUEST_TIMEOUT_VAR));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::Zero(CONNECT_TIMEOUT_VAR));
        }
        Ok(self)
    }
}

fn seconds<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
