use crate::constants::*;
use axum::http::HeaderValue;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub upstream_url: String,
    pub allowed_origins: Vec<HeaderValue>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidUpstream(String),
    InvalidOrigin(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort(port) => {
                write!(f, "Invalid port number: {}", port)
            }
            ConfigError::InvalidUpstream(url) => {
                write!(f, "UPSTREAM_URL must be an http(s) origin, got: {}", url)
            }
            ConfigError::InvalidOrigin(origin) => {
                write!(f, "Invalid CORS origin: {}", origin)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same parsing as [`Config::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("PROXY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("PROXY_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let upstream_url =
            lookup("UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let origins = lookup("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string());

        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(port));
        }

        if !(upstream_url.starts_with("http://") || upstream_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUpstream(upstream_url));
        }
        let upstream_url = upstream_url.trim_end_matches('/').to_string();

        let allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Config {
            host,
            port,
            upstream_url,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
