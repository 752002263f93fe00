use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::domain::listing::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

impl From<ConfigError> for std::io::Error {
    fn from(err: ConfigError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    }
}

/// Settings for the admin client talking to the REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Pre-issued bearer token, used until someone signs in.
    pub api_token: Option<String>,
    pub page_size: u32,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }

    /// Reads `BACKOFFICE_*` variables, loading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("BACKOFFICE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("BACKOFFICE_API_URL"))?;
        let page_size: u32 = parse_or(&lookup, "BACKOFFICE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let timeout_secs: u64 = parse_or(&lookup, "BACKOFFICE_TIMEOUT_SECS", 30)?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: lookup("BACKOFFICE_API_TOKEN").filter(|t| !t.is_empty()),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Bind address of the demo backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn api_url_is_required() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("BACKOFFICE_API_URL"))
        );
    }

    #[test]
    fn client_defaults() {
        let config =
            ClientConfig::from_lookup(lookup(&[("BACKOFFICE_API_URL", "http://api.local/")]))
                .unwrap();
        assert_eq!(config.api_url, "http://api.local");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn bad_port_surfaces_as_invalid_input() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);
        assert_eq!(io.to_string(), "PORT has an invalid value: eighty");
    }

    #[test]
    fn page_size_is_clamped() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("BACKOFFICE_API_URL", "http://api.local"),
            ("BACKOFFICE_PAGE_SIZE", "500"),
        ]))
        .unwrap();
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value: eighty");
    }

    #[test]
    fn server_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }
}
