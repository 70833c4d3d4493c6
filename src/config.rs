//! Configuration Module
//!
//! Loads bot configuration from environment variables (a `.env` file is
//! honoured by the binary). Every value has a default; the log channel id is
//! deliberately not part of this struct because it is read at dispatch time.

use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
use crate::error::{AppError, AppResult};
use crate::skins::MojangEndpoints;
use crate::utils::redact::redact_url;
use crate::utils::url_validation::validate_webhook_url;

#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook receiving error and security alerts
    pub webhook_url: Option<String>,
    /// Verbose console output and cause chains in rendered errors
    pub debug: bool,
    /// Bot token for posting to the log channel
    pub bot_token: Option<String>,
    pub cache_max_entries: usize,
    pub cache_ttl: Duration,
    pub endpoints: MojangEndpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: None,
            debug: false,
            bot_token: None,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            endpoints: MojangEndpoints::default(),
        }
    }
}

impl Config {
    /// Load from the process environment
    ///
    /// # Environment Variables
    /// - `LOG_WEBHOOK_URL` - Discord webhook for alerts (optional)
    /// - `DEBUG_MODE` - `true`/`1`/`yes` enables debug output (default: false)
    /// - `DISCORD_TOKEN` - Bot token for the log channel sink (optional)
    /// - `CACHE_MAX_ENTRIES` - Profile cache capacity (default: 500)
    /// - `CACHE_TTL_SECS` - Sliding TTL in seconds (default: 300)
    /// - `MOJANG_API_URL`, `MOJANG_SESSION_URL`, `OPTIFINE_URL` - Upstream overrides
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let webhook_url = match get("LOG_WEBHOOK_URL") {
            Some(url) => {
                validate_webhook_url(&url).map_err(|e| {
                    AppError::Config(format!("LOG_WEBHOOK_URL ({}): {}", redact_url(&url), e))
                })?;
                Some(url)
            }
            None => None,
        };

        let mut endpoints = defaults.endpoints;
        if let Some(url) = get("MOJANG_API_URL") {
            endpoints.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("MOJANG_SESSION_URL") {
            endpoints.session_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("OPTIFINE_URL") {
            endpoints.optifine_url = url.trim_end_matches('/').to_string();
        }

        Ok(Self {
            webhook_url,
            debug: get("DEBUG_MODE").map(|v| parse_flag(&v)).unwrap_or(false),
            bot_token: get("DISCORD_TOKEN"),
            cache_max_entries: parse_or("CACHE_MAX_ENTRIES", get("CACHE_MAX_ENTRIES"), defaults.cache_max_entries)?,
            cache_ttl: Duration::from_secs(parse_or(
                "CACHE_TTL_SECS",
                get("CACHE_TTL_SECS"),
                defaults.cache_ttl.as_secs(),
            )?),
            endpoints,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> AppResult<T> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", name, v))),
        None => Ok(default),
    }
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

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_max_entries, 500);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.webhook_url.is_none());
        assert!(!config.debug);
        assert_eq!(config.endpoints.primary_timeout, Duration::from_secs(10));
        assert_eq!(config.endpoints.probe_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_from_empty_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cache_max_entries, 500);
        assert!(config.bot_token.is_none());
    }

    #[test]
    fn test_config_from_values() {
        let config = Config::from_lookup(lookup(&[
            ("LOG_WEBHOOK_URL", "https://discord.com/api/webhooks/1/abc"),
            ("DEBUG_MODE", "TRUE"),
            ("DISCORD_TOKEN", "token"),
            ("CACHE_MAX_ENTRIES", "50"),
            ("CACHE_TTL_SECS", "60"),
            ("MOJANG_API_URL", "http://127.0.0.1:8080/"),
        ]))
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.bot_token.as_deref(), Some("token"));
        assert_eq!(config.cache_max_entries, 50);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.endpoints.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.endpoints.session_url, crate::skins::mojang::SESSION_SERVER_URL);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("LOG_WEBHOOK_URL", "  "), ("DISCORD_TOKEN", "")])).unwrap();
        assert!(config.webhook_url.is_none());
        assert!(config.bot_token.is_none());
    }

    #[test]
    fn test_invalid_webhook_is_rejected_without_leaking_token() {
        let err = Config::from_lookup(lookup(&[(
            "LOG_WEBHOOK_URL",
            "http://discord.com/api/webhooks/1/supersecret",
        )]))
        .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, AppError::Config(_)));
        assert!(!message.contains("supersecret"));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[("CACHE_MAX_ENTRIES", "lots")])).unwrap_err();
        assert!(err.to_string().contains("CACHE_MAX_ENTRIES"));
    }
}
