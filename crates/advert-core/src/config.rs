//! Service configuration.
//!
//! Everything is read from `ADVERT_*` environment variables. Unset keys fall
//! back to defaults; set but malformed keys are rejected.

use std::time::Duration;

use thiserror::Error;

const ENV_TOPIC: &str = "ADVERT_TOPIC";
const ENV_STORE_TABLE: &str = "ADVERT_STORE_TABLE";
const ENV_STORE_ENDPOINT: &str = "ADVERT_STORE_ENDPOINT";
const ENV_STORE_PAGE_SIZE: &str = "ADVERT_STORE_PAGE_SIZE";
const ENV_CALL_TIMEOUT_MS: &str = "ADVERT_CALL_TIMEOUT_MS";
const ENV_HEALTH_TIMEOUT_MS: &str = "ADVERT_HEALTH_TIMEOUT_MS";
const ENV_HEALTH_INTERVAL_SECS: &str = "ADVERT_HEALTH_INTERVAL_SECS";
const ENV_PUBLISH_ON_CONFIRM: &str = "ADVERT_PUBLISH_ON_CONFIRM";

const DEFAULT_TOPIC: &str = "advert-confirmed";
const DEFAULT_STORE_TABLE: &str = "Adverts";
const DEFAULT_STORE_PAGE_SIZE: u64 = 100;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    NotPositiveInteger { key: &'static str, value: String },

    #[error("{key} must be a boolean (true/false/1/0/yes/no), got '{value}'")]
    NotBoolean { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Connection parameters for the advert table.
///
/// `table_name` and `endpoint` are for networked backends; the in-memory
/// store ignores both and only reads `page_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub table_name: String,
    /// Override for local emulators; `None` means the backend default.
    pub endpoint: Option<String>,
    /// Records fetched per `get_all` page.
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_STORE_TABLE.to_string(),
            endpoint: None,
            page_size: DEFAULT_STORE_PAGE_SIZE as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertConfig {
    /// Address of the notification channel confirmed events go to.
    pub topic: String,
    pub store: StoreConfig,
    /// Upper bound for every single store or publisher call.
    pub call_timeout: Duration,
    /// Upper bound for one health check.
    pub health_timeout: Duration,
    /// Period of the background health check started by `App::spawn_health`.
    pub health_interval: Duration,
    /// When false, confirm never emits a notification.
    pub publish_on_confirm: bool,
}

impl Default for AdvertConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            store: StoreConfig::default(),
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            health_timeout: Duration::from_millis(DEFAULT_HEALTH_TIMEOUT_MS),
            health_interval: Duration::from_secs(DEFAULT_HEALTH_INTERVAL_SECS),
            publish_on_confirm: true,
        }
    }
}

impl AdvertConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load with a custom key lookup (test-friendly).
    pub fn from_env_with<F>(get_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let topic = get_env(ENV_TOPIC).unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let publish_on_confirm = parse_bool_env(&get_env, ENV_PUBLISH_ON_CONFIRM, true)?;

        let table_name =
            get_env(ENV_STORE_TABLE).unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string());
        let endpoint = get_env(ENV_STORE_ENDPOINT).filter(|e| !e.trim().is_empty());
        let page_size =
            parse_positive_u64_env(&get_env, ENV_STORE_PAGE_SIZE, DEFAULT_STORE_PAGE_SIZE)?;

        let call_timeout_ms =
            parse_positive_u64_env(&get_env, ENV_CALL_TIMEOUT_MS, DEFAULT_CALL_TIMEOUT_MS)?;
        let health_timeout_ms =
            parse_positive_u64_env(&get_env, ENV_HEALTH_TIMEOUT_MS, DEFAULT_HEALTH_TIMEOUT_MS)?;
        let health_interval_secs = parse_positive_u64_env(
            &get_env,
            ENV_HEALTH_INTERVAL_SECS,
            DEFAULT_HEALTH_INTERVAL_SECS,
        )?;

        let config = Self {
            topic,
            store: StoreConfig {
                table_name,
                endpoint,
                page_size: usize::try_from(page_size).unwrap_or(usize::MAX),
            },
            call_timeout: Duration::from_millis(call_timeout_ms),
            health_timeout: Duration::from_millis(health_timeout_ms),
            health_interval: Duration::from_secs(health_interval_secs),
            publish_on_confirm,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field rules a hand-built config can break.
    ///
    /// Errors name the environment key that sets the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.publish_on_confirm && self.topic.trim().is_empty() {
            return Err(ConfigError::Empty(ENV_TOPIC));
        }
        if self.store.table_name.trim().is_empty() {
            return Err(ConfigError::Empty(ENV_STORE_TABLE));
        }
        if self.store.page_size == 0 {
            return Err(ConfigError::Zero(ENV_STORE_PAGE_SIZE));
        }
        let durations = [
            (ENV_CALL_TIMEOUT_MS, self.call_timeout),
            (ENV_HEALTH_TIMEOUT_MS, self.health_timeout),
            (ENV_HEALTH_INTERVAL_SECS, self.health_interval),
        ];
        for (key, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::Zero(key));
            }
        }
        Ok(())
    }
}

fn parse_positive_u64_env<F>(get_env: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = get_env(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::NotPositiveInteger { key, value: raw }),
    }
}

fn parse_bool_env<F>(get_env: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = get_env(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::NotBoolean { key, value: raw }),
    }
}
