//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use signup::CountryCode;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Record store configuration. Optional so `--dry-run` works without it.
    #[serde(default)]
    pub airtable: Option<AirtableConfig>,

    /// Registration settings
    #[serde(default)]
    pub signup: SignupConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirtableConfig {
    /// Personal access token
    pub api_key: SecretString,

    /// Base identifier (e.g., "appXXXXXXXXXXXXXX")
    pub base_id: String,

    /// Users table name or id
    #[serde(default = "default_table")]
    pub table: String,

    /// API base URL
    #[serde(default = "default_airtable_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupConfig {
    /// Dialing code applied to mobiles typed without "+" (e.g., "1", "44").
    /// Unset means every mobile must be entered in international form.
    #[serde(default)]
    pub default_country_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_table() -> String {
    "Users".into()
}

fn default_airtable_url() -> String {
    "https://api.airtable.com/v0".into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nested keys use `__`, e.g. `AIRTABLE__API_KEY`, `AIRTABLE__BASE_ID`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Keep strings as strings so a "+" prefix is never parsed away.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Record store section, required outside of dry runs.
    pub fn airtable(&self) -> Result<&AirtableConfig> {
        self.airtable
            .as_ref()
            .context("AIRTABLE__API_KEY and AIRTABLE__BASE_ID must be set")
    }

    /// Parsed `SIGNUP__DEFAULT_COUNTRY_CODE`, if set.
    pub fn default_country(&self) -> Result<Option<CountryCode>> {
        self.signup
            .default_country_code
            .as_deref()
            .map(|code| {
                CountryCode::parse(code).context("Invalid SIGNUP__DEFAULT_COUNTRY_CODE")
            })
            .transpose()
    }
}
