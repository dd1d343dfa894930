use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::betting::{AmericanOdds, Bet};
use crate::data::types::GeoPoint;

pub const OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub betting: BettingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub location: GeoPoint,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            archive_url: default_archive_url(),
            timezone: default_timezone(),
            timeout_secs: default_timeout_secs(),
            location: GeoPoint::default(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Example wager evaluated by the demo
#[derive(Debug, Clone, Deserialize)]
pub struct BettingConfig {
    #[serde(default = "default_example_odds")]
    pub example_odds: i32,
    #[serde(default = "default_model_probability")]
    pub model_probability: f64,
    #[serde(default = "default_stake")]
    pub stake: f64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            example_odds: default_example_odds(),
            model_probability: default_model_probability(),
            stake: default_stake(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

fn default_archive_url() -> String { OPEN_METEO_ARCHIVE_URL.to_string() }
fn default_timezone() -> String { DEFAULT_TIMEZONE.to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_attempts() -> u32 { 3 }
fn default_base_delay_ms() -> u64 { 500 }
fn default_max_delay_ms() -> u64 { 5000 }
fn default_example_odds() -> i32 { 150 }
fn default_model_probability() -> f64 { 0.45 }
fn default_stake() -> f64 { 1.0 }
fn default_csv_log_path() -> String { "ev_log.csv".to_string() }

/// Overrides read from the environment (and `.env`)
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub archive_url: Option<String>,
    pub timezone: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Missing file means built-in defaults; a broken one is still an error
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            tracing::warn!("Config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weather
            .location
            .validate()
            .context("Invalid [weather.location]")?;

        anyhow::ensure!(
            !self.weather.archive_url.trim().is_empty(),
            "weather.archive_url must not be empty"
        );
        anyhow::ensure!(
            !self.weather.timezone.trim().is_empty(),
            "weather.timezone must not be empty"
        );
        anyhow::ensure!(
            self.weather.timeout_secs > 0,
            "weather.timeout_secs must be positive"
        );
        anyhow::ensure!(
            self.weather.retry.max_attempts > 0,
            "weather.retry.max_attempts must be at least 1"
        );

        Bet::new(
            self.betting.model_probability,
            self.betting.example_odds,
            self.betting.stake,
        )
        .context("Invalid [betting] example")?;

        Ok(())
    }

    /// Fold environment overrides into the file config
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(url) = &env.archive_url {
            self.weather.archive_url = url.clone();
        }
        if let Some(tz) = &env.timezone {
            self.weather.timezone = tz.clone();
        }
    }
}

impl BettingConfig {
    pub fn odds(&self) -> Result<AmericanOdds> {
        Ok(AmericanOdds::new(self.example_odds)?)
    }
}

impl EnvConfig {
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        Self {
            archive_url: non_empty_var("WEATHER_ARCHIVE_URL"),
            timezone: non_empty_var("WEATHER_TIMEZONE"),
            start_date: non_empty_var("WEATHER_START_DATE"),
            end_date: non_empty_var("WEATHER_END_DATE"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
