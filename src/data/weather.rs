use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;
use crate::data::retry::RetryPolicy;
use crate::data::types::{
    parse_iso_date, DailyTemperature, DailyTemperatureSeries, DateRange, GeoPoint,
};

/// Daily aggregate requested from the archive
const DAILY_MIN_TEMPERATURE: &str = "temperature_2m_min";

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather archive retrieval failed after {attempts} attempt(s): {reason}")]
    Retrieval { attempts: u32, reason: String },

    #[error("No daily data returned from weather archive for {start} to {end}")]
    EmptyData { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Invalid archive URL '{0}'")]
    InvalidArchiveUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl WeatherError {
    pub fn is_retrieval(&self) -> bool {
        matches!(self, WeatherError::Retrieval { .. })
    }

    pub fn is_empty_data(&self) -> bool {
        matches!(self, WeatherError::EmptyData { .. })
    }

    fn empty(range: &DateRange) -> Self {
        WeatherError::EmptyData {
            start: range.start(),
            end: range.end(),
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        WeatherError::Retrieval {
            attempts: 1,
            reason: format!("malformed archive response: {}", reason.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    daily: Option<ArchiveDaily>,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
}

/// Open-Meteo error body, e.g. `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ArchiveErrorBody {
    reason: String,
}

/// Failure of a single request attempt
#[derive(Debug)]
enum AttemptError {
    Transport(reqwest::Error),
    Status {
        status: StatusCode,
        reason: Option<String>,
    },
    Decode(serde_json::Error),
}

impl AttemptError {
    /// Worth another attempt: network trouble, rate limiting or a server fault
    fn is_transient(&self) -> bool {
        match self {
            AttemptError::Transport(e) => !e.is_builder(),
            AttemptError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            AttemptError::Decode(_) => false,
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(e) if e.is_timeout() => write!(f, "request timed out: {}", e),
            AttemptError::Transport(e) => write!(f, "transport error: {}", e),
            AttemptError::Status {
                status,
                reason: Some(reason),
            } => write!(f, "HTTP {}: {}", status, reason),
            AttemptError::Status { status, reason: None } => write!(f, "HTTP {}", status),
            AttemptError::Decode(e) => write!(f, "invalid JSON: {}", e),
        }
    }
}

/// Historical daily minimum temperatures for one fixed location
pub struct WeatherHistoryClient {
    client: Client,
    archive_url: Url,
    location: GeoPoint,
    timezone: String,
    retry: RetryPolicy,
}

impl WeatherHistoryClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        config.location.validate()?;

        let archive_url = Url::parse(&config.archive_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| WeatherError::InvalidArchiveUrl(config.archive_url.clone()))?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("stadium-ev/", env!("CARGO_PKG_VERSION")));

        // Local mirrors bypass system proxies
        if matches!(
            archive_url.host_str(),
            Some("localhost" | "127.0.0.1" | "[::1]")
        ) {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            archive_url,
            location: config.location,
            timezone: config.timezone.clone(),
            retry: RetryPolicy::from(&config.retry),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Fetch daily minimum temperatures between the range bounds (inclusive).
    /// `timezone` falls back to the configured default and decides which
    /// 24-hour window the provider aggregates into each day.
    pub async fn fetch_daily_min_temperatures(
        &self,
        range: &DateRange,
        timezone: Option<&str>,
    ) -> Result<DailyTemperatureSeries, WeatherError> {
        let timezone = self.resolve_timezone(timezone)?;
        let params = self.query_params(range, &timezone);

        info!(
            "Fetching daily min temperatures at ({}, {}) for {} [{}]",
            self.location.latitude(),
            self.location.longitude(),
            range,
            timezone
        );

        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        let response = loop {
            attempt += 1;

            match self.fetch_once(&params).await {
                Ok(response) => break response,
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Weather archive attempt {}/{} failed: {} (retrying in {:?})",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(
                        "Weather archive attempt {}/{} failed: {}",
                        attempt, max_attempts, e
                    );
                    return Err(WeatherError::Retrieval {
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
            }
        };

        let series = parse_daily_response(response, range).map_err(|e| match e {
            WeatherError::Retrieval { reason, .. } => WeatherError::Retrieval {
                attempts: attempt,
                reason,
            },
            other => other,
        })?;

        let missing = series.missing_dates(range);
        if !missing.is_empty() {
            warn!(
                "Weather archive returned {} of {} days for {} (missing: {:?})",
                series.len(),
                range.num_days(),
                range,
                missing
            );
        }

        debug!("Received {} daily readings", series.len());
        Ok(series)
    }

    /// Same as [`Self::fetch_daily_min_temperatures`] with ISO8601 date strings
    pub async fn fetch_daily_min_temperatures_str(
        &self,
        start: &str,
        end: &str,
        timezone: Option<&str>,
    ) -> Result<DailyTemperatureSeries, WeatherError> {
        let range = DateRange::parse(start, end)?;
        self.fetch_daily_min_temperatures(&range, timezone).await
    }

    fn resolve_timezone(&self, timezone: Option<&str>) -> Result<String, WeatherError> {
        let tz = timezone.unwrap_or(&self.timezone).trim();
        if tz.is_empty() || tz.chars().any(char::is_whitespace) {
            return Err(WeatherError::InvalidTimezone(tz.to_string()));
        }
        Ok(tz.to_string())
    }

    fn query_params(&self, range: &DateRange, timezone: &str) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.location.latitude().to_string()),
            ("longitude", self.location.longitude().to_string()),
            ("start_date", range.start().format("%Y-%m-%d").to_string()),
            ("end_date", range.end().format("%Y-%m-%d").to_string()),
            ("daily", DAILY_MIN_TEMPERATURE.to_string()),
            ("timezone", timezone.to_string()),
        ]
    }

    async fn fetch_once(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<ArchiveResponse, AttemptError> {
        let response = self
            .client
            .get(self.archive_url.clone())
            .query(params)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AttemptError::Transport)?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ArchiveErrorBody>(&body)
                .ok()
                .map(|b| b.reason);
            return Err(AttemptError::Status { status, reason });
        }

        serde_json::from_str(&body).map_err(AttemptError::Decode)
    }
}

/// Zip the provider's parallel `time` / `temperature_2m_min` arrays into a series.
/// Null readings are gaps and get dropped; an all-null payload counts as empty.
fn parse_daily_response(
    response: ArchiveResponse,
    range: &DateRange,
) -> Result<DailyTemperatureSeries, WeatherError> {
    let daily = response.daily.ok_or_else(|| WeatherError::empty(range))?;

    if daily.time.is_empty() || daily.temperature_2m_min.is_empty() {
        return Err(WeatherError::empty(range));
    }

    if daily.time.len() != daily.temperature_2m_min.len() {
        return Err(WeatherError::malformed(format!(
            "{} dates but {} temperatures",
            daily.time.len(),
            daily.temperature_2m_min.len()
        )));
    }

    let mut entries = Vec::with_capacity(daily.time.len());
    let mut previous: Option<NaiveDate> = None;

    for (raw_date, temp) in daily.time.iter().zip(daily.temperature_2m_min) {
        let date = parse_iso_date(raw_date)
            .map_err(|_| WeatherError::malformed(format!("bad date '{}'", raw_date)))?;

        if previous.is_some_and(|p| p >= date) {
            return Err(WeatherError::malformed(format!(
                "dates out of order at {}",
                date
            )));
        }
        previous = Some(date);

        if !range.contains(date) {
            warn!("Weather archive returned {} outside requested {}", date, range);
        }

        match temp {
            Some(min_temp_c) => entries.push(DailyTemperature { date, min_temp_c }),
            None => warn!("No minimum temperature recorded for {}", date),
        }
    }

    if entries.is_empty() {
        return Err(WeatherError::empty(range));
    }

    Ok(DailyTemperatureSeries::from_sorted(entries))
}
