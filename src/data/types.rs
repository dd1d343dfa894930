use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;

use crate::data::weather::WeatherError;

/// Fixed point on the globe that the archive is queried for
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Highmark Stadium, Orchard Park NY
    pub const HIGHMARK_STADIUM: GeoPoint = GeoPoint {
        latitude: 42.773773,
        longitude: -78.787460,
    };

    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    /// Deserialized points skip `new`, so config loading calls this
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(WeatherError::InvalidLocation {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        Ok(())
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::HIGHMARK_STADIUM
    }
}

/// Inclusive calendar date range, start <= end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WeatherError> {
        if start > end {
            return Err(WeatherError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse ISO8601 (YYYY-MM-DD) start and end dates
    pub fn parse(start: &str, end: &str) -> Result<Self, WeatherError> {
        Self::new(parse_iso_date(start)?, parse_iso_date(end)?)
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn num_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

pub fn parse_iso_date(s: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| WeatherError::InvalidDate(s.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    pub min_temp_c: f64,
}

/// Daily minimum temperatures, ascending by date, never empty
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTemperatureSeries {
    entries: Vec<DailyTemperature>,
}

impl DailyTemperatureSeries {
    /// Callers must hand over a non-empty, strictly ascending list;
    /// the archive response parser checks both before building one.
    pub(crate) fn from_sorted(entries: Vec<DailyTemperature>) -> Self {
        debug_assert!(!entries.is_empty());
        debug_assert!(entries.windows(2).all(|w| w[0].date < w[1].date));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyTemperature> {
        self.entries.iter()
    }

    pub fn first(&self) -> &DailyTemperature {
        &self.entries[0]
    }

    pub fn last(&self) -> &DailyTemperature {
        &self.entries[self.entries.len() - 1]
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.entries
            .binary_search_by_key(&date, |e| e.date)
            .ok()
            .map(|i| self.entries[i].min_temp_c)
    }

    /// Coldest daily minimum in the series
    pub fn min(&self) -> &DailyTemperature {
        self.entries
            .iter()
            .min_by(|a, b| a.min_temp_c.total_cmp(&b.min_temp_c))
            .unwrap_or(&self.entries[0])
    }

    pub fn max(&self) -> &DailyTemperature {
        self.entries
            .iter()
            .max_by(|a, b| a.min_temp_c.total_cmp(&b.min_temp_c))
            .unwrap_or(&self.entries[0])
    }

    pub fn mean(&self) -> f64 {
        self.entries.iter().map(|e| e.min_temp_c).sum::<f64>() / self.entries.len() as f64
    }

    /// Dates in `range` the provider returned no reading for
    pub fn missing_dates(&self, range: &DateRange) -> Vec<NaiveDate> {
        range.dates().filter(|d| self.get(*d).is_none()).collect()
    }
}

impl<'a> IntoIterator for &'a DailyTemperatureSeries {
    type Item = &'a DailyTemperature;
    type IntoIter = std::slice::Iter<'a, DailyTemperature>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
