pub mod retry;
pub mod types;
pub mod weather;

pub use types::{DailyTemperature, DailyTemperatureSeries, DateRange, GeoPoint};
pub use weather::{WeatherError, WeatherHistoryClient};
