//! Weather records: simulated samples and real forecast input.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One simulated growing year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub heat_stress_days: u32,
    pub freeze_events: u32,
    /// Annual rainfall in inches, never below [`WeatherSample::MIN_RAINFALL`]
    pub annual_rainfall: f64,
}

impl WeatherSample {
    pub const MIN_RAINFALL: f64 = 10.0;
}

/// Daily high/low in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: Date,
    pub temperature: Temperature,
    /// Precipitation in inches
    #[serde(default)]
    pub precipitation: f64,
    #[serde(default)]
    pub growing_degree_days: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
}

/// Real-time forecast already fetched by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    /// Daily records in chronological order
    pub daily: Vec<DailyForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConditions>,
    pub timestamp: Timestamp,
}

impl WeatherForecast {
    /// The first `days` records of the forecast
    #[must_use]
    pub fn upcoming(&self, days: usize) -> &[DailyForecast] {
        &self.daily[..self.daily.len().min(days)]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }
}
