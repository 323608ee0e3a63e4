//! Tests for forecast-anchored runs
//!
//! These tests verify:
//! - Forecast metadata is echoed in the result
//! - Forecast signals shift the weather samples and the harvest mean
//! - Custom integrations plug into the pipeline

use jiff::civil::date;
use rand::RngCore;

use super::{balanced_config, fixed_timestamp};
use crate::config::SimulationConfig;
use crate::date_math::add_days;
use crate::model::{
    ClimateScenario, CurrentConditions, DailyForecast, LocationConfig, Temperature,
    WeatherForecast, WeatherSample,
};
use crate::simulation::{SimulationOptions, run_simulation, run_simulation_with_integration};
use crate::weather::WeatherIntegration;

fn options(seed: u64) -> SimulationOptions {
    SimulationOptions::seeded(seed).generated_at(fixed_timestamp())
}

fn heat_wave(days: i32) -> WeatherForecast {
    let start = date(2025, 6, 1);
    WeatherForecast {
        daily: (0..days)
            .map(|i| DailyForecast {
                date: add_days(start, i),
                temperature: Temperature {
                    high: 101.0,
                    low: 76.0,
                },
                precipitation: 0.1,
                growing_degree_days: 28.0,
            })
            .collect(),
        current: Some(CurrentConditions { temperature: 94.0 }),
        timestamp: "2025-06-01T06:00:00Z".parse().unwrap(),
    }
}

fn with_forecast(forecast: WeatherForecast) -> SimulationConfig {
    SimulationConfig {
        weather: Some(forecast),
        ..balanced_config(200)
    }
}

#[test]
fn test_forecast_is_echoed() {
    let forecast = heat_wave(14);
    let result = run_simulation(&with_forecast(forecast.clone()), options(3)).unwrap();

    assert_eq!(result.used_real_weather, Some(true));
    assert_eq!(result.weather_timestamp, Some(forecast.timestamp));
    assert!(result.diagnostics.forecast_anchored);

    let context = result.statistics.real_weather_context.unwrap();
    assert_eq!(context.current_temperature, Some(94.0));
    assert!((context.upcoming_week_gdd - 7.0 * 28.0).abs() < 1e-9);
    assert!((context.upcoming_week_precipitation - 0.7).abs() < 1e-9);
    assert_eq!(context.forecast_timestamp, forecast.timestamp);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["used_real_weather"], serde_json::Value::Bool(true));
}

#[test]
fn test_heat_wave_shifts_samples_and_harvest() {
    let baseline = run_simulation(&balanced_config(200), options(3)).unwrap();
    let anchored = run_simulation(&with_forecast(heat_wave(14)), options(3)).unwrap();

    // Full weight: λ = 0.5 × 15 + 0.5 × 120
    assert!(baseline.weather_risk.mean_heat_stress_days < 25.0);
    assert!(anchored.weather_risk.mean_heat_stress_days > 50.0);

    // 1 − 0.3 + 0.05 for adequate weekly rain
    let multiplier = anchored.parameters.weather_multiplier.unwrap();
    assert!((multiplier - 0.75).abs() < 1e-9);
    assert!(
        (anchored.parameters.harvest_value.mean - baseline.parameters.harvest_value.mean * 0.75)
            .abs()
            < 1e-6
    );
}

#[test]
fn test_empty_forecast_is_ignored() {
    let forecast = WeatherForecast {
        daily: Vec::new(),
        current: None,
        timestamp: fixed_timestamp(),
    };
    let result = run_simulation(&with_forecast(forecast), options(5)).unwrap();
    assert!(result.used_real_weather.is_none());
    assert!(result.weather_timestamp.is_none());
    assert!(result.statistics.real_weather_context.is_none());
    assert!(!result.diagnostics.forecast_anchored);
}

/// Integration that ignores randomness entirely
struct CalmYear;

impl WeatherIntegration for CalmYear {
    fn anchored_sample(
        &self,
        _rng: &mut dyn RngCore,
        _location: &LocationConfig,
        _scenario: &ClimateScenario,
        _forecast: &WeatherForecast,
    ) -> WeatherSample {
        WeatherSample {
            heat_stress_days: 0,
            freeze_events: 5,
            annual_rainfall: 32.0,
        }
    }

    fn harvest_adjustment(&self, _: &WeatherForecast, _: &ClimateScenario) -> f64 {
        1.1
    }
}

#[test]
fn test_custom_integration_drives_samples() {
    let result =
        run_simulation_with_integration(&with_forecast(heat_wave(3)), &CalmYear, options(8))
            .unwrap();

    assert!(result.iterations.iter().all(|i| i.weather.heat_stress_days == 0));
    assert!(result.probabilistic_calendar.critical.is_empty());
    assert_eq!(result.parameters.weather_multiplier, Some(1.1));
    assert_eq!(result.weather_risk.extreme_heat_probability, 0.0);

    // Identical weather everywhere means perfect agreement on dates
    assert!(
        result
            .probabilistic_calendar
            .planting
            .iter()
            .all(|p| p.consensus_strength == 1.0)
    );
}
