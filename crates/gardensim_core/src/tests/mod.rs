//! Integration tests for the gardensim engine
//!
//! Tests are organized by topic:
//! - `pipeline` - End-to-end run shape and invariants
//! - `determinism` - Seeded reproducibility
//! - `real_weather` - Forecast-anchored runs and the integration seam
//! - `scenarios` - Climate scenario and plan sensitivity

mod real_weather;

use jiff::Timestamp;

use crate::config::{SimulationBuilder, SimulationConfig};
use crate::model::CropCategory;

/// Balanced three-category plan used across the integration tests
pub(crate) fn balanced_config(iterations: usize) -> SimulationConfig {
    SimulationBuilder::new()
        .season_start(2025, 1, 1)
        .allocate(CropCategory::HeatTolerant, 40.0)
        .allocate(CropCategory::CoolSeason, 35.0)
        .allocate(CropCategory::Perennial, 25.0)
        .base_investment(400.0)
        .iterations(iterations)
        .build()
}

pub(crate) fn fixed_timestamp() -> Timestamp {
    "2025-01-01T12:00:00Z".parse().unwrap()
}
