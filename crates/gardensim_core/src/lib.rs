//! Garden harvest forecasting library
//!
//! This crate provides a Monte Carlo engine that turns an uncertain planting
//! plan into a probability-weighted forecast. It supports:
//! - Poisson/Normal weather sampling per climate scenario, optionally anchored
//!   to a real forecast through [`weather::WeatherIntegration`]
//! - Harvest and investment distributions derived from a crop portfolio
//! - Required-investment and investment-sufficiency analysis
//! - Per-iteration planting/harvest calendars and a consensus calendar
//! - Net return, ROI and success-rate statistics with histograms
//!
//! # Builder DSL
//!
//! ```ignore
//! use gardensim_core::config::SimulationBuilder;
//! use gardensim_core::model::{CropCategory, SummerScenario};
//! use gardensim_core::simulation::{SimulationOptions, run_simulation};
//!
//! let config = SimulationBuilder::new()
//!     .season_start(2025, 2, 1)
//!     .allocate(CropCategory::HeatTolerant, 60.0)
//!     .allocate(CropCategory::Perennial, 40.0)
//!     .base_investment(450.0)
//!     .summer(SummerScenario::Extreme)
//!     .iterations(1_000)
//!     .build();
//!
//! let result = run_simulation(&config, SimulationOptions::seeded(42))?;
//! println!("success rate: {:.1}%", result.statistics.success_rate);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod calendar;
pub mod consensus;
pub mod date_math;
pub mod error;
pub mod investment;
pub mod metrics;
pub mod parameters;
pub mod simulation;
pub mod statistics;
pub mod weather;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{SimulationBuilder, SimulationConfig};
pub use error::{Result, SimulationError};
pub use metrics::SimulationDiagnostics;
pub use simulation::{
    MonteCarloProgress, SimulationOptions, run_simulation, run_simulation_with_integration,
};
pub use weather::{ForecastAnchoring, WeatherIntegration};
