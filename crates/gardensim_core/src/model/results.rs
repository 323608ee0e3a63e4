//! Simulation results
//!
//! Contains the generated distribution parameters, the per-iteration records
//! and the aggregate views built from them.

use std::collections::BTreeMap;

use jiff::Timestamp;
use rand::{Rng, distr::Distribution};
use serde::{Deserialize, Serialize};

use super::calendar::{Calendar, ProbabilisticCalendar};
use super::investment::{InvestmentSufficiency, RequiredInvestment};
use super::portfolio::CropCategory;
use super::weather::WeatherSample;
use crate::error::SimulationError;
use crate::metrics::SimulationDiagnostics;

/// Mean and standard deviation of a Normal distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalParams {
    /// Std dev as a fixed share of the mean
    #[must_use]
    pub fn proportional(mean: f64, ratio: f64) -> Self {
        Self {
            mean,
            std_dev: mean.abs() * ratio,
        }
    }

    /// Draw one value.
    ///
    /// A zero std dev returns the mean without consuming randomness.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        name: &'static str,
    ) -> Result<f64, SimulationError> {
        if self.std_dev == 0.0 && self.mean.is_finite() {
            return Ok(self.mean);
        }
        if !self.mean.is_finite() {
            return Err(SimulationError::InvalidDistributionParameters {
                distribution: name,
                mean: self.mean,
                std_dev: self.std_dev,
                reason: "mean must be finite",
            });
        }
        rand_distr::Normal::new(self.mean, self.std_dev)
            .map(|dist| dist.sample(rng))
            .map_err(|_| SimulationError::InvalidDistributionParameters {
                distribution: name,
                mean: self.mean,
                std_dev: self.std_dev,
                reason: "std_dev must be finite and non-negative",
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryParameters {
    pub allocation: f64,
    pub base_yield: f64,
    pub value: NormalParams,
}

/// Distribution parameters derived once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub harvest_value: NormalParams,
    pub investment: NormalParams,
    pub categories: BTreeMap<CropCategory, CategoryParameters>,
    pub required_investment: RequiredInvestment,
    /// Sufficiency of the mean investment
    pub sufficiency: InvestmentSufficiency,
    /// Harvest multiplier from real forecast data, when it was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_multiplier: Option<f64>,
}

/// One Monte Carlo draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationIteration {
    pub harvest_value: f64,
    pub investment: f64,
    pub net_return: f64,
    pub roi: f64,
    pub category_yields: BTreeMap<CropCategory, f64>,
    pub weather: WeatherSample,
    pub calendar: Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Forecast snapshot attached to statistics when real weather was used
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealWeatherContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<f64>,
    pub upcoming_week_gdd: f64,
    pub upcoming_week_precipitation: f64,
    pub forecast_timestamp: Timestamp,
}

/// Aggregate of all valid iterations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub percentiles: Percentiles,
    pub roi: SummaryStats,
    pub harvest_value: SummaryStats,
    pub investment: SummaryStats,
    /// Percent of valid iterations with a positive net return
    pub success_rate: f64,
    pub valid_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_weather_context: Option<RealWeatherContext>,
}

impl Statistics {
    /// The all-zero record returned when no iteration is usable
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Moderate,
    High,
    VeryHigh,
}

/// Financial risk classification of the plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Std dev of net return over the absolute mean; 0 when the mean is 0
    pub coefficient_of_variation: f64,
    /// 10th percentile net return
    pub downside: f64,
}

/// Weather outlook across all simulated years
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherRiskSummary {
    pub mean_heat_stress_days: f64,
    pub mean_freeze_events: f64,
    pub mean_rainfall: f64,
    pub extreme_heat_probability: f64,
    pub hard_freeze_probability: f64,
    pub drought_probability: f64,
    pub level: RiskLevel,
}

/// Everything produced by one engine call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub statistics: Statistics,
    pub iterations: Vec<SimulationIteration>,
    pub net_return_histogram: Vec<HistogramBin>,
    pub roi_histogram: Vec<HistogramBin>,
    pub probabilistic_calendar: ProbabilisticCalendar,
    pub weather_risk: WeatherRiskSummary,
    pub risk: RiskAssessment,
    pub required_investment: RequiredInvestment,
    pub sufficiency: InvestmentSufficiency,
    pub parameters: SimulationParameters,
    pub diagnostics: SimulationDiagnostics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_real_weather: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_timestamp: Option<Timestamp>,
}
