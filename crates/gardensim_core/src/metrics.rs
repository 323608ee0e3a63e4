//! Degraded-path accounting for a simulation run
//!
//! Every substitution the engine makes instead of failing (a non-finite draw
//! replaced by its mean, a location field falling back to its default, an
//! iteration filtered out of the statistics) is counted here so a
//! mis-calibrated run is distinguishable from a healthy one.

use serde::{Deserialize, Serialize};

/// Counters for substitutions made during one iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawFallbacks {
    pub harvest: bool,
    pub investment: bool,
    pub roi: bool,
    pub category: u32,
}

/// Fallbacks and substitutions collected across a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationDiagnostics {
    /// Harvest draws replaced by the distribution mean
    pub non_finite_harvest_draws: u64,
    /// Investment draws replaced by the distribution mean
    pub non_finite_investment_draws: u64,
    /// ROI values forced to 0
    pub roi_substitutions: u64,
    /// Category yield draws replaced by the category mean
    pub non_finite_category_draws: u64,
    /// Iterations excluded from statistics
    pub filtered_iterations: u64,
    /// Location fields that fell back to defaults
    pub location_fallbacks: Vec<String>,
    /// Distribution parameters replaced by safe defaults
    pub parameter_fallbacks: Vec<String>,
    /// Weather samples were anchored to a real forecast
    pub forecast_anchored: bool,
}

impl SimulationDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one iteration's substitutions into the run totals
    pub fn record_draw(&mut self, fallbacks: DrawFallbacks) {
        self.non_finite_harvest_draws += u64::from(fallbacks.harvest);
        self.non_finite_investment_draws += u64::from(fallbacks.investment);
        self.roi_substitutions += u64::from(fallbacks.roi);
        self.non_finite_category_draws += u64::from(fallbacks.category);
    }

    pub fn record_location_fallback(&mut self, field: &str) {
        self.location_fallbacks.push(field.to_string());
    }

    pub fn record_parameter_fallback(&mut self, parameter: &str) {
        self.parameter_fallbacks.push(parameter.to_string());
    }

    pub fn record_filtered(&mut self, count: usize) {
        self.filtered_iterations += count as u64;
    }

    /// Whether any fallback path was taken
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.non_finite_harvest_draws > 0
            || self.non_finite_investment_draws > 0
            || self.roi_substitutions > 0
            || self.non_finite_category_draws > 0
            || self.filtered_iterations > 0
            || !self.location_fallbacks.is_empty()
            || !self.parameter_fallbacks.is_empty()
    }
}
