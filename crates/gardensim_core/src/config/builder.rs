//! Simulation Builder
//!
//! Fluent construction of a [`SimulationConfig`].
//!
//! # Example
//!
//! ```ignore
//! use gardensim_core::config::SimulationBuilder;
//! use gardensim_core::model::{CropCategory, SummerScenario, WinterScenario};
//!
//! let config = SimulationBuilder::new()
//!     .season_start(2025, 2, 1)
//!     .allocate(CropCategory::HeatTolerant, 50.0)
//!     .allocate(CropCategory::CoolSeason, 30.0)
//!     .allocate(CropCategory::Perennial, 20.0)
//!     .base_investment(400.0)
//!     .garden_area(150.0)
//!     .summer(SummerScenario::Extreme)
//!     .winter(WinterScenario::Mild)
//!     .iterations(2_000)
//!     .seed(42)
//!     .build();
//! ```

use jiff::civil::Date;

use super::SimulationConfig;
use crate::model::{
    ClimateScenario, CropCatalog, CropCategory, LocationConfig, Portfolio, SummerScenario,
    WeatherForecast, WinterScenario,
};

/// Builder for [`SimulationConfig`]
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
}

impl SimulationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Plan
    // =========================================================================

    /// Replace the whole portfolio
    #[must_use]
    pub fn portfolio(mut self, portfolio: Portfolio) -> Self {
        self.config.portfolio = Some(portfolio);
        self
    }

    /// Set one category's allocation percentage
    #[must_use]
    pub fn allocate(mut self, category: CropCategory, percent: f64) -> Self {
        self.config
            .portfolio
            .get_or_insert_with(Portfolio::new)
            .set(category, percent);
        self
    }

    #[must_use]
    pub fn base_investment(mut self, amount: f64) -> Self {
        self.config.base_investment = amount;
        self
    }

    /// Risk multiplier of the portfolio preset
    #[must_use]
    pub fn portfolio_multiplier(mut self, multiplier: f64) -> Self {
        self.config.portfolio_multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn crops(mut self, catalog: CropCatalog) -> Self {
        self.config.crops = Some(catalog);
        self
    }

    // =========================================================================
    // Location & climate
    // =========================================================================

    #[must_use]
    pub fn location(mut self, location: LocationConfig) -> Self {
        self.config.location = location;
        self
    }

    /// Garden area in square feet
    #[must_use]
    pub fn garden_area(mut self, area: f64) -> Self {
        self.config.location.garden_area = area;
        self
    }

    #[must_use]
    pub fn heat_intensity(mut self, intensity: f64) -> Self {
        self.config.location.heat_intensity = intensity;
        self
    }

    #[must_use]
    pub fn winter_severity(mut self, severity: f64) -> Self {
        self.config.location.winter_severity = severity;
        self
    }

    /// Average annual rainfall in inches
    #[must_use]
    pub fn avg_rainfall(mut self, inches: f64) -> Self {
        self.config.location.avg_rainfall = inches;
        self
    }

    #[must_use]
    pub fn scenario(mut self, scenario: ClimateScenario) -> Self {
        self.config.scenario = scenario;
        self
    }

    #[must_use]
    pub fn summer(mut self, summer: SummerScenario) -> Self {
        self.config.scenario.summer = summer;
        self
    }

    #[must_use]
    pub fn winter(mut self, winter: WinterScenario) -> Self {
        self.config.scenario.winter = winter;
        self
    }

    /// Attach an already-fetched forecast
    #[must_use]
    pub fn forecast(mut self, forecast: WeatherForecast) -> Self {
        self.config.weather = Some(forecast);
        self
    }

    // =========================================================================
    // Run
    // =========================================================================

    #[must_use]
    pub fn season_start_date(mut self, date: Date) -> Self {
        self.config.season_start = Some(date);
        self
    }

    /// Set the season start from year, month, day
    #[must_use]
    pub fn season_start(self, year: i16, month: i8, day: i8) -> Self {
        self.season_start_date(jiff::civil::date(year, month, day))
    }

    #[must_use]
    pub fn iterations(mut self, n: usize) -> Self {
        self.config.iterations = n;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.config.histogram_bins = bins;
        self
    }

    #[must_use]
    pub fn build(self) -> SimulationConfig {
        self.config
    }
}
