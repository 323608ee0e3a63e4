//! Run configuration
//!
//! [`SimulationConfig`] is the serializable description of one planting plan
//! plus the Monte Carlo knobs. It can be deserialized from YAML or JSON, or
//! assembled with [`SimulationBuilder`].

mod builder;

pub use builder::SimulationBuilder;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::{
    ClimateScenario, CropCatalog, CropCategory, LocationConfig, Portfolio, WeatherForecast,
};
use crate::statistics::DEFAULT_HISTOGRAM_BINS;

pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_BASE_INVESTMENT: f64 = 500.0;
pub const DEFAULT_PORTFOLIO_MULTIPLIER: f64 = 1.0;

/// Longest days-to-maturity a catalog entry may declare (ten years)
pub const MAX_DAYS_TO_MATURITY: u32 = 3650;
/// Season years whose calendars stay inside 0001-01-01..=9999-12-31 even for
/// the slowest crop under the heaviest stress
pub const MIN_SEASON_YEAR: i16 = 100;
pub const MAX_SEASON_YEAR: i16 = 9980;

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_base_investment() -> f64 {
    DEFAULT_BASE_INVESTMENT
}

fn default_portfolio_multiplier() -> f64 {
    DEFAULT_PORTFOLIO_MULTIPLIER
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

/// Everything needed for one engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Crop allocation. Required at run time.
    #[serde(default)]
    pub portfolio: Option<Portfolio>,
    #[serde(default = "default_base_investment")]
    pub base_investment: f64,
    #[serde(default = "default_portfolio_multiplier")]
    pub portfolio_multiplier: f64,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub scenario: ClimateScenario,
    /// Real forecast, already fetched by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherForecast>,
    /// First day of the growing season; anchors every calendar date
    #[serde(default)]
    pub season_start: Option<Date>,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Crop reference table; the built-in catalog when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crops: Option<CropCatalog>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            portfolio: None,
            base_investment: DEFAULT_BASE_INVESTMENT,
            portfolio_multiplier: DEFAULT_PORTFOLIO_MULTIPLIER,
            location: LocationConfig::default(),
            scenario: ClimateScenario::default(),
            weather: None,
            season_start: None,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            crops: None,
        }
    }
}

impl SimulationConfig {
    /// Check everything that would make a run meaningless.
    ///
    /// Location fields are not checked here; unusable values fall back to
    /// defaults during the run and are reported in the diagnostics.
    pub fn validate(&self) -> Result<()> {
        let portfolio = self
            .portfolio
            .as_ref()
            .ok_or(SimulationError::MissingPortfolio)?;
        portfolio.validate()?;

        if self.iterations == 0 {
            return Err(SimulationError::InvalidIterations(self.iterations));
        }
        let season_start = self
            .season_start
            .ok_or_else(|| SimulationError::Config("season_start is required".to_string()))?;
        if !(MIN_SEASON_YEAR..=MAX_SEASON_YEAR).contains(&season_start.year()) {
            return Err(SimulationError::Config(format!(
                "season_start year {} is outside {MIN_SEASON_YEAR}..={MAX_SEASON_YEAR}",
                season_start.year()
            )));
        }
        if self.histogram_bins == 0 {
            return Err(SimulationError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if let Some(catalog) = &self.crops {
            validate_catalog(catalog)?;
        }
        Ok(())
    }
}

fn validate_catalog(catalog: &CropCatalog) -> Result<()> {
    let too_slow = CropCategory::ALL
        .iter()
        .flat_map(|&category| catalog.crops(category))
        .find(|crop| crop.days_to_maturity > MAX_DAYS_TO_MATURITY);
    match too_slow {
        Some(crop) => Err(SimulationError::Config(format!(
            "crop {} has days_to_maturity {} (max {MAX_DAYS_TO_MATURITY})",
            crop.key, crop.days_to_maturity
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn valid() -> SimulationConfig {
        SimulationConfig {
            portfolio: Some(Portfolio::new().with(CropCategory::CoolSeason, 100.0)),
            season_start: Some(date(2025, 1, 1)),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let json = r#"{
            "portfolio": {"heat_tolerant": 60, "perennial": 40},
            "season_start": "2025-02-01"
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.histogram_bins, 25);
        assert_eq!(config.portfolio_multiplier, 1.0);
        assert_eq!(config.base_investment, 500.0);
        assert_eq!(config.location, LocationConfig::default());
        assert!(config.weather.is_none());
        assert_eq!(
            config.portfolio.unwrap().allocation(CropCategory::Perennial),
            40.0
        );
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_portfolio_is_rejected() {
        let config = SimulationConfig {
            portfolio: None,
            ..valid()
        };
        assert_eq!(config.validate(), Err(SimulationError::MissingPortfolio));
    }

    #[test]
    fn test_zero_iterations_is_rejected() {
        let config = SimulationConfig {
            iterations: 0,
            ..valid()
        };
        assert_eq!(config.validate(), Err(SimulationError::InvalidIterations(0)));
    }

    #[test]
    fn test_missing_season_start_is_rejected() {
        let config = SimulationConfig {
            season_start: None,
            ..valid()
        };
        assert!(matches!(config.validate(), Err(SimulationError::Config(_))));
    }

    #[test]
    fn test_negative_allocation_is_rejected() {
        let config = SimulationConfig {
            portfolio: Some(Portfolio::new().with(CropCategory::Perennial, -5.0)),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidAllocation { .. })
        ));
    }

    #[test]
    fn test_season_year_bounds() {
        let late = SimulationConfig {
            season_start: Some(date(9998, 6, 1)),
            ..valid()
        };
        assert!(matches!(late.validate(), Err(SimulationError::Config(_))));

        let early = SimulationConfig {
            season_start: Some(date(42, 3, 1)),
            ..valid()
        };
        assert!(matches!(early.validate(), Err(SimulationError::Config(_))));

        let last_allowed = SimulationConfig {
            season_start: Some(date(MAX_SEASON_YEAR, 12, 31)),
            ..valid()
        };
        assert!(last_allowed.validate().is_ok());
    }

    #[test]
    fn test_catalog_maturity_cap() {
        let builtin = CropCatalog::builtin();
        let with_lettuce_days = |days: u32| {
            let mut table = std::collections::BTreeMap::new();
            for category in CropCategory::ALL {
                table.insert(category, builtin.crops(category).to_vec());
            }
            table.get_mut(&CropCategory::CoolSeason).unwrap()[0].days_to_maturity = days;
            SimulationConfig {
                crops: Some(CropCatalog::new(table)),
                ..valid()
            }
        };

        let err = with_lettuce_days(u32::MAX).validate().unwrap_err();
        assert!(matches!(&err, SimulationError::Config(msg) if msg.contains("lettuce")));
        assert!(with_lettuce_days(MAX_DAYS_TO_MATURITY).validate().is_ok());
    }
}
