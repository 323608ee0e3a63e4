//! Scenario files
//!
//! A scenario file is a YAML [`SimulationConfig`]. Anything the file leaves
//! out takes the engine defaults, except the season start, which defaults to
//! January 1 of the current year.

use std::path::Path;

use color_eyre::eyre::WrapErr;
use gardensim_core::SimulationConfig;
use jiff::civil::{Date, date};

/// Commented example printed by `gardensim template`
pub const TEMPLATE: &str = r#"# gardensim scenario
#
# Allocation percentages per crop category (need not sum to 100)
portfolio:
  heat_tolerant: 40
  cool_season: 35
  perennial: 25

# Planned spend and the risk multiplier of the portfolio preset
base_investment: 450
portfolio_multiplier: 1.0

location:
  garden_area: 120        # square feet
  heat_intensity: 4       # 1 (cool) to 5 (very hot)
  winter_severity: 2      # 1 (mild) to 5 (harsh)
  avg_rainfall: 32        # inches per year

scenario:
  summer: extreme         # mild | normal | extreme | catastrophic
  winter: mild            # traditional | mild | warm | none

season_start: "2025-02-01"
iterations: 1000
histogram_bins: 25
# seed: 42
"#;

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    pub histogram_bins: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(bins) = self.histogram_bins {
            config.histogram_bins = bins;
        }
    }
}

/// Parse a scenario from YAML text
pub fn parse_scenario(yaml: &str, today: Date) -> color_eyre::Result<SimulationConfig> {
    let mut config: SimulationConfig =
        serde_saphyr::from_str(yaml).wrap_err("Failed to parse scenario YAML")?;
    if config.season_start.is_none() {
        let start = date(today.year(), 1, 1);
        tracing::debug!(%start, "No season_start given, using January 1");
        config.season_start = Some(start);
    }
    Ok(config)
}

/// Read and parse a scenario file
pub fn load_scenario(path: &Path, today: Date) -> color_eyre::Result<SimulationConfig> {
    let yaml = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read scenario file {}", path.display()))?;
    let config = parse_scenario(&yaml, today)
        .wrap_err_with(|| format!("Invalid scenario file {}", path.display()))?;
    tracing::info!(path = %path.display(), iterations = config.iterations, "Loaded scenario");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardensim_core::model::{CropCategory, SummerScenario, WinterScenario};
    use std::fs;
    use tempfile::tempdir;

    fn today() -> Date {
        date(2026, 5, 20)
    }

    #[test]
    fn test_template_parses() {
        let config = parse_scenario(TEMPLATE, today()).unwrap();
        let portfolio = config.portfolio.as_ref().unwrap();
        assert_eq!(portfolio.allocation(CropCategory::HeatTolerant), 40.0);
        assert_eq!(portfolio.allocation(CropCategory::Perennial), 25.0);
        assert_eq!(config.base_investment, 450.0);
        assert_eq!(config.location.garden_area, 120.0);
        assert_eq!(config.scenario.summer, SummerScenario::Extreme);
        assert_eq!(config.scenario.winter, WinterScenario::Mild);
        assert_eq!(config.season_start, Some(date(2025, 2, 1)));
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_scenario_uses_defaults() {
        let config = parse_scenario("portfolio:\n  cool_season: 100\n", today()).unwrap();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.histogram_bins, 25);
        assert_eq!(config.season_start, Some(date(2026, 1, 1)));
        assert_eq!(config.scenario.summer, SummerScenario::Normal);
    }

    #[test]
    fn test_load_from_file_and_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        fs::write(&path, TEMPLATE).unwrap();

        let mut config = load_scenario(&path, today()).unwrap();
        Overrides {
            iterations: Some(50),
            seed: Some(7),
            histogram_bins: None,
        }
        .apply(&mut config);
        assert_eq!(config.iterations, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.histogram_bins, 25);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_scenario(&dir.path().join("nope.yaml"), today()).unwrap_err();
        assert!(format!("{err:?}").contains("nope.yaml"));
    }

    #[test]
    fn test_unknown_scenario_label_is_an_error() {
        let yaml = "portfolio:\n  cool_season: 100\nscenario:\n  summer: apocalyptic\n";
        assert!(parse_scenario(yaml, today()).is_err());
    }
}
