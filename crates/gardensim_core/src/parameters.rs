//! Distribution parameters derived once per run from the plan.

use std::collections::BTreeMap;

use crate::investment::{analyze_sufficiency, calculate_required_investment};
use crate::metrics::SimulationDiagnostics;
use crate::model::{
    CategoryParameters, ClimateScenario, CropCatalog, LocationConfig, NormalParams, Portfolio,
    SimulationParameters, WeatherForecast,
};
use crate::weather::WeatherIntegration;

/// Harvest value std dev as a share of the mean
pub const HARVEST_STD_RATIO: f64 = 0.30;
/// Investment std dev as a share of the mean
pub const INVESTMENT_STD_RATIO: f64 = 0.10;

/// Substituted when the harvest mean cannot be computed
pub const DEFAULT_HARVEST_MEAN: f64 = 1000.0;
/// Substituted when the investment mean cannot be computed
pub const DEFAULT_INVESTMENT_MEAN: f64 = 500.0;

/// The plan as seen by the parameter generator
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub portfolio: &'a Portfolio,
    pub base_investment: f64,
    /// Risk multiplier of the chosen portfolio preset
    pub portfolio_multiplier: f64,
    pub location: &'a LocationConfig,
    pub scenario: ClimateScenario,
    pub forecast: Option<&'a WeatherForecast>,
    pub catalog: &'a CropCatalog,
}

/// Derive harvest, investment and per-category distributions.
///
/// Also computes the required investment and the sufficiency of the mean
/// investment. Any non-finite intermediate is replaced by a safe default and
/// recorded in `diagnostics`.
pub fn generate_parameters(
    plan: &PlanInputs<'_>,
    integration: &dyn WeatherIntegration,
    diagnostics: &mut SimulationDiagnostics,
) -> SimulationParameters {
    let severity = plan.scenario.severity_factor();
    let size = plan.location.size_multiplier();

    let mut categories = BTreeMap::new();
    for (category, allocation) in plan.portfolio.iter() {
        let base_yield = allocation * plan.catalog.yield_multiplier(category) * size;
        let mut mean = base_yield * plan.catalog.market_price(category) * severity;
        if !mean.is_finite() || mean < 0.0 {
            tracing::warn!(%category, mean, "Non-finite category value, using 0");
            diagnostics.record_parameter_fallback(category.key());
            mean = 0.0;
        }
        categories.insert(
            category,
            CategoryParameters {
                allocation,
                base_yield,
                value: NormalParams::proportional(mean, HARVEST_STD_RATIO),
            },
        );
    }

    let mut harvest_mean: f64 = categories.values().map(|c| c.value.mean).sum();
    if !harvest_mean.is_finite() || harvest_mean < 0.0 {
        tracing::warn!(harvest_mean, "Non-finite harvest mean, using default");
        diagnostics.record_parameter_fallback("harvest_value");
        harvest_mean = DEFAULT_HARVEST_MEAN;
    }

    let mut investment_mean = plan.base_investment * plan.portfolio_multiplier;
    if !investment_mean.is_finite() || investment_mean < 0.0 {
        tracing::warn!(investment_mean, "Non-finite investment mean, using default");
        diagnostics.record_parameter_fallback("investment");
        investment_mean = DEFAULT_INVESTMENT_MEAN;
    }

    let mut weather_multiplier = None;
    if let Some(forecast) = plan.forecast.filter(|f| !f.is_empty()) {
        let multiplier = integration.harvest_adjustment(forecast, &plan.scenario);
        if multiplier.is_finite() && multiplier > 0.0 {
            tracing::info!(
                multiplier,
                forecast_days = forecast.daily.len(),
                "Applied real weather adjustment to harvest mean"
            );
            harvest_mean *= multiplier;
            for params in categories.values_mut() {
                params.value = NormalParams::proportional(
                    params.value.mean * multiplier,
                    HARVEST_STD_RATIO,
                );
            }
            weather_multiplier = Some(multiplier);
        } else {
            tracing::warn!(multiplier, "Ignoring unusable weather adjustment");
            diagnostics.record_parameter_fallback("weather_multiplier");
        }
    }

    let required_investment =
        calculate_required_investment(plan.portfolio, &plan.scenario, size, plan.location);
    let sufficiency = analyze_sufficiency(investment_mean, &required_investment);

    tracing::debug!(
        harvest_mean,
        investment_mean,
        required = required_investment.total,
        ratio = sufficiency.ratio,
        "Generated simulation parameters"
    );

    SimulationParameters {
        harvest_value: NormalParams::proportional(harvest_mean, HARVEST_STD_RATIO),
        investment: NormalParams::proportional(investment_mean, INVESTMENT_STD_RATIO),
        categories,
        required_investment,
        sufficiency,
        weather_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CropCategory, DailyForecast, SufficiencyLevel, SummerScenario, Temperature,
        WinterScenario,
    };
    use crate::weather::ForecastAnchoring;

    struct FixedAdjustment(f64);

    impl WeatherIntegration for FixedAdjustment {
        fn anchored_sample(
            &self,
            rng: &mut dyn rand::RngCore,
            location: &LocationConfig,
            scenario: &ClimateScenario,
            _forecast: &WeatherForecast,
        ) -> crate::model::WeatherSample {
            crate::weather::sample_weather(rng, location, scenario)
        }

        fn harvest_adjustment(&self, _: &WeatherForecast, _: &ClimateScenario) -> f64 {
            self.0
        }
    }

    fn one_day_forecast() -> WeatherForecast {
        WeatherForecast {
            daily: vec![DailyForecast {
                date: jiff::civil::date(2025, 4, 1),
                temperature: Temperature {
                    high: 80.0,
                    low: 60.0,
                },
                precipitation: 0.1,
                growing_degree_days: 15.0,
            }],
            current: None,
            timestamp: "2025-04-01T00:00:00Z".parse().unwrap(),
        }
    }

    fn plan<'a>(
        portfolio: &'a Portfolio,
        location: &'a LocationConfig,
        catalog: &'a CropCatalog,
        forecast: Option<&'a WeatherForecast>,
    ) -> PlanInputs<'a> {
        PlanInputs {
            portfolio,
            base_investment: 400.0,
            portfolio_multiplier: 1.5,
            location,
            scenario: ClimateScenario::new(SummerScenario::Normal, WinterScenario::Mild),
            forecast,
            catalog,
        }
    }

    #[test]
    fn test_harvest_mean_sums_category_values() {
        let portfolio = Portfolio::new()
            .with(CropCategory::HeatTolerant, 50.0)
            .with(CropCategory::CoolSeason, 50.0);
        let location = LocationConfig {
            garden_area: 200.0,
            ..Default::default()
        };
        let catalog = CropCatalog::builtin();
        let mut diagnostics = SimulationDiagnostics::new();

        let params = generate_parameters(
            &plan(&portfolio, &location, &catalog, None),
            &ForecastAnchoring,
            &mut diagnostics,
        );

        let expected: f64 = [CropCategory::HeatTolerant, CropCategory::CoolSeason]
            .iter()
            .map(|&c| 50.0 * catalog.yield_multiplier(c) * 2.0 * catalog.market_price(c))
            .sum();
        assert!((params.harvest_value.mean - expected).abs() < 1e-9);
        assert!((params.harvest_value.std_dev - expected * 0.3).abs() < 1e-9);
        assert_eq!(params.investment.mean, 600.0);
        assert!((params.investment.std_dev - 60.0).abs() < 1e-9);
        assert!(params.weather_multiplier.is_none());
        assert!(!diagnostics.is_degraded());
    }

    #[test]
    fn test_zero_allocation_contributes_nothing() {
        let portfolio = Portfolio::new()
            .with(CropCategory::HeatTolerant, 0.0)
            .with(CropCategory::Perennial, 100.0);
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let params = generate_parameters(
            &plan(&portfolio, &location, &catalog, None),
            &ForecastAnchoring,
            &mut SimulationDiagnostics::new(),
        );
        assert_eq!(params.categories[&CropCategory::HeatTolerant].value.mean, 0.0);
        let perennial = params.categories[&CropCategory::Perennial].value.mean;
        assert!((params.harvest_value.mean - perennial).abs() < 1e-9);
    }

    #[test]
    fn test_severe_summer_lowers_harvest_mean() {
        let portfolio = Portfolio::new().with(CropCategory::HeatTolerant, 100.0);
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let mut normal = plan(&portfolio, &location, &catalog, None);
        let normal_params =
            generate_parameters(&normal, &ForecastAnchoring, &mut SimulationDiagnostics::new());
        normal.scenario.summer = SummerScenario::Catastrophic;
        let severe_params =
            generate_parameters(&normal, &ForecastAnchoring, &mut SimulationDiagnostics::new());
        assert!(
            (severe_params.harvest_value.mean - normal_params.harvest_value.mean * 0.5).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_weather_adjustment_scales_harvest() {
        let portfolio = Portfolio::new().with(CropCategory::CoolSeason, 100.0);
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let forecast = one_day_forecast();

        let base = generate_parameters(
            &plan(&portfolio, &location, &catalog, None),
            &FixedAdjustment(0.8),
            &mut SimulationDiagnostics::new(),
        );
        let adjusted = generate_parameters(
            &plan(&portfolio, &location, &catalog, Some(&forecast)),
            &FixedAdjustment(0.8),
            &mut SimulationDiagnostics::new(),
        );
        assert_eq!(adjusted.weather_multiplier, Some(0.8));
        assert!((adjusted.harvest_value.mean - base.harvest_value.mean * 0.8).abs() < 1e-9);
        assert_eq!(adjusted.investment, base.investment);
    }

    #[test]
    fn test_unusable_adjustment_is_recorded() {
        let portfolio = Portfolio::new().with(CropCategory::CoolSeason, 100.0);
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let forecast = one_day_forecast();
        let mut diagnostics = SimulationDiagnostics::new();

        let params = generate_parameters(
            &plan(&portfolio, &location, &catalog, Some(&forecast)),
            &FixedAdjustment(f64::NAN),
            &mut diagnostics,
        );
        assert!(params.weather_multiplier.is_none());
        assert!(params.harvest_value.mean.is_finite());
        assert_eq!(diagnostics.parameter_fallbacks, vec!["weather_multiplier"]);
    }

    #[test]
    fn test_non_finite_investment_falls_back() {
        let portfolio = Portfolio::new().with(CropCategory::CoolSeason, 100.0);
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let mut inputs = plan(&portfolio, &location, &catalog, None);
        inputs.base_investment = f64::INFINITY;
        let mut diagnostics = SimulationDiagnostics::new();

        let params = generate_parameters(&inputs, &ForecastAnchoring, &mut diagnostics);
        assert_eq!(params.investment.mean, DEFAULT_INVESTMENT_MEAN);
        assert_eq!(diagnostics.parameter_fallbacks, vec!["investment"]);
    }

    #[test]
    fn test_sufficiency_snapshot_uses_mean_investment() {
        let portfolio = Portfolio::new().with(CropCategory::CoolSeason, 100.0);
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let mut inputs = plan(&portfolio, &location, &catalog, None);
        inputs.base_investment = 10_000.0;
        inputs.portfolio_multiplier = 1.0;

        let params =
            generate_parameters(&inputs, &ForecastAnchoring, &mut SimulationDiagnostics::new());
        assert_eq!(params.sufficiency.actual, 10_000.0);
        assert_eq!(params.sufficiency.level, SufficiencyLevel::Abundant);
    }
}
