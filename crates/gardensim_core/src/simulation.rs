//! Monte Carlo runner and the end-to-end pipeline.
//!
//! Every iteration owns a `SmallRng` seeded from a master seed sequence, so a
//! seeded run produces identical iterations whether they execute sequentially
//! or across the rayon pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use jiff::Timestamp;
use jiff::civil::Date;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::calendar::generate_calendar;
use crate::config::SimulationConfig;
use crate::consensus::synthesize_calendar;
use crate::error::{Result, SimulationError};
use crate::investment::analyze_sufficiency;
use crate::metrics::{DrawFallbacks, SimulationDiagnostics};
use crate::model::{
    CropCatalog, LocationConfig, NormalParams, Portfolio, SimulationIteration,
    SimulationParameters, SimulationResult,
};
use crate::parameters::{PlanInputs, generate_parameters};
use crate::statistics::{
    assess_risk, calculate_statistics, generate_histogram, weather_risk_summary,
};
use crate::weather::{ForecastAnchoring, WeatherIntegration, WeatherSampler};

/// Shared progress and cancellation handle for a Monte Carlo run.
///
/// Clones share the same counters, so one copy can be handed to the run while
/// another is polled or cancelled from a different thread.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloProgress {
    /// Completed iterations counter
    completed: Arc<AtomicUsize>,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
}

impl MonteCarloProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Request cancellation; iterations not yet started are skipped
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Run-time knobs that are not part of the plan itself
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Overrides the config seed. With neither, a random seed is drawn.
    pub seed: Option<u64>,
    /// Stamp for the consensus calendar; `Timestamp::now()` when absent
    pub generated_at: Option<Timestamp>,
    pub progress: Option<MonteCarloProgress>,
}

impl SimulationOptions {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn generated_at(mut self, timestamp: Timestamp) -> Self {
        self.generated_at = Some(timestamp);
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: MonteCarloProgress) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Read-only inputs shared by every iteration
pub struct IterationContext<'a> {
    pub parameters: &'a SimulationParameters,
    pub sampler: &'a WeatherSampler<'a>,
    pub portfolio: &'a Portfolio,
    pub location: &'a LocationConfig,
    pub catalog: &'a CropCatalog,
    pub season_start: Date,
}

/// Draw from `params`, replacing an unusable draw with the mean
fn draw_or_mean<R: RngCore>(
    rng: &mut R,
    params: &NormalParams,
    name: &'static str,
) -> (f64, bool) {
    match params.sample(rng, name) {
        Ok(v) if v.is_finite() => (v, false),
        _ => (params.mean, true),
    }
}

/// One Monte Carlo iteration from its own seed
#[must_use]
pub fn simulate_iteration(
    ctx: &IterationContext<'_>,
    seed: u64,
) -> (SimulationIteration, DrawFallbacks) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut fallbacks = DrawFallbacks::default();

    let weather = ctx.sampler.sample(&mut rng);

    let (harvest_value, harvest_fallback) =
        draw_or_mean(&mut rng, &ctx.parameters.harvest_value, "harvest_value");
    let (investment, investment_fallback) =
        draw_or_mean(&mut rng, &ctx.parameters.investment, "investment");
    fallbacks.harvest = harvest_fallback;
    fallbacks.investment = investment_fallback;

    let net_return = harvest_value - investment;
    let mut roi = if investment > 0.0 {
        net_return / investment * 100.0
    } else {
        fallbacks.roi = true;
        0.0
    };
    if !roi.is_finite() {
        fallbacks.roi = true;
        roi = 0.0;
    }

    let category_yields = ctx
        .parameters
        .categories
        .iter()
        .map(|(&category, params)| {
            let (value, substituted) = draw_or_mean(&mut rng, &params.value, "category_yield");
            fallbacks.category += u32::from(substituted);
            (category, value.max(0.0))
        })
        .collect();

    let calendar = generate_calendar(
        ctx.portfolio,
        &weather,
        ctx.location,
        ctx.catalog,
        ctx.season_start,
    );

    let iteration = SimulationIteration {
        harvest_value,
        investment,
        net_return,
        roi,
        category_yields,
        weather,
        calendar,
    };
    (iteration, fallbacks)
}

/// Per-iteration seeds derived from one master seed
#[must_use]
pub fn iteration_seeds(master_seed: u64, n: usize) -> Vec<u64> {
    let mut master = SmallRng::seed_from_u64(master_seed);
    (0..n).map(|_| master.next_u64()).collect()
}

/// Run `n` iterations.
///
/// Returns exactly `n` iterations in seed order, or
/// [`SimulationError::Cancelled`] when the progress handle is cancelled.
pub fn run_monte_carlo(
    ctx: &IterationContext<'_>,
    n: usize,
    master_seed: u64,
    progress: Option<&MonteCarloProgress>,
) -> Result<Vec<(SimulationIteration, DrawFallbacks)>> {
    if n == 0 {
        return Err(SimulationError::InvalidIterations(n));
    }
    let seeds = iteration_seeds(master_seed, n);

    let run_one = |seed: &u64| {
        if progress.is_some_and(MonteCarloProgress::is_cancelled) {
            return None;
        }
        let outcome = simulate_iteration(ctx, *seed);
        if let Some(p) = progress {
            p.increment();
        }
        Some(outcome)
    };

    #[cfg(feature = "parallel")]
    let outcomes: Option<Vec<_>> = seeds.par_iter().map(run_one).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Option<Vec<_>> = seeds.iter().map(run_one).collect();

    match outcomes {
        Some(outcomes) if !progress.is_some_and(MonteCarloProgress::is_cancelled) => Ok(outcomes),
        _ => {
            tracing::info!(
                completed = progress.map_or(0, MonteCarloProgress::completed),
                requested = n,
                "Monte Carlo run cancelled"
            );
            Err(SimulationError::Cancelled)
        }
    }
}

/// Run the full pipeline with the default forecast anchoring
pub fn run_simulation(
    config: &SimulationConfig,
    options: SimulationOptions,
) -> Result<SimulationResult> {
    run_simulation_with_integration(config, &ForecastAnchoring, options)
}

/// Run the full pipeline: parameters, iterations, statistics, consensus
/// calendar and risk views.
pub fn run_simulation_with_integration(
    config: &SimulationConfig,
    integration: &dyn WeatherIntegration,
    options: SimulationOptions,
) -> Result<SimulationResult> {
    config.validate()?;
    let portfolio = config
        .portfolio
        .as_ref()
        .ok_or(SimulationError::MissingPortfolio)?;
    let season_start = config
        .season_start
        .ok_or_else(|| SimulationError::Config("season_start is required".to_string()))?;

    let mut diagnostics = SimulationDiagnostics::new();

    let (location, location_fallbacks) = config.location.sanitized();
    for field in location_fallbacks {
        tracing::warn!(field, "Unusable location value, using default");
        diagnostics.record_location_fallback(field);
    }

    let catalog = config.crops.clone().unwrap_or_else(CropCatalog::builtin);
    let forecast = config.weather.as_ref().filter(|f| !f.is_empty());

    let plan = PlanInputs {
        portfolio,
        base_investment: config.base_investment,
        portfolio_multiplier: config.portfolio_multiplier,
        location: &location,
        scenario: config.scenario,
        forecast,
        catalog: &catalog,
    };
    let parameters = generate_parameters(&plan, integration, &mut diagnostics);

    let sampler = WeatherSampler::new(&location, config.scenario, forecast, integration);
    diagnostics.forecast_anchored = sampler.is_anchored();
    for rate in sampler.unsamplable_rates() {
        tracing::warn!(rate, "Poisson rate out of range, event counts drawn as zero");
        diagnostics.record_parameter_fallback(rate);
    }

    let seed = options
        .seed
        .or(config.seed)
        .unwrap_or_else(|| rand::rng().next_u64());
    tracing::debug!(seed, iterations = config.iterations, "Starting Monte Carlo run");

    let ctx = IterationContext {
        parameters: &parameters,
        sampler: &sampler,
        portfolio,
        location: &location,
        catalog: &catalog,
        season_start,
    };
    let outcomes = run_monte_carlo(&ctx, config.iterations, seed, options.progress.as_ref())?;

    let mut iterations = Vec::with_capacity(outcomes.len());
    for (iteration, fallbacks) in outcomes {
        diagnostics.record_draw(fallbacks);
        iterations.push(iteration);
    }

    let statistics = calculate_statistics(&iterations, forecast);
    diagnostics.record_filtered(iterations.len() - statistics.valid_iterations);

    let net_returns: Vec<f64> = iterations.iter().map(|i| i.net_return).collect();
    let rois: Vec<f64> = iterations.iter().map(|i| i.roi).collect();
    let net_return_histogram = generate_histogram(&net_returns, config.histogram_bins);
    let roi_histogram = generate_histogram(&rois, config.histogram_bins);

    let generated_at = options.generated_at.unwrap_or_else(Timestamp::now);
    let probabilistic_calendar =
        synthesize_calendar(iterations.iter().map(|i| &i.calendar), generated_at);

    let weather_risk = weather_risk_summary(&iterations, &location);
    let risk = assess_risk(&statistics);

    let sufficiency = if statistics.valid_iterations > 0 {
        analyze_sufficiency(statistics.investment.mean, &parameters.required_investment)
    } else {
        parameters.sufficiency.clone()
    };

    if diagnostics.is_degraded() {
        tracing::warn!(?diagnostics, "Simulation completed on fallback paths");
    }
    tracing::info!(
        iterations = iterations.len(),
        mean_net_return = statistics.mean,
        success_rate = statistics.success_rate,
        risk = ?risk.level,
        sufficiency = ?sufficiency.level,
        anchored = diagnostics.forecast_anchored,
        "Simulation complete"
    );

    Ok(SimulationResult {
        statistics,
        iterations,
        net_return_histogram,
        roi_histogram,
        probabilistic_calendar,
        weather_risk,
        risk,
        required_investment: parameters.required_investment.clone(),
        sufficiency,
        used_real_weather: forecast.map(|_| true),
        weather_timestamp: forecast.map(|f| f.timestamp),
        parameters,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationBuilder;
    use crate::model::{ClimateScenario, CropCategory};

    fn config() -> SimulationConfig {
        SimulationBuilder::new()
            .season_start(2025, 1, 1)
            .allocate(CropCategory::HeatTolerant, 40.0)
            .allocate(CropCategory::CoolSeason, 40.0)
            .allocate(CropCategory::Perennial, 20.0)
            .iterations(64)
            .build()
    }

    #[test]
    fn test_iteration_seeds_are_deterministic() {
        assert_eq!(iteration_seeds(9, 16), iteration_seeds(9, 16));
        assert_ne!(iteration_seeds(9, 16), iteration_seeds(10, 16));
        assert_eq!(iteration_seeds(9, 16)[..8], iteration_seeds(9, 8)[..]);
    }

    #[test]
    fn test_same_seed_same_iteration() {
        let config = config();
        let portfolio = config.portfolio.clone().unwrap();
        let location = LocationConfig::default();
        let catalog = CropCatalog::builtin();
        let scenario = ClimateScenario::default();
        let plan = PlanInputs {
            portfolio: &portfolio,
            base_investment: 500.0,
            portfolio_multiplier: 1.0,
            location: &location,
            scenario,
            forecast: None,
            catalog: &catalog,
        };
        let parameters =
            generate_parameters(&plan, &ForecastAnchoring, &mut SimulationDiagnostics::new());
        let sampler = WeatherSampler::new(&location, scenario, None, &ForecastAnchoring);
        let ctx = IterationContext {
            parameters: &parameters,
            sampler: &sampler,
            portfolio: &portfolio,
            location: &location,
            catalog: &catalog,
            season_start: jiff::civil::date(2025, 1, 1),
        };

        let (a, _) = simulate_iteration(&ctx, 1234);
        let (b, _) = simulate_iteration(&ctx, 1234);
        assert_eq!(a, b);
        assert_eq!(a.net_return, a.harvest_value - a.investment);
        assert!(a.category_yields.values().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_zero_iterations_is_an_error() {
        let config = SimulationConfig {
            iterations: 0,
            ..config()
        };
        let err = run_simulation(&config, SimulationOptions::seeded(1)).unwrap_err();
        assert_eq!(err, SimulationError::InvalidIterations(0));
    }

    #[test]
    fn test_cancelled_before_start() {
        let progress = MonteCarloProgress::new();
        progress.cancel();
        let err = run_simulation(
            &config(),
            SimulationOptions::seeded(1).progress(progress.clone()),
        )
        .unwrap_err();
        assert_eq!(err, SimulationError::Cancelled);
        assert_eq!(progress.completed(), 0);
    }

    #[test]
    fn test_progress_counts_every_iteration() {
        let progress = MonteCarloProgress::new();
        let result = run_simulation(
            &config(),
            SimulationOptions::seeded(3).progress(progress.clone()),
        )
        .unwrap();
        assert_eq!(result.iterations.len(), 64);
        assert_eq!(progress.completed(), 64);
        assert!(!progress.is_cancelled());
    }

    #[test]
    fn test_zero_investment_forces_zero_roi() {
        let config = SimulationConfig {
            base_investment: 0.0,
            ..config()
        };
        let result = run_simulation(&config, SimulationOptions::seeded(5)).unwrap();
        assert!(result.iterations.iter().all(|i| i.roi == 0.0));
        assert_eq!(result.diagnostics.roi_substitutions, 64);
        assert_eq!(result.statistics.roi.mean, 0.0);
    }
}
