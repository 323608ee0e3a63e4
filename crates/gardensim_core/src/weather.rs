//! Weather sampling.
//!
//! Without a forecast, each simulated year draws heat-stress days and freeze
//! events from Poisson distributions and annual rainfall from a Normal. With a
//! forecast, sampling is delegated to a [`WeatherIntegration`], which also
//! owns the harvest adjustment applied by the parameter generator.

use rand::{Rng, RngCore, distr::Distribution};

use crate::model::{
    ClimateScenario, LocationConfig, RealWeatherContext, SummerScenario, WeatherForecast,
    WeatherSample, WinterScenario,
};

/// Rainfall std dev as a share of the mean
const RAINFALL_STD_RATIO: f64 = 0.2;

/// Poisson rate of heat-stress days for a location and summer scenario
#[must_use]
pub fn heat_stress_rate(location: &LocationConfig, summer: SummerScenario) -> f64 {
    summer.heat_stress_baseline() * location.heat_intensity / 3.0
}

/// Poisson rate of freeze events for a location and winter scenario
#[must_use]
pub fn freeze_rate(location: &LocationConfig, winter: WinterScenario) -> f64 {
    winter.freeze_baseline() * location.winter_severity / 3.0
}

/// Whether a positive rate is beyond what the Poisson sampler accepts.
///
/// [`sample_count`] draws zero for such a rate; the run reports it through
/// [`WeatherSampler::unsamplable_rates`].
#[must_use]
pub fn is_unsamplable_rate(lambda: f64) -> bool {
    lambda > 0.0 && rand_distr::Poisson::new(lambda).is_err()
}

/// Draw a non-negative event count. A rate of zero (or any unusable rate)
/// yields zero without consuming randomness.
pub fn sample_count<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u32 {
    if !(lambda.is_finite() && lambda > 0.0) {
        return 0;
    }
    match rand_distr::Poisson::new(lambda) {
        Ok(dist) => {
            let draw: f64 = dist.sample(rng);
            draw.max(0.0) as u32
        }
        Err(_) => 0,
    }
}

/// Draw annual rainfall around `mean`, floored at [`WeatherSample::MIN_RAINFALL`]
pub fn sample_rainfall<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    let draw = rand_distr::Normal::new(mean, mean.abs() * RAINFALL_STD_RATIO)
        .map(|dist| dist.sample(rng))
        .unwrap_or(mean);
    if draw.is_finite() {
        draw.max(WeatherSample::MIN_RAINFALL)
    } else {
        mean.max(WeatherSample::MIN_RAINFALL)
    }
}

/// Synthetic weather for one simulated year
pub fn sample_weather<R: Rng + ?Sized>(
    rng: &mut R,
    location: &LocationConfig,
    scenario: &ClimateScenario,
) -> WeatherSample {
    let heat_stress_days = sample_count(rng, heat_stress_rate(location, scenario.summer));
    let freeze_events = sample_count(rng, freeze_rate(location, scenario.winter));
    let annual_rainfall = sample_rainfall(rng, location.avg_rainfall);

    WeatherSample {
        heat_stress_days,
        freeze_events,
        annual_rainfall,
    }
}

/// Seam between the engine and real forecast data.
///
/// Implementations must be pure functions of their inputs and the supplied
/// RNG so seeded runs stay reproducible.
pub trait WeatherIntegration: Send + Sync {
    /// One weather sample anchored to the forecast
    fn anchored_sample(
        &self,
        rng: &mut dyn RngCore,
        location: &LocationConfig,
        scenario: &ClimateScenario,
        forecast: &WeatherForecast,
    ) -> WeatherSample;

    /// Multiplier applied to expected harvest value
    fn harvest_adjustment(&self, forecast: &WeatherForecast, scenario: &ClimateScenario) -> f64;
}

/// Default forecast blending.
///
/// Temperatures are in °F. Signals taken from the forecast window:
/// - heat fraction: share of days with a high of at least 95
/// - freeze fraction: share of days with a low of at most 32
/// - weight: `0.5 × min(days, 14) / 14`
///
/// Sampling blends each scenario rate with the forecast-implied rate
/// (`heat_fraction × 120` heat days, `freeze_fraction × 90` freeze events,
/// `Σprecip × 365 / days` inches of rain) using that weight.
///
/// The harvest multiplier is `1 − 0.3·heat − 0.2·freeze`, nudged by ±0.05 for
/// adequate (0.5–2.0 in) or scarce (< 0.2 in) rain over the first week, and
/// clamped to 0.5–1.2.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastAnchoring;

impl ForecastAnchoring {
    pub const HEAT_THRESHOLD_F: f64 = 95.0;
    pub const FREEZE_THRESHOLD_F: f64 = 32.0;
    const FULL_WEIGHT_DAYS: f64 = 14.0;
    const MAX_WEIGHT: f64 = 0.5;
    const HEAT_SEASON_DAYS: f64 = 120.0;
    const FREEZE_SEASON_DAYS: f64 = 90.0;

    /// Signals extracted from the forecast: (heat fraction, freeze fraction, weight)
    #[must_use]
    pub fn signals(forecast: &WeatherForecast) -> (f64, f64, f64) {
        let days = forecast.daily.len();
        if days == 0 {
            return (0.0, 0.0, 0.0);
        }
        let n = days as f64;
        let heat = forecast
            .daily
            .iter()
            .filter(|d| d.temperature.high >= Self::HEAT_THRESHOLD_F)
            .count() as f64
            / n;
        let freeze = forecast
            .daily
            .iter()
            .filter(|d| d.temperature.low <= Self::FREEZE_THRESHOLD_F)
            .count() as f64
            / n;
        let weight = Self::MAX_WEIGHT * n.min(Self::FULL_WEIGHT_DAYS) / Self::FULL_WEIGHT_DAYS;
        (heat, freeze, weight)
    }

    fn annualized_rainfall(forecast: &WeatherForecast) -> Option<f64> {
        if forecast.daily.is_empty() {
            return None;
        }
        let total: f64 = forecast.daily.iter().map(|d| d.precipitation.max(0.0)).sum();
        Some(total * 365.0 / forecast.daily.len() as f64)
    }
}

impl WeatherIntegration for ForecastAnchoring {
    fn anchored_sample(
        &self,
        rng: &mut dyn RngCore,
        location: &LocationConfig,
        scenario: &ClimateScenario,
        forecast: &WeatherForecast,
    ) -> WeatherSample {
        let (heat, freeze, w) = Self::signals(forecast);

        let heat_lambda = (1.0 - w) * heat_stress_rate(location, scenario.summer)
            + w * heat * Self::HEAT_SEASON_DAYS;
        let freeze_lambda = (1.0 - w) * freeze_rate(location, scenario.winter)
            + w * freeze * Self::FREEZE_SEASON_DAYS;
        let rain_mean = match Self::annualized_rainfall(forecast) {
            Some(annual) => (1.0 - w) * location.avg_rainfall + w * annual,
            None => location.avg_rainfall,
        };

        WeatherSample {
            heat_stress_days: sample_count(rng, heat_lambda),
            freeze_events: sample_count(rng, freeze_lambda),
            annual_rainfall: sample_rainfall(rng, rain_mean),
        }
    }

    fn harvest_adjustment(&self, forecast: &WeatherForecast, _scenario: &ClimateScenario) -> f64 {
        if forecast.is_empty() {
            return 1.0;
        }
        let (heat, freeze, _) = Self::signals(forecast);
        let week_precip: f64 = forecast.upcoming(7).iter().map(|d| d.precipitation).sum();

        let mut multiplier = 1.0 - 0.3 * heat - 0.2 * freeze;
        if (0.5..=2.0).contains(&week_precip) {
            multiplier += 0.05;
        } else if week_precip < 0.2 {
            multiplier -= 0.05;
        }
        multiplier.clamp(0.5, 1.2)
    }
}

/// Draws weather for each iteration, anchored to a forecast when one is given
pub struct WeatherSampler<'a> {
    location: &'a LocationConfig,
    scenario: ClimateScenario,
    forecast: Option<&'a WeatherForecast>,
    integration: &'a dyn WeatherIntegration,
}

impl<'a> WeatherSampler<'a> {
    #[must_use]
    pub fn new(
        location: &'a LocationConfig,
        scenario: ClimateScenario,
        forecast: Option<&'a WeatherForecast>,
        integration: &'a dyn WeatherIntegration,
    ) -> Self {
        // An empty forecast carries no signal; treat it as absent.
        let forecast = forecast.filter(|f| !f.is_empty());
        Self {
            location,
            scenario,
            forecast,
            integration,
        }
    }

    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.forecast.is_some()
    }

    pub fn sample<R: RngCore>(&self, rng: &mut R) -> WeatherSample {
        match self.forecast {
            Some(forecast) => {
                self.integration
                    .anchored_sample(rng, self.location, &self.scenario, forecast)
            }
            None => sample_weather(rng, self.location, &self.scenario),
        }
    }

    /// Names of the unanchored Poisson rates that cannot be sampled
    #[must_use]
    pub fn unsamplable_rates(&self) -> Vec<&'static str> {
        let rates = [
            ("heat_stress_rate", heat_stress_rate(self.location, self.scenario.summer)),
            ("freeze_rate", freeze_rate(self.location, self.scenario.winter)),
        ];
        rates
            .into_iter()
            .filter(|&(_, lambda)| is_unsamplable_rate(lambda))
            .map(|(name, _)| name)
            .collect()
    }

    /// Draw `n` independent samples from one generator
    pub fn generate<R: RngCore>(&self, rng: &mut R, n: usize) -> Vec<WeatherSample> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

/// Snapshot of the forecast attached to statistics for traceability
#[must_use]
pub fn real_weather_context(forecast: &WeatherForecast) -> RealWeatherContext {
    let week = forecast.upcoming(7);
    RealWeatherContext {
        current_temperature: forecast.current.map(|c| c.temperature),
        upcoming_week_gdd: week.iter().map(|d| d.growing_degree_days).sum(),
        upcoming_week_precipitation: week.iter().map(|d| d.precipitation).sum(),
        forecast_timestamp: forecast.timestamp,
    }
}
