//! Aggregation over Monte Carlo iterations.
//!
//! All functions here are pure and order-independent: they sort copies of
//! the inputs and never touch shared state, so calling them twice on the same
//! slice gives identical output.

use crate::model::{
    HistogramBin, LocationConfig, Percentiles, RiskAssessment, RiskLevel, SimulationIteration,
    Statistics, SummaryStats, WeatherForecast, WeatherRiskSummary,
};
use crate::weather::real_weather_context;

pub const DEFAULT_HISTOGRAM_BINS: usize = 25;

/// Linear-interpolated percentile of an ascending slice, `p` in 0-100
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Mean, median and population standard deviation
#[must_use]
pub fn summary_stats(values: &[f64]) -> SummaryStats {
    if values.is_empty() {
        return SummaryStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    SummaryStats {
        mean,
        median: median_of_sorted(&sorted_copy(values)),
        std_dev: variance.sqrt(),
    }
}

fn is_valid(iteration: &SimulationIteration) -> bool {
    iteration.net_return.is_finite()
        && iteration.roi.is_finite()
        && iteration.harvest_value.is_finite()
}

/// Summary statistics over every finite iteration.
///
/// Iterations with a non-finite net return, ROI or harvest value are left
/// out. With no valid iteration left the all-zero [`Statistics::empty`]
/// record is returned.
#[must_use]
pub fn calculate_statistics(
    iterations: &[SimulationIteration],
    forecast: Option<&WeatherForecast>,
) -> Statistics {
    let valid: Vec<&SimulationIteration> = iterations.iter().filter(|i| is_valid(i)).collect();
    let filtered = iterations.len() - valid.len();
    if filtered > 0 {
        tracing::warn!(
            filtered,
            total = iterations.len(),
            "Excluded non-finite iterations from statistics"
        );
    }

    let real_weather_context = forecast.filter(|f| !f.is_empty()).map(real_weather_context);

    if valid.is_empty() {
        tracing::warn!(
            total = iterations.len(),
            "No valid iterations, returning empty statistics"
        );
        return Statistics {
            real_weather_context,
            ..Statistics::empty()
        };
    }

    let net: Vec<f64> = valid.iter().map(|i| i.net_return).collect();
    let roi: Vec<f64> = valid.iter().map(|i| i.roi).collect();
    let harvest: Vec<f64> = valid.iter().map(|i| i.harvest_value).collect();
    let investment: Vec<f64> = valid
        .iter()
        .map(|i| i.investment)
        .filter(|v| v.is_finite())
        .collect();

    let net_stats = summary_stats(&net);
    let sorted_net = sorted_copy(&net);
    let successes = net.iter().filter(|v| **v > 0.0).count();

    Statistics {
        mean: net_stats.mean,
        median: net_stats.median,
        std_dev: net_stats.std_dev,
        percentiles: Percentiles {
            p10: percentile(&sorted_net, 10.0),
            p25: percentile(&sorted_net, 25.0),
            p75: percentile(&sorted_net, 75.0),
            p90: percentile(&sorted_net, 90.0),
        },
        roi: summary_stats(&roi),
        harvest_value: summary_stats(&harvest),
        investment: summary_stats(&investment),
        success_rate: successes as f64 / valid.len() as f64 * 100.0,
        valid_iterations: valid.len(),
        real_weather_context,
    }
}

/// Equal-width histogram.
///
/// Empty input gives no bins; identical values give a single bin. Bin
/// counts always sum to the input length: non-finite values land in the
/// outermost bins.
#[must_use]
pub fn generate_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let bins = bins.max(1);

    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || max <= min {
        let (start, end) = if min.is_finite() { (min, max) } else { (0.0, 0.0) };
        return vec![HistogramBin {
            start,
            end,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let index = if v.is_nan() || v <= min {
            0
        } else {
            (((v - min) / width).floor() as usize).min(bins - 1)
        };
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Financial risk classification from success rate and spread
#[must_use]
pub fn assess_risk(statistics: &Statistics) -> RiskAssessment {
    let level = match statistics.success_rate {
        r if r >= 80.0 => RiskLevel::Low,
        r if r >= 60.0 => RiskLevel::Moderate,
        r if r >= 40.0 => RiskLevel::High,
        _ => RiskLevel::VeryHigh,
    };
    let coefficient_of_variation = if statistics.mean.abs() > f64::EPSILON {
        statistics.std_dev / statistics.mean.abs()
    } else {
        0.0
    };
    RiskAssessment {
        level,
        coefficient_of_variation,
        downside: statistics.percentiles.p10,
    }
}

fn share(iterations: &[SimulationIteration], pred: impl Fn(&SimulationIteration) -> bool) -> f64 {
    iterations.iter().filter(|i| pred(i)).count() as f64 / iterations.len() as f64
}

/// Weather outlook across every simulated year
#[must_use]
pub fn weather_risk_summary(
    iterations: &[SimulationIteration],
    location: &LocationConfig,
) -> WeatherRiskSummary {
    let n = iterations.len();
    if n == 0 {
        return WeatherRiskSummary::default();
    }
    let n_f = n as f64;

    let extreme_heat_probability = share(iterations, |i| i.weather.heat_stress_days > 30);
    let hard_freeze_probability = share(iterations, |i| i.weather.freeze_events > 15);
    let drought_probability = share(iterations, |i| {
        i.weather.annual_rainfall < 0.6 * location.avg_rainfall
    });

    let worst = extreme_heat_probability
        .max(hard_freeze_probability)
        .max(drought_probability);
    let level = match worst {
        p if p >= 0.5 => RiskLevel::VeryHigh,
        p if p >= 0.3 => RiskLevel::High,
        p if p >= 0.1 => RiskLevel::Moderate,
        _ => RiskLevel::Low,
    };

    WeatherRiskSummary {
        mean_heat_stress_days: iterations
            .iter()
            .map(|i| f64::from(i.weather.heat_stress_days))
            .sum::<f64>()
            / n_f,
        mean_freeze_events: iterations
            .iter()
            .map(|i| f64::from(i.weather.freeze_events))
            .sum::<f64>()
            / n_f,
        mean_rainfall: iterations
            .iter()
            .map(|i| i.weather.annual_rainfall)
            .sum::<f64>()
            / n_f,
        extreme_heat_probability,
        hard_freeze_probability,
        drought_probability,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Calendar, WeatherSample};
    use std::collections::BTreeMap;

    fn iteration(net_return: f64) -> SimulationIteration {
        let investment = 100.0;
        SimulationIteration {
            harvest_value: investment + net_return,
            investment,
            net_return,
            roi: net_return / investment * 100.0,
            category_yields: BTreeMap::new(),
            weather: WeatherSample {
                heat_stress_days: 10,
                freeze_events: 2,
                annual_rainfall: 30.0,
            },
            calendar: Calendar::default(),
        }
    }

    #[test]
    fn test_success_rate_example() {
        let iterations: Vec<_> = [100.0, 150.0, -50.0, -25.0, 80.0]
            .into_iter()
            .map(iteration)
            .collect();
        let stats = calculate_statistics(&iterations, None);
        assert_eq!(stats.success_rate, 60.0);
        assert_eq!(stats.valid_iterations, 5);
        assert_eq!(stats.median, 80.0);
        assert!((stats.mean - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_iterations_are_filtered() {
        let mut bad = iteration(10.0);
        bad.roi = f64::NAN;
        let mut worse = iteration(10.0);
        worse.harvest_value = f64::INFINITY;
        let iterations = vec![iteration(20.0), bad, worse, iteration(-20.0)];

        let stats = calculate_statistics(&iterations, None);
        assert_eq!(stats.valid_iterations, 2);
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn test_all_invalid_gives_empty_record() {
        let mut bad = iteration(10.0);
        bad.net_return = f64::NAN;
        let stats = calculate_statistics(&[bad], None);
        assert_eq!(stats, Statistics::empty());
        assert_eq!(calculate_statistics(&[], None), Statistics::empty());
    }

    #[test]
    fn test_percentiles_interpolate() {
        let sorted: Vec<f64> = (1..=11).map(f64::from).collect();
        assert_eq!(percentile(&sorted, 10.0), 2.0);
        assert_eq!(percentile(&sorted, 25.0), 3.5);
        assert_eq!(percentile(&sorted, 90.0), 10.0);
        assert_eq!(percentile(&[7.0], 75.0), 7.0);
        assert_eq!(percentile(&[], 75.0), 0.0);
    }

    #[test]
    fn test_summary_stats_population_std() {
        let stats = summary_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.std_dev, 2.0);
    }

    #[test]
    fn test_statistics_are_idempotent() {
        let iterations: Vec<_> = (-20..30).map(|v| iteration(f64::from(v) * 3.7)).collect();
        let first = calculate_statistics(&iterations, None);
        let second = calculate_statistics(&iterations, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_statistics_ignore_order() {
        let mut iterations: Vec<_> = (0..40)
            .map(|v| iteration(f64::from(v * 7 % 13) - 6.0))
            .collect();
        let forward = calculate_statistics(&iterations, None);
        iterations.reverse();
        let reversed = calculate_statistics(&iterations, None);
        assert_eq!(forward.median, reversed.median);
        assert_eq!(forward.percentiles, reversed.percentiles);
        assert_eq!(forward.success_rate, reversed.success_rate);
        assert!((forward.mean - reversed.mean).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_counts_sum_to_len() {
        let values: Vec<f64> = (0..997).map(|v| (f64::from(v) * 0.37).sin() * 50.0).collect();
        for bins in [1, 7, 25, 100] {
            let histogram = generate_histogram(&values, bins);
            assert_eq!(histogram.len(), bins);
            assert_eq!(histogram.iter().map(|b| b.count).sum::<usize>(), values.len());
        }
    }

    #[test]
    fn test_histogram_edge_cases() {
        assert!(generate_histogram(&[], 25).is_empty());

        let flat = generate_histogram(&[3.0, 3.0, 3.0], 25);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 3);

        let with_nan = generate_histogram(&[1.0, f64::NAN, 2.0, f64::INFINITY], 4);
        assert_eq!(with_nan.iter().map(|b| b.count).sum::<usize>(), 4);

        let bins = generate_histogram(&[0.0, 10.0], 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 1);
        assert_eq!(bins[1].end, 10.0);
    }

    #[test]
    fn test_risk_levels() {
        let mut stats = Statistics {
            success_rate: 85.0,
            mean: 100.0,
            std_dev: 50.0,
            ..Default::default()
        };
        assert_eq!(assess_risk(&stats).level, RiskLevel::Low);
        assert_eq!(assess_risk(&stats).coefficient_of_variation, 0.5);
        stats.success_rate = 60.0;
        assert_eq!(assess_risk(&stats).level, RiskLevel::Moderate);
        stats.success_rate = 40.0;
        assert_eq!(assess_risk(&stats).level, RiskLevel::High);
        stats.success_rate = 39.9;
        assert_eq!(assess_risk(&stats).level, RiskLevel::VeryHigh);
    }

    #[test]
    fn test_weather_risk_summary() {
        let mut iterations: Vec<_> = (0..4).map(|_| iteration(1.0)).collect();
        iterations[0].weather.heat_stress_days = 40;
        iterations[1].weather.annual_rainfall = 10.0;
        let summary = weather_risk_summary(&iterations, &LocationConfig::default());
        assert_eq!(summary.extreme_heat_probability, 0.25);
        assert_eq!(summary.drought_probability, 0.25);
        assert_eq!(summary.hard_freeze_probability, 0.0);
        assert_eq!(summary.mean_heat_stress_days, 17.5);
        assert_eq!(summary.level, RiskLevel::Moderate);
    }
}
