//! Required investment and sufficiency analysis.
//!
//! Both functions are deterministic: they depend only on the plan, never on
//! simulated draws.

use std::collections::BTreeMap;

use crate::model::{
    CategoryGuidance, ClimateFactors, ClimateScenario, CostCategory, CropCategory,
    GuidanceAction, Importance, InvestmentSufficiency, LocationConfig, Portfolio,
    RequiredInvestment, SufficiencyLevel, SufficiencyStatus,
};

pub const ABUNDANT_RATIO: f64 = 1.2;
pub const ADEQUATE_RATIO: f64 = 1.0;
pub const MARGINAL_RATIO: f64 = 0.8;
/// Below this ratio low-importance categories are flagged for reduction
pub const REDUCE_RATIO: f64 = 0.6;

const DRY_RAINFALL: f64 = 20.0;
const WET_RAINFALL: f64 = 50.0;

/// Recommended spend for a plan.
///
/// Base costs per 100 sq ft are scaled by `size_multiplier`, then by the
/// climate factors of the scenario, then by the portfolio mix.
#[must_use]
pub fn calculate_required_investment(
    portfolio: &Portfolio,
    scenario: &ClimateScenario,
    size_multiplier: f64,
    location: &LocationConfig,
) -> RequiredInvestment {
    let mut factors = scenario.summer.cost_factors();
    factors.protection *= scenario.winter.protection_factor();
    if location.avg_rainfall < DRY_RAINFALL {
        factors.irrigation *= 1.25;
    } else if location.avg_rainfall > WET_RAINFALL {
        factors.irrigation *= 0.85;
    }

    let heat = portfolio.fraction(CropCategory::HeatTolerant);
    let cool = portfolio.fraction(CropCategory::CoolSeason);
    let perennial = portfolio.fraction(CropCategory::Perennial);

    let breakdown: BTreeMap<CostCategory, f64> = CostCategory::ALL
        .iter()
        .map(|&category| {
            let climate = climate_multiplier(category, &factors);
            let mix = portfolio_multiplier(category, heat, cool, perennial);
            (category, category.base_cost() * size_multiplier * climate * mix)
        })
        .collect();

    let total = breakdown.values().sum();

    tracing::debug!(
        total,
        summer = %scenario.summer,
        winter = %scenario.winter,
        "Computed required investment"
    );

    RequiredInvestment {
        breakdown,
        total,
        climate_factors: factors,
    }
}

fn climate_multiplier(category: CostCategory, factors: &ClimateFactors) -> f64 {
    match category {
        CostCategory::Soil | CostCategory::Fertilizer => factors.heat,
        CostCategory::Protection => factors.protection,
        CostCategory::Irrigation => factors.irrigation,
        CostCategory::Seeds
        | CostCategory::Infrastructure
        | CostCategory::Tools
        | CostCategory::Containers => 1.0,
    }
}

fn portfolio_multiplier(category: CostCategory, heat: f64, cool: f64, perennial: f64) -> f64 {
    match category {
        CostCategory::Protection => 1.0 + 0.5 * heat,
        CostCategory::Irrigation => 1.0 + 0.6 * heat,
        CostCategory::Soil => 1.0 + 0.3 * cool,
        CostCategory::Infrastructure => 1.0 + 0.5 * perennial,
        CostCategory::Tools => 1.0 + 0.3 * perennial,
        CostCategory::Seeds | CostCategory::Fertilizer | CostCategory::Containers => 1.0,
    }
}

/// Classify a sufficiency ratio. Thresholds are inclusive lower bounds.
#[must_use]
pub fn classify_ratio(ratio: f64) -> (SufficiencyLevel, SufficiencyStatus) {
    if ratio >= ABUNDANT_RATIO {
        (SufficiencyLevel::Abundant, SufficiencyStatus::Excellent)
    } else if ratio >= ADEQUATE_RATIO {
        (SufficiencyLevel::Adequate, SufficiencyStatus::Good)
    } else if ratio >= MARGINAL_RATIO {
        (SufficiencyLevel::Marginal, SufficiencyStatus::Caution)
    } else {
        (SufficiencyLevel::Insufficient, SufficiencyStatus::Warning)
    }
}

/// Compare a planned spend against the required investment
#[must_use]
pub fn analyze_sufficiency(actual: f64, required: &RequiredInvestment) -> InvestmentSufficiency {
    let ratio = if required.total > 0.0 {
        actual / required.total
    } else {
        ADEQUATE_RATIO
    };
    let (level, status) = classify_ratio(ratio);

    let mut guidance = Vec::new();
    if ratio < MARGINAL_RATIO {
        guidance.extend(flag_categories(
            required,
            Importance::High,
            GuidanceAction::PrioritizeFunding,
        ));
    }
    if ratio < REDUCE_RATIO {
        guidance.extend(flag_categories(
            required,
            Importance::Low,
            GuidanceAction::ConsiderReducing,
        ));
    }

    let gap = (required.total - actual).max(0.0);
    let surplus = (actual - required.total).max(0.0);

    let message = match level {
        SufficiencyLevel::Abundant => {
            format!("Budget exceeds requirements by ${surplus:.0}; room for upgrades")
        }
        SufficiencyLevel::Adequate => "Budget covers the recommended investment".to_string(),
        SufficiencyLevel::Marginal => {
            format!("Budget is ${gap:.0} short; expect trade-offs in lower-priority items")
        }
        SufficiencyLevel::Insufficient => {
            format!("Budget is ${gap:.0} short; fund essentials before anything else")
        }
    };

    InvestmentSufficiency {
        level,
        status,
        ratio,
        actual,
        required: required.total,
        gap,
        surplus,
        guidance,
        message,
    }
}

fn flag_categories(
    required: &RequiredInvestment,
    importance: Importance,
    action: GuidanceAction,
) -> impl Iterator<Item = CategoryGuidance> + '_ {
    required
        .breakdown
        .iter()
        .filter(move |(category, _)| category.importance() == importance)
        .map(move |(category, amount)| CategoryGuidance {
            category: *category,
            action,
            required: *amount,
        })
}
