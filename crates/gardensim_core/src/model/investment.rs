use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scenario::ClimateFactors;

/// Spending buckets in a garden budget
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Seeds,
    Soil,
    Fertilizer,
    Protection,
    Infrastructure,
    Tools,
    Containers,
    Irrigation,
}

impl CostCategory {
    pub const ALL: [CostCategory; 8] = [
        CostCategory::Seeds,
        CostCategory::Soil,
        CostCategory::Fertilizer,
        CostCategory::Protection,
        CostCategory::Infrastructure,
        CostCategory::Tools,
        CostCategory::Containers,
        CostCategory::Irrigation,
    ];

    /// Cost for a 100 sq ft plot before climate and portfolio multipliers
    #[must_use]
    pub fn base_cost(self) -> f64 {
        match self {
            CostCategory::Seeds => 50.0,
            CostCategory::Soil => 75.0,
            CostCategory::Fertilizer => 40.0,
            CostCategory::Protection => 60.0,
            CostCategory::Infrastructure => 100.0,
            CostCategory::Tools => 50.0,
            CostCategory::Containers => 30.0,
            CostCategory::Irrigation => 80.0,
        }
    }

    #[must_use]
    pub fn importance(self) -> Importance {
        match self {
            CostCategory::Seeds
            | CostCategory::Soil
            | CostCategory::Protection
            | CostCategory::Fertilizer => Importance::High,
            CostCategory::Infrastructure | CostCategory::Irrigation => Importance::Medium,
            CostCategory::Tools | CostCategory::Containers => Importance::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    High,
    Medium,
    Low,
}

/// Deterministic recommended spend for a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredInvestment {
    pub breakdown: BTreeMap<CostCategory, f64>,
    pub total: f64,
    pub climate_factors: ClimateFactors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SufficiencyLevel {
    Abundant,
    Adequate,
    Marginal,
    Insufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SufficiencyStatus {
    Excellent,
    Good,
    Caution,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceAction {
    PrioritizeFunding,
    ConsiderReducing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGuidance {
    pub category: CostCategory,
    pub action: GuidanceAction,
    pub required: f64,
}

/// Comparison of planned spend against the required investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSufficiency {
    pub level: SufficiencyLevel,
    pub status: SufficiencyStatus,
    pub ratio: f64,
    pub actual: f64,
    pub required: f64,
    pub gap: f64,
    pub surplus: f64,
    pub guidance: Vec<CategoryGuidance>,
    pub message: String,
}
