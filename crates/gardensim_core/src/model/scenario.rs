//! Qualitative climate scenarios and their baseline lookup tables.
//!
//! Every table is an exhaustive `match`, so adding a scenario label fails to
//! compile until each baseline is given a value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Summer severity selected by the user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SummerScenario {
    Mild,
    #[default]
    Normal,
    Extreme,
    Catastrophic,
}

impl SummerScenario {
    pub const ALL: [SummerScenario; 4] = [
        SummerScenario::Mild,
        SummerScenario::Normal,
        SummerScenario::Extreme,
        SummerScenario::Catastrophic,
    ];

    /// Poisson rate of heat-stress days at a heat intensity of 3
    #[must_use]
    pub fn heat_stress_baseline(self) -> f64 {
        match self {
            SummerScenario::Mild => 5.0,
            SummerScenario::Normal => 15.0,
            SummerScenario::Extreme => 35.0,
            SummerScenario::Catastrophic => 60.0,
        }
    }

    /// Multiplier applied to expected harvest value
    #[must_use]
    pub fn harvest_factor(self) -> f64 {
        match self {
            SummerScenario::Mild => 1.10,
            SummerScenario::Normal => 1.00,
            SummerScenario::Extreme => 0.75,
            SummerScenario::Catastrophic => 0.50,
        }
    }

    /// Cost multipliers for heat-, protection- and irrigation-related spend
    #[must_use]
    pub fn cost_factors(self) -> ClimateFactors {
        let (heat, protection, irrigation) = match self {
            SummerScenario::Mild => (0.9, 0.85, 0.9),
            SummerScenario::Normal => (1.0, 1.0, 1.0),
            SummerScenario::Extreme => (1.3, 1.4, 1.5),
            SummerScenario::Catastrophic => (1.6, 1.8, 2.0),
        };
        ClimateFactors {
            heat,
            protection,
            irrigation,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SummerScenario::Mild => "mild",
            SummerScenario::Normal => "normal",
            SummerScenario::Extreme => "extreme",
            SummerScenario::Catastrophic => "catastrophic",
        }
    }
}

/// Winter severity selected by the user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum WinterScenario {
    Traditional,
    #[default]
    Mild,
    Warm,
    None,
}

impl WinterScenario {
    pub const ALL: [WinterScenario; 4] = [
        WinterScenario::Traditional,
        WinterScenario::Mild,
        WinterScenario::Warm,
        WinterScenario::None,
    ];

    /// Poisson rate of freeze events at a winter severity of 3
    #[must_use]
    pub fn freeze_baseline(self) -> f64 {
        match self {
            WinterScenario::Traditional => 20.0,
            WinterScenario::Mild => 8.0,
            WinterScenario::Warm => 3.0,
            WinterScenario::None => 0.0,
        }
    }

    #[must_use]
    pub fn harvest_factor(self) -> f64 {
        match self {
            WinterScenario::Traditional => 0.95,
            WinterScenario::Mild => 1.00,
            WinterScenario::Warm => 1.00,
            WinterScenario::None => 0.97,
        }
    }

    /// Extra multiplier on cold-protection spend
    #[must_use]
    pub fn protection_factor(self) -> f64 {
        match self {
            WinterScenario::Traditional => 1.2,
            WinterScenario::Mild => 1.0,
            WinterScenario::Warm => 0.95,
            WinterScenario::None => 0.9,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WinterScenario::Traditional => "traditional",
            WinterScenario::Mild => "mild",
            WinterScenario::Warm => "warm",
            WinterScenario::None => "none",
        }
    }
}

impl fmt::Display for SummerScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for WinterScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The pair of qualitative labels that select baseline parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClimateScenario {
    #[serde(default)]
    pub summer: SummerScenario,
    #[serde(default)]
    pub winter: WinterScenario,
}

impl ClimateScenario {
    #[must_use]
    pub fn new(summer: SummerScenario, winter: WinterScenario) -> Self {
        Self { summer, winter }
    }

    /// Combined climate-severity factor applied to harvest value
    #[must_use]
    pub fn severity_factor(&self) -> f64 {
        self.summer.harvest_factor() * self.winter.harvest_factor()
    }
}

/// Climate multipliers used by the required-investment calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateFactors {
    pub heat: f64,
    pub protection: f64,
    pub irrigation: f64,
}

impl Default for ClimateFactors {
    fn default() -> Self {
        Self {
            heat: 1.0,
            protection: 1.0,
            irrigation: 1.0,
        }
    }
}
