use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Crop category keys used by portfolios and the crop catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CropCategory {
    HeatTolerant,
    CoolSeason,
    Perennial,
}

impl CropCategory {
    pub const ALL: [CropCategory; 3] = [
        CropCategory::HeatTolerant,
        CropCategory::CoolSeason,
        CropCategory::Perennial,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            CropCategory::HeatTolerant => "heat_tolerant",
            CropCategory::CoolSeason => "cool_season",
            CropCategory::Perennial => "perennial",
        }
    }
}

impl fmt::Display for CropCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Allocation percentages (0-100) per crop category.
///
/// Percentages need not sum to 100. A missing category is the same as a zero
/// allocation. Backed by an ordered map so iteration order, and therefore
/// seeded output, is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio(BTreeMap<CropCategory, f64>);

impl Portfolio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, category: CropCategory, percent: f64) -> Self {
        self.0.insert(category, percent);
        self
    }

    pub fn set(&mut self, category: CropCategory, percent: f64) {
        self.0.insert(category, percent);
    }

    /// Allocation percentage for a category, 0 when absent
    #[must_use]
    pub fn allocation(&self, category: CropCategory) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    /// Allocation as a 0-1 fraction
    #[must_use]
    pub fn fraction(&self, category: CropCategory) -> f64 {
        self.allocation(category) / 100.0
    }

    /// Categories with a non-zero allocation, in key order
    pub fn active(&self) -> impl Iterator<Item = (CropCategory, f64)> + '_ {
        self.0
            .iter()
            .filter(|(_, pct)| **pct > 0.0)
            .map(|(cat, pct)| (*cat, *pct))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CropCategory, f64)> + '_ {
        self.0.iter().map(|(cat, pct)| (*cat, *pct))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject allocations the engine cannot reason about
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (category, value) in self.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidAllocation { category, value });
            }
        }
        Ok(())
    }
}

impl FromIterator<(CropCategory, f64)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (CropCategory, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
