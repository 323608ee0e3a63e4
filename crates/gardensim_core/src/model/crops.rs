//! Crop reference data.
//!
//! The engine treats the catalog as a read-only lookup table supplied by the
//! caller. [`CropCatalog::builtin`] provides a small default table for the
//! CLI and tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::portfolio::CropCategory;

/// Agronomic and market constants for one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub key: String,
    pub name: String,
    /// Pounds per percent-of-allocation on a 100 sq ft plot
    pub yield_multiplier: f64,
    /// Dollars per pound
    pub market_price: f64,
    /// Free-text planting-season hint, e.g. "early spring"
    pub planting_season: String,
    pub days_to_maturity: u32,
}

impl CropProfile {
    fn new(
        key: &str,
        name: &str,
        yield_multiplier: f64,
        market_price: f64,
        planting_season: &str,
        days_to_maturity: u32,
    ) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            yield_multiplier,
            market_price,
            planting_season: planting_season.to_string(),
            days_to_maturity,
        }
    }

    /// Offset in days from the last frost date implied by the planting hint
    #[must_use]
    pub fn planting_offset_days(&self) -> i32 {
        planting_offset_days(&self.planting_season)
    }
}

/// Interpret a planting-season hint as an offset from the last frost date.
///
/// First matching keyword wins; longer phrases are checked before the
/// shorter ones they contain.
#[must_use]
pub fn planting_offset_days(hint: &str) -> i32 {
    const KEYWORDS: [(&str, i32); 10] = [
        ("late winter", -42),
        ("early spring", -21),
        ("late spring", 21),
        ("late summer", 120),
        ("summer", 60),
        ("autumn", 150),
        ("fall", 150),
        ("after last frost", 14),
        ("after frost", 14),
        ("spring", 0),
    ];
    const UNKNOWN_HINT_OFFSET: i32 = 7;

    let hint = hint.to_ascii_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| hint.contains(keyword))
        .map_or(UNKNOWN_HINT_OFFSET, |(_, offset)| *offset)
}

/// Crops available per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropCatalog(BTreeMap<CropCategory, Vec<CropProfile>>);

impl CropCatalog {
    #[must_use]
    pub fn new(crops: BTreeMap<CropCategory, Vec<CropProfile>>) -> Self {
        Self(crops)
    }

    /// Crops listed under a category, empty when the category is unknown
    #[must_use]
    pub fn crops(&self, category: CropCategory) -> &[CropProfile] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Average yield multiplier over the category's crops
    #[must_use]
    pub fn yield_multiplier(&self, category: CropCategory) -> f64 {
        mean_of(self.crops(category), |c| c.yield_multiplier)
    }

    /// Average market price over the category's crops
    #[must_use]
    pub fn market_price(&self, category: CropCategory) -> f64 {
        mean_of(self.crops(category), |c| c.market_price)
    }

    /// Default reference table for a warm-climate home garden
    #[must_use]
    pub fn builtin() -> Self {
        let mut crops = BTreeMap::new();
        crops.insert(
            CropCategory::HeatTolerant,
            vec![
                CropProfile::new("okra", "Okra", 1.2, 3.5, "after last frost", 60),
                CropProfile::new("peppers", "Hot Peppers", 1.0, 4.0, "late spring", 75),
                CropProfile::new("southern_peas", "Southern Peas", 1.1, 2.5, "summer", 65),
                CropProfile::new("sweet_potato", "Sweet Potato", 1.5, 2.0, "late spring", 110),
            ],
        );
        crops.insert(
            CropCategory::CoolSeason,
            vec![
                CropProfile::new("lettuce", "Lettuce", 0.9, 3.0, "early spring", 45),
                CropProfile::new("kale", "Kale", 1.0, 3.5, "late winter", 55),
                CropProfile::new("broccoli", "Broccoli", 0.8, 3.0, "fall", 70),
                CropProfile::new("carrots", "Carrots", 1.1, 2.0, "early spring", 70),
            ],
        );
        crops.insert(
            CropCategory::Perennial,
            vec![
                CropProfile::new("rosemary", "Rosemary", 0.7, 8.0, "spring", 90),
                CropProfile::new("blackberries", "Blackberries", 0.6, 5.0, "late winter", 365),
                CropProfile::new("asparagus", "Asparagus", 0.4, 6.0, "early spring", 730),
            ],
        );
        Self(crops)
    }
}

fn mean_of(crops: &[CropProfile], field: impl Fn(&CropProfile) -> f64) -> f64 {
    if crops.is_empty() {
        return 0.0;
    }
    crops.iter().map(field).sum::<f64>() / crops.len() as f64
}
