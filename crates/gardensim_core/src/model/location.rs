use serde::{Deserialize, Serialize};

fn default_garden_area() -> f64 {
    LocationConfig::DEFAULT_GARDEN_AREA
}

fn default_heat_intensity() -> f64 {
    LocationConfig::DEFAULT_HEAT_INTENSITY
}

fn default_winter_severity() -> f64 {
    LocationConfig::DEFAULT_WINTER_SEVERITY
}

fn default_avg_rainfall() -> f64 {
    LocationConfig::DEFAULT_AVG_RAINFALL
}

/// Numeric climate descriptors for the garden site.
///
/// Absent fields deserialize to their defaults. Present but unusable values
/// (non-finite, zero or negative) are replaced by [`LocationConfig::sanitized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Planted area in square feet
    #[serde(default = "default_garden_area")]
    pub garden_area: f64,
    /// Heat intensity index, 3 is typical
    #[serde(default = "default_heat_intensity")]
    pub heat_intensity: f64,
    /// Winter severity index, 3 is typical
    #[serde(default = "default_winter_severity")]
    pub winter_severity: f64,
    /// Average annual rainfall in inches
    #[serde(default = "default_avg_rainfall")]
    pub avg_rainfall: f64,
    /// Identifier of the real-time forecast feed for this location, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_ref: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            garden_area: Self::DEFAULT_GARDEN_AREA,
            heat_intensity: Self::DEFAULT_HEAT_INTENSITY,
            winter_severity: Self::DEFAULT_WINTER_SEVERITY,
            avg_rainfall: Self::DEFAULT_AVG_RAINFALL,
            forecast_ref: None,
        }
    }
}

impl LocationConfig {
    pub const DEFAULT_GARDEN_AREA: f64 = 100.0;
    pub const DEFAULT_HEAT_INTENSITY: f64 = 3.0;
    pub const DEFAULT_WINTER_SEVERITY: f64 = 3.0;
    pub const DEFAULT_AVG_RAINFALL: f64 = 32.0;

    /// Garden-size multiplier relative to the 100 sq ft reference plot
    #[must_use]
    pub fn size_multiplier(&self) -> f64 {
        self.garden_area / 100.0
    }

    /// Replace unusable fields with defaults.
    ///
    /// Returns the cleaned config and the names of the fields that fell back,
    /// so callers can report the degraded path.
    #[must_use]
    pub fn sanitized(&self) -> (LocationConfig, Vec<&'static str>) {
        let mut fallbacks = Vec::new();
        let mut fix = |value: f64, default: f64, name: &'static str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallbacks.push(name);
                default
            }
        };

        let cleaned = LocationConfig {
            garden_area: fix(self.garden_area, Self::DEFAULT_GARDEN_AREA, "garden_area"),
            heat_intensity: fix(
                self.heat_intensity,
                Self::DEFAULT_HEAT_INTENSITY,
                "heat_intensity",
            ),
            winter_severity: fix(
                self.winter_severity,
                Self::DEFAULT_WINTER_SEVERITY,
                "winter_severity",
            ),
            avg_rainfall: fix(self.avg_rainfall, Self::DEFAULT_AVG_RAINFALL, "avg_rainfall"),
            forecast_ref: self.forecast_ref.clone(),
        };

        (cleaned, fallbacks)
    }
}
