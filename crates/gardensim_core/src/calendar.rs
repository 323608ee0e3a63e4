//! Per-scenario planting calendar.
//!
//! Each simulated weather sample produces one calendar: the last frost date
//! moves with the freeze count, planting windows hang off the frost date and
//! the crop's planting hint, harvest windows follow days-to-maturity adjusted
//! for stress, and stress thresholds raise critical tasks.

use jiff::civil::Date;

use crate::date_math::add_days;
use crate::model::{
    Calendar, CriticalEvent, CriticalEventKind, CropCatalog, CropCategory, CropProfile,
    HarvestEvent, LocationConfig, PlantingEvent, Portfolio, Priority, Severity, WeatherEvent,
    WeatherEventKind, WeatherSample,
};

/// Days before/after the optimal planting date that bound the window
pub const PLANTING_EARLY_DAYS: i32 = 7;
pub const PLANTING_LATE_DAYS: i32 = 14;
/// Days from first harvest to peak and last harvest
pub const HARVEST_PEAK_DAYS: i32 = 14;
pub const HARVEST_LAST_DAYS: i32 = 30;

const IRRIGATION_STRESS_DAYS: u32 = 15;
const PROTECTION_STRESS_DAYS: u32 = 30;
const FROST_WATCH_EVENTS: u32 = 12;

/// Rainfall outside this share of the location average counts as abnormal
const NORMAL_RAIN_BAND: (f64, f64) = (0.6, 1.4);

/// Baseline last frost date for the season's year
#[must_use]
pub fn baseline_last_frost(season_start: Date) -> Date {
    jiff::civil::date(season_start.year(), 3, 15)
}

/// Last frost date shifted by the simulated freeze count
#[must_use]
pub fn adjusted_last_frost(season_start: Date, freeze_events: u32) -> Date {
    let shift = match freeze_events {
        n if n > 15 => 14,
        n if n > 8 => 7,
        n if n < 3 => -7,
        _ => 0,
    };
    add_days(baseline_last_frost(season_start), shift)
}

fn rainfall_is_abnormal(weather: &WeatherSample, location: &LocationConfig) -> bool {
    let (low, high) = NORMAL_RAIN_BAND;
    let ratio = weather.annual_rainfall / location.avg_rainfall;
    !(low..=high).contains(&ratio)
}

fn planting_confidence(weather: &WeatherSample, location: &LocationConfig) -> f64 {
    let mut confidence: f64 = 0.85;
    if weather.heat_stress_days > 40 {
        confidence -= 0.20;
    } else if weather.heat_stress_days > 25 {
        confidence -= 0.10;
    }
    if weather.freeze_events > 15 {
        confidence -= 0.15;
    } else if weather.freeze_events > 8 {
        confidence -= 0.05;
    }
    if rainfall_is_abnormal(weather, location) {
        confidence -= 0.10;
    }
    confidence.clamp(0.3, 0.95)
}

fn harvest_confidence(weather: &WeatherSample, location: &LocationConfig) -> f64 {
    let mut confidence: f64 = 0.80;
    if weather.heat_stress_days > 30 {
        confidence -= 0.15;
    }
    if weather.freeze_events > 15 {
        confidence -= 0.10;
    }
    if rainfall_is_abnormal(weather, location) {
        confidence -= 0.05;
    }
    confidence.clamp(0.4, 0.9)
}

/// Optimal planting date for a crop in this simulated year
#[must_use]
pub fn optimal_planting_date(
    crop: &CropProfile,
    last_frost: Date,
    weather: &WeatherSample,
) -> Date {
    let mut offset = crop.planting_offset_days();
    if weather.heat_stress_days > 30 {
        offset -= 10;
    } else if weather.heat_stress_days > 15 {
        offset -= 5;
    }
    if weather.freeze_events > 15 {
        offset += 7;
    }
    add_days(last_frost, offset)
}

/// Days to maturity after heat and freeze stress.
///
/// Heat-tolerant crops mature faster in a hot year; everything else slows
/// down. A heavy freeze year slows every crop.
#[must_use]
pub fn adjusted_maturity_days(
    crop: &CropProfile,
    category: CropCategory,
    weather: &WeatherSample,
) -> i32 {
    let mut days = f64::from(crop.days_to_maturity);
    if weather.heat_stress_days > 20 {
        days *= match category {
            CropCategory::HeatTolerant => 0.9,
            CropCategory::CoolSeason | CropCategory::Perennial => 1.15,
        };
    }
    if weather.freeze_events > 10 {
        days *= 1.10;
    }
    days.round() as i32
}

fn critical_events(
    weather: &WeatherSample,
    season_start: Date,
    last_frost: Date,
) -> Vec<CriticalEvent> {
    let mut events = Vec::new();
    if weather.heat_stress_days > IRRIGATION_STRESS_DAYS {
        events.push(CriticalEvent {
            kind: CriticalEventKind::IrrigationAssessment,
            date: add_days(season_start, 45),
            priority: Priority::High,
            confidence: 0.85,
        });
    }
    if weather.heat_stress_days > PROTECTION_STRESS_DAYS {
        events.push(CriticalEvent {
            kind: CriticalEventKind::ProtectionDeployment,
            date: add_days(season_start, 60),
            priority: Priority::Critical,
            confidence: 0.90,
        });
    }
    if weather.freeze_events > FROST_WATCH_EVENTS {
        events.push(CriticalEvent {
            kind: CriticalEventKind::FrostProtection,
            date: add_days(last_frost, -14),
            priority: Priority::Medium,
            confidence: 0.75,
        });
    }
    events
}

/// Categorical summary of the year's notable weather
#[must_use]
pub fn classify_weather(weather: &WeatherSample, location: &LocationConfig) -> Vec<WeatherEvent> {
    let mut events = Vec::new();
    let mut push = |kind, severity| events.push(WeatherEvent { kind, severity });

    if weather.heat_stress_days > 30 {
        push(WeatherEventKind::ExtremeHeat, Severity::High);
    } else if weather.heat_stress_days > 15 {
        push(WeatherEventKind::ExtremeHeat, Severity::Moderate);
    }
    if weather.freeze_events > 15 {
        push(WeatherEventKind::HardFreeze, Severity::High);
    } else if weather.freeze_events > 8 {
        push(WeatherEventKind::HardFreeze, Severity::Moderate);
    }

    let rain_ratio = weather.annual_rainfall / location.avg_rainfall;
    if rain_ratio < 0.4 {
        push(WeatherEventKind::Drought, Severity::High);
    } else if rain_ratio < NORMAL_RAIN_BAND.0 {
        push(WeatherEventKind::Drought, Severity::Moderate);
    } else if rain_ratio > NORMAL_RAIN_BAND.1 {
        push(WeatherEventKind::ExcessRain, Severity::Moderate);
    }
    events
}

/// Build the calendar for one simulated weather sample
#[must_use]
pub fn generate_calendar(
    portfolio: &Portfolio,
    weather: &WeatherSample,
    location: &LocationConfig,
    catalog: &CropCatalog,
    season_start: Date,
) -> Calendar {
    let last_frost = adjusted_last_frost(season_start, weather.freeze_events);
    let plant_conf = planting_confidence(weather, location);
    let harvest_conf = harvest_confidence(weather, location);

    let mut planting = Vec::new();
    let mut harvest = Vec::new();

    for (category, _) in portfolio.active() {
        for crop in catalog.crops(category) {
            let optimal = optimal_planting_date(crop, last_frost, weather);
            planting.push(PlantingEvent {
                crop_key: crop.key.clone(),
                crop_name: crop.name.clone(),
                category,
                optimal_date: optimal,
                early_date: Some(add_days(optimal, -PLANTING_EARLY_DAYS)),
                late_date: Some(add_days(optimal, PLANTING_LATE_DAYS)),
                confidence: plant_conf,
            });

            let first = add_days(optimal, adjusted_maturity_days(crop, category, weather));
            harvest.push(HarvestEvent {
                crop_key: crop.key.clone(),
                crop_name: crop.name.clone(),
                category,
                first_harvest: first,
                peak_harvest: Some(add_days(first, HARVEST_PEAK_DAYS)),
                last_harvest: Some(add_days(first, HARVEST_LAST_DAYS)),
                confidence: harvest_conf,
            });
        }
    }

    Calendar {
        last_frost: Some(last_frost),
        planting,
        harvest,
        critical: critical_events(weather, season_start, last_frost),
        weather_events: classify_weather(weather, location),
    }
}
