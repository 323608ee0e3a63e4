//! Planting calendar records, per simulated scenario and in consensus form.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::portfolio::CropCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantingEvent {
    pub crop_key: String,
    pub crop_name: String,
    pub category: CropCategory,
    pub optimal_date: Date,
    pub early_date: Option<Date>,
    pub late_date: Option<Date>,
    /// 0-1
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestEvent {
    pub crop_key: String,
    pub crop_name: String,
    pub category: CropCategory,
    pub first_harvest: Date,
    pub peak_harvest: Option<Date>,
    pub last_harvest: Option<Date>,
    pub confidence: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CriticalEventKind {
    IrrigationAssessment,
    ProtectionDeployment,
    FrostProtection,
}

impl CriticalEventKind {
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            CriticalEventKind::IrrigationAssessment => {
                "Assess irrigation capacity ahead of sustained heat stress"
            }
            CriticalEventKind::ProtectionDeployment => {
                "Deploy shade cloth and heat protection for sensitive crops"
            }
            CriticalEventKind::FrostProtection => {
                "Stage frost covers before the late freeze window"
            }
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalEvent {
    pub kind: CriticalEventKind,
    pub date: Date,
    pub priority: Priority,
    pub confidence: f64,
}

/// Any dated calendar entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarEvent {
    Planting(PlantingEvent),
    Harvest(HarvestEvent),
    Critical(CriticalEvent),
}

impl CalendarEvent {
    /// The anchor date used for chronological ordering
    #[must_use]
    pub fn date(&self) -> Date {
        match self {
            CalendarEvent::Planting(e) => e.optimal_date,
            CalendarEvent::Harvest(e) => e.first_harvest,
            CalendarEvent::Critical(e) => e.date,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WeatherEventKind {
    ExtremeHeat,
    HardFreeze,
    Drought,
    ExcessRain,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Moderate,
    High,
}

/// Categorical summary of one simulated year's notable weather
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherEvent {
    pub kind: WeatherEventKind,
    pub severity: Severity,
}

/// Calendar derived from one simulated weather sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub last_frost: Option<Date>,
    pub planting: Vec<PlantingEvent>,
    pub harvest: Vec<HarvestEvent>,
    pub critical: Vec<CriticalEvent>,
    pub weather_events: Vec<WeatherEvent>,
}

impl Calendar {
    /// All dated entries in chronological order
    #[must_use]
    pub fn events(&self) -> Vec<CalendarEvent> {
        let mut events: Vec<CalendarEvent> = self
            .planting
            .iter()
            .cloned()
            .map(CalendarEvent::Planting)
            .chain(self.harvest.iter().cloned().map(CalendarEvent::Harvest))
            .chain(self.critical.iter().cloned().map(CalendarEvent::Critical))
            .collect();
        events.sort_by_key(CalendarEvent::date);
        events
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPlanting {
    pub crop_key: String,
    pub crop_name: String,
    pub category: CropCategory,
    pub optimal_date: Date,
    pub early_date: Date,
    pub late_date: Date,
    pub confidence: f64,
    /// Fraction of scenarios within the consensus window
    pub consensus_strength: f64,
    pub scenario_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusHarvest {
    pub crop_key: String,
    pub crop_name: String,
    pub category: CropCategory,
    pub first_harvest: Date,
    pub peak_harvest: Date,
    pub last_harvest: Date,
    pub confidence: f64,
    pub consensus_strength: f64,
    pub scenario_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusCritical {
    pub kind: CriticalEventKind,
    pub description: String,
    pub date: Date,
    pub priority: Priority,
    pub confidence: f64,
    pub consensus_strength: f64,
    /// Share of all simulated scenarios in which the event occurs
    pub frequency: f64,
    pub scenario_count: usize,
}

/// Consensus calendar across every simulated scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticCalendar {
    pub planting: Vec<ConsensusPlanting>,
    pub harvest: Vec<ConsensusHarvest>,
    pub critical: Vec<ConsensusCritical>,
    pub total_scenarios: usize,
    pub generated_at: Timestamp,
}
