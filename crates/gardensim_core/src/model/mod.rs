mod calendar;
mod crops;
mod investment;
mod location;
mod portfolio;
mod results;
mod scenario;
mod weather;

pub use calendar::{
    Calendar, CalendarEvent, ConsensusCritical, ConsensusHarvest, ConsensusPlanting,
    CriticalEvent, CriticalEventKind, HarvestEvent, PlantingEvent, Priority,
    ProbabilisticCalendar, Severity, WeatherEvent, WeatherEventKind,
};
pub use crops::{CropCatalog, CropProfile, planting_offset_days};
pub use investment::{
    CategoryGuidance, CostCategory, GuidanceAction, Importance, InvestmentSufficiency,
    RequiredInvestment, SufficiencyLevel, SufficiencyStatus,
};
pub use location::LocationConfig;
pub use portfolio::{CropCategory, Portfolio};
pub use results::{
    CategoryParameters, HistogramBin, NormalParams, Percentiles, RealWeatherContext,
    RiskAssessment, RiskLevel, SimulationIteration, SimulationParameters, SimulationResult,
    Statistics, SummaryStats, WeatherRiskSummary,
};
pub use scenario::{ClimateFactors, ClimateScenario, SummerScenario, WinterScenario};
pub use weather::{CurrentConditions, DailyForecast, Temperature, WeatherForecast, WeatherSample};
