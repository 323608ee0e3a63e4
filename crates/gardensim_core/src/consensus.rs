//! Probabilistic calendar synthesis.
//!
//! Folds the per-scenario calendars into one consensus calendar: events are
//! grouped by crop (or critical-event kind), each group is reduced to median
//! dates and mean confidence, and consensus strength measures how tightly the
//! scenarios agree. Only medians, means and counts are used, so the result
//! does not depend on iteration order.

use jiff::Timestamp;
use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::calendar::{
    HARVEST_LAST_DAYS, HARVEST_PEAK_DAYS, PLANTING_EARLY_DAYS, PLANTING_LATE_DAYS,
};
use crate::date_math::{add_days, days_between, median_date};
use crate::model::{
    Calendar, ConsensusCritical, ConsensusHarvest, ConsensusPlanting, CriticalEvent,
    CriticalEventKind, CropCategory, HarvestEvent, PlantingEvent, ProbabilisticCalendar,
};

/// Scenarios within this many days of the consensus date count as agreeing
pub const CONSENSUS_WINDOW_DAYS: i32 = 14;
/// Critical events seen in fewer scenarios than this share are dropped
pub const MIN_CRITICAL_FREQUENCY: f64 = 0.20;

type CropKey = (String, CropCategory);

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Fraction of `dates` within [`CONSENSUS_WINDOW_DAYS`] of `consensus`
#[must_use]
pub fn consensus_strength(dates: &[Date], consensus: Date) -> f64 {
    if dates.is_empty() {
        return 0.0;
    }
    let agreeing = dates
        .iter()
        .filter(|d| days_between(consensus, **d).abs() <= CONSENSUS_WINDOW_DAYS)
        .count();
    agreeing as f64 / dates.len() as f64
}

/// Median of the bounds that are present, or `fallback` when none are
fn bound(values: impl Iterator<Item = Option<Date>>, fallback: Date) -> Date {
    let present: Vec<Date> = values.flatten().collect();
    median_date(&present).unwrap_or(fallback)
}

fn group_by_crop<'a, T>(
    events: impl Iterator<Item = &'a T>,
    key: impl Fn(&T) -> CropKey,
) -> FxHashMap<CropKey, Vec<&'a T>>
where
    T: 'a,
{
    let mut groups: FxHashMap<CropKey, Vec<&'a T>> = FxHashMap::default();
    for event in events {
        groups.entry(key(event)).or_default().push(event);
    }
    groups
}

fn consensus_planting(group: &[&PlantingEvent]) -> Option<ConsensusPlanting> {
    let first = group.first()?;
    let dates: Vec<Date> = group.iter().map(|e| e.optimal_date).collect();
    let optimal = median_date(&dates)?;

    Some(ConsensusPlanting {
        crop_key: first.crop_key.clone(),
        crop_name: first.crop_name.clone(),
        category: first.category,
        optimal_date: optimal,
        early_date: bound(
            group.iter().map(|e| e.early_date),
            add_days(optimal, -PLANTING_EARLY_DAYS),
        ),
        late_date: bound(
            group.iter().map(|e| e.late_date),
            add_days(optimal, PLANTING_LATE_DAYS),
        ),
        confidence: mean(group.iter().map(|e| e.confidence)),
        consensus_strength: consensus_strength(&dates, optimal),
        scenario_count: group.len(),
    })
}

fn consensus_harvest(group: &[&HarvestEvent]) -> Option<ConsensusHarvest> {
    let first = group.first()?;
    let dates: Vec<Date> = group.iter().map(|e| e.first_harvest).collect();
    let first_harvest = median_date(&dates)?;

    Some(ConsensusHarvest {
        crop_key: first.crop_key.clone(),
        crop_name: first.crop_name.clone(),
        category: first.category,
        first_harvest,
        peak_harvest: bound(
            group.iter().map(|e| e.peak_harvest),
            add_days(first_harvest, HARVEST_PEAK_DAYS),
        ),
        last_harvest: bound(
            group.iter().map(|e| e.last_harvest),
            add_days(first_harvest, HARVEST_LAST_DAYS),
        ),
        confidence: mean(group.iter().map(|e| e.confidence)),
        consensus_strength: consensus_strength(&dates, first_harvest),
        scenario_count: group.len(),
    })
}

fn consensus_critical(
    kind: CriticalEventKind,
    group: &[&CriticalEvent],
    scenarios_with_kind: usize,
    total_scenarios: usize,
) -> Option<ConsensusCritical> {
    let dates: Vec<Date> = group.iter().map(|e| e.date).collect();
    let date = median_date(&dates)?;
    let priority = group.iter().map(|e| e.priority).max()?;

    Some(ConsensusCritical {
        kind,
        description: kind.description().to_string(),
        date,
        priority,
        confidence: mean(group.iter().map(|e| e.confidence)),
        consensus_strength: consensus_strength(&dates, date),
        frequency: scenarios_with_kind as f64 / total_scenarios as f64,
        scenario_count: scenarios_with_kind,
    })
}

/// Build the consensus calendar from every scenario's calendar
#[must_use]
pub fn synthesize_calendar<'a>(
    calendars: impl IntoIterator<Item = &'a Calendar>,
    generated_at: Timestamp,
) -> ProbabilisticCalendar {
    let calendars: Vec<&Calendar> = calendars.into_iter().collect();
    let total_scenarios = calendars.len();

    let planting_groups = group_by_crop(calendars.iter().flat_map(|c| &c.planting), |e| {
        (e.crop_key.clone(), e.category)
    });
    let mut planting: Vec<ConsensusPlanting> = planting_groups
        .values()
        .filter_map(|group| consensus_planting(group))
        .collect();
    planting.sort_by(|a, b| {
        (a.optimal_date, &a.crop_key, a.category).cmp(&(b.optimal_date, &b.crop_key, b.category))
    });

    let harvest_groups = group_by_crop(calendars.iter().flat_map(|c| &c.harvest), |e| {
        (e.crop_key.clone(), e.category)
    });
    let mut harvest: Vec<ConsensusHarvest> = harvest_groups
        .values()
        .filter_map(|group| consensus_harvest(group))
        .collect();
    harvest.sort_by(|a, b| {
        (a.first_harvest, &a.crop_key, a.category).cmp(&(b.first_harvest, &b.crop_key, b.category))
    });

    let mut critical_groups: FxHashMap<CriticalEventKind, (Vec<&CriticalEvent>, usize)> =
        FxHashMap::default();
    for calendar in &calendars {
        let mut seen: Vec<CriticalEventKind> = Vec::new();
        for event in &calendar.critical {
            let entry = critical_groups.entry(event.kind).or_default();
            entry.0.push(event);
            if !seen.contains(&event.kind) {
                seen.push(event.kind);
                entry.1 += 1;
            }
        }
    }

    let mut critical: Vec<ConsensusCritical> = Vec::new();
    for (kind, (group, scenarios)) in &critical_groups {
        let Some(consensus) = consensus_critical(*kind, group, *scenarios, total_scenarios) else {
            continue;
        };
        if consensus.frequency < MIN_CRITICAL_FREQUENCY {
            tracing::debug!(
                ?kind,
                frequency = consensus.frequency,
                "Dropping infrequent critical event"
            );
            continue;
        }
        critical.push(consensus);
    }
    critical.sort_by(|a, b| (a.date, a.kind).cmp(&(b.date, b.kind)));

    ProbabilisticCalendar {
        planting,
        harvest,
        critical,
        total_scenarios,
        generated_at,
    }
}
