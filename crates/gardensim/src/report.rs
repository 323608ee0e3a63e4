//! Plain-text summary of a simulation result

use std::fmt::Write;

use gardensim_core::model::SimulationResult;

fn group_thousands(whole: u64) -> String {
    let digits = whole.to_string();
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a currency value
pub fn format_currency(value: f64) -> String {
    let total_cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && total_cents > 0 { "-" } else { "" };
    format!(
        "{}${}.{:02}",
        sign,
        group_thousands(total_cents / 100),
        total_cents % 100
    )
}

/// Format a value already expressed in percent
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Human-readable digest of the headline numbers
pub fn render_summary(result: &SimulationResult) -> String {
    let stats = &result.statistics;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Iterations:      {}", result.iterations.len());
    let _ = writeln!(out, "Mean net return: {}", format_currency(stats.mean));
    let _ = writeln!(out, "Median:          {}", format_currency(stats.median));
    let _ = writeln!(
        out,
        "P10 / P90:       {} / {}",
        format_currency(stats.percentiles.p10),
        format_currency(stats.percentiles.p90)
    );
    let _ = writeln!(out, "Mean ROI:        {}", format_percent(stats.roi.mean));
    let _ = writeln!(out, "Success rate:    {}", format_percent(stats.success_rate));
    let _ = writeln!(out, "Risk:            {:?}", result.risk.level);
    let _ = writeln!(out, "Weather risk:    {:?}", result.weather_risk.level);
    let _ = writeln!(
        out,
        "Investment:      {:?} ({} of {} required)",
        result.sufficiency.level,
        format_currency(result.sufficiency.actual),
        format_currency(result.sufficiency.required)
    );
    let _ = writeln!(out, "                 {}", result.sufficiency.message);

    if let Some(true) = result.used_real_weather {
        let _ = writeln!(
            out,
            "Forecast:        anchored (multiplier {:.2})",
            result.parameters.weather_multiplier.unwrap_or(1.0)
        );
    }

    let calendar = &result.probabilistic_calendar;
    if !calendar.planting.is_empty() {
        let _ = writeln!(out, "\nPlanting windows:");
        for p in &calendar.planting {
            let _ = writeln!(
                out,
                "  {:<16} {} ({} to {}), agreement {}",
                p.crop_name,
                p.optimal_date,
                p.early_date,
                p.late_date,
                format_percent(p.consensus_strength * 100.0)
            );
        }
    }
    if !calendar.critical.is_empty() {
        let _ = writeln!(out, "\nCritical actions:");
        for c in &calendar.critical {
            let _ = writeln!(
                out,
                "  {} [{:?}] {} (in {} of runs)",
                c.date,
                c.priority,
                c.description,
                format_percent(c.frequency * 100.0)
            );
        }
    }
    if result.diagnostics.is_degraded() {
        let _ = writeln!(
            out,
            "\nNote: some values fell back to defaults; see diagnostics in the JSON output."
        );
    }

    out
}
