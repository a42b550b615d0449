//! Sleep analyzers
//!
//! Session summary statistics (per-day totals, quality distribution) and the
//! two rule-based anomaly checks: day-over-day duration jumps and missed naps.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::stats::{mean, round_to};
use crate::types::{DataStatus, SleepSession};
use crate::window::WindowOutcome;

/// Sessions shorter than this many hours classify as Poor
pub const POOR_SLEEP_MAX_HOURS: f64 = 6.0;
/// Sessions longer than this many hours classify as Rich
pub const RICH_SLEEP_MIN_HOURS: f64 = 8.0;
/// Day-over-day total-duration change (minutes) that counts as a jump
pub const DURATION_JUMP_MINUTES: f64 = 90.0;
/// A nap starts within this hour range, inclusive on both ends
pub const NAP_START_HOURS: (u32, u32) = (12, 17);
/// A nap lasts at most this many minutes
pub const NAP_MAX_DURATION_MINUTES: f64 = 120.0;

/// Session quality class by duration in hours.
///
/// The cut points are fixed: the boundary values 6 and 8 both classify Good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Poor,
    Good,
    Rich,
}

/// Classify one session by its duration in hours
pub fn classify_quality(duration_hours: f64) -> SleepQuality {
    if duration_hours < POOR_SLEEP_MAX_HOURS {
        SleepQuality::Poor
    } else if duration_hours > RICH_SLEEP_MIN_HOURS {
        SleepQuality::Rich
    } else {
        SleepQuality::Good
    }
}

/// Summary statistics over windowed sleep sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSummaryReport {
    pub status: DataStatus,
    pub summary: String,
    pub days_analyzed: Option<u32>,
    pub total_sessions: Option<u32>,
    pub avg_hours_per_day: Option<f64>,
    pub avg_minutes_per_session: Option<f64>,
    pub quality_distribution: BTreeMap<SleepQuality, u32>,
    pub recommendation: String,
}

/// Anomaly flags over windowed sleep sessions. The two lists are computed
/// independently; a date can appear in one, both, or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepAnomalyReport {
    pub status: DataStatus,
    pub summary: String,
    pub duration_jump_days: Vec<String>,
    pub missed_nap_days: Vec<String>,
    pub recommendation: String,
}

/// Summarize sleep sessions: per-day totals, averages, quality distribution.
pub fn analyze_sessions(
    outcome: WindowOutcome<SleepSession>,
    lookback_days: Option<u32>,
) -> SleepSummaryReport {
    let events = match outcome {
        WindowOutcome::NoData => {
            return SleepSummaryReport {
                status: DataStatus::NoData,
                summary: "No sleep data found.".to_string(),
                days_analyzed: None,
                total_sessions: None,
                avg_hours_per_day: None,
                avg_minutes_per_session: None,
                quality_distribution: BTreeMap::new(),
                recommendation: "Please check for missing or unrecorded data.".to_string(),
            }
        }
        WindowOutcome::EmptyWindow { .. } => {
            return SleepSummaryReport {
                status: DataStatus::NoDataInWindow,
                summary: window_empty_message("sleep", lookback_days),
                days_analyzed: None,
                total_sessions: None,
                avg_hours_per_day: None,
                avg_minutes_per_session: None,
                quality_distribution: BTreeMap::new(),
                recommendation: "Please check for missing or unrecorded data.".to_string(),
            }
        }
        WindowOutcome::Data { events, .. } => events,
    };

    let daily = daily_totals_minutes(&events);
    let days = daily.len() as u32;
    let sessions = events.len() as u32;
    let total_hours: f64 = events.iter().map(|s| s.duration_minutes / 60.0).sum();

    let avg_hours_per_day = round_to(total_hours / f64::from(days), 2);
    let durations: Vec<f64> = events.iter().map(|s| s.duration_minutes).collect();
    let avg_minutes_per_session = round_to(mean(&durations).unwrap_or(0.0), 2);

    let mut quality_distribution: BTreeMap<SleepQuality, u32> = BTreeMap::new();
    for session in &events {
        let class = classify_quality(session.duration_minutes / 60.0);
        *quality_distribution.entry(class).or_insert(0) += 1;
    }

    let dominant = quality_distribution
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(class, _)| *class)
        .unwrap_or(SleepQuality::Good);

    SleepSummaryReport {
        status: DataStatus::Ok,
        summary: format!(
            "Analyzed {days} day(s) with {sessions} sleep session(s), \
             averaging {avg_hours_per_day} hours per day."
        ),
        days_analyzed: Some(days),
        total_sessions: Some(sessions),
        avg_hours_per_day: Some(avg_hours_per_day),
        avg_minutes_per_session: Some(avg_minutes_per_session),
        quality_distribution,
        recommendation: quality_recommendation(dominant).to_string(),
    }
}

/// Detect duration jumps and missed-nap days.
pub fn detect_anomalies(
    outcome: WindowOutcome<SleepSession>,
    lookback_days: Option<u32>,
) -> SleepAnomalyReport {
    let events = match outcome {
        WindowOutcome::NoData => {
            return empty_anomaly_report(DataStatus::NoData, "No sleep data found.".to_string())
        }
        WindowOutcome::EmptyWindow { .. } => {
            return empty_anomaly_report(
                DataStatus::NoDataInWindow,
                window_empty_message("sleep", lookback_days),
            )
        }
        WindowOutcome::Data { events, .. } => events,
    };

    let duration_jump_days = find_duration_jumps(&events);
    let missed_nap_days = find_missed_nap_days(&events);

    let summary = if duration_jump_days.is_empty() && missed_nap_days.is_empty() {
        "No sleep anomalies detected.".to_string()
    } else {
        format!(
            "{} day(s) with sleep duration jumps and {} missed-nap day(s) flagged.",
            duration_jump_days.len(),
            missed_nap_days.len()
        )
    };

    SleepAnomalyReport {
        status: DataStatus::Ok,
        summary,
        duration_jump_days,
        missed_nap_days,
        recommendation:
            "Review the flagged days against routine changes such as travel, illness, or growth spurts."
                .to_string(),
    }
}

/// Days whose total sleep differs from the previous observed day's total by
/// more than [`DURATION_JUMP_MINUTES`]; the later day is flagged.
fn find_duration_jumps(events: &[SleepSession]) -> Vec<String> {
    let daily = daily_totals_minutes(events);
    let totals: Vec<(&NaiveDate, &f64)> = daily.iter().collect();
    totals
        .windows(2)
        .filter(|pair| (pair[1].1 - pair[0].1).abs() > DURATION_JUMP_MINUTES)
        .map(|pair| pair[1].0.to_string())
        .collect()
}

/// Days with a nap count below half the mean nap count (floored at one).
///
/// Only days with at least one nap participate; with no naps anywhere the
/// result is simply empty.
fn find_missed_nap_days(events: &[SleepSession]) -> Vec<String> {
    let mut nap_counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for session in events {
        if is_nap(session) {
            *nap_counts
                .entry(session.start_time.date_naive())
                .or_insert(0) += 1;
        }
    }
    if nap_counts.is_empty() {
        return Vec::new();
    }

    let counts: Vec<f64> = nap_counts.values().map(|c| f64::from(*c)).collect();
    let nap_avg = mean(&counts).unwrap_or(0.0);
    let threshold = (nap_avg * 0.5).max(1.0);

    nap_counts
        .iter()
        .filter(|(_, count)| f64::from(**count) < threshold)
        .map(|(date, _)| date.to_string())
        .collect()
}

fn is_nap(session: &SleepSession) -> bool {
    let hour = session.start_time.hour();
    (NAP_START_HOURS.0..=NAP_START_HOURS.1).contains(&hour)
        && session.duration_minutes <= NAP_MAX_DURATION_MINUTES
}

/// Total sleep minutes per calendar date, date-ordered
fn daily_totals_minutes(events: &[SleepSession]) -> BTreeMap<NaiveDate, f64> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for session in events {
        *totals
            .entry(session.start_time.date_naive())
            .or_insert(0.0) += session.duration_minutes;
    }
    totals
}

fn empty_anomaly_report(status: DataStatus, summary: String) -> SleepAnomalyReport {
    SleepAnomalyReport {
        status,
        summary,
        duration_jump_days: Vec::new(),
        missed_nap_days: Vec::new(),
        recommendation: "Please check for missing or unrecorded data.".to_string(),
    }
}

fn window_empty_message(domain: &str, lookback_days: Option<u32>) -> String {
    match lookback_days {
        Some(days) => format!("No {domain} data found for the last {days} days."),
        None => format!("No valid {domain} data found."),
    }
}

fn quality_recommendation(dominant: SleepQuality) -> &'static str {
    match dominant {
        SleepQuality::Poor => {
            "Many sessions run short; consider an earlier wind-down and checking for disturbances."
        }
        SleepQuality::Good => "Session lengths look healthy; keep the current routine.",
        SleepQuality::Rich => {
            "Sessions run long; verify the schedule still leaves room for daytime activity."
        }
    }
}
