//! Diaper analyzers
//!
//! Change frequency, content-type distribution, time-of-day distribution,
//! change intervals, and the two rule-based alert checks (consecutive big
//! poos, long gaps between changes).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::stats::{consecutive_gaps_hours, mean, round_to};
use crate::types::{DataStatus, DiaperChange, Level, SubjectId};
use crate::window::WindowOutcome;

/// Default number of equal-width time-of-day bands (6 bands of 4 hours)
pub const DEFAULT_TIMING_BINS: u32 = 6;
/// Default consecutive-big-poo run length that triggers an alert
pub const DEFAULT_BIG_POO_THRESHOLD: u32 = 2;
/// Default change gap in hours that triggers an alert
pub const DEFAULT_MAX_GAP_HOURS: f64 = 5.0;
/// A single band holding more than this share of changes reads as concentrated
pub const CONCENTRATION_THRESHOLD: f64 = 0.4;

/// Per-subject daily-average entry for grouped frequency reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDailyAverage {
    pub subject_id: Option<SubjectId>,
    pub avg_changes_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperFrequencyReport {
    pub status: DataStatus,
    pub summary: String,
    pub avg_changes_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_subject: Option<Vec<SubjectDailyAverage>>,
    pub pee_level_counts: BTreeMap<Level, u32>,
    pub poo_level_counts: BTreeMap<Level, u32>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperTypeReport {
    pub status: DataStatus,
    pub summary: String,
    pub pee_level_counts: BTreeMap<Level, u32>,
    pub poo_level_counts: BTreeMap<Level, u32>,
    pub recommendation: String,
}

/// One time-of-day band with its change count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingBandCount {
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingPattern {
    Concentrated,
    EvenlyDistributed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperTimingReport {
    pub status: DataStatus,
    pub summary: String,
    /// All bands in day order, including empty ones
    pub distribution: Vec<TimingBandCount>,
    pub peak_band: Option<String>,
    pub pattern: Option<TimingPattern>,
    pub recommendation: String,
}

/// Interval statistics, one entry per group (a single ungrouped entry when
/// `by_subject` is off)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    pub avg_interval_hours: Option<f64>,
    pub min_interval_hours: Option<f64>,
    pub max_interval_hours: Option<f64>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperIntervalReport {
    pub status: DataStatus,
    pub summary: String,
    pub interval_stats: Vec<IntervalStats>,
    pub recommendation: String,
}

/// A triggered alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiaperAlert {
    /// Running count of consecutive Big poo levels reached the threshold.
    /// Fires at every qualifying position while the run continues; the
    /// repeated warnings are deliberate.
    ConsecutiveBigPoo {
        /// 1-based position of the change in the windowed sequence
        position: u32,
        run_length: u32,
        message: String,
    },
    /// Gap between consecutive changes exceeded the hour threshold
    LongGap {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        gap_hours: f64,
        message: String,
    },
}

/// Thresholds for [`analyze_alerts`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiaperAlertConfig {
    pub big_poo_threshold: u32,
    pub max_gap_hours: f64,
}

impl Default for DiaperAlertConfig {
    fn default() -> Self {
        Self {
            big_poo_threshold: DEFAULT_BIG_POO_THRESHOLD,
            max_gap_hours: DEFAULT_MAX_GAP_HOURS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperAlertReport {
    pub status: DataStatus,
    pub summary: String,
    pub alerts: Vec<DiaperAlert>,
    pub recommendation: String,
}

/// Per-day change counts and pee/poo level distributions.
pub fn analyze_frequency(
    outcome: WindowOutcome<DiaperChange>,
    lookback_days: Option<u32>,
    by_subject: bool,
) -> DiaperFrequencyReport {
    let events = match split(outcome, lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return DiaperFrequencyReport {
                status,
                summary,
                avg_changes_per_day: None,
                per_subject: None,
                pee_level_counts: BTreeMap::new(),
                poo_level_counts: BTreeMap::new(),
                recommendation: "Please ensure there is diaper data available.".to_string(),
            }
        }
    };

    let (avg, per_subject) = if by_subject {
        let mut counts: BTreeMap<(Option<SubjectId>, NaiveDate), u32> = BTreeMap::new();
        for change in &events {
            *counts
                .entry((change.subject_id, change.start_time.date_naive()))
                .or_insert(0) += 1;
        }
        let mut per_subject_days: BTreeMap<Option<SubjectId>, Vec<f64>> = BTreeMap::new();
        for ((subject, _), count) in &counts {
            per_subject_days
                .entry(*subject)
                .or_default()
                .push(f64::from(*count));
        }
        let entries: Vec<SubjectDailyAverage> = per_subject_days
            .iter()
            .map(|(subject, day_counts)| SubjectDailyAverage {
                subject_id: *subject,
                avg_changes_per_day: round_to(mean(day_counts).unwrap_or(0.0), 1),
            })
            .collect();
        let averages: Vec<f64> = entries.iter().map(|e| e.avg_changes_per_day).collect();
        (mean(&averages).unwrap_or(0.0), Some(entries))
    } else {
        let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for change in &events {
            *counts.entry(change.start_time.date_naive()).or_insert(0) += 1;
        }
        let day_counts: Vec<f64> = counts.values().map(|c| f64::from(*c)).collect();
        (mean(&day_counts).unwrap_or(0.0), None)
    };
    let avg = round_to(avg, 1);

    let (pee_level_counts, poo_level_counts) = level_counts(&events);

    let scope = match lookback_days {
        Some(days) => format!("In the last {days} days"),
        None => "Across all recorded days".to_string(),
    };
    let suffix = if by_subject { " (by subject)" } else { "" };
    let summary =
        format!("{scope}, the average number of diaper changes per day is {avg}.{suffix}");

    DiaperFrequencyReport {
        status: DataStatus::Ok,
        summary,
        avg_changes_per_day: Some(avg),
        per_subject,
        pee_level_counts,
        poo_level_counts,
        recommendation:
            "Adjust care plans based on the change frequency and pee/poo volume distribution."
                .to_string(),
    }
}

/// Pee and poo level distributions, counted independently.
pub fn analyze_type(
    outcome: WindowOutcome<DiaperChange>,
    lookback_days: Option<u32>,
) -> DiaperTypeReport {
    let events = match split(outcome, lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return DiaperTypeReport {
                status,
                summary,
                pee_level_counts: BTreeMap::new(),
                poo_level_counts: BTreeMap::new(),
                recommendation: "Please ensure there is diaper content data.".to_string(),
            }
        }
    };

    let (pee_level_counts, poo_level_counts) = level_counts(&events);
    let pee_total: u32 = pee_level_counts.values().sum();
    let poo_total: u32 = poo_level_counts.values().sum();

    let scope = match lookback_days {
        Some(days) => format!("In the last {days} days"),
        None => "Across all recorded days".to_string(),
    };
    let summary = format!(
        "{scope}, there are {pee_total} records with pee and {poo_total} records with poo."
    );

    DiaperTypeReport {
        status: DataStatus::Ok,
        summary,
        pee_level_counts,
        poo_level_counts,
        recommendation:
            "Watch the distribution of pee/poo levels to catch abnormalities early.".to_string(),
    }
}

/// Time-of-day distribution over `bins` equal-width bands spanning 24 hours.
pub fn analyze_timing(
    outcome: WindowOutcome<DiaperChange>,
    lookback_days: Option<u32>,
    bins: u32,
) -> DiaperTimingReport {
    let bins = bins.max(1);
    let events = match split(outcome, lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return DiaperTimingReport {
                status,
                summary,
                distribution: Vec::new(),
                peak_band: None,
                pattern: None,
                recommendation: "Please ensure there is diaper data available.".to_string(),
            }
        }
    };

    let width = 24.0 / f64::from(bins);
    let mut counts = vec![0u32; bins as usize];
    for change in &events {
        let fractional_hour =
            f64::from(change.start_time.hour()) + f64::from(change.start_time.minute()) / 60.0;
        let idx = ((fractional_hour / width) as usize).min(bins as usize - 1);
        counts[idx] += 1;
    }

    let distribution: Vec<TimingBandCount> = counts
        .iter()
        .enumerate()
        .map(|(i, count)| TimingBandCount {
            label: band_label(i as u32, bins),
            count: *count,
        })
        .collect();

    let total: u32 = counts.iter().sum();
    // First band in day order wins ties
    let mut peak_idx = 0usize;
    for (i, count) in counts.iter().enumerate() {
        if *count > counts[peak_idx] {
            peak_idx = i;
        }
    }
    let concentration = f64::from(counts[peak_idx]) / f64::from(total.max(1));
    let pattern = if concentration > CONCENTRATION_THRESHOLD {
        TimingPattern::Concentrated
    } else {
        TimingPattern::EvenlyDistributed
    };
    let peak_band = band_label(peak_idx as u32, bins);

    let pattern_sentence = match pattern {
        TimingPattern::Concentrated => {
            format!("Change times are mainly concentrated in {peak_band}.")
        }
        TimingPattern::EvenlyDistributed => {
            "Change times are relatively evenly distributed.".to_string()
        }
    };
    let scope = match lookback_days {
        Some(days) => format!("over the last {days} days"),
        None => "across all recorded days".to_string(),
    };
    let summary = format!("Distribution of diaper change times {scope}: {pattern_sentence}");

    DiaperTimingReport {
        status: DataStatus::Ok,
        summary,
        distribution,
        peak_band: Some(peak_band),
        pattern: Some(pattern),
        recommendation:
            "Watch for concentration or irregularity in change times and arrange care accordingly."
                .to_string(),
    }
}

/// Gaps between consecutive changes in hours, optionally grouped by subject.
pub fn analyze_intervals(
    outcome: WindowOutcome<DiaperChange>,
    lookback_days: Option<u32>,
    by_subject: bool,
) -> DiaperIntervalReport {
    let events = match split(outcome, lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return DiaperIntervalReport {
                status,
                summary,
                interval_stats: Vec::new(),
                recommendation: "Please ensure there is diaper data available.".to_string(),
            }
        }
    };

    if events.len() < 2 {
        let summary = match lookback_days {
            Some(days) => format!(
                "Not enough diaper change records in the last {days} days to analyze intervals."
            ),
            None => "Not enough diaper change records to analyze intervals.".to_string(),
        };
        return DiaperIntervalReport {
            status: DataStatus::InsufficientSample,
            summary,
            interval_stats: Vec::new(),
            recommendation: "Please ensure the data contains enough diaper change information."
                .to_string(),
        };
    }

    let interval_stats: Vec<IntervalStats> = if by_subject {
        let mut groups: BTreeMap<Option<SubjectId>, Vec<DiaperChange>> = BTreeMap::new();
        for change in events {
            groups.entry(change.subject_id).or_default().push(change);
        }
        groups
            .into_iter()
            .map(|(subject, group)| gap_stats(subject, &group))
            .collect()
    } else {
        vec![gap_stats(None, &events)]
    };

    let summary = match interval_stats.iter().find_map(|s| s.avg_interval_hours) {
        Some(avg) => {
            format!("The average interval between diaper changes is about {avg} hours.")
        }
        None => "Unable to calculate valid change intervals.".to_string(),
    };

    DiaperIntervalReport {
        status: DataStatus::Ok,
        summary,
        interval_stats,
        recommendation:
            "Watch the change intervals to avoid gaps that are too long or too short.".to_string(),
    }
}

/// Rule-based alerts: consecutive big poos and long gaps between changes.
pub fn analyze_alerts(
    outcome: WindowOutcome<DiaperChange>,
    lookback_days: Option<u32>,
    config: DiaperAlertConfig,
) -> DiaperAlertReport {
    let events = match split(outcome, lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return DiaperAlertReport {
                status,
                summary,
                alerts: Vec::new(),
                recommendation: "Please ensure there is diaper data available.".to_string(),
            }
        }
    };

    let mut alerts = Vec::new();

    // Consecutive big poos: re-triggers at every position once the running
    // count reaches the threshold, so an ongoing run keeps warning.
    let mut run = 0u32;
    for (i, change) in events.iter().enumerate() {
        if change.poo == Some(Level::Big) {
            run += 1;
            if run >= config.big_poo_threshold {
                let position = i as u32 + 1;
                let message =
                    format!("Detected {run} consecutive big poos (at change #{position}).");
                warn!(position, run_length = run, "consecutive big poo alert");
                alerts.push(DiaperAlert::ConsecutiveBigPoo {
                    position,
                    run_length: run,
                    message,
                });
            }
        } else {
            run = 0;
        }
    }

    // Long gaps between consecutive changes
    for pair in events.windows(2) {
        let gap_hours = (pair[1].start_time - pair[0].start_time).num_seconds() as f64 / 3600.0;
        if gap_hours > config.max_gap_hours {
            let from = pair[0].start_time;
            let to = pair[1].start_time;
            let message = format!(
                "Interval from {} to {} exceeds {} hours (actual {:.1} hours).",
                from.format("%Y-%m-%d %H:%M:%S"),
                to.format("%Y-%m-%d %H:%M:%S"),
                config.max_gap_hours,
                gap_hours
            );
            warn!(gap_hours, "long diaper change gap");
            alerts.push(DiaperAlert::LongGap {
                from,
                to,
                gap_hours: round_to(gap_hours, 1),
                message,
            });
        }
    }

    let summary = if alerts.is_empty() {
        "No abnormalities detected.".to_string()
    } else {
        format!("{} alert(s) found.", alerts.len())
    };

    DiaperAlertReport {
        status: DataStatus::Ok,
        summary,
        alerts,
        recommendation: "Review the alerts and adjust care plans as needed.".to_string(),
    }
}

fn split(
    outcome: WindowOutcome<DiaperChange>,
    lookback_days: Option<u32>,
) -> Result<Vec<DiaperChange>, (DataStatus, String)> {
    match outcome {
        WindowOutcome::NoData => Err((
            DataStatus::NoData,
            "No diaper change records found.".to_string(),
        )),
        WindowOutcome::EmptyWindow { .. } => {
            let summary = match lookback_days {
                Some(days) => format!("No diaper change records in the last {days} days."),
                None => "No diaper change records found.".to_string(),
            };
            Err((DataStatus::NoDataInWindow, summary))
        }
        WindowOutcome::Data { events, .. } => Ok(events),
    }
}

fn level_counts(events: &[DiaperChange]) -> (BTreeMap<Level, u32>, BTreeMap<Level, u32>) {
    let mut pee: BTreeMap<Level, u32> = BTreeMap::new();
    let mut poo: BTreeMap<Level, u32> = BTreeMap::new();
    for change in events {
        if let Some(level) = change.pee {
            *pee.entry(level).or_insert(0) += 1;
        }
        if let Some(level) = change.poo {
            *poo.entry(level).or_insert(0) += 1;
        }
    }
    (pee, poo)
}

fn gap_stats(subject_id: Option<SubjectId>, group: &[DiaperChange]) -> IntervalStats {
    let gaps = consecutive_gaps_hours(group);
    if gaps.is_empty() {
        return IntervalStats {
            subject_id,
            avg_interval_hours: None,
            min_interval_hours: None,
            max_interval_hours: None,
            count: 0,
        };
    }
    let avg = mean(&gaps).unwrap_or(0.0);
    let min = gaps.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = gaps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    IntervalStats {
        subject_id,
        avg_interval_hours: Some(round_to(avg, 2)),
        min_interval_hours: Some(round_to(min, 2)),
        max_interval_hours: Some(round_to(max, 2)),
        count: gaps.len() as u32,
    }
}

/// Label for band `i` of `bins`: truncated integer edge hours, `HH:00-HH:00`
fn band_label(i: u32, bins: u32) -> String {
    let lo = 24.0 * f64::from(i) / f64::from(bins);
    let hi = 24.0 * f64::from(i + 1) / f64::from(bins);
    format!("{:02}:00-{:02}:00", lo as u32, hi as u32)
}
