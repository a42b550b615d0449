//! Feed analyzers
//!
//! Volume, interval, time-of-day, consistency, and type-ratio metrics over
//! milliliter-extracted feed events.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::stats::{coefficient_of_variation, consecutive_gaps_hours, mean, round_to, sample_std_dev};
use crate::types::{DataStatus, FeedEvent, FeedType};
use crate::window::WindowOutcome;

/// Mean intake below this many ml per feed reads as low
pub const LOW_INTAKE_ML: f64 = 90.0;
/// Mean intake above this many ml per feed reads as high
pub const HIGH_INTAKE_ML: f64 = 150.0;
/// Coefficient-of-variation cut below which a series counts as regular
pub const CV_REGULAR_MAX: f64 = 0.2;
/// Coefficient-of-variation cut above which a series counts as irregular
pub const CV_IRREGULAR_MIN: f64 = 0.5;
/// Interval std dev (hours) below which the schedule reads as very regular
pub const STD_VERY_REGULAR_MAX_HOURS: f64 = 1.0;
/// Interval std dev (hours) above which the schedule reads as irregular
pub const STD_IRREGULAR_MIN_HOURS: f64 = 3.0;

/// Fixed time-of-day bands by start hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBand {
    Morning,
    Noon,
    Evening,
    Night,
}

impl TimeBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBand::Morning => "morning",
            TimeBand::Noon => "noon",
            TimeBand::Evening => "evening",
            TimeBand::Night => "night",
        }
    }
}

/// Band for an event's start hour: morning 6–9, noon 10–13, evening 17–19,
/// night otherwise.
pub fn time_band(hour: u32) -> TimeBand {
    match hour {
        6..=9 => TimeBand::Morning,
        10..=13 => TimeBand::Noon,
        17..=19 => TimeBand::Evening,
        _ => TimeBand::Night,
    }
}

/// Variability class for a coefficient of variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariabilityClass {
    Regular,
    Moderate,
    Irregular,
}

/// Classify a CV at the fixed 0.2 / 0.5 cut points
pub fn classify_cv(cv: f64) -> VariabilityClass {
    if cv < CV_REGULAR_MAX {
        VariabilityClass::Regular
    } else if cv > CV_IRREGULAR_MIN {
        VariabilityClass::Irregular
    } else {
        VariabilityClass::Moderate
    }
}

/// Direction of the breast-milk share between the first and last observed day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedVolumeReport {
    pub status: DataStatus,
    pub summary: String,
    pub total_volume_ml: Option<u64>,
    pub average_volume_per_feed: Option<f64>,
    pub feeds_per_day: Option<f64>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedIntervalReport {
    pub status: DataStatus,
    pub summary: String,
    pub average_interval_hours: Option<f64>,
    pub min_interval_hours: Option<f64>,
    pub max_interval_hours: Option<f64>,
    pub std_dev_hours: Option<f64>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedTimeOfDayReport {
    pub status: DataStatus,
    pub summary: String,
    /// Percentage share of feeds per band, only bands that occurred
    pub peak_periods: BTreeMap<TimeBand, f64>,
    pub peak_period: Option<TimeBand>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConsistencyReport {
    pub status: DataStatus,
    pub summary: String,
    pub time_variability_cv: Option<f64>,
    pub volume_variability_cv: Option<f64>,
    pub time_pattern: Option<VariabilityClass>,
    pub volume_pattern: Option<VariabilityClass>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedTypeRatioReport {
    pub status: DataStatus,
    pub summary: String,
    pub breast_milk_ratio: Option<f64>,
    pub formula_milk_ratio: Option<f64>,
    pub trend: Option<TrendDirection>,
    pub recommendation: String,
}

const CHECK_DATA_RECOMMENDATION: &str = "Please check for missing or unrecorded data.";

/// Total and per-feed volume statistics with intake guidance.
///
/// `feeds_per_day` divides the feed count by the *requested* lookback when one
/// is given, not by the number of observed days, and is the raw count
/// otherwise.
pub fn analyze_volume(
    outcome: WindowOutcome<FeedEvent>,
    lookback_days: Option<u32>,
) -> FeedVolumeReport {
    let events = match split(outcome, "feeding records", lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return FeedVolumeReport {
                status,
                summary,
                total_volume_ml: None,
                average_volume_per_feed: None,
                feeds_per_day: None,
                recommendation: CHECK_DATA_RECOMMENDATION.to_string(),
            }
        }
    };

    let total: u64 = events.iter().map(|e| u64::from(e.volume_ml)).sum();
    let count = events.len();
    let volumes: Vec<f64> = events.iter().map(|e| f64::from(e.volume_ml)).collect();
    let avg = mean(&volumes).unwrap_or(0.0);
    let feeds_per_day = match lookback_days {
        Some(days) if days > 0 => round_to(count as f64 / f64::from(days), 2),
        _ => count as f64,
    };

    let recommendation = if avg < LOW_INTAKE_ML {
        "The intake per feed is relatively small. Consider checking for weak sucking or overly short intervals between feeds."
    } else if avg > HIGH_INTAKE_ML {
        "The intake per feed is relatively large. Watch for signs of vomiting or bloating."
    } else {
        "The milk intake per feed is within a healthy range. You can maintain the current feeding strategy."
    };

    let summary = match lookback_days {
        Some(days) => format!(
            "In the past {days} days, {count} feeds were recorded with a total intake of \
             {total} ml, averaging {avg:.1} ml per feed."
        ),
        None => format!(
            "A total of {count} feeds were recorded with {total} ml intake, \
             averaging {avg:.1} ml per feed."
        ),
    };

    FeedVolumeReport {
        status: DataStatus::Ok,
        summary,
        total_volume_ml: Some(total),
        average_volume_per_feed: Some(round_to(avg, 1)),
        feeds_per_day: Some(feeds_per_day),
        recommendation: recommendation.to_string(),
    }
}

/// Gaps between consecutive feeds in hours: mean, min, max, sample std dev.
pub fn analyze_intervals(
    outcome: WindowOutcome<FeedEvent>,
    lookback_days: Option<u32>,
) -> FeedIntervalReport {
    let events = match split(outcome, "feeding records", lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => return insufficient_intervals(status, summary),
    };

    if events.len() < 2 {
        let summary = match lookback_days {
            Some(days) => {
                format!("Too few feeding records in the last {days} days to calculate intervals.")
            }
            None => "Too few feeding records to calculate intervals.".to_string(),
        };
        return insufficient_intervals(DataStatus::InsufficientSample, summary);
    }

    let intervals = consecutive_gaps_hours(&events);
    let avg = mean(&intervals).unwrap_or(0.0);
    let min = intervals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = intervals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = sample_std_dev(&intervals);

    let recommendation = match std_dev {
        Some(sd) if sd < STD_VERY_REGULAR_MAX_HOURS => "Feeding intervals are very regular.",
        Some(sd) if sd > STD_IRREGULAR_MIN_HOURS => {
            "Feeding intervals vary widely, possibly due to an inconsistent schedule or missing records."
        }
        _ => "Feeding intervals fluctuate moderately, which is generally normal.",
    };

    let summary = match lookback_days {
        Some(days) => format!(
            "On average, feeding occurs every {avg:.1} hours \
             (min {min:.1} hours, max {max:.1} hours) in the last {days} days."
        ),
        None => format!(
            "On average, feeding occurs every {avg:.1} hours \
             (min {min:.1} hours, max {max:.1} hours)."
        ),
    };

    FeedIntervalReport {
        status: DataStatus::Ok,
        summary,
        average_interval_hours: Some(round_to(avg, 1)),
        min_interval_hours: Some(round_to(min, 1)),
        max_interval_hours: Some(round_to(max, 1)),
        std_dev_hours: std_dev.map(|sd| round_to(sd, 2)),
        recommendation: recommendation.to_string(),
    }
}

/// Percentage share of feeds per time-of-day band and the modal band.
pub fn analyze_time_of_day(
    outcome: WindowOutcome<FeedEvent>,
    lookback_days: Option<u32>,
) -> FeedTimeOfDayReport {
    let events = match split(outcome, "feeding records", lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => {
            return FeedTimeOfDayReport {
                status,
                summary,
                peak_periods: BTreeMap::new(),
                peak_period: None,
                recommendation: CHECK_DATA_RECOMMENDATION.to_string(),
            }
        }
    };

    let mut counts: BTreeMap<TimeBand, u32> = BTreeMap::new();
    for event in &events {
        *counts.entry(time_band(event.start_time.hour())).or_insert(0) += 1;
    }
    let total = events.len() as f64;

    let peak_periods: BTreeMap<TimeBand, f64> = counts
        .iter()
        .map(|(band, count)| (*band, round_to(f64::from(*count) / total * 100.0, 1)))
        .collect();

    // First band in day order wins ties
    let mut peak_period: Option<TimeBand> = None;
    let mut peak_share = f64::NEG_INFINITY;
    for (band, share) in &peak_periods {
        if *share > peak_share {
            peak_share = *share;
            peak_period = Some(*band);
        }
    }

    let distribution = peak_periods
        .iter()
        .map(|(band, pct)| format!("{} {pct}%", band.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let summary = match lookback_days {
        Some(days) => format!("Feeding time distribution over the past {days} days: {distribution}."),
        None => format!("Feeding time distribution: {distribution}."),
    };

    let recommendation = match peak_period {
        Some(TimeBand::Night) => format!(
            "Feeding concentrates in the {} period ({}% of feeds). If night feedings are frequent, \
             consider improving the sleep environment to reduce disturbances.",
            TimeBand::Night.as_str(),
            peak_periods[&TimeBand::Night]
        ),
        Some(band) => format!(
            "Feeding concentrates in the {} period ({}% of feeds). Consider aligning the \
             feeding schedule with this peak to avoid excessive hunger.",
            band.as_str(),
            peak_periods[&band]
        ),
        None => CHECK_DATA_RECOMMENDATION.to_string(),
    };

    FeedTimeOfDayReport {
        status: DataStatus::Ok,
        summary,
        peak_periods,
        peak_period,
        recommendation,
    }
}

/// Coefficient of variation for inter-feed intervals and volumes.
pub fn analyze_consistency(
    outcome: WindowOutcome<FeedEvent>,
    lookback_days: Option<u32>,
) -> FeedConsistencyReport {
    let events = match split(outcome, "feeding records", lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => return insufficient_consistency(status, summary),
    };

    if events.len() < 2 {
        let summary = match lookback_days {
            Some(days) => format!(
                "Insufficient feeding records in the last {days} days to calculate variability."
            ),
            None => "Insufficient feeding records to calculate variability.".to_string(),
        };
        return insufficient_consistency(DataStatus::InsufficientSample, summary);
    }

    let intervals = consecutive_gaps_hours(&events);
    let volumes: Vec<f64> = events.iter().map(|e| f64::from(e.volume_ml)).collect();

    let time_cv = coefficient_of_variation(&intervals);
    let volume_cv = coefficient_of_variation(&volumes);
    let time_pattern = time_cv.map(classify_cv);
    let volume_pattern = volume_cv.map(classify_cv);

    let summary = match lookback_days {
        Some(days) => format!("Feeding time and volume variability analysis for the last {days} days."),
        None => "Feeding time and volume variability analysis.".to_string(),
    };

    let recommendation = format!(
        "Interval variability: {}. Volume variability: {}. If variability is large, observe \
         feeding habits and consult a pediatrician if necessary.",
        pattern_phrase(time_pattern),
        pattern_phrase(volume_pattern)
    );

    FeedConsistencyReport {
        status: DataStatus::Ok,
        summary,
        time_variability_cv: time_cv.map(|cv| round_to(cv, 3)),
        volume_variability_cv: volume_cv.map(|cv| round_to(cv, 3)),
        time_pattern,
        volume_pattern,
        recommendation,
    }
}

/// Breast-milk versus formula shares among type-resolved feeds, with the
/// first-versus-last-day trend of the breast-milk ratio.
pub fn analyze_type_ratio(
    outcome: WindowOutcome<FeedEvent>,
    lookback_days: Option<u32>,
) -> FeedTypeRatioReport {
    let events = match split(outcome, "feeding records", lookback_days) {
        Ok(events) => events,
        Err((status, summary)) => return no_type_ratio(status, summary),
    };

    let typed: Vec<&FeedEvent> = events.iter().filter(|e| e.feed_type.is_some()).collect();
    if typed.is_empty() {
        let summary = match lookback_days {
            Some(days) => format!("No feeding type records found in the last {days} days."),
            None => "No feeding type records found.".to_string(),
        };
        return no_type_ratio(DataStatus::NoDataInWindow, summary);
    }

    let total = typed.len() as f64;
    let breast = typed
        .iter()
        .filter(|e| e.feed_type == Some(FeedType::BreastMilk))
        .count() as f64;
    let formula = typed
        .iter()
        .filter(|e| e.feed_type == Some(FeedType::FormulaMilk))
        .count() as f64;

    let breast_ratio = breast / total;
    let formula_ratio = formula / total;

    // Per-day breast share, trend taken from the first and last observed days
    let mut daily: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for event in &typed {
        let entry = daily.entry(event.start_time.date_naive()).or_insert((0, 0));
        entry.1 += 1;
        if event.feed_type == Some(FeedType::BreastMilk) {
            entry.0 += 1;
        }
    }
    let day_ratios: Vec<f64> = daily
        .values()
        .map(|(breast, total)| f64::from(*breast) / f64::from(*total))
        .collect();
    let trend = match (day_ratios.first(), day_ratios.last()) {
        (Some(first), Some(last)) if daily.len() >= 2 && last > first => TrendDirection::Increasing,
        (Some(first), Some(last)) if daily.len() >= 2 && last < first => TrendDirection::Decreasing,
        _ => TrendDirection::Flat,
    };

    let trend_sentence = match trend {
        TrendDirection::Increasing => "Breast milk ratio shows an increasing trend.",
        TrendDirection::Decreasing => "Breast milk ratio shows a decreasing trend.",
        TrendDirection::Flat => "No significant change in breast milk ratio.",
    };

    let summary = format!(
        "The breast milk ratio is approximately {:.0}% and the formula milk ratio \
         approximately {:.0}%. {trend_sentence}",
        breast_ratio * 100.0,
        formula_ratio * 100.0
    );

    FeedTypeRatioReport {
        status: DataStatus::Ok,
        summary,
        breast_milk_ratio: Some(round_to(breast_ratio, 2)),
        formula_milk_ratio: Some(round_to(formula_ratio, 2)),
        trend: Some(trend),
        recommendation: "Adjust the mixed feeding strategy according to the ratios.".to_string(),
    }
}

/// Shared degenerate-case handling: `Err` carries status and summary for
/// NoData / NoDataInWindow.
fn split(
    outcome: WindowOutcome<FeedEvent>,
    noun: &str,
    lookback_days: Option<u32>,
) -> Result<Vec<FeedEvent>, (DataStatus, String)> {
    match outcome {
        WindowOutcome::NoData => Err((DataStatus::NoData, format!("No {noun} found."))),
        WindowOutcome::EmptyWindow { .. } => {
            let summary = match lookback_days {
                Some(days) => format!("No {noun} found in the last {days} days."),
                None => format!("No {noun} found."),
            };
            Err((DataStatus::NoDataInWindow, summary))
        }
        WindowOutcome::Data { events, .. } => Ok(events),
    }
}

fn insufficient_intervals(status: DataStatus, summary: String) -> FeedIntervalReport {
    FeedIntervalReport {
        status,
        summary,
        average_interval_hours: None,
        min_interval_hours: None,
        max_interval_hours: None,
        std_dev_hours: None,
        recommendation: CHECK_DATA_RECOMMENDATION.to_string(),
    }
}

fn insufficient_consistency(status: DataStatus, summary: String) -> FeedConsistencyReport {
    FeedConsistencyReport {
        status,
        summary,
        time_variability_cv: None,
        volume_variability_cv: None,
        time_pattern: None,
        volume_pattern: None,
        recommendation: "Please ensure data completeness.".to_string(),
    }
}

fn no_type_ratio(status: DataStatus, summary: String) -> FeedTypeRatioReport {
    FeedTypeRatioReport {
        status,
        summary,
        breast_milk_ratio: None,
        formula_milk_ratio: None,
        trend: None,
        recommendation: "Ensure feeding records include breast milk or formula milk information."
            .to_string(),
    }
}

fn pattern_phrase(pattern: Option<VariabilityClass>) -> &'static str {
    match pattern {
        Some(VariabilityClass::Regular) => "regular",
        Some(VariabilityClass::Moderate) => "moderate",
        Some(VariabilityClass::Irregular) => "irregular",
        None => "undetermined",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::select_window;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn feed(day: u32, hour: u32, volume_ml: u32) -> FeedEvent {
        FeedEvent {
            start_time: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            volume_ml,
            feed_type: None,
        }
    }

    fn typed(day: u32, hour: u32, feed_type: FeedType) -> FeedEvent {
        FeedEvent {
            feed_type: Some(feed_type),
            ..feed(day, hour, 100)
        }
    }

    fn windowed(events: Vec<FeedEvent>) -> WindowOutcome<FeedEvent> {
        select_window(events, None)
    }

    #[test]
    fn test_volume_totals() {
        let report = analyze_volume(
            windowed(vec![feed(1, 8, 120), feed(1, 12, 100), feed(2, 8, 110)]),
            None,
        );
        assert_eq!(report.status, DataStatus::Ok);
        assert_eq!(report.total_volume_ml, Some(330));
        assert_eq!(report.average_volume_per_feed, Some(110.0));
        // Without a lookback, feeds_per_day is the raw count
        assert_eq!(report.feeds_per_day, Some(3.0));
    }

    #[test]
    fn test_volume_feeds_per_day_divides_by_requested_lookback() {
        let events: Vec<FeedEvent> = (0..6).map(|i| feed(1, 2 + i * 3, 100)).collect();
        let report = analyze_volume(select_window(events, Some(3)), Some(3));
        // 6 feeds over a requested 3-day lookback, regardless of observed days
        assert_eq!(report.feeds_per_day, Some(2.0));
    }

    #[test]
    fn test_volume_guidance_bands() {
        let low = analyze_volume(windowed(vec![feed(1, 8, 60), feed(1, 12, 80)]), None);
        assert!(low.recommendation.contains("relatively small"));

        let healthy = analyze_volume(windowed(vec![feed(1, 8, 100), feed(1, 12, 120)]), None);
        assert!(healthy.recommendation.contains("healthy range"));

        let high = analyze_volume(windowed(vec![feed(1, 8, 180), feed(1, 12, 170)]), None);
        assert!(high.recommendation.contains("relatively large"));
    }

    #[test]
    fn test_interval_statistics() {
        // Feeds at 00:00, 03:00, 07:00 → gaps of 3 h and 4 h
        let report = analyze_intervals(
            windowed(vec![feed(1, 0, 100), feed(1, 3, 100), feed(1, 7, 100)]),
            None,
        );
        assert_eq!(report.status, DataStatus::Ok);
        assert_eq!(report.average_interval_hours, Some(3.5));
        assert_eq!(report.min_interval_hours, Some(3.0));
        assert_eq!(report.max_interval_hours, Some(4.0));
        // Sample std of [3, 4] = sqrt(0.5) ≈ 0.7071
        assert_eq!(report.std_dev_hours, Some(0.71));
        assert!(report.recommendation.contains("very regular"));
    }

    #[test]
    fn test_interval_regularity_bands() {
        // Gaps of 1 h and 9 h → sample std ≈ 5.66 > 3 → widely varying
        let report = analyze_intervals(
            windowed(vec![feed(1, 0, 100), feed(1, 1, 100), feed(1, 10, 100)]),
            None,
        );
        assert!(report.recommendation.contains("vary widely"));

        // Gaps of 3 h and 5 h → sample std ≈ 1.41 → moderate band
        let report = analyze_intervals(
            windowed(vec![feed(1, 0, 100), feed(1, 3, 100), feed(1, 8, 100)]),
            None,
        );
        assert!(report.recommendation.contains("moderately"));
    }

    #[test]
    fn test_interval_insufficient_sample_has_no_numbers() {
        for events in [vec![], vec![feed(1, 8, 100)]] {
            let report = analyze_intervals(select_window(events, None), None);
            assert_ne!(report.status, DataStatus::Ok);
            assert_eq!(report.average_interval_hours, None);
            assert_eq!(report.min_interval_hours, None);
            assert_eq!(report.max_interval_hours, None);
            assert_eq!(report.std_dev_hours, None);
        }
    }

    #[test]
    fn test_interval_single_gap_reports_no_std_dev() {
        // Two rows qualify, but one gap has no sample spread; no NaN may leak
        let report = analyze_intervals(windowed(vec![feed(1, 0, 100), feed(1, 4, 100)]), None);
        assert_eq!(report.status, DataStatus::Ok);
        assert_eq!(report.average_interval_hours, Some(4.0));
        assert_eq!(report.std_dev_hours, None);
    }

    #[test]
    fn test_time_band_boundaries() {
        assert_eq!(time_band(6), TimeBand::Morning);
        assert_eq!(time_band(9), TimeBand::Morning);
        assert_eq!(time_band(10), TimeBand::Noon);
        assert_eq!(time_band(13), TimeBand::Noon);
        assert_eq!(time_band(14), TimeBand::Night);
        assert_eq!(time_band(17), TimeBand::Evening);
        assert_eq!(time_band(19), TimeBand::Evening);
        assert_eq!(time_band(20), TimeBand::Night);
        assert_eq!(time_band(0), TimeBand::Night);
        assert_eq!(time_band(5), TimeBand::Night);
    }

    #[test]
    fn test_time_of_day_distribution() {
        let report = analyze_time_of_day(
            windowed(vec![
                feed(1, 7, 100),
                feed(1, 8, 100),
                feed(1, 11, 100),
                feed(1, 22, 100),
            ]),
            None,
        );
        assert_eq!(report.peak_periods[&TimeBand::Morning], 50.0);
        assert_eq!(report.peak_periods[&TimeBand::Noon], 25.0);
        assert_eq!(report.peak_periods[&TimeBand::Night], 25.0);
        assert_eq!(report.peak_period, Some(TimeBand::Morning));
    }

    #[test]
    fn test_consistency_classification() {
        // Evenly spaced, stable volumes → regular on both axes
        let regular = analyze_consistency(
            windowed(vec![feed(1, 0, 100), feed(1, 3, 110), feed(1, 6, 90)]),
            None,
        );
        assert_eq!(regular.time_variability_cv, Some(0.0));
        assert_eq!(regular.time_pattern, Some(VariabilityClass::Regular));
        assert_eq!(regular.volume_pattern, Some(VariabilityClass::Regular));

        // Widely varying volumes → irregular volume axis
        let irregular = analyze_consistency(
            windowed(vec![feed(1, 0, 50), feed(1, 3, 150), feed(1, 6, 250)]),
            None,
        );
        assert_eq!(irregular.volume_pattern, Some(VariabilityClass::Irregular));
    }

    #[test]
    fn test_consistency_insufficient_sample() {
        let report = analyze_consistency(windowed(vec![feed(1, 8, 100)]), Some(7));
        assert_eq!(report.status, DataStatus::InsufficientSample);
        assert_eq!(report.time_variability_cv, None);
        assert_eq!(report.volume_pattern, None);
    }

    #[test]
    fn test_type_ratio_and_trend() {
        // Day 1: 1/2 breast; day 2: 2/2 breast → increasing
        let report = analyze_type_ratio(
            windowed(vec![
                typed(1, 8, FeedType::BreastMilk),
                typed(1, 12, FeedType::FormulaMilk),
                typed(2, 8, FeedType::BreastMilk),
                typed(2, 12, FeedType::BreastMilk),
            ]),
            None,
        );
        assert_eq!(report.breast_milk_ratio, Some(0.75));
        assert_eq!(report.formula_milk_ratio, Some(0.25));
        assert_eq!(report.trend, Some(TrendDirection::Increasing));
    }

    #[test]
    fn test_type_ratio_ignores_interior_days() {
        // Interior day is all formula but first and last days match → flat
        let report = analyze_type_ratio(
            windowed(vec![
                typed(1, 8, FeedType::BreastMilk),
                typed(2, 8, FeedType::FormulaMilk),
                typed(2, 12, FeedType::FormulaMilk),
                typed(3, 8, FeedType::BreastMilk),
            ]),
            None,
        );
        assert_eq!(report.trend, Some(TrendDirection::Flat));
    }

    #[test]
    fn test_type_ratio_without_typed_rows() {
        let report = analyze_type_ratio(windowed(vec![feed(1, 8, 100)]), Some(7));
        assert_eq!(report.status, DataStatus::NoDataInWindow);
        assert_eq!(report.breast_milk_ratio, None);
        assert_eq!(report.trend, None);
    }

    #[test]
    fn test_no_data_vs_empty_states() {
        let report = analyze_volume(WindowOutcome::NoData, None);
        assert_eq!(report.status, DataStatus::NoData);
        assert_eq!(report.total_volume_ml, None);
    }
}
