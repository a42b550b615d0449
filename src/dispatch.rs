//! Metric dispatch
//!
//! An explicit table from requested metric family to analyzer output. This
//! replaces the delegation layer of the surrounding system: no routing
//! heuristics, just an enum and a match.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diaper::{
    DiaperAlertReport, DiaperFrequencyReport, DiaperIntervalReport, DiaperTimingReport,
    DiaperTypeReport,
};
use crate::error::AnalyticsError;
use crate::feed::{
    FeedConsistencyReport, FeedIntervalReport, FeedTimeOfDayReport, FeedTypeRatioReport,
    FeedVolumeReport,
};
use crate::sleep::{SleepAnomalyReport, SleepSummaryReport};
use crate::types::{ActivityType, ReportMeta};

/// The analyzer entry points, one per metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    SleepSummary,
    SleepAnomaly,
    FeedVolume,
    FeedInterval,
    FeedTimeOfDay,
    FeedConsistency,
    FeedTypeRatio,
    DiaperFrequency,
    DiaperType,
    DiaperTiming,
    DiaperInterval,
    DiaperAlert,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 12] = [
        MetricFamily::SleepSummary,
        MetricFamily::SleepAnomaly,
        MetricFamily::FeedVolume,
        MetricFamily::FeedInterval,
        MetricFamily::FeedTimeOfDay,
        MetricFamily::FeedConsistency,
        MetricFamily::FeedTypeRatio,
        MetricFamily::DiaperFrequency,
        MetricFamily::DiaperType,
        MetricFamily::DiaperTiming,
        MetricFamily::DiaperInterval,
        MetricFamily::DiaperAlert,
    ];

    /// The activity domain this family consumes
    pub fn activity_type(&self) -> ActivityType {
        match self {
            MetricFamily::SleepSummary | MetricFamily::SleepAnomaly => ActivityType::Sleep,
            MetricFamily::FeedVolume
            | MetricFamily::FeedInterval
            | MetricFamily::FeedTimeOfDay
            | MetricFamily::FeedConsistency
            | MetricFamily::FeedTypeRatio => ActivityType::Feed,
            MetricFamily::DiaperFrequency
            | MetricFamily::DiaperType
            | MetricFamily::DiaperTiming
            | MetricFamily::DiaperInterval
            | MetricFamily::DiaperAlert => ActivityType::Diaper,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFamily::SleepSummary => "sleep_summary",
            MetricFamily::SleepAnomaly => "sleep_anomaly",
            MetricFamily::FeedVolume => "feed_volume",
            MetricFamily::FeedInterval => "feed_interval",
            MetricFamily::FeedTimeOfDay => "feed_time_of_day",
            MetricFamily::FeedConsistency => "feed_consistency",
            MetricFamily::FeedTypeRatio => "feed_type_ratio",
            MetricFamily::DiaperFrequency => "diaper_frequency",
            MetricFamily::DiaperType => "diaper_type",
            MetricFamily::DiaperTiming => "diaper_timing",
            MetricFamily::DiaperInterval => "diaper_interval",
            MetricFamily::DiaperAlert => "diaper_alert",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricFamily {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricFamily::ALL
            .iter()
            .find(|family| family.as_str() == s)
            .copied()
            .ok_or_else(|| AnalyticsError::UnknownMetric(s.to_string()))
    }
}

/// Analyzer output, tagged with its metric family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum AnalysisReport {
    SleepSummary(SleepSummaryReport),
    SleepAnomaly(SleepAnomalyReport),
    FeedVolume(FeedVolumeReport),
    FeedInterval(FeedIntervalReport),
    FeedTimeOfDay(FeedTimeOfDayReport),
    FeedConsistency(FeedConsistencyReport),
    FeedTypeRatio(FeedTypeRatioReport),
    DiaperFrequency(DiaperFrequencyReport),
    DiaperType(DiaperTypeReport),
    DiaperTiming(DiaperTimingReport),
    DiaperInterval(DiaperIntervalReport),
    DiaperAlert(DiaperAlertReport),
}

impl AnalysisReport {
    /// The family this report answers
    pub fn metric(&self) -> MetricFamily {
        match self {
            AnalysisReport::SleepSummary(_) => MetricFamily::SleepSummary,
            AnalysisReport::SleepAnomaly(_) => MetricFamily::SleepAnomaly,
            AnalysisReport::FeedVolume(_) => MetricFamily::FeedVolume,
            AnalysisReport::FeedInterval(_) => MetricFamily::FeedInterval,
            AnalysisReport::FeedTimeOfDay(_) => MetricFamily::FeedTimeOfDay,
            AnalysisReport::FeedConsistency(_) => MetricFamily::FeedConsistency,
            AnalysisReport::FeedTypeRatio(_) => MetricFamily::FeedTypeRatio,
            AnalysisReport::DiaperFrequency(_) => MetricFamily::DiaperFrequency,
            AnalysisReport::DiaperType(_) => MetricFamily::DiaperType,
            AnalysisReport::DiaperTiming(_) => MetricFamily::DiaperTiming,
            AnalysisReport::DiaperInterval(_) => MetricFamily::DiaperInterval,
            AnalysisReport::DiaperAlert(_) => MetricFamily::DiaperAlert,
        }
    }
}

/// A complete analysis result: provenance metadata plus the tagged report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metric_family_round_trips_through_names() {
        for family in MetricFamily::ALL {
            let parsed: MetricFamily = family.as_str().parse().unwrap();
            assert_eq!(parsed, family);
            // serde names match the FromStr names
            let json = serde_json::to_string(&family).unwrap();
            assert_eq!(json, format!("\"{}\"", family.as_str()));
        }
    }

    #[test]
    fn test_unknown_metric_is_an_error() {
        let result: Result<MetricFamily, _> = "sleep_quality".parse();
        assert!(matches!(
            result,
            Err(AnalyticsError::UnknownMetric(name)) if name == "sleep_quality"
        ));
    }

    #[test]
    fn test_every_family_has_a_domain() {
        let sleep = MetricFamily::ALL
            .iter()
            .filter(|f| f.activity_type() == ActivityType::Sleep)
            .count();
        let feed = MetricFamily::ALL
            .iter()
            .filter(|f| f.activity_type() == ActivityType::Feed)
            .count();
        let diaper = MetricFamily::ALL
            .iter()
            .filter(|f| f.activity_type() == ActivityType::Diaper)
            .count();
        assert_eq!((sleep, feed, diaper), (2, 5, 5));
    }
}
