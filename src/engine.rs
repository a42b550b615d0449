//! Engine orchestration
//!
//! Ties the pipeline together per call: fetch raw records from the source,
//! normalize, select the effective window, run the requested analyzer, stamp
//! provenance. Calls are stateless and independent; nothing is cached between
//! them.

use tracing::debug;
use uuid::Uuid;

use crate::diaper::{
    self, DiaperAlertConfig, DEFAULT_BIG_POO_THRESHOLD, DEFAULT_MAX_GAP_HOURS,
    DEFAULT_TIMING_BINS,
};
use crate::dispatch::{AnalysisReport, MetricFamily, Report};
use crate::error::AnalyticsError;
use crate::feed;
use crate::normalizer::Normalizer;
use crate::sleep;
use crate::source::ActivitySource;
use crate::types::{ReportMeta, SubjectId};
use crate::window::select_window;
use crate::{CARELOG_VERSION, PRODUCER_NAME};

/// Lookback requested from the source when the caller gives none.
///
/// The effective analysis window still spans the whole fetched series in that
/// case; this bound only caps how far back the source reads.
pub const DEFAULT_FETCH_LOOKBACK_DAYS: u32 = 365;

/// Per-call configuration. There are no process-wide defaults: the subject is
/// always explicit.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisConfig {
    pub subject_id: SubjectId,
    /// Trailing window in days, anchored at the latest observed event;
    /// `None` analyzes the whole fetched series
    pub lookback_days: Option<u32>,
    /// Number of equal-width bands for the diaper timing distribution
    pub timing_bins: u32,
    /// Consecutive-big-poo run length that triggers an alert
    pub big_poo_threshold: u32,
    /// Change gap in hours that triggers an alert
    pub max_gap_hours: f64,
    /// Group frequency/interval output by subject
    pub by_subject: bool,
}

impl AnalysisConfig {
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            lookback_days: None,
            timing_bins: DEFAULT_TIMING_BINS,
            big_poo_threshold: DEFAULT_BIG_POO_THRESHOLD,
            max_gap_hours: DEFAULT_MAX_GAP_HOURS,
            by_subject: false,
        }
    }

    pub fn with_lookback(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }
}

/// Analysis engine over an activity source
pub struct Engine {
    source: Box<dyn ActivitySource>,
    instance_id: Uuid,
}

impl Engine {
    pub fn new(source: Box<dyn ActivitySource>) -> Self {
        Self {
            source,
            instance_id: Uuid::new_v4(),
        }
    }

    /// Run one metric family for one subject.
    ///
    /// The only error path is the source itself; empty and undersized data
    /// come back as reports with the corresponding [`DataStatus`](crate::types::DataStatus).
    pub fn analyze(
        &self,
        family: MetricFamily,
        config: &AnalysisConfig,
    ) -> Result<Report, AnalyticsError> {
        let fetch_days = config.lookback_days.unwrap_or(DEFAULT_FETCH_LOOKBACK_DAYS);
        let records =
            self.source
                .fetch(config.subject_id, Some(family.activity_type()), fetch_days)?;
        debug!(
            metric = %family,
            subject_id = config.subject_id,
            records = records.len(),
            "fetched activity records"
        );

        let lookback = config.lookback_days;
        let (report, window) = match family {
            MetricFamily::SleepSummary => {
                let outcome = select_window(Normalizer::sleep_sessions(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::SleepSummary(sleep::analyze_sessions(outcome, lookback));
                (report, window)
            }
            MetricFamily::SleepAnomaly => {
                let outcome = select_window(Normalizer::sleep_sessions(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::SleepAnomaly(sleep::detect_anomalies(outcome, lookback));
                (report, window)
            }
            MetricFamily::FeedVolume => {
                let outcome = select_window(Normalizer::feed_events(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::FeedVolume(feed::analyze_volume(outcome, lookback));
                (report, window)
            }
            MetricFamily::FeedInterval => {
                let outcome = select_window(Normalizer::feed_events(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::FeedInterval(feed::analyze_intervals(outcome, lookback));
                (report, window)
            }
            MetricFamily::FeedTimeOfDay => {
                let outcome = select_window(Normalizer::feed_events(&records), lookback);
                let window = outcome.window();
                let report =
                    AnalysisReport::FeedTimeOfDay(feed::analyze_time_of_day(outcome, lookback));
                (report, window)
            }
            MetricFamily::FeedConsistency => {
                let outcome = select_window(Normalizer::feed_events(&records), lookback);
                let window = outcome.window();
                let report =
                    AnalysisReport::FeedConsistency(feed::analyze_consistency(outcome, lookback));
                (report, window)
            }
            MetricFamily::FeedTypeRatio => {
                let outcome = select_window(Normalizer::feed_events(&records), lookback);
                let window = outcome.window();
                let report =
                    AnalysisReport::FeedTypeRatio(feed::analyze_type_ratio(outcome, lookback));
                (report, window)
            }
            MetricFamily::DiaperFrequency => {
                let outcome = select_window(Normalizer::diaper_changes(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::DiaperFrequency(diaper::analyze_frequency(
                    outcome,
                    lookback,
                    config.by_subject,
                ));
                (report, window)
            }
            MetricFamily::DiaperType => {
                let outcome = select_window(Normalizer::diaper_changes(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::DiaperType(diaper::analyze_type(outcome, lookback));
                (report, window)
            }
            MetricFamily::DiaperTiming => {
                let outcome = select_window(Normalizer::diaper_changes(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::DiaperTiming(diaper::analyze_timing(
                    outcome,
                    lookback,
                    config.timing_bins,
                ));
                (report, window)
            }
            MetricFamily::DiaperInterval => {
                let outcome = select_window(Normalizer::diaper_changes(&records), lookback);
                let window = outcome.window();
                let report = AnalysisReport::DiaperInterval(diaper::analyze_intervals(
                    outcome,
                    lookback,
                    config.by_subject,
                ));
                (report, window)
            }
            MetricFamily::DiaperAlert => {
                let outcome = select_window(Normalizer::diaper_changes(&records), lookback);
                let window = outcome.window();
                let alert_config = DiaperAlertConfig {
                    big_poo_threshold: config.big_poo_threshold,
                    max_gap_hours: config.max_gap_hours,
                };
                let report = AnalysisReport::DiaperAlert(diaper::analyze_alerts(
                    outcome,
                    lookback,
                    alert_config,
                ));
                (report, window)
            }
        };

        Ok(Report {
            meta: ReportMeta {
                producer: PRODUCER_NAME.to_string(),
                version: CARELOG_VERSION.to_string(),
                instance_id: self.instance_id.to_string(),
                subject_id: config.subject_id,
                window,
            },
            report,
        })
    }

    /// Run every metric family for one subject, in the canonical order.
    pub fn analyze_all(&self, config: &AnalysisConfig) -> Result<Vec<Report>, AnalyticsError> {
        MetricFamily::ALL
            .iter()
            .map(|family| self.analyze(*family, config))
            .collect()
    }
}
