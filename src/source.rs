//! External data-source contract
//!
//! The engine consumes activity records through the [`ActivitySource`] trait.
//! The production implementation lives outside this crate (database, export
//! service); [`InMemorySource`] implements the same contract over a loaded
//! vector for the CLI and for tests.

use chrono::{Duration, Utc};

use crate::error::SourceError;
use crate::normalizer::parse_timestamp;
use crate::types::{ActivityType, RawActivityRecord, SubjectId};

/// Supplies raw activity records for one subject within a trailing window.
///
/// Implementations return rows ordered ascending by start time, restricted to
/// `start_time >= now − lookback_days` (wall clock at the source), the given
/// subject, and, when present, the given activity type. No matching rows is an
/// empty vector, not an error; a [`SourceError`] means the data could not be
/// obtained and must not be conflated with "no data".
pub trait ActivitySource {
    fn fetch(
        &self,
        subject_id: SubjectId,
        activity_type: Option<ActivityType>,
        lookback_days: u32,
    ) -> Result<Vec<RawActivityRecord>, SourceError>;
}

/// In-memory [`ActivitySource`] over a preloaded record set.
///
/// Records with unparseable start times pass through unfiltered; the
/// normalizer owns the decision to drop them.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawActivityRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawActivityRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ActivitySource for InMemorySource {
    fn fetch(
        &self,
        subject_id: SubjectId,
        activity_type: Option<ActivityType>,
        lookback_days: u32,
    ) -> Result<Vec<RawActivityRecord>, SourceError> {
        let cutoff = Utc::now() - Duration::days(i64::from(lookback_days));
        let mut rows: Vec<RawActivityRecord> = self
            .records
            .iter()
            .filter(|r| r.subject_id == Some(subject_id))
            .filter(|r| match activity_type {
                Some(wanted) => r
                    .activity_type
                    .as_deref()
                    .is_some_and(|label| wanted.matches(label)),
                None => true,
            })
            .filter(|r| {
                match r.start_time.as_deref().and_then(parse_timestamp) {
                    Some(ts) => ts >= cutoff,
                    // Leave malformed timestamps for the normalizer to reject
                    None => true,
                }
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.start_time.as_deref().and_then(parse_timestamp));
        Ok(rows)
    }
}

/// A source that always fails; used to exercise error propagation.
#[cfg(test)]
pub(crate) struct FailingSource;

#[cfg(test)]
impl ActivitySource for FailingSource {
    fn fetch(
        &self,
        _subject_id: SubjectId,
        _activity_type: Option<ActivityType>,
        _lookback_days: u32,
    ) -> Result<Vec<RawActivityRecord>, SourceError> {
        Err(SourceError::Connection("simulated outage".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(subject: SubjectId, activity: &str, start: &str) -> RawActivityRecord {
        RawActivityRecord {
            subject_id: Some(subject),
            activity_type: Some(activity.to_string()),
            start_time: Some(start.to_string()),
            ..Default::default()
        }
    }

    fn recent(days_ago: i64) -> String {
        (Utc::now() - Duration::days(days_ago))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    #[test]
    fn test_filters_by_subject_and_type() {
        let source = InMemorySource::new(vec![
            record(10, "Sleep", &recent(1)),
            record(10, "Feed", &recent(1)),
            record(11, "Sleep", &recent(1)),
        ]);
        let rows = source.fetch(10, Some(ActivityType::Sleep), 30).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject_id, Some(10));
    }

    #[test]
    fn test_lookback_cutoff_applies() {
        let source = InMemorySource::new(vec![
            record(10, "Feed", &recent(2)),
            record(10, "Feed", &recent(40)),
        ]);
        let rows = source.fetch(10, Some(ActivityType::Feed), 30).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let source = InMemorySource::new(vec![record(10, "Feed", &recent(1))]);
        let rows = source.fetch(99, None, 30).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rows_sorted_ascending() {
        let source = InMemorySource::new(vec![
            record(10, "Feed", &recent(1)),
            record(10, "Feed", &recent(3)),
            record(10, "Feed", &recent(2)),
        ]);
        let rows = source.fetch(10, None, 30).unwrap();
        let times: Vec<_> = rows
            .iter()
            .map(|r| parse_timestamp(r.start_time.as_deref().unwrap()).unwrap())
            .collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
    }
}
