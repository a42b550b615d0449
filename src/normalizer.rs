//! Record normalization
//!
//! Turns raw activity records into typed, time-sorted event tables, one shape
//! per activity domain. Coercion failures on required fields drop the row;
//! they are never call-level errors. The per-domain differences are confined
//! to the row constructors below; coercion and the extraction grammar are
//! shared.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::types::{
    ActivityType, DiaperChange, FeedEvent, FeedType, Level, RawActivityRecord, SleepSession,
};

/// Normalizer for raw activity records
pub struct Normalizer;

impl Normalizer {
    /// Valid, time-sorted sleep sessions.
    ///
    /// Requires parseable start and end times and a strictly positive,
    /// parseable duration.
    pub fn sleep_sessions(records: &[RawActivityRecord]) -> Vec<SleepSession> {
        let mut sessions: Vec<SleepSession> = records
            .iter()
            .filter(|r| matches_type(r, ActivityType::Sleep))
            .filter_map(sleep_row)
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        sessions
    }

    /// Valid, time-sorted feed events.
    ///
    /// Requires a parseable start time and an extractable milliliter volume;
    /// the feed type stays optional.
    pub fn feed_events(records: &[RawActivityRecord]) -> Vec<FeedEvent> {
        let mut events: Vec<FeedEvent> = records
            .iter()
            .filter(|r| matches_type(r, ActivityType::Feed))
            .filter_map(feed_row)
            .collect();
        events.sort_by_key(|e| e.start_time);
        events
    }

    /// Valid, time-sorted diaper changes.
    ///
    /// Requires a parseable start time. Unresolved pee/poo levels stay `None`
    /// and keep the row.
    pub fn diaper_changes(records: &[RawActivityRecord]) -> Vec<DiaperChange> {
        let mut changes: Vec<DiaperChange> = records
            .iter()
            .filter(|r| matches_type(r, ActivityType::Diaper))
            .filter_map(diaper_row)
            .collect();
        changes.sort_by_key(|c| c.start_time);
        changes
    }
}

fn matches_type(record: &RawActivityRecord, activity: ActivityType) -> bool {
    record
        .activity_type
        .as_deref()
        .is_some_and(|label| activity.matches(label))
}

fn sleep_row(record: &RawActivityRecord) -> Option<SleepSession> {
    let start_time = match record.start_time.as_deref().and_then(parse_timestamp) {
        Some(ts) => ts,
        None => return drop_row(record, "unparseable start_time"),
    };
    let end_time = match record.end_time.as_deref().and_then(parse_timestamp) {
        Some(ts) => ts,
        None => return drop_row(record, "unparseable end_time"),
    };
    let duration_minutes = match record.duration_minutes {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => return drop_row(record, "missing or non-positive duration"),
    };
    Some(SleepSession {
        start_time,
        end_time,
        duration_minutes,
    })
}

fn feed_row(record: &RawActivityRecord) -> Option<FeedEvent> {
    let start_time = match record.start_time.as_deref().and_then(parse_timestamp) {
        Some(ts) => ts,
        None => return drop_row(record, "unparseable start_time"),
    };
    let volume_ml = match record.end_condition.as_deref().and_then(extract_ml) {
        Some(ml) => ml,
        None => return drop_row(record, "no milliliter volume in end_condition"),
    };
    let feed_type = record.start_condition.as_deref().and_then(extract_feed_type);
    Some(FeedEvent {
        start_time,
        volume_ml,
        feed_type,
    })
}

fn diaper_row(record: &RawActivityRecord) -> Option<DiaperChange> {
    let start_time = match record.start_time.as_deref().and_then(parse_timestamp) {
        Some(ts) => ts,
        None => return drop_row(record, "unparseable start_time"),
    };
    let pee = record
        .end_condition
        .as_deref()
        .and_then(|text| extract_level(text, "pee"));
    let poo = record
        .end_condition
        .as_deref()
        .and_then(|text| extract_level(text, "poo"));
    Some(DiaperChange {
        start_time,
        subject_id: record.subject_id,
        pee,
        poo,
    })
}

fn drop_row<T>(record: &RawActivityRecord, reason: &str) -> Option<T> {
    debug!(activity_id = ?record.activity_id, reason, "dropping record");
    None
}

/// Coerce a raw timestamp string.
///
/// Accepts RFC 3339 and the common SQL-ish layouts (space or `T` separator,
/// optional fractional seconds, date-only). Anything else is `None`.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Extract a milliliter volume: the first integer immediately followed by
/// optional whitespace and `ml` (case-insensitive).
pub(crate) fn extract_ml(text: &str) -> Option<u32> {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let digits_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let mut j = i;
            while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
                j += 1;
            }
            if lower[j..].starts_with("ml") {
                return lower[digits_start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Resolve the feed type from free-text start-condition notes.
///
/// `formula` wins over `breast` when both appear, matching the log
/// convention of listing the supplement last.
pub(crate) fn extract_feed_type(text: &str) -> Option<FeedType> {
    let lower = text.trim().to_ascii_lowercase();
    if lower.contains("formula") {
        Some(FeedType::FormulaMilk)
    } else if lower.contains("breast") {
        Some(FeedType::BreastMilk)
    } else {
        None
    }
}

/// Extract a diaper content level: the first `<kind>:(small|medium|big)`
/// occurrence, case-insensitive. Text outside the grammar yields `None`.
pub(crate) fn extract_level(text: &str, kind: &str) -> Option<Level> {
    let lower = text.to_ascii_lowercase();
    let prefix = format!("{kind}:");
    for (idx, _) in lower.match_indices(&prefix) {
        let rest = &lower[idx + prefix.len()..];
        for token in ["small", "medium", "big"] {
            if rest.starts_with(token) {
                return Level::parse(token);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(activity_type: &str) -> RawActivityRecord {
        RawActivityRecord {
            activity_type: Some(activity_type.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        for ok in [
            "2024-03-01 20:15:00",
            "2024-03-01T20:15:00",
            "2024-03-01 20:15:00.250",
            "2024-03-01T20:15:00Z",
            "2024-03-01T20:15:00+02:00",
            "2024-03-01",
        ] {
            assert!(parse_timestamp(ok).is_some(), "should parse: {ok}");
        }
        for bad in ["", "yesterday", "03/01/2024", "2024-13-01 00:00:00"] {
            assert!(parse_timestamp(bad).is_none(), "should reject: {bad}");
        }
    }

    #[test]
    fn test_extract_ml_variants() {
        assert_eq!(extract_ml("120 ml"), Some(120));
        assert_eq!(extract_ml("90ml"), Some(90));
        assert_eq!(extract_ml("Bottle, 150 ML left"), Some(150));
        assert_eq!(extract_ml("abc"), None);
        assert_eq!(extract_ml("ml without a number"), None);
        // First qualifying integer wins
        assert_eq!(extract_ml("2 bottles, 80 ml each"), Some(80));
    }

    #[test]
    fn test_extract_feed_type() {
        assert_eq!(extract_feed_type("Formula milk"), Some(FeedType::FormulaMilk));
        assert_eq!(extract_feed_type("BREAST"), Some(FeedType::BreastMilk));
        assert_eq!(extract_feed_type("breast + formula top-up"), Some(FeedType::FormulaMilk));
        assert_eq!(extract_feed_type("solid food"), None);
    }

    #[test]
    fn test_extract_level() {
        assert_eq!(extract_level("pee:small poo:big", "pee"), Some(Level::Small));
        assert_eq!(extract_level("pee:small poo:big", "poo"), Some(Level::Big));
        assert_eq!(extract_level("Pee:MEDIUM", "pee"), Some(Level::Medium));
        assert_eq!(extract_level("pee:huge pee:small", "pee"), Some(Level::Small));
        assert_eq!(extract_level("dry diaper", "pee"), None);
    }

    #[test]
    fn test_feed_rows_retained_exactly_when_volume_parses() {
        let records: Vec<RawActivityRecord> = ["120 ml", "abc", "90ml"]
            .iter()
            .enumerate()
            .map(|(i, cond)| RawActivityRecord {
                start_time: Some(format!("2024-03-01 0{i}:00:00")),
                end_condition: Some(cond.to_string()),
                ..raw("Feed")
            })
            .collect();
        let events = Normalizer::feed_events(&records);
        let volumes: Vec<u32> = events.iter().map(|e| e.volume_ml).collect();
        assert_eq!(volumes, vec![120, 90]);
    }

    #[test]
    fn test_unparseable_start_time_drops_row_everywhere() {
        let sleep = RawActivityRecord {
            start_time: Some("not a time".to_string()),
            end_time: Some("2024-03-02 06:00:00".to_string()),
            duration_minutes: Some(480.0),
            ..raw("Sleep")
        };
        assert!(Normalizer::sleep_sessions(&[sleep]).is_empty());

        let feed = RawActivityRecord {
            start_time: None,
            end_condition: Some("100 ml".to_string()),
            ..raw("Feed")
        };
        assert!(Normalizer::feed_events(&[feed]).is_empty());

        let diaper = RawActivityRecord {
            start_time: Some("??".to_string()),
            end_condition: Some("pee:small".to_string()),
            ..raw("Diaper")
        };
        assert!(Normalizer::diaper_changes(&[diaper]).is_empty());
    }

    #[test]
    fn test_sleep_requires_positive_duration() {
        let base = RawActivityRecord {
            start_time: Some("2024-03-01 20:00:00".to_string()),
            end_time: Some("2024-03-02 06:00:00".to_string()),
            ..raw("Sleep")
        };
        for bad in [Some(0.0), Some(-30.0), None] {
            let record = RawActivityRecord {
                duration_minutes: bad,
                ..base.clone()
            };
            assert!(Normalizer::sleep_sessions(&[record]).is_empty());
        }
        let good = RawActivityRecord {
            duration_minutes: Some(480.0),
            ..base
        };
        assert_eq!(Normalizer::sleep_sessions(&[good]).len(), 1);
    }

    #[test]
    fn test_unresolved_level_keeps_diaper_row() {
        let record = RawActivityRecord {
            start_time: Some("2024-03-01 08:00:00".to_string()),
            end_condition: Some("leaked through".to_string()),
            ..raw("Diaper")
        };
        let changes = Normalizer::diaper_changes(&[record]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].pee, None);
        assert_eq!(changes[0].poo, None);
    }

    #[test]
    fn test_output_sorted_by_start_time() {
        let records: Vec<RawActivityRecord> = ["2024-03-03", "2024-03-01", "2024-03-02"]
            .iter()
            .map(|day| RawActivityRecord {
                start_time: Some(format!("{day} 12:00:00")),
                ..raw("Diaper")
            })
            .collect();
        let changes = Normalizer::diaper_changes(&records);
        let days: Vec<u32> = changes
            .iter()
            .map(|c| chrono::Datelike::day(&c.start_time))
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn test_type_restriction() {
        let record = RawActivityRecord {
            start_time: Some("2024-03-01 08:00:00".to_string()),
            end_condition: Some("100 ml".to_string()),
            ..raw("Feed")
        };
        assert!(Normalizer::diaper_changes(&[record.clone()]).is_empty());
        assert_eq!(Normalizer::feed_events(&[record]).len(), 1);
    }
}
