//! Core types for the carelog analytics engine
//!
//! This module defines the data that flows through the pipeline: raw activity
//! records as delivered by the external source, the typed events produced by
//! normalization, and the metadata stamped on every report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifies the care subject. All analysis is scoped to one subject per call.
pub type SubjectId = i64;

/// Activity domain of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Sleep,
    Feed,
    Diaper,
}

impl ActivityType {
    /// Name as it appears in the activity log's `Type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Sleep => "Sleep",
            ActivityType::Feed => "Feed",
            ActivityType::Diaper => "Diaper",
        }
    }

    /// Case-insensitive match against a raw type label
    pub fn matches(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.as_str())
    }
}

/// One row of the activity log as delivered by the external source.
///
/// Time and numeric fields arrive loosely typed (exports mix JSON numbers and
/// strings); the normalizer performs the actual coercion and drops rows whose
/// required fields do not parse. Deserialization itself never fails on a bad
/// value, it only yields `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawActivityRecord {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub activity_id: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_i64")]
    pub subject_id: Option<SubjectId>,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub start_condition: Option<String>,
    #[serde(default)]
    pub start_location: Option<String>,
    #[serde(default)]
    pub end_condition: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Milk source recorded for a feed, when the log text resolves one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedType {
    BreastMilk,
    FormulaMilk,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::BreastMilk => "BreastMilk",
            FeedType::FormulaMilk => "FormulaMilk",
        }
    }
}

/// Diaper content severity tag extracted from free text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Small,
    Medium,
    Big,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Small => "small",
            Level::Medium => "medium",
            Level::Big => "big",
        }
    }

    /// Parse a lowercase level token; anything outside the grammar is `None`
    pub fn parse(token: &str) -> Option<Level> {
        match token {
            "small" => Some(Level::Small),
            "medium" => Some(Level::Medium),
            "big" => Some(Level::Big),
            _ => None,
        }
    }
}

/// A normalized sleep session. `duration_minutes` is always strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: f64,
}

/// A normalized feed event. Rows without an extractable milliliter volume
/// never become `FeedEvent`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub start_time: DateTime<Utc>,
    pub volume_ml: u32,
    pub feed_type: Option<FeedType>,
}

/// A normalized diaper change. Unresolved pee/poo levels stay `None` without
/// excluding the row from frequency or timing analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperChange {
    pub start_time: DateTime<Utc>,
    pub subject_id: Option<SubjectId>,
    pub pee: Option<Level>,
    pub poo: Option<Level>,
}

/// Anything carrying the series ordering key
pub trait Timestamped {
    fn start_time(&self) -> DateTime<Utc>;
}

impl Timestamped for SleepSession {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

impl Timestamped for FeedEvent {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

impl Timestamped for DiaperChange {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

/// Outcome class carried by every report.
///
/// Lets callers tell "no data of this type exists" from "nothing inside the
/// requested window" from "data present but below the minimum sample size"
/// without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Ok,
    NoData,
    NoDataInWindow,
    InsufficientSample,
}

/// The effective analysis window.
///
/// `end` is the latest observed event's start time, never wall-clock "now".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Provenance metadata stamped on every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub producer: String,
    pub version: String,
    pub instance_id: String,
    pub subject_id: SubjectId,
    /// Window bounds actually applied, absent when no data existed at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<AnalysisWindow>,
}

fn de_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn de_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_matches_case_insensitively() {
        assert!(ActivityType::Sleep.matches("sleep"));
        assert!(ActivityType::Sleep.matches("SLEEP"));
        assert!(ActivityType::Feed.matches(" Feed "));
        assert!(!ActivityType::Diaper.matches("Feed"));
    }

    #[test]
    fn test_level_parse() {
        assert_eq!(Level::parse("small"), Some(Level::Small));
        assert_eq!(Level::parse("big"), Some(Level::Big));
        assert_eq!(Level::parse("huge"), None);
    }

    #[test]
    fn test_raw_record_accepts_numeric_or_string_fields() {
        let json = r#"{
            "activity_id": 42,
            "subject_id": "10",
            "activity_type": "Sleep",
            "start_time": "2024-03-01 20:00:00",
            "duration_minutes": "480"
        }"#;
        let record: RawActivityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.activity_id.as_deref(), Some("42"));
        assert_eq!(record.subject_id, Some(10));
        assert_eq!(record.duration_minutes, Some(480.0));
    }

    #[test]
    fn test_raw_record_bad_values_become_none_not_errors() {
        let json = r#"{
            "subject_id": "ten",
            "duration_minutes": "abc",
            "start_time": "2024-03-01 20:00:00"
        }"#;
        let record: RawActivityRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.subject_id, None);
        assert_eq!(record.duration_minutes, None);
        assert!(record.start_time.is_some());
    }
}
