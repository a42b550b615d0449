//! Error types for carelog

use thiserror::Error;

/// Errors that can propagate out of an analysis call.
///
/// Row-level problems (unparseable timestamps, malformed condition text,
/// non-numeric durations) are absorbed during normalization and never surface
/// here. Only a failure to obtain data at all, or a failure to encode a
/// report, is a call-level error.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("activity source failure: {0}")]
    Source(#[from] SourceError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown metric family: {0}")]
    UnknownMetric(String),
}

/// Failure reported by an [`ActivitySource`](crate::source::ActivitySource).
///
/// The engine never masks a source failure as an empty result set: an empty
/// result is a valid response, a `SourceError` is not.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("connection failure: {0}")]
    Connection(String),

    #[error("query failure: {0}")]
    Query(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}
