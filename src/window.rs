//! Effective-window selection
//!
//! The analysis window ends at the latest observed event's start time, not at
//! wall-clock "now". With a lookback of N days the window is
//! `[max(start) − N days, max(start)]`; without one it spans the whole series.

use chrono::Duration;

use crate::types::{AnalysisWindow, Timestamped};

/// Result of windowing a normalized event table.
///
/// `NoData` means the table was empty before filtering; `EmptyWindow` means
/// events existed but none fell inside the requested window. Callers report
/// the two differently.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome<T> {
    NoData,
    EmptyWindow { window: AnalysisWindow },
    Data { events: Vec<T>, window: AnalysisWindow },
}

impl<T> WindowOutcome<T> {
    /// Window bounds actually applied, absent only when no data existed
    pub fn window(&self) -> Option<AnalysisWindow> {
        match self {
            WindowOutcome::NoData => None,
            WindowOutcome::EmptyWindow { window } => Some(*window),
            WindowOutcome::Data { window, .. } => Some(*window),
        }
    }
}

/// Restrict a time-sorted event table to the effective window.
///
/// The lower bound is inclusive. Events must already be sorted ascending by
/// start time (the normalizer guarantees this).
pub fn select_window<T: Timestamped>(
    events: Vec<T>,
    lookback_days: Option<u32>,
) -> WindowOutcome<T> {
    let (first, last) = match (events.first(), events.last()) {
        (Some(first), Some(last)) => (first.start_time(), last.start_time()),
        _ => return WindowOutcome::NoData,
    };

    let end = last;
    let start = match lookback_days {
        Some(days) => end - Duration::days(i64::from(days)),
        None => first,
    };
    let window = AnalysisWindow { start, end };

    let filtered: Vec<T> = events
        .into_iter()
        .filter(|e| e.start_time() >= start)
        .collect();

    if filtered.is_empty() {
        WindowOutcome::EmptyWindow { window }
    } else {
        WindowOutcome::Data {
            events: filtered,
            window,
        }
    }
}
