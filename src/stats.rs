//! Shared numeric helpers
//!
//! Small descriptive-statistics building blocks used by every analyzer. All
//! spread measures use the sample standard deviation (n − 1 denominator).

use crate::types::Timestamped;

/// Arithmetic mean, `None` on an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator), `None` below 2 values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Coefficient of variation: sample std dev divided by mean.
///
/// `None` below 2 values or when the mean is zero (the ratio is undefined
/// there, and a `NaN` must never leak into a report).
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    sample_std_dev(values).map(|sd| sd / m)
}

/// Gaps between consecutive event start times, in hours.
///
/// Expects the slice already sorted ascending; returns n − 1 gaps.
pub fn consecutive_gaps_hours<T: Timestamped>(events: &[T]) -> Vec<f64> {
    events
        .windows(2)
        .map(|pair| {
            let delta = pair[1].start_time() - pair[0].start_time();
            delta.num_seconds() as f64 / 3600.0
        })
        .collect()
}

/// Round to a fixed number of decimal places for reporting
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedEvent;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0]), Some(4.0));
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_sample_std_dev_uses_n_minus_one() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[5.0]), None);
        // Sample std of [1, 2, 3, 4] is sqrt(5/3)
        let sd = sample_std_dev(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((sd - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cv_undefined_cases() {
        assert_eq!(coefficient_of_variation(&[3.0]), None);
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), None);
        let cv = coefficient_of_variation(&[90.0, 110.0]).unwrap();
        assert!(cv.is_finite());
        assert!(cv > 0.0);
    }

    #[test]
    fn test_consecutive_gaps_hours() {
        let events: Vec<FeedEvent> = [0, 3, 7]
            .iter()
            .map(|h| FeedEvent {
                start_time: Utc.with_ymd_and_hms(2024, 3, 1, *h, 0, 0).unwrap(),
                volume_ml: 100,
                feed_type: None,
            })
            .collect();
        assert_eq!(consecutive_gaps_hours(&events), vec![3.0, 4.0]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.675, 1), 2.7);
        assert_eq!(round_to(120.0, 1), 120.0);
    }
}
