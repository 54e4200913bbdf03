//! Forecast engine: projection and smoothing over a daily accuracy series.
//!
//! Both operations are pure: they borrow the series, never mutate it, and
//! return identical output for identical input.
//!
//! There is deliberately no single definition of "trend" here:
//!   - linear_trend_forecast extends the series past its last day using the
//!     slope between the first and last points only.
//!   - moving_average_smoothing replaces each observed point with a trailing
//!     window mean and never projects beyond the data.

use crate::{series::DailyBucket, stats::clamp_percent};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date:      NaiveDate,
    pub accuracy:  f64,
    /// Always true; lets renderers mix observed and projected points.
    pub projected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedBucket {
    pub date:               NaiveDate,
    pub accuracy:           f64,
    pub smoothed_accuracy:  f64,
}

/// Project `horizon_days` future points from the endpoint-to-endpoint slope.
///
/// - empty series: empty result
/// - one point:    flat projection at that point's accuracy
/// - n points:     slope = (last - first) / (n - 1), each projection clamped
///                 to [0, 100]
pub fn linear_trend_forecast(series: &[DailyBucket], horizon_days: u32) -> Vec<ForecastPoint> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Vec::new();
    };

    let slope = if series.len() > 1 {
        (last.accuracy - first.accuracy) / (series.len() - 1) as f64
    } else {
        0.0
    };

    (1..=horizon_days)
        .map_while(|i| {
            let date = last.date.checked_add_days(Days::new(u64::from(i)))?;
            Some(ForecastPoint {
                date,
                accuracy: clamp_percent(last.accuracy + slope * f64::from(i)),
                projected: true,
            })
        })
        .collect()
}

/// Trailing moving average over `[max(0, i - window + 1), i]`.
/// Output length always equals input length. A window of 0 behaves as 1.
pub fn moving_average_smoothing(series: &[DailyBucket], window_size: usize) -> Vec<SmoothedBucket> {
    let window = window_size.max(1);

    series
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let start = (i + 1).saturating_sub(window);
            let trailing = &series[start..=i];
            let sum: f64 = trailing.iter().map(|b| b.accuracy).sum();
            SmoothedBucket {
                date: bucket.date,
                accuracy: bucket.accuracy,
                smoothed_accuracy: sum / trailing.len() as f64,
            }
        })
        .collect()
}
