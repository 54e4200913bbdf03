//! Stats aggregator: outcome tallies and routing accuracy.

use crate::{
    config::AccuracyThresholds,
    record::{Outcome, TicketRecord},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_tickets:    usize,
    pub success_count:    usize,
    pub failure_count:    usize,
    pub defaulted_count:  usize,
    pub accuracy_percent: f64,
}

impl StatsSummary {
    /// Replace the computed accuracy with a ratio reported by the backend
    /// (0..1). Non-finite ratios are ignored.
    pub fn with_reported_ratio(mut self, ratio: Option<f64>) -> Self {
        if let Some(r) = ratio.filter(|r| r.is_finite()) {
            self.accuracy_percent = clamp_percent(r * 100.0);
        }
        self
    }

    /// Tickets that did not reach the right team (FAILURE + DEFAULTED).
    pub fn incorrect_count(&self) -> usize {
        self.failure_count + self.defaulted_count
    }

    pub fn accuracy_decimal(&self) -> f64 {
        self.accuracy_percent / 100.0
    }

    /// Tickets whose status resolved to none of the three known outcomes.
    pub fn unknown_count(&self) -> usize {
        self.total_tickets
            .saturating_sub(self.success_count + self.failure_count + self.defaulted_count)
    }
}

pub fn compute_stats(records: &[TicketRecord]) -> StatsSummary {
    let mut summary = StatsSummary {
        total_tickets: records.len(),
        ..StatsSummary::default()
    };

    for record in records {
        match record.status {
            Outcome::Success   => summary.success_count += 1,
            Outcome::Failure   => summary.failure_count += 1,
            Outcome::Defaulted => summary.defaulted_count += 1,
            Outcome::Unknown   => {}
        }
    }

    summary.accuracy_percent = accuracy_percent(summary.success_count, summary.total_tickets);
    summary
}

/// success / total × 100, clamped to [0, 100]; 0 when total is 0.
pub fn accuracy_percent(success: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    clamp_percent(success as f64 / total as f64 * 100.0)
}

pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

// ── Presentation helpers ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyBadge {
    Good,
    Ok,
    Bad,
}

impl AccuracyBadge {
    pub fn classify(percent: f64, thresholds: &AccuracyThresholds) -> Self {
        if percent >= thresholds.good_percent {
            Self::Good
        } else if percent >= thresholds.ok_percent {
            Self::Ok
        } else {
            Self::Bad
        }
    }
}

/// Movement of accuracy since the previously displayed reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccuracyTrend {
    FirstMeasurement,
    Steady { delta: f64 },
    Up { delta: f64 },
    Down { delta: f64 },
}

impl AccuracyTrend {
    pub fn compare(previous: Option<f64>, current: f64, epsilon: f64) -> Self {
        let Some(prev) = previous.filter(|p| p.is_finite()) else {
            return Self::FirstMeasurement;
        };
        let delta = current - prev;
        if delta.abs() < epsilon {
            Self::Steady { delta }
        } else if delta > 0.0 {
            Self::Up { delta }
        } else {
            Self::Down { delta }
        }
    }
}
