//! Time-series builder: buckets records by UTC calendar day.
//!
//! RULE: the grouping key is always the UTC date of `created_at`, never the
//! viewer's local date, so every caller sees identical buckets.
//! Records with no timestamp are left out of every bucket.

use crate::{
    record::{Outcome, TicketRecord},
    stats::accuracy_percent,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date:          NaiveDate,
    pub total:         usize,
    pub success_count: usize,
    pub accuracy:      f64,
}

impl DailyBucket {
    pub fn new(date: NaiveDate, total: usize, success_count: usize) -> Self {
        Self {
            date,
            total,
            success_count,
            accuracy: accuracy_percent(success_count, total),
        }
    }

    /// ISO form, `YYYY-MM-DD`.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Short chart label, `DD-MM`.
    pub fn label(&self) -> String {
        self.date.format("%d-%m").to_string()
    }
}

#[derive(Default)]
struct DayTally {
    total:      usize,
    success:    usize,
    misrouted:  usize,
}

fn tally_by_day(records: &[TicketRecord]) -> BTreeMap<NaiveDate, DayTally> {
    let mut days: BTreeMap<NaiveDate, DayTally> = BTreeMap::new();
    for record in records {
        let Some(created) = record.created_at else {
            continue;
        };
        let day = days.entry(created.date_naive()).or_default();
        day.total += 1;
        if record.status == Outcome::Success {
            day.success += 1;
        }
        if record.status.is_misrouted() {
            day.misrouted += 1;
        }
    }
    days
}

/// One bucket per UTC day, ascending by date.
pub fn build_daily_series(records: &[TicketRecord]) -> Vec<DailyBucket> {
    tally_by_day(records)
        .into_iter()
        .map(|(date, day)| DailyBucket::new(date, day.total, day.success))
        .collect()
}

// ── Misrouting history ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MisroutingBucket {
    pub date:              NaiveDate,
    pub total_tickets:     usize,
    pub misrouted_count:   usize,
    pub misrouted_percent: f64,
}

/// Per-day count of misrouted (FAILURE or DEFAULTED) tickets, restricted to
/// the inclusive `[from, to]` range when bounds are given.
pub fn build_misrouting_series(
    records: &[TicketRecord],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<MisroutingBucket> {
    tally_by_day(records)
        .into_iter()
        .filter(|(date, _)| from.map_or(true, |f| *date >= f) && to.map_or(true, |t| *date <= t))
        .map(|(date, day)| MisroutingBucket {
            date,
            total_tickets: day.total,
            misrouted_count: day.misrouted,
            misrouted_percent: accuracy_percent(day.misrouted, day.total),
        })
        .collect()
}
