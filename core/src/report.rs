//! Report export: a flat, serialisable copy of one scope's dashboard.
//!
//! RULES:
//!   - A report is built from a completed MetricsSnapshot only; there is no
//!     report before the first successful refresh.
//!   - generated_at comes from the caller's clock, never the wall clock.
//!   - Tickets keep snapshot order and are flattened to display strings.
//!     Spreadsheet or HTML rendering is left to the consumer of the JSON.

use crate::{
    error::MetricsResult,
    record::TicketRecord,
    session::MetricsSnapshot,
    stats::{AccuracyBadge, StatsSummary},
    types::{Millis, ScopeId, TicketId},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTicket {
    pub id:         TicketId,
    pub status:     String,
    pub priority:   String,
    pub subject:    String,
    /// RFC 3339 UTC, or empty when the ticket carries no date.
    pub date:       String,
    pub department: Option<String>,
}

impl From<&TicketRecord> for ExportedTicket {
    fn from(record: &TicketRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: record.status.code().to_string(),
            priority: record.priority.code().to_string(),
            subject: record.subject.clone(),
            date: record
                .created_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
            department: record
                .department_name
                .clone()
                .or_else(|| record.department_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub generated_at: DateTime<Utc>,
    pub scope:        ScopeId,
    /// When the underlying data was fetched, in epoch milliseconds.
    pub refreshed_at: Millis,
    pub stats:        StatsSummary,
    pub badge:        AccuracyBadge,
    pub tickets:      Vec<ExportedTicket>,
}

impl ReportSnapshot {
    pub fn build(scope: &str, snapshot: &MetricsSnapshot, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            scope: scope.to_string(),
            refreshed_at: snapshot.refreshed_at,
            stats: snapshot.stats.clone(),
            badge: snapshot.badge,
            tickets: snapshot.records.iter().map(ExportedTicket::from).collect(),
        }
    }

    pub fn to_json(&self) -> MetricsResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}
