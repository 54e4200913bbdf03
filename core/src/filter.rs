//! Ticket filter engine: compound filtering, facet counts, pagination.
//!
//! RULES:
//!   - apply_filters() preserves input order; an empty FilterState is the
//!     identity.
//!   - Facet counts answer "how many records would remain if this chip were
//!     selected": every other active filter applies, the facet's own
//!     current selection does not.
//!   - paginate() never returns a page outside [1, total_pages].
//!   - UNKNOWN records match neither routing value; only the "all" routing
//!     selection keeps them.

use crate::record::{Outcome, Priority, TicketRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Routing-outcome filter.
///
/// Correct matches SUCCESS only; Incorrect matches FAILURE and DEFAULTED.
/// UNKNOWN matches neither. This is the same split StatsSummary uses for
/// accuracy and incorrect_count, so the filtered table and the headline
/// figures agree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoutingOutcome {
    Correct,
    Incorrect,
}

impl RoutingOutcome {
    pub fn matches(&self, status: Outcome) -> bool {
        match self {
            Self::Correct   => status == Outcome::Success,
            Self::Incorrect => status.is_misrouted(),
        }
    }
}

impl fmt::Display for RoutingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Correct   => "correct",
            Self::Incorrect => "incorrect",
        })
    }
}

impl FromStr for RoutingOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "correct"   => Ok(Self::Correct),
            "incorrect" => Ok(Self::Incorrect),
            other       => Err(format!("unrecognised routing outcome '{other}'")),
        }
    }
}

/// Active filters. `None` means "all" and is persisted as an empty string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default, with = "blank_is_none")]
    pub status: Option<Outcome>,
    #[serde(default, with = "blank_is_none")]
    pub routing: Option<RoutingOutcome>,
    #[serde(default, with = "blank_is_none")]
    pub priority: Option<Priority>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.status.is_none()
            && self.routing.is_none()
            && self.priority.is_none()
    }

    /// The same filters with `dimension`'s own selection cleared.
    pub fn without(&self, dimension: FacetDimension) -> Self {
        let mut other = self.clone();
        match dimension {
            FacetDimension::Status   => other.status = None,
            FacetDimension::Priority => other.priority = None,
        }
        other
    }

    pub fn matches(&self, record: &TicketRecord) -> bool {
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            if !record.id.to_lowercase().contains(&term)
                && !record.subject.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if self.routing.is_some_and(|r| !r.matches(record.status)) {
            return false;
        }
        if self.priority.is_some_and(|p| p != record.priority) {
            return false;
        }
        true
    }

    fn search_term(&self) -> Option<&str> {
        Some(self.search.trim()).filter(|t| !t.is_empty())
    }
}

/// Keep records passing every active filter, in their original order.
pub fn apply_filters<'a>(records: &'a [TicketRecord], filters: &FilterState) -> Vec<&'a TicketRecord> {
    records.iter().filter(|r| filters.matches(r)).collect()
}

// ── Facet counts ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FacetDimension {
    Status,
    Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetCount {
    /// Chip value; the empty string is the "all" chip.
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetCounts {
    pub dimension: FacetDimension,
    /// "All" first, then candidates in display order.
    pub entries:   Vec<FacetCount>,
}

impl FacetCounts {
    pub fn get(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.value.eq_ignore_ascii_case(value))
            .map(|e| e.count)
    }
}

/// Chip counts for one dimension.
///
/// Status candidates are the three known outcomes, plus UNKNOWN when any
/// record carries it. Priority candidates are all four codes.
pub fn facet_counts(
    records: &[TicketRecord],
    filters: &FilterState,
    dimension: FacetDimension,
) -> FacetCounts {
    let base = apply_filters(records, &filters.without(dimension));

    let mut entries = vec![FacetCount {
        value: String::new(),
        count: base.len(),
    }];

    match dimension {
        FacetDimension::Status => {
            let has_unknown = records.iter().any(|r| r.status == Outcome::Unknown);
            entries.extend(
                Outcome::ALL
                    .into_iter()
                    .filter(|o| *o != Outcome::Unknown || has_unknown)
                    .map(|o| FacetCount {
                        value: o.code().to_string(),
                        count: base.iter().filter(|r| r.status == o).count(),
                    }),
            );
        }
        FacetDimension::Priority => {
            entries.extend(Priority::ALL.into_iter().map(|p| FacetCount {
                value: p.code().to_string(),
                count: base.iter().filter(|r| r.priority == p).count(),
            }));
        }
    }

    FacetCounts { dimension, entries }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub total_pages:  usize,
    pub current_page: usize,
    pub items:        &'a [T],
}

/// `max(1, ceil(len / page_size))`. A page size of 0 is treated as 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamp any requested page (0, negative, past the end) into range.
pub fn clamp_page(page: i64, total_pages: usize) -> usize {
    let last = total_pages.max(1) as i64;
    page.clamp(1, last) as usize
}

pub fn paginate<T>(items: &[T], page: i64, page_size: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let total_pages = total_pages(items.len(), size);
    let current_page = clamp_page(page, total_pages);

    let start = ((current_page - 1) * size).min(items.len());
    let end = (start + size).min(items.len());

    Page {
        total_pages,
        current_page,
        items: &items[start..end],
    }
}

// ── Serde helper ─────────────────────────────────────────────────────────────

/// Persist `None` as `""` and read blank strings back as `None`.
mod blank_is_none {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.collect_str(v),
            None    => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some).map_err(de::Error::custom)
    }
}
