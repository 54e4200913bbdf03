//! Per-scope ticket view state and its durable persistence.
//!
//! A TicketView is created when the user enters a scope (a department, or
//! "all"). It reloads whatever was saved for that scope, and every mutation
//! is written back immediately. Writes are best-effort: a failing store
//! never blocks the view.

use crate::{
    clock::{Clock, SystemClock},
    error::MetricsError,
    filter::{apply_filters, clamp_page, facet_counts, paginate, FacetCounts, FacetDimension,
             FilterState, RoutingOutcome},
    record::{Outcome, Priority, TicketRecord},
    store::{MetricsStore, Persisted},
    types::{ScopeId, ALL_SCOPE},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Card,
}

/// The persisted record for one scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SavedViewState {
    pub filters:      FilterState,
    #[serde(default)]
    pub current_view: ViewMode,
    #[serde(default = "first_page")]
    pub current_page: usize,
}

fn first_page() -> usize {
    1
}

impl Default for SavedViewState {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            current_view: ViewMode::default(),
            current_page: first_page(),
        }
    }
}

// ── Persistence ──────────────────────────────────────────────────────────────

pub struct ViewStatePersistence<'a> {
    store:     &'a MetricsStore,
    namespace: String,
    clock:     Box<dyn Clock + 'a>,
}

impl<'a> ViewStatePersistence<'a> {
    /// Stamps saves with the wall clock. Use with_clock() to replay.
    pub fn new(store: &'a MetricsStore, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// `<namespace>:<scope>`, falling back to the "all" scope.
    pub fn key(&self, scope: Option<&str>) -> String {
        format!("{}:{}", self.namespace, resolve_scope(scope))
    }

    pub fn save(&self, scope: Option<&str>, state: &SavedViewState) -> Persisted {
        let key = self.key(scope);
        let result = serde_json::to_string(state)
            .map_err(MetricsError::from)
            .and_then(|payload| self.store.put_view_state(&key, &payload, self.clock.now_ms()));
        Persisted::from_result(result, &format!("view state '{key}'"))
    }

    /// Previously saved state, or None when absent, malformed, or the store
    /// cannot be read.
    pub fn load(&self, scope: Option<&str>) -> Option<SavedViewState> {
        let key = self.key(scope);
        let payload = match self.store.get_view_state(&key) {
            Ok(payload) => payload?,
            Err(e) => {
                log::warn!("Could not read view state '{key}': {e}");
                return None;
            }
        };
        match serde_json::from_str::<SavedViewState>(&payload) {
            Ok(mut state) => {
                state.current_page = state.current_page.max(1);
                Some(state)
            }
            Err(e) => {
                log::warn!("Ignoring malformed view state '{key}': {e}");
                None
            }
        }
    }
}

pub fn resolve_scope(scope: Option<&str>) -> &str {
    scope.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(ALL_SCOPE)
}

// ── Ticket view ──────────────────────────────────────────────────────────────

/// What the renderer needs for one ticket table/card view.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub total_pages:     usize,
    pub current_page:    usize,
    pub page_size:       usize,
    pub total_matching:  usize,
    pub view_mode:       ViewMode,
    pub tickets:         Vec<TicketRecord>,
    pub status_facets:   FacetCounts,
    pub priority_facets: FacetCounts,
}

pub struct TicketView<'a> {
    scope:        ScopeId,
    persistence:  ViewStatePersistence<'a>,
    filters:      FilterState,
    view_mode:    ViewMode,
    current_page: usize,
    page_size:    usize,
}

impl<'a> TicketView<'a> {
    /// Enter a scope, restoring its saved state or starting from defaults.
    pub fn enter(scope: Option<&str>, persistence: ViewStatePersistence<'a>, page_size: usize) -> Self {
        let scope = resolve_scope(scope).to_string();
        let saved = persistence.load(Some(&scope)).unwrap_or_default();
        log::debug!(
            "Entered ticket view for scope '{scope}' (page {}, {:?})",
            saved.current_page,
            saved.current_view
        );
        Self {
            scope,
            persistence,
            filters: saved.filters,
            view_mode: saved.current_view,
            current_page: saved.current_page,
            page_size: page_size.max(1),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn saved_state(&self) -> SavedViewState {
        SavedViewState {
            filters: self.filters.clone(),
            current_view: self.view_mode,
            current_page: self.current_page,
        }
    }

    // ── Filter mutations (always reset to page 1) ──────────────────

    pub fn set_search(&mut self, search: impl Into<String>) -> Persisted {
        self.filters.search = search.into();
        self.filters_changed()
    }

    pub fn set_status(&mut self, status: Option<Outcome>) -> Persisted {
        self.filters.status = status;
        self.filters_changed()
    }

    pub fn set_routing(&mut self, routing: Option<RoutingOutcome>) -> Persisted {
        self.filters.routing = routing;
        self.filters_changed()
    }

    pub fn set_priority(&mut self, priority: Option<Priority>) -> Persisted {
        self.filters.priority = priority;
        self.filters_changed()
    }

    /// Apply a chip click. The empty value (or anything unrecognised)
    /// selects "all" for that dimension.
    pub fn select_chip(&mut self, dimension: FacetDimension, value: &str) -> Persisted {
        match dimension {
            FacetDimension::Status   => self.filters.status = value.parse().ok(),
            FacetDimension::Priority => self.filters.priority = value.parse().ok(),
        }
        self.filters_changed()
    }

    pub fn clear_filters(&mut self) -> Persisted {
        self.filters = FilterState::default();
        self.filters_changed()
    }

    fn filters_changed(&mut self) -> Persisted {
        self.current_page = 1;
        self.persist()
    }

    // ── View and page navigation (never touch filters) ─────────────

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Persisted {
        self.view_mode = mode;
        self.persist()
    }

    pub fn next_page(&mut self) -> Persisted {
        self.current_page = self.current_page.saturating_add(1);
        self.persist()
    }

    pub fn previous_page(&mut self) -> Persisted {
        self.current_page = self.current_page.saturating_sub(1).max(1);
        self.persist()
    }

    pub fn go_to_page(&mut self, page: i64) -> Persisted {
        self.current_page = page.max(1) as usize;
        self.persist()
    }

    /// Filter, facet and paginate `records`. A current page left past the
    /// end (e.g. after the data shrank) is clamped and the clamp persisted.
    pub fn render(&mut self, records: &[TicketRecord]) -> TicketPage {
        let filtered = apply_filters(records, &self.filters);
        let page = paginate(&filtered, self.current_page as i64, self.page_size);

        if page.current_page != self.current_page {
            self.current_page = clamp_page(self.current_page as i64, page.total_pages);
            let _ = self.persist();
        }

        TicketPage {
            total_pages: page.total_pages,
            current_page: page.current_page,
            page_size: self.page_size,
            total_matching: filtered.len(),
            view_mode: self.view_mode,
            tickets: page.items.iter().map(|r| (*r).clone()).collect(),
            status_facets: facet_counts(records, &self.filters, FacetDimension::Status),
            priority_facets: facet_counts(records, &self.filters, FacetDimension::Priority),
        }
    }

    fn persist(&self) -> Persisted {
        self.persistence.save(Some(&self.scope), &self.saved_state())
    }
}
