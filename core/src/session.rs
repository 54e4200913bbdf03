//! Dashboard session: the per-view context threaded through the pipeline.
//!
//! One session exists per opened view (one scope). It owns the latest
//! computed snapshot and the ticket view state; nothing is shared between
//! sessions and nothing lives in module-level state.
//!
//! A refresh builds a complete new MetricsSnapshot and swaps it in, so
//! readers see either the previous snapshot or the new one, never a mix.
//! A failed fetch keeps the previous snapshot.

use crate::{
    clock::{Clock, SystemClock},
    config::MetricsConfig,
    error::RetrievalError,
    forecast::{linear_trend_forecast, moving_average_smoothing, ForecastPoint, SmoothedBucket},
    normalizer::normalize_all,
    preferences::{Preferences, RefreshConfig},
    record::TicketRecord,
    report::ReportSnapshot,
    scheduler::{relative_age_label, CycleOutcome, RefreshScheduler, SchedulerSignal},
    series::{build_daily_series, build_misrouting_series, DailyBucket, MisroutingBucket},
    source::{RecordBatch, RecordSource},
    stats::{compute_stats, AccuracyBadge, AccuracyTrend, StatsSummary},
    store::{MetricsStore, Persisted},
    types::{Millis, ScopeId},
    view_state::{resolve_scope, TicketPage, TicketView, ViewStatePersistence},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub refreshed_at: Millis,
    pub records:      Vec<TicketRecord>,
    pub stats:        StatsSummary,
    pub badge:        AccuracyBadge,
    pub trend:        AccuracyTrend,
    pub daily:        Vec<DailyBucket>,
    pub forecast:     Vec<ForecastPoint>,
    pub smoothed:     Vec<SmoothedBucket>,
}

impl MetricsSnapshot {
    /// Run the whole pipeline over one batch.
    pub fn build(
        batch: &RecordBatch,
        config: &MetricsConfig,
        previous_accuracy: Option<f64>,
        now: Millis,
    ) -> Self {
        let records = normalize_all(&batch.records);
        let stats = compute_stats(&records).with_reported_ratio(batch.reported_accuracy);
        let daily = build_daily_series(&records);
        let forecast = linear_trend_forecast(&daily, config.forecast.horizon_days);
        let smoothed = moving_average_smoothing(&daily, config.forecast.smoothing_window);

        Self {
            refreshed_at: now,
            badge: AccuracyBadge::classify(stats.accuracy_percent, &config.accuracy),
            trend: AccuracyTrend::compare(
                previous_accuracy,
                stats.accuracy_percent,
                config.accuracy.trend_epsilon,
            ),
            records,
            stats,
            daily,
            forecast,
            smoothed,
        }
    }
}

pub struct DashboardSession<'a> {
    session_id: Uuid,
    scope:      ScopeId,
    config:     MetricsConfig,
    prefs:      Preferences<'a>,
    tickets:    TicketView<'a>,
    snapshot:   Option<MetricsSnapshot>,
    last_error: Option<RetrievalError>,
}

impl<'a> DashboardSession<'a> {
    pub fn open(scope: Option<&str>, config: MetricsConfig, store: &'a MetricsStore) -> Self {
        Self::open_with_clock(scope, config, store, SystemClock)
    }

    /// Like open(), but view-state saves are stamped by `clock`.
    pub fn open_with_clock(
        scope: Option<&str>,
        config: MetricsConfig,
        store: &'a MetricsStore,
        clock: impl Clock + 'a,
    ) -> Self {
        let scope = resolve_scope(scope).to_string();
        let persistence = ViewStatePersistence::new(store, config.storage.view_state_namespace.clone())
            .with_clock(clock);
        let tickets = TicketView::enter(Some(&scope), persistence, config.page_size);
        let session_id = Uuid::new_v4();
        log::debug!("Opened dashboard session {session_id} for scope '{scope}'");
        Self {
            session_id,
            scope,
            prefs: Preferences::new(store),
            config,
            tickets,
            snapshot: None,
            last_error: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn last_error(&self) -> Option<&RetrievalError> {
        self.last_error.as_ref()
    }

    pub fn tickets(&self) -> &TicketView<'a> {
        &self.tickets
    }

    pub fn tickets_mut(&mut self) -> &mut TicketView<'a> {
        &mut self.tickets
    }

    /// Compute a new snapshot from `batch` and swap it in. The accuracy is
    /// remembered so the next snapshot can report its trend.
    pub fn apply_batch(&mut self, batch: &RecordBatch, now: Millis) -> &MetricsSnapshot {
        let snapshot = MetricsSnapshot::build(batch, &self.config, self.prefs.last_accuracy(), now);
        if let Persisted::Discarded(_) = self.prefs.save_last_accuracy(snapshot.stats.accuracy_percent) {
            log::debug!("Session {}: trend baseline not saved", self.session_id);
        }
        log::debug!(
            "Session {}: {} tickets, accuracy {:.1}%",
            self.session_id,
            snapshot.stats.total_tickets,
            snapshot.stats.accuracy_percent
        );
        self.last_error = None;
        self.snapshot.insert(snapshot)
    }

    pub fn record_failure(&mut self, error: RetrievalError) {
        self.last_error = Some(error);
    }

    /// The current ticket page over the latest snapshot (empty before the
    /// first successful refresh).
    pub fn render_tickets(&mut self) -> TicketPage {
        let records = self.snapshot.as_ref().map(|s| s.records.as_slice()).unwrap_or(&[]);
        self.tickets.render(records)
    }

    pub fn misrouting_history(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Vec<MisroutingBucket> {
        self.snapshot
            .as_ref()
            .map(|s| build_misrouting_series(&s.records, from, to))
            .unwrap_or_default()
    }

    /// Exportable report of the latest snapshot, or None before the first
    /// successful refresh.
    pub fn report(&self, generated_at: DateTime<Utc>) -> Option<ReportSnapshot> {
        self.snapshot
            .as_ref()
            .map(|s| ReportSnapshot::build(&self.scope, s, generated_at))
    }

    pub fn last_updated_label(&self, now: Millis) -> Option<String> {
        self.snapshot
            .as_ref()
            .map(|s| relative_age_label(now - s.refreshed_at))
    }
}

// ── Refresh runner ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    Completed { cycle_id: u64, tickets: usize },
    Failed { cycle_id: u64, error: RetrievalError },
    /// Another cycle was running, or the trigger was not allowed.
    Dropped,
}

/// Drives refresh cycles for one session: the scheduler decides when, the
/// source supplies records, the session absorbs the result.
pub struct RefreshRunner<'a, C: Clock, S: RecordSource> {
    scheduler: RefreshScheduler<C>,
    session:   DashboardSession<'a>,
    source:    S,
    prefs:     Preferences<'a>,
}

impl<'a, C: Clock, S: RecordSource> RefreshRunner<'a, C, S> {
    /// Load the saved refresh preference and arm the first cycle.
    pub fn new(clock: C, session: DashboardSession<'a>, source: S, store: &'a MetricsStore) -> Self {
        let prefs = Preferences::new(store);
        let defaults = RefreshConfig::from(&session.config().refresh);
        let mut scheduler = RefreshScheduler::new(clock, prefs.refresh_config(defaults));
        scheduler.schedule_next();
        Self {
            scheduler,
            session,
            source,
            prefs,
        }
    }

    pub fn scheduler(&self) -> &RefreshScheduler<C> {
        &self.scheduler
    }

    pub fn session(&self) -> &DashboardSession<'a> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DashboardSession<'a> {
        &mut self.session
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn configure(&mut self, config: RefreshConfig) -> Persisted {
        self.scheduler.configure(config, &self.prefs)
    }

    /// Poll timers and run any automatic cycle that came due.
    pub fn pump(&mut self) -> Vec<CycleReport> {
        let mut reports = Vec::new();
        for signal in self.scheduler.poll() {
            match signal {
                SchedulerSignal::RefreshDue => reports.push(self.run_cycle(false)),
                SchedulerSignal::CountdownTick { remaining_ms } => {
                    log::trace!("Next refresh in {remaining_ms} ms");
                }
            }
        }
        reports
    }

    /// Run a cycle now. Resets the countdown from this cycle's completion.
    pub fn refresh_now(&mut self) -> CycleReport {
        self.run_cycle(true)
    }

    /// Report of the latest snapshot, stamped by the runner's clock.
    pub fn report(&self) -> Option<ReportSnapshot> {
        self.session.report(self.scheduler.clock().now_utc())
    }

    pub fn teardown(&mut self) {
        self.scheduler.teardown();
    }

    fn run_cycle(&mut self, manual: bool) -> CycleReport {
        let Some(ticket) = self.scheduler.trigger_refresh(manual) else {
            return CycleReport::Dropped;
        };
        let cycle_id = ticket.id();

        let (report, outcome) = match self.source.fetch(self.session.scope()) {
            Ok(batch) => {
                let now = self.scheduler.clock().now_ms();
                let tickets = self.session.apply_batch(&batch, now).stats.total_tickets;
                (CycleReport::Completed { cycle_id, tickets }, CycleOutcome::Completed)
            }
            Err(error) => {
                let outcome = CycleOutcome::Failed(error.to_string());
                self.session.record_failure(error.clone());
                (CycleReport::Failed { cycle_id, error }, outcome)
            }
        };

        self.scheduler.complete(ticket, &outcome);
        report
    }
}
