//! Refresh scheduler: keeps the dashboard fresh on an interval.
//!
//! STATES:
//!   Idle       auto-refresh off (or torn down); nothing armed
//!   Scheduled  countdown ticker + single-shot fire timer armed
//!   Running    one refresh cycle in flight; no timers armed
//!
//! RULES:
//!   - At most one cycle is in flight. A trigger while Running is dropped,
//!     never queued.
//!   - Every cycle ends in complete(), success or failure, which re-derives
//!     scheduling from the completion time. The fire timer is single-shot
//!     and re-armed per cycle, so slow cycles push the next one back
//!     instead of piling up.
//!   - Timers are always cancelled before being replaced.
//!   - Fire times saturate at Millis::MAX; they never wrap into the past.
//!   - After teardown() nothing fires and nothing re-arms.

use crate::{
    clock::Clock,
    preferences::{Preferences, RefreshConfig},
    store::Persisted,
    timer::{TimerId, TimerQueue},
    types::Millis,
};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

const COUNTDOWN_PERIOD_MS: Millis = 1_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Scheduled,
    Running,
}

/// Proof that a cycle was started. Handed back to `complete()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTicket {
    id:         u64,
    manual:     bool,
    started_at: Millis,
}

impl CycleTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn started_at(&self) -> Millis {
        self.started_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed,
    Failed(String),
}

/// What a poll observed.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerSignal {
    /// Once per second while Scheduled; drives the countdown label.
    CountdownTick { remaining_ms: Millis },
    /// The fire timer elapsed; the driver should run an automatic cycle.
    RefreshDue,
}

pub struct RefreshScheduler<C: Clock> {
    clock:           C,
    config:          RefreshConfig,
    state:           SchedulerState,
    timers:          TimerQueue,
    countdown_timer: Option<TimerId>,
    fire_timer:      Option<TimerId>,
    next_fire_at:    Option<Millis>,
    in_flight:       Option<u64>,
    cycles_started:  u64,
    torn_down:       bool,
}

impl<C: Clock> RefreshScheduler<C> {
    /// A new scheduler starts Idle. Call schedule_next() to arm it.
    pub fn new(clock: C, config: RefreshConfig) -> Self {
        Self {
            clock,
            config,
            state: SchedulerState::Idle,
            timers: TimerQueue::new(),
            countdown_timer: None,
            fire_timer: None,
            next_fire_at: None,
            in_flight: None,
            cycles_started: 0,
            torn_down: false,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> RefreshConfig {
        self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn next_fire_at(&self) -> Option<Millis> {
        self.next_fire_at
    }

    pub fn armed_timer_count(&self) -> usize {
        self.timers.armed_count()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Persist the new preference, then re-derive scheduling.
    /// While a cycle is running the new config takes effect on completion.
    pub fn configure(&mut self, config: RefreshConfig, prefs: &Preferences<'_>) -> Persisted {
        self.config = RefreshConfig::new(config.enabled, config.interval_ms);
        let persisted = prefs.save_refresh_config(&self.config);
        if self.state != SchedulerState::Running {
            self.schedule_next();
        }
        persisted
    }

    pub fn schedule_next(&mut self) {
        self.cancel_timers();

        if self.torn_down || !self.config.enabled {
            self.state = SchedulerState::Idle;
            log::debug!("Auto-refresh idle");
            return;
        }

        let now = self.clock.now_ms();
        let fire_at = now.saturating_add(self.config.interval());
        self.next_fire_at = Some(fire_at);
        self.countdown_timer = Some(
            self.timers
                .arm_every(now.saturating_add(COUNTDOWN_PERIOD_MS), COUNTDOWN_PERIOD_MS),
        );
        self.fire_timer = Some(self.timers.arm_once(fire_at));
        self.state = SchedulerState::Scheduled;
        log::debug!("Next auto-refresh at {fire_at} (in {} ms)", self.config.interval_ms);
    }

    /// Collect everything that came due since the last poll.
    pub fn poll(&mut self) -> Vec<SchedulerSignal> {
        if self.torn_down {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        let mut signals = Vec::new();

        for id in self.timers.poll_due(now) {
            if Some(id) == self.fire_timer {
                self.fire_timer = None;
                signals.push(SchedulerSignal::RefreshDue);
            } else if Some(id) == self.countdown_timer {
                signals.push(SchedulerSignal::CountdownTick {
                    remaining_ms: self.remaining_ms().unwrap_or(0),
                });
            }
        }
        signals
    }

    /// Start a cycle, or return None when the trigger is dropped:
    /// a cycle is already running, the scheduler was torn down, or an
    /// automatic trigger arrived while auto-refresh is off.
    pub fn trigger_refresh(&mut self, manual: bool) -> Option<CycleTicket> {
        if self.torn_down {
            log::debug!("Refresh trigger after teardown dropped");
            return None;
        }
        if self.state == SchedulerState::Running {
            log::debug!("Refresh already running; trigger dropped (manual={manual})");
            return None;
        }
        if !manual && !self.config.enabled {
            log::debug!("Automatic refresh while disabled dropped");
            return None;
        }

        self.cancel_timers();
        self.cycles_started += 1;
        let ticket = CycleTicket {
            id: self.cycles_started,
            manual,
            started_at: self.clock.now_ms(),
        };
        self.in_flight = Some(ticket.id);
        self.state = SchedulerState::Running;
        log::debug!("Refresh cycle {} started (manual={manual})", ticket.id);
        Some(ticket)
    }

    /// Finish a cycle. Success or failure, scheduling is re-derived from
    /// now. Tickets that are not the in-flight cycle are ignored.
    pub fn complete(&mut self, ticket: CycleTicket, outcome: &CycleOutcome) {
        if self.in_flight != Some(ticket.id) {
            log::debug!("Ignoring completion of stale cycle {}", ticket.id);
            return;
        }
        self.in_flight = None;

        let took = self.clock.now_ms().saturating_sub(ticket.started_at);
        match outcome {
            CycleOutcome::Completed => {
                log::info!("Refresh cycle {} completed in {took} ms", ticket.id)
            }
            CycleOutcome::Failed(reason) => {
                log::warn!("Refresh cycle {} failed after {took} ms: {reason}", ticket.id)
            }
        }

        self.state = SchedulerState::Idle;
        self.schedule_next();
    }

    /// Cancel everything. Used when the owning view goes away.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight = None;
        self.cancel_timers();
        self.timers.cancel_all();
        self.state = SchedulerState::Idle;
        log::debug!("Refresh scheduler torn down");
    }

    pub fn remaining_ms(&self) -> Option<Millis> {
        self.next_fire_at
            .map(|at| at.saturating_sub(self.clock.now_ms()).max(0))
    }

    /// "in 42s (at 12:00:42 UTC)", or a status when nothing is pending.
    pub fn countdown_label(&self) -> String {
        if !self.config.enabled {
            return "auto-refresh is off".into();
        }
        let (Some(at), Some(remaining)) = (self.next_fire_at, self.remaining_ms()) else {
            return "scheduling…".into();
        };
        let seconds = remaining.saturating_add(999) / 1_000;
        match Utc.timestamp_millis_opt(at).single() {
            Some(when) => format!("in {seconds}s (at {} UTC)", when.format("%H:%M:%S")),
            None => format!("in {seconds}s"),
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.countdown_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.fire_timer.take() {
            self.timers.cancel(id);
        }
        self.next_fire_at = None;
    }
}

/// "Last updated" text for an age in milliseconds.
pub fn relative_age_label(elapsed_ms: Millis) -> String {
    let seconds = elapsed_ms.max(0) / 1_000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 5 {
        "just now".into()
    } else if seconds < 60 {
        format!("{seconds} sec ago")
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else {
        format!("{days} days ago")
    }
}
