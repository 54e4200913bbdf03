//! Global preferences: auto-refresh settings and the last shown accuracy.
//!
//! These are not scoped per department. Reads fall back to defaults on any
//! failure; writes are best-effort.

use crate::{
    config::{RefreshDefaults, DEFAULT_REFRESH_INTERVAL_MS, MAX_REFRESH_INTERVAL_MS},
    store::{MetricsStore, Persisted},
    types::Millis,
};
use serde::{Deserialize, Serialize};

const AUTO_REFRESH_ENABLED_KEY: &str = "autoRefreshEnabled";
const AUTO_REFRESH_INTERVAL_KEY: &str = "autoRefreshIntervalMs";
const LAST_ACCURACY_KEY: &str = "routingAccuracyLast";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshConfig {
    pub enabled:     bool,
    pub interval_ms: u64,
}

impl RefreshConfig {
    /// A zero interval falls back to the default; anything above
    /// MAX_REFRESH_INTERVAL_MS is capped to it.
    pub fn new(enabled: bool, interval_ms: u64) -> Self {
        let interval_ms = match interval_ms {
            0 => DEFAULT_REFRESH_INTERVAL_MS,
            ms => ms.min(MAX_REFRESH_INTERVAL_MS),
        };
        Self { enabled, interval_ms }
    }

    pub fn interval(&self) -> Millis {
        Millis::try_from(self.interval_ms).unwrap_or(Millis::MAX)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::new(true, DEFAULT_REFRESH_INTERVAL_MS)
    }
}

impl From<&RefreshDefaults> for RefreshConfig {
    fn from(defaults: &RefreshDefaults) -> Self {
        Self::new(defaults.enabled, defaults.interval_ms)
    }
}

pub struct Preferences<'a> {
    store: &'a MetricsStore,
}

impl<'a> Preferences<'a> {
    pub fn new(store: &'a MetricsStore) -> Self {
        Self { store }
    }

    /// Saved refresh settings layered over `defaults`. An unreadable or
    /// non-positive interval keeps the default.
    pub fn refresh_config(&self, defaults: RefreshConfig) -> RefreshConfig {
        let enabled = match self.read(AUTO_REFRESH_ENABLED_KEY).as_deref() {
            Some("true")  => true,
            Some("false") => false,
            _             => defaults.enabled,
        };
        let interval_ms = self
            .read(AUTO_REFRESH_INTERVAL_KEY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(defaults.interval_ms);
        RefreshConfig::new(enabled, interval_ms)
    }

    pub fn save_refresh_config(&self, config: &RefreshConfig) -> Persisted {
        let result = self
            .store
            .put_preference(AUTO_REFRESH_ENABLED_KEY, &config.enabled.to_string())
            .and_then(|()| {
                self.store
                    .put_preference(AUTO_REFRESH_INTERVAL_KEY, &config.interval_ms.to_string())
            });
        Persisted::from_result(result, "auto-refresh preference")
    }

    pub fn last_accuracy(&self) -> Option<f64> {
        self.read(LAST_ACCURACY_KEY)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn save_last_accuracy(&self, accuracy_percent: f64) -> Persisted {
        let result = self
            .store
            .put_preference(LAST_ACCURACY_KEY, &accuracy_percent.to_string());
        Persisted::from_result(result, "last accuracy")
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get_preference(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not read preference '{key}': {e}");
                None
            }
        }
    }
}
