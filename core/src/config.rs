use crate::error::{MetricsError, MetricsResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60_000;
/// Longest auto-refresh interval accepted: one day.
pub const MAX_REFRESH_INTERVAL_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshDefaults {
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// Days projected by the trend forecast.
    pub horizon_days: u32,
    /// Trailing window used by the moving-average smoothing.
    pub smoothing_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccuracyThresholds {
    /// Accuracy at or above this is "good".
    pub good_percent: f64,
    /// Accuracy at or above this (and below good) is "ok".
    pub ok_percent: f64,
    /// Changes smaller than this, in percentage points, count as steady.
    pub trend_epsilon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Namespace prefixed to every persisted view-state key.
    pub view_state_namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub page_size: usize,
    pub refresh: RefreshDefaults,
    pub forecast: ForecastConfig,
    pub accuracy: AccuracyThresholds,
    pub storage: StorageConfig,
}

impl MetricsConfig {
    /// Load from the data/ directory.
    /// In tests, use MetricsConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/metrics/metrics_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MetricsConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> MetricsResult<()> {
        let reason = if self.page_size == 0 {
            "page_size must be positive".to_string()
        } else if self.refresh.interval_ms == 0 {
            "refresh.interval_ms must be positive".to_string()
        } else if self.refresh.interval_ms > MAX_REFRESH_INTERVAL_MS {
            format!(
                "refresh.interval_ms ({}) exceeds {MAX_REFRESH_INTERVAL_MS}",
                self.refresh.interval_ms
            )
        } else if self.accuracy.ok_percent > self.accuracy.good_percent {
            format!(
                "accuracy.ok_percent ({}) exceeds accuracy.good_percent ({})",
                self.accuracy.ok_percent, self.accuracy.good_percent
            )
        } else if self.storage.view_state_namespace.trim().is_empty() {
            "storage.view_state_namespace must not be empty".to_string()
        } else {
            return Ok(());
        };
        Err(MetricsError::Config { reason })
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            refresh: RefreshDefaults {
                enabled: true,
                interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            },
            forecast: ForecastConfig {
                horizon_days: 7,
                smoothing_window: 7,
            },
            accuracy: AccuracyThresholds {
                good_percent: 90.0,
                ok_percent: 70.0,
                trend_epsilon: 0.1,
            },
            storage: StorageConfig {
                view_state_namespace: "departmentTicketFilters".into(),
            },
        }
    }
}
