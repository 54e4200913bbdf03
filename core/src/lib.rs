//! Routing-metrics analytics and view-state engine.
//!
//! Pipeline: raw records → normalizer → {stats, series → forecast, filter};
//! the ticket view persists its state per scope; the refresh scheduler
//! re-enters the pipeline on an interval.

pub mod clock;
pub mod config;
pub mod demo;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod normalizer;
pub mod preferences;
pub mod record;
pub mod report;
pub mod scheduler;
pub mod series;
pub mod session;
pub mod source;
pub mod stats;
pub mod store;
pub mod timer;
pub mod types;
pub mod view_state;
