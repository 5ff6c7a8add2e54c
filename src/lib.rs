//! Market watch engine: indicator thresholds, position proximity and
//! deduplicated alert selection over periodic quote snapshots.

pub mod common;
pub mod config;
pub mod core;
pub mod history;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
