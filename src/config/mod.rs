//! Configuration loading and management for the overtime ledger engine.
//!
//! This module provides functionality to load the overtime thresholds,
//! translation tables and export formatting from YAML files. Every value
//! has a built-in default, so a [`PipelineConfig::default()`] runs the
//! engine without any files.
//!
//! # Example
//!
//! ```no_run
//! use overtime_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Daily cap: {}", config.config().thresholds.daily_regular_hours);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ExportConfig, PipelineConfig, ThresholdConfig, TranslationConfig};
