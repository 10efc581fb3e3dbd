//! Calculation logic for the overtime ledger engine.
//!
//! This module contains every stage of a batch run: canonical record
//! building, jurisdiction resolution, overtime classification, the
//! daily-cap and weekly-cap overtime engines, ledger formatting, and the
//! pipeline that chains them.

mod canonical_builder;
mod daily_cap_overtime;
mod jurisdiction_resolver;
mod ledger_formatter;
mod overtime_classifier;
mod pipeline;
mod threshold;
mod weekly_cap_overtime;

pub use canonical_builder::{CanonicalBuildResult, build_canonical_records};
pub use daily_cap_overtime::{DailyCapResult, apply_daily_cap};
pub use jurisdiction_resolver::{
    JurisdictionResolution, pad_subjob, resolve_jurisdictions, split_phase_code,
};
pub use ledger_formatter::{LedgerFormatResult, format_ledger, work_date};
pub use overtime_classifier::{
    OvertimeClassification, OvertimeRegime, RegimeMap, build_regime_map, classify_overtime_rules,
};
pub use pipeline::{BatchInput, process_batch};
pub use threshold::{ThresholdSplit, split_at_threshold, verify_conservation};
pub use weekly_cap_overtime::{WeeklyCapResult, apply_weekly_cap};
