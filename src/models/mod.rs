//! Core data models for the overtime ledger engine.
//!
//! This module contains all the domain models used throughout the engine,
//! one record type per pipeline generation.

mod audit;
mod computed_hours;
mod jurisdiction;
mod ledger;
mod timesheet;

pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use computed_hours::{ClassifiedRecord, ComputedHoursRecord, ResolvedRecord};
pub use jurisdiction::{DAILY_CAP_RULE_CODE, JobJurisdiction, JurisdictionTag, OvertimeRule};
pub use ledger::{
    DOUBLE_TIME_HOUR_TYPE, LedgerBatch, LedgerRow, LedgerTotals, OVERTIME_HOUR_TYPE, PayRate,
    REGULAR_HOUR_TYPE,
};
pub use timesheet::{CanonicalRecord, DayKey, RawTimesheetRow, RawValue, WeekKey};
