//! Ledger output models.
//!
//! This module contains the [`LedgerBatch`] type and its associated
//! structures that capture everything a batch run produces: the long-format
//! [`LedgerRow`]s, aggregated [`LedgerTotals`] and the audit trace.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, JurisdictionTag, RawValue};

/// Hour-type label of the regular bucket.
pub const REGULAR_HOUR_TYPE: &str = "REG";
/// Hour-type label of the overtime bucket.
pub const OVERTIME_HOUR_TYPE: &str = "OT";
/// Hour-type label of double-time carved out of overtime.
pub const DOUBLE_TIME_HOUR_TYPE: &str = "DT";

/// A pay-rate lookup entry as returned by the pay-rate query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayRate {
    /// Company number.
    pub company: RawValue,
    /// Employee number.
    pub employee_number: RawValue,
    /// Hourly rate.
    pub rate: Decimal,
}

/// One transaction line of the exported ledger.
///
/// # Example
///
/// ```
/// use overtime_ledger::models::{JurisdictionTag, LedgerRow};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let row = LedgerRow {
///     employee_number: 100,
///     company: "APC".to_string(),
///     week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
///     work_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
///     hour_type: "REG".to_string(),
///     hours: Decimal::new(8, 0),
///     jurisdiction: JurisdictionTag::Cahq,
///     project: "2301001".to_string(),
///     phase_code_1: "100200".to_string(),
///     phase_code_2: "300".to_string(),
///     pay_rate: None,
/// };
/// assert_eq!(row.jurisdiction.as_str(), "CAHQ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Employee number.
    pub employee_number: u32,
    /// Company name.
    pub company: String,
    /// Week-ending date. Not written to the export file.
    pub week_ending: NaiveDate,
    /// Calendar date the hours were worked.
    pub work_date: NaiveDate,
    /// Hour-type label (REG, OT, DT, HOL, VAC, ...).
    pub hour_type: String,
    /// Number of hours; never zero.
    pub hours: Decimal,
    /// Jurisdiction the hours were worked under.
    pub jurisdiction: JurisdictionTag,
    /// Job number followed by the zero-padded subjob.
    pub project: String,
    /// First phase code segment.
    pub phase_code_1: String,
    /// Second phase code segment.
    pub phase_code_2: String,
    /// Hourly rate, when the pay-rate lookup had one.
    pub pay_rate: Option<Decimal>,
}

/// Aggregated hour totals for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Total regular hours.
    pub regular_hours: Decimal,
    /// Total overtime hours.
    pub overtime_hours: Decimal,
    /// Total double-time hours.
    pub double_time_hours: Decimal,
    /// Total hours of every other type (holiday, vacation, ...).
    pub other_hours: Decimal,
    /// Number of ledger rows.
    pub row_count: usize,
}

impl LedgerTotals {
    /// Aggregates ledger rows by hour bucket.
    pub fn from_rows(rows: &[LedgerRow]) -> Self {
        let mut totals = LedgerTotals {
            row_count: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.hour_type.as_str() {
                REGULAR_HOUR_TYPE => totals.regular_hours += row.hours,
                OVERTIME_HOUR_TYPE => totals.overtime_hours += row.hours,
                DOUBLE_TIME_HOUR_TYPE => totals.double_time_hours += row.hours,
                _ => totals.other_hours += row.hours,
            }
        }
        totals
    }

    /// Returns the sum of every bucket.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours + self.double_time_hours + self.other_hours
    }
}

/// The complete result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBatch {
    /// Unique identifier for this batch.
    pub batch_id: Uuid,
    /// When the batch was processed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that processed the batch.
    pub engine_version: String,
    /// The latest week-ending date in the batch; `None` for an empty batch.
    pub week_ending: Option<NaiveDate>,
    /// The ledger rows, sorted for export.
    pub rows: Vec<LedgerRow>,
    /// Aggregated totals.
    pub totals: LedgerTotals,
    /// Complete audit trace of the run.
    pub audit_trace: AuditTrace,
}

impl LedgerBatch {
    /// Returns the export file stem, `YYYYMMDD_merge`.
    ///
    /// # Example
    ///
    /// ```
    /// use overtime_ledger::models::{AuditTrace, LedgerBatch, LedgerTotals};
    /// use chrono::{NaiveDate, Utc};
    /// use uuid::Uuid;
    ///
    /// let batch = LedgerBatch {
    ///     batch_id: Uuid::new_v4(),
    ///     timestamp: Utc::now(),
    ///     engine_version: "0.1.0".to_string(),
    ///     week_ending: NaiveDate::from_ymd_opt(2026, 1, 18),
    ///     rows: vec![],
    ///     totals: LedgerTotals::default(),
    ///     audit_trace: AuditTrace { steps: vec![], warnings: vec![], duration_us: 0 },
    /// };
    /// assert_eq!(batch.export_file_stem().as_deref(), Some("20260118_merge"));
    /// ```
    pub fn export_file_stem(&self) -> Option<String> {
        self.week_ending
            .map(|date| format!("{}_merge", date.format("%Y%m%d")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_row(hour_type: &str, hours: &str) -> LedgerRow {
        LedgerRow {
            employee_number: 100,
            company: "APC".to_string(),
            week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
            work_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            hour_type: hour_type.to_string(),
            hours: dec(hours),
            jurisdiction: JurisdictionTag::Cahq,
            project: "2301001".to_string(),
            phase_code_1: "100200".to_string(),
            phase_code_2: "300".to_string(),
            pay_rate: Some(dec("31.25")),
        }
    }

    #[test]
    fn test_totals_bucket_by_hour_type() {
        let rows = vec![
            sample_row("REG", "8"),
            sample_row("OT", "4"),
            sample_row("DT", "1.5"),
            sample_row("VAC", "8"),
            sample_row("HOL", "2"),
        ];

        let totals = LedgerTotals::from_rows(&rows);

        assert_eq!(totals.regular_hours, dec("8"));
        assert_eq!(totals.overtime_hours, dec("4"));
        assert_eq!(totals.double_time_hours, dec("1.5"));
        assert_eq!(totals.other_hours, dec("10"));
        assert_eq!(totals.row_count, 5);
        assert_eq!(totals.total_hours(), dec("23.5"));
    }

    #[test]
    fn test_totals_of_empty_ledger() {
        let totals = LedgerTotals::from_rows(&[]);
        assert_eq!(totals, LedgerTotals::default());
    }

    #[test]
    fn test_ledger_row_serialization() {
        let json = serde_json::to_string(&sample_row("REG", "8.0")).unwrap();
        assert!(json.contains("\"hour_type\":\"REG\""));
        assert!(json.contains("\"hours\":\"8.0\""));
        assert!(json.contains("\"jurisdiction\":\"CAHQ\""));
        assert!(json.contains("\"work_date\":\"2026-01-12\""));
        assert!(json.contains("\"pay_rate\":\"31.25\""));
    }

    #[test]
    fn test_pay_rate_deserialization() {
        let json = r#"{"company": 30, "employee_number": "200", "rate": "42.10"}"#;
        let rate: PayRate = serde_json::from_str(json).unwrap();
        assert_eq!(rate.company, RawValue::Integer(30));
        assert_eq!(rate.employee_number.to_code(), "200");
        assert_eq!(rate.rate, dec("42.10"));
    }
}
