//! Canonical record building.
//!
//! This module turns loosely-typed export rows into [`CanonicalRecord`]s:
//! fields are coerced to their types, company codes are translated, and
//! rows sharing the same key are summed into a single record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::config::TranslationConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, CanonicalRecord, RawTimesheetRow, RawValue};

/// The result of canonicalizing a batch of raw rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalBuildResult {
    /// Canonical records in first-appearance order.
    pub records: Vec<CanonicalRecord>,
    /// The audit step recording the aggregation.
    pub audit_step: AuditStep,
}

/// Identity of a canonical record; rows sharing it are summed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AggregationKey {
    company: String,
    employee_number: u32,
    week_number: u32,
    day_of_week: u8,
    job: String,
    subjob: String,
    cost_distribution: String,
    department: String,
    week_ending: NaiveDate,
    hour_type: String,
}

/// Builds canonical records from raw timesheet rows.
///
/// Job, subjob, cost distribution, department and other-hours type are
/// coerced to trimmed text; hour cells to decimals, with blank cells read as
/// zero. Company codes are translated through `translations`. Rows sharing
/// (company, employee, week number, day of week, job, subjob, cost
/// distribution, department, week ending, hour type) are summed, never
/// overwritten.
///
/// # Errors
///
/// - [`EngineError::DataFormat`] when a field cannot be coerced, naming the
///   1-based row position.
/// - [`EngineError::NegativeHours`] when a summed bucket is below zero.
///
/// # Example
///
/// ```
/// use overtime_ledger::calculation::build_canonical_records;
/// use overtime_ledger::config::TranslationConfig;
/// use overtime_ledger::models::{RawTimesheetRow, RawValue};
/// use rust_decimal::Decimal;
///
/// let row = RawTimesheetRow {
///     company: RawValue::Integer(1),
///     employee_number: RawValue::Integer(100),
///     week_number: RawValue::Integer(3),
///     day_of_week: RawValue::Integer(1),
///     job: RawValue::Float(2301.0),
///     subjob: Some(RawValue::from("1")),
///     cost_distribution: Some(RawValue::from("100200300")),
///     regular_hours: Some(RawValue::Float(4.0)),
///     overtime_hours: None,
///     other_hours: None,
///     other_hours_type: None,
///     department: RawValue::Integer(10),
///     week_ending: RawValue::from("2026-01-18"),
/// };
///
/// let result = build_canonical_records(&[row.clone(), row], &TranslationConfig::default(), 1)?;
/// assert_eq!(result.records.len(), 1);
/// assert_eq!(result.records[0].company, "APC");
/// assert_eq!(result.records[0].job, "2301");
/// assert_eq!(result.records[0].regular, Decimal::from(8));
/// # Ok::<(), overtime_ledger::error::EngineError>(())
/// ```
pub fn build_canonical_records(
    rows: &[RawTimesheetRow],
    translations: &TranslationConfig,
    step_number: u32,
) -> EngineResult<CanonicalBuildResult> {
    let mut records: Vec<CanonicalRecord> = Vec::new();
    let mut index: HashMap<AggregationKey, usize> = HashMap::new();

    for (position, raw) in rows.iter().enumerate() {
        let record = canonicalize_row(raw, position + 1, translations)?;
        let key = AggregationKey {
            company: record.company.clone(),
            employee_number: record.employee_number,
            week_number: record.week_number,
            day_of_week: record.day_of_week,
            job: record.job.clone(),
            subjob: record.subjob.clone(),
            cost_distribution: record.cost_distribution.clone(),
            department: record.department.clone(),
            week_ending: record.week_ending,
            hour_type: record.hour_type.clone(),
        };

        match index.get(&key) {
            Some(&existing) => {
                let target = &mut records[existing];
                target.regular += record.regular;
                target.overtime += record.overtime;
                target.other += record.other;
            }
            None => {
                index.insert(key, records.len());
                records.push(record);
            }
        }
    }

    for record in &records {
        for (field, hours) in [
            ("regular", record.regular),
            ("overtime", record.overtime),
            ("other", record.other),
        ] {
            if hours < Decimal::ZERO {
                return Err(EngineError::NegativeHours {
                    employee_number: record.employee_number,
                    field: field.to_string(),
                    hours,
                });
            }
        }
    }

    let merged = rows.len() - records.len();
    let total_hours: Decimal = records.iter().map(CanonicalRecord::total_hours).sum();

    let audit_step = AuditStep {
        step_number,
        rule_id: "canonical_records".to_string(),
        rule_name: "Canonical Record Builder".to_string(),
        input: serde_json::json!({
            "rows": rows.len()
        }),
        output: serde_json::json!({
            "records": records.len(),
            "merged_rows": merged,
            "total_hours": total_hours.normalize().to_string()
        }),
        reasoning: format!(
            "{} raw rows normalized into {} records ({} duplicate rows summed)",
            rows.len(),
            records.len(),
            merged
        ),
    };

    Ok(CanonicalBuildResult {
        records,
        audit_step,
    })
}

fn canonicalize_row(
    raw: &RawTimesheetRow,
    row: usize,
    translations: &TranslationConfig,
) -> EngineResult<CanonicalRecord> {
    let employee_number = integer_field(&raw.employee_number, row, "employee_number")?;
    let week_number = integer_field(&raw.week_number, row, "week_number")?;
    let day_of_week = integer_field(&raw.day_of_week, row, "day_of_week")?;

    let day_of_week = u8::try_from(day_of_week)
        .ok()
        .filter(|day| (1..=7).contains(day))
        .ok_or_else(|| data_format(row, "day_of_week", format!("{} is not a day 1-7", day_of_week)))?;

    let week_ending = raw
        .week_ending
        .to_date()
        .map_err(|message| data_format(row, "week_ending", message))?;

    Ok(CanonicalRecord {
        company: translations.company_name(&raw.company.to_code()),
        employee_number: u32::try_from(employee_number)
            .map_err(|_| data_format(row, "employee_number", "out of range".to_string()))?,
        department: raw.department.to_text(),
        week_ending,
        week_number: u32::try_from(week_number)
            .map_err(|_| data_format(row, "week_number", "out of range".to_string()))?,
        day_of_week,
        job: raw.job.to_text(),
        subjob: optional_text(raw.subjob.as_ref()),
        cost_distribution: optional_text(raw.cost_distribution.as_ref()),
        hour_type: optional_text(raw.other_hours_type.as_ref()),
        regular: hours_field(raw.regular_hours.as_ref(), row, "regular_hours")?,
        overtime: hours_field(raw.overtime_hours.as_ref(), row, "overtime_hours")?,
        other: hours_field(raw.other_hours.as_ref(), row, "other_hours")?,
    })
}

fn integer_field(value: &RawValue, row: usize, field: &str) -> EngineResult<i64> {
    value
        .to_integer()
        .map_err(|message| data_format(row, field, message))
}

fn hours_field(value: Option<&RawValue>, row: usize, field: &str) -> EngineResult<Decimal> {
    match value {
        None => Ok(Decimal::ZERO),
        Some(v) if v.is_blank() => Ok(Decimal::ZERO),
        Some(v) => v
            .to_decimal()
            .map_err(|message| data_format(row, field, message)),
    }
}

fn optional_text(value: Option<&RawValue>) -> String {
    value.map(RawValue::to_text).unwrap_or_default()
}

fn data_format(row: usize, field: &str, message: String) -> EngineError {
    EngineError::DataFormat {
        row,
        field: field.to_string(),
        message,
    }
}
