//! Ledger formatting.
//!
//! Turns the wide per-record engine output into the long transaction ledger:
//! one row per (record, hour type) with nonzero hours, dated, relabelled,
//! priced and sorted for export.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::config::{ExportConfig, TranslationConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, ComputedHoursRecord, JurisdictionTag, LedgerRow, PayRate,
    OVERTIME_HOUR_TYPE, REGULAR_HOUR_TYPE,
};

/// The result of formatting engine output into ledger rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerFormatResult {
    /// Ledger rows sorted by (company, employee, work date, hour type).
    pub rows: Vec<LedgerRow>,
    /// One warning per employee with no pay rate.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording the pivot.
    pub audit_step: AuditStep,
}

/// Every column of a ledger row except hours and rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LedgerKey {
    employee_number: u32,
    company: String,
    week_ending: NaiveDate,
    work_date: NaiveDate,
    hour_type: String,
    jurisdiction: JurisdictionTag,
    project: String,
    phase_code_1: String,
    phase_code_2: String,
}

/// Returns the calendar date of a day of the week, given that day 7 is the
/// week-ending date.
///
/// ```
/// use overtime_ledger::calculation::work_date;
/// use chrono::NaiveDate;
///
/// let week_ending = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
/// assert_eq!(work_date(week_ending, 1), NaiveDate::from_ymd_opt(2026, 1, 12));
/// assert_eq!(work_date(week_ending, 7), Some(week_ending));
/// ```
pub fn work_date(week_ending: NaiveDate, day_of_week: u8) -> Option<NaiveDate> {
    let offset = 7u8.checked_sub(day_of_week)?;
    week_ending.checked_sub_days(Days::new(u64::from(offset)))
}

/// Formats computed records into ledger rows.
///
/// Each record is pivoted into up to three rows: `REG` from the regular
/// bucket, `OT` from the overtime bucket and the record's hour type from the
/// other bucket (a blank type is labelled with
/// [`ExportConfig::untyped_other_label`]). Hour types are relabelled through
/// the translation table, rows sharing every ledger column are summed, and
/// rows with zero hours are dropped. Pay rates are joined on (company,
/// employee); a missing rate leaves the row unpriced and records a warning.
///
/// Formatting is deterministic: the same input always yields the same rows
/// in the same order.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when a work date falls outside
/// the supported calendar.
pub fn format_ledger(
    records: &[ComputedHoursRecord],
    pay_rates: &[PayRate],
    translations: &TranslationConfig,
    export: &ExportConfig,
    step_number: u32,
) -> EngineResult<LedgerFormatResult> {
    let mut rows: Vec<LedgerRow> = Vec::new();
    let mut index: HashMap<LedgerKey, usize> = HashMap::new();
    let mut dropped = 0usize;

    for computed in records {
        let record = computed.source.canonical();
        let resolved = &computed.source.resolved;
        let date = work_date(record.week_ending, record.day_of_week).ok_or_else(|| {
            EngineError::CalculationError {
                message: format!("no work date for {}", record.day_key()),
            }
        })?;

        let other_type = if computed.hour_type.trim().is_empty() {
            export.untyped_other_label.as_str()
        } else {
            computed.hour_type.as_str()
        };

        for (hour_type, hours) in [
            (REGULAR_HOUR_TYPE, computed.regular_hours),
            (OVERTIME_HOUR_TYPE, computed.overtime_hours),
            (other_type, computed.other_hours),
        ] {
            if hours.is_zero() {
                dropped += 1;
                continue;
            }

            let key = LedgerKey {
                employee_number: record.employee_number,
                company: record.company.clone(),
                week_ending: record.week_ending,
                work_date: date,
                hour_type: translations.hour_type_label(hour_type),
                jurisdiction: resolved.jurisdiction.clone(),
                project: resolved.project.clone(),
                phase_code_1: resolved.phase_code_1.clone(),
                phase_code_2: resolved.phase_code_2.clone(),
            };

            match index.get(&key) {
                Some(&existing) => rows[existing].hours += hours,
                None => {
                    index.insert(key.clone(), rows.len());
                    rows.push(LedgerRow {
                        employee_number: key.employee_number,
                        company: key.company,
                        week_ending: key.week_ending,
                        work_date: key.work_date,
                        hour_type: key.hour_type,
                        hours,
                        jurisdiction: key.jurisdiction,
                        project: key.project,
                        phase_code_1: key.phase_code_1,
                        phase_code_2: key.phase_code_2,
                        pay_rate: None,
                    });
                }
            }
        }
    }

    let merged = rows.len();
    rows.retain(|row| !row.hours.is_zero());
    dropped += merged - rows.len();

    let mut rate_table: HashMap<(String, String), Decimal> = HashMap::new();
    for rate in pay_rates {
        let key = (
            translations.company_name(&rate.company.to_code()),
            rate.employee_number.to_code(),
        );
        rate_table.entry(key).or_insert(rate.rate);
    }

    let mut warnings = Vec::new();
    let mut missing: HashSet<(String, u32)> = HashSet::new();
    for row in &mut rows {
        let key = (row.company.clone(), row.employee_number.to_string());
        row.pay_rate = rate_table.get(&key).copied();
        if row.pay_rate.is_none() && missing.insert((row.company.clone(), row.employee_number)) {
            let miss = EngineError::LookupMiss {
                lookup: "pay rate".to_string(),
                key: format!("{}/{}", row.company, row.employee_number),
            };
            warn!(error = %miss, "Ledger rows left without a pay rate");
            warnings.push(AuditWarning::from_error(&miss, "low"));
        }
    }

    rows.sort_by(|a, b| {
        (&a.company, a.employee_number, a.work_date, &a.hour_type).cmp(&(
            &b.company,
            b.employee_number,
            b.work_date,
            &b.hour_type,
        ))
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "ledger_format".to_string(),
        rule_name: "Ledger Formatter".to_string(),
        input: serde_json::json!({
            "records": records.len(),
            "pay_rates": pay_rates.len()
        }),
        output: serde_json::json!({
            "rows": rows.len(),
            "dropped_zero_rows": dropped,
            "employees_without_rate": missing.len()
        }),
        reasoning: format!(
            "{} records pivoted into {} ledger rows; {} employees have no pay rate",
            records.len(),
            rows.len(),
            missing.len()
        ),
    };

    Ok(LedgerFormatResult {
        rows,
        warnings,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalRecord, ClassifiedRecord, OvertimeRule, RawValue, ResolvedRecord};
    use chrono::Datelike;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn computed(
        employee: u32,
        day: u8,
        regular: &str,
        overtime: &str,
        other: &str,
        hour_type: &str,
    ) -> ComputedHoursRecord {
        let source = ClassifiedRecord {
            resolved: ResolvedRecord {
                record: CanonicalRecord {
                    company: "APC".to_string(),
                    employee_number: employee,
                    department: "10".to_string(),
                    week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
                    week_number: 3,
                    day_of_week: day,
                    job: "2301".to_string(),
                    subjob: "1".to_string(),
                    cost_distribution: "100200300".to_string(),
                    hour_type: String::new(),
                    regular: dec(regular),
                    overtime: dec(overtime),
                    other: dec(other),
                },
                jurisdiction: JurisdictionTag::Cahq,
                project: "2301001".to_string(),
                phase_code_1: "100200".to_string(),
                phase_code_2: "300".to_string(),
            },
            overtime_rule: OvertimeRule::DailyCap,
        };
        ComputedHoursRecord {
            source,
            regular_hours: dec(regular),
            overtime_hours: dec(overtime),
            other_hours: dec(other),
            hour_type: hour_type.to_string(),
        }
    }

    fn rate(company: i64, employee: i64, rate: &str) -> PayRate {
        PayRate {
            company: RawValue::Integer(company),
            employee_number: RawValue::Integer(employee),
            rate: dec(rate),
        }
    }

    fn format(records: &[ComputedHoursRecord], pay_rates: &[PayRate]) -> LedgerFormatResult {
        format_ledger(
            records,
            pay_rates,
            &TranslationConfig::default(),
            &ExportConfig::default(),
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_record_pivots_into_one_row_per_bucket() {
        let result = format(&[computed(100, 1, "8", "4", "1", "DT")], &[]);
        let types: Vec<&str> = result.rows.iter().map(|r| r.hour_type.as_str()).collect();

        assert_eq!(types, vec!["DT", "OT", "REG"]);
        assert_eq!(result.rows[0].hours, dec("1"));
        assert_eq!(result.rows[1].hours, dec("4"));
        assert_eq!(result.rows[2].hours, dec("8"));
    }

    #[test]
    fn test_zero_hour_rows_are_dropped() {
        let result = format(&[computed(100, 1, "6", "0", "0", "")], &[]);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].hour_type, "REG");
        assert!(result.rows.iter().all(|r| !r.hours.is_zero()));
        assert_eq!(result.audit_step.output["dropped_zero_rows"], 2);
    }

    #[test]
    fn test_hour_types_are_relabelled() {
        let result = format(
            &[
                computed(100, 1, "0", "0", "8", "VA"),
                computed(100, 2, "0", "0", "8", "HL"),
                computed(100, 3, "0", "0", "2", "JD"),
            ],
            &[],
        );
        let types: Vec<&str> = result.rows.iter().map(|r| r.hour_type.as_str()).collect();

        assert_eq!(types, vec!["VAC", "HOL", "JD"]);
    }

    #[test]
    fn test_untyped_other_hours_get_default_label() {
        let result = format(&[computed(100, 1, "0", "0", "3", "")], &[]);
        assert_eq!(result.rows[0].hour_type, "OTH");
    }

    #[test]
    fn test_work_date_counts_back_from_week_ending() {
        let result = format(
            &[computed(100, 1, "8", "0", "0", ""), computed(100, 7, "8", "0", "0", "")],
            &[],
        );

        assert_eq!(result.rows[0].work_date, NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(result.rows[1].work_date, NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
    }

    #[test]
    fn test_work_date_rejects_invalid_day() {
        let week_ending = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
        assert_eq!(work_date(week_ending, 8), None);
    }

    #[test]
    fn test_rows_sharing_every_column_are_summed() {
        let result = format(
            &[computed(100, 1, "3", "0", "0", ""), computed(100, 1, "2.5", "0", "0", "")],
            &[],
        );

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].hours, dec("5.5"));
    }

    #[test]
    fn test_rows_differing_in_project_stay_separate() {
        let mut other_job = computed(100, 1, "0", "0", "1", "DT");
        other_job.source.resolved.project = "2400".to_string();
        let result = format(&[computed(100, 1, "0", "0", "1", "DT"), other_job], &[]);

        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_pay_rates_are_joined_by_company_and_employee() {
        let result = format(
            &[computed(100, 1, "8", "0", "0", ""), computed(101, 1, "8", "0", "0", "")],
            &[rate(1, 100, "31.25"), rate(30, 101, "99")],
        );

        assert_eq!(result.rows[0].pay_rate, Some(dec("31.25")));
        assert_eq!(result.rows[1].pay_rate, None);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("APC/101"));
    }

    #[test]
    fn test_one_warning_per_employee_without_rate() {
        let result = format(
            &[computed(100, 1, "8", "2", "0", ""), computed(100, 2, "8", "0", "0", "")],
            &[],
        );

        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.audit_step.output["employees_without_rate"], 1);
    }

    #[test]
    fn test_rows_sorted_by_company_employee_date_type() {
        let mut mee = computed(50, 1, "8", "0", "0", "");
        mee.source.resolved.record.company = "MEE".to_string();
        let result = format(
            &[
                mee,
                computed(200, 2, "8", "0", "0", ""),
                computed(100, 3, "8", "1", "0", ""),
                computed(100, 1, "8", "0", "0", ""),
            ],
            &[],
        );
        let order: Vec<(String, u32, u32, String)> = result
            .rows
            .iter()
            .map(|r| {
                (
                    r.company.clone(),
                    r.employee_number,
                    r.work_date.day(),
                    r.hour_type.clone(),
                )
            })
            .collect();

        assert_eq!(
            order,
            vec![
                ("APC".to_string(), 100, 12, "REG".to_string()),
                ("APC".to_string(), 100, 14, "OT".to_string()),
                ("APC".to_string(), 100, 14, "REG".to_string()),
                ("APC".to_string(), 200, 13, "REG".to_string()),
                ("MEE".to_string(), 50, 12, "REG".to_string()),
            ]
        );
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let records = vec![
            computed(200, 2, "8", "1", "0", ""),
            computed(100, 1, "8", "4", "2", "DT"),
            computed(100, 1, "0", "0", "8", "VA"),
        ];
        let first = format(&records, &[rate(1, 100, "30")]);
        let second = format(&records, &[rate(1, 100, "30")]);

        assert_eq!(first.rows, second.rows);
        assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn test_row_carries_identifiers() {
        let row = &format(&[computed(100, 1, "8", "0", "0", "")], &[]).rows[0];

        assert_eq!(row.jurisdiction, JurisdictionTag::Cahq);
        assert_eq!(row.project, "2301001");
        assert_eq!(row.phase_code_1, "100200");
        assert_eq!(row.phase_code_2, "300");
        assert_eq!(row.week_ending, NaiveDate::from_ymd_opt(2026, 1, 18).unwrap());
    }
}
