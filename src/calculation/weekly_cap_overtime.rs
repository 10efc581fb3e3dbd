//! Weekly-cap overtime engine.
//!
//! Records outside the daily-cap rule are reallocated one week-group at a
//! time: regular hours past the weekly cap (40 by default) become overtime.
//! There is no double-time on this path.

use rust_decimal::Decimal;

use crate::config::ThresholdConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, ClassifiedRecord, ComputedHoursRecord};

use super::threshold::{split_at_threshold, verify_conservation};

/// The result of running the weekly-cap engine.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyCapResult {
    /// Computed records in week-group order.
    pub records: Vec<ComputedHoursRecord>,
    /// One audit step per record whose hours were reallocated.
    pub audit_steps: Vec<AuditStep>,
}

/// Applies the weekly regular-hours cap.
///
/// Records are stably sorted by (company, employee, department, week-ending,
/// week-number, day-of-week) and the regular hours of each week-group are
/// summed in that order. The record that crosses the cap keeps the part
/// that fits and moves the rest to overtime; every later record in the
/// week moves all of its regular hours to overtime. Other hours and their
/// type pass through.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when a record is governed by
/// the daily-cap rule or when a week-group's hours are not conserved.
///
/// # Example
///
/// ```
/// use overtime_ledger::calculation::apply_weekly_cap;
/// use overtime_ledger::config::ThresholdConfig;
/// use overtime_ledger::models::{
///     CanonicalRecord, ClassifiedRecord, JurisdictionTag, OvertimeRule, ResolvedRecord,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = |day_of_week: u8| ClassifiedRecord {
///     resolved: ResolvedRecord {
///         record: CanonicalRecord {
///             company: "MEE".to_string(),
///             employee_number: 200,
///             department: "20".to_string(),
///             week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
///             week_number: 3,
///             day_of_week,
///             job: "500".to_string(),
///             subjob: String::new(),
///             cost_distribution: String::new(),
///             hour_type: String::new(),
///             regular: Decimal::from(9),
///             overtime: Decimal::ZERO,
///             other: Decimal::ZERO,
///         },
///         jurisdiction: JurisdictionTag::Az,
///         project: "500".to_string(),
///         phase_code_1: String::new(),
///         phase_code_2: String::new(),
///     },
///     overtime_rule: OvertimeRule::Jurisdiction(JurisdictionTag::Az),
/// };
///
/// let records: Vec<_> = (1..=5).map(day).collect();
/// let result = apply_weekly_cap(&records, &ThresholdConfig::default(), 1)?;
///
/// let regular: Decimal = result.records.iter().map(|r| r.regular_hours).sum();
/// assert_eq!(regular, Decimal::from(40));
/// assert_eq!(result.records[4].overtime_hours, Decimal::from(5));
/// # Ok::<(), overtime_ledger::error::EngineError>(())
/// ```
pub fn apply_weekly_cap(
    records: &[ClassifiedRecord],
    thresholds: &ThresholdConfig,
    first_step_number: u32,
) -> EngineResult<WeeklyCapResult> {
    if let Some(misrouted) = records.iter().find(|r| r.overtime_rule.is_daily_cap()) {
        return Err(EngineError::CalculationError {
            message: format!(
                "record {} carries the daily-cap rule and cannot use the weekly cap",
                misrouted.canonical().day_key()
            ),
        });
    }

    let mut ordered: Vec<&ClassifiedRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.canonical().day_key());

    let mut computed = Vec::with_capacity(ordered.len());
    let mut audit_steps = Vec::new();
    let mut step_number = first_step_number;

    for group in ordered.chunk_by(|a, b| a.canonical().week_key() == b.canonical().week_key()) {
        let mut regular_sum = Decimal::ZERO;
        let mut original_total = Decimal::ZERO;
        let mut computed_total = Decimal::ZERO;

        for source in group {
            let record = source.canonical();
            let split =
                split_at_threshold(regular_sum, record.regular, thresholds.weekly_regular_hours);

            let result = ComputedHoursRecord {
                source: (*source).clone(),
                regular_hours: split.within,
                overtime_hours: split.excess + record.overtime,
                other_hours: record.other,
                hour_type: record.hour_type.clone(),
            };

            if split.excess > Decimal::ZERO {
                audit_steps.push(AuditStep {
                    step_number,
                    rule_id: "weekly_cap_overtime".to_string(),
                    rule_name: "Weekly-Cap Overtime Reallocation".to_string(),
                    input: serde_json::json!({
                        "day_group": record.day_key().to_string(),
                        "job": source.resolved.project,
                        "jurisdiction": source.resolved.jurisdiction.as_str(),
                        "regular": record.regular.normalize().to_string(),
                        "overtime": record.overtime.normalize().to_string(),
                        "regular_before": regular_sum.normalize().to_string()
                    }),
                    output: serde_json::json!({
                        "regular": result.regular_hours.normalize().to_string(),
                        "overtime": result.overtime_hours.normalize().to_string()
                    }),
                    reasoning: format!(
                        "{}h regular over the {}h weekly cap moved to overtime",
                        split.excess.normalize(),
                        thresholds.weekly_regular_hours.normalize()
                    ),
                });
                step_number += 1;
            }

            regular_sum += record.regular;
            original_total += result.original_hours();
            computed_total += result.total_hours();
            computed.push(result);
        }

        if let Some(first) = group.first() {
            let week = first.canonical().week_key();
            verify_conservation(
                &format!(
                    "{}/{}/{}/{}/wk{}",
                    week.company, week.employee_number, week.department, week.week_ending, week.week_number
                ),
                original_total,
                computed_total,
            )?;
        }
    }

    Ok(WeeklyCapResult {
        records: computed,
        audit_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalRecord, JurisdictionTag, OvertimeRule, ResolvedRecord};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(week_ending_day: u32, day: u8, regular: &str, overtime: &str) -> ClassifiedRecord {
        ClassifiedRecord {
            resolved: ResolvedRecord {
                record: CanonicalRecord {
                    company: "MEE".to_string(),
                    employee_number: 200,
                    department: "20".to_string(),
                    week_ending: NaiveDate::from_ymd_opt(2026, 1, week_ending_day).unwrap(),
                    week_number: 3,
                    day_of_week: day,
                    job: "500".to_string(),
                    subjob: String::new(),
                    cost_distribution: String::new(),
                    hour_type: String::new(),
                    regular: dec(regular),
                    overtime: dec(overtime),
                    other: Decimal::ZERO,
                },
                jurisdiction: JurisdictionTag::Az,
                project: "500".to_string(),
                phase_code_1: String::new(),
                phase_code_2: String::new(),
            },
            overtime_rule: OvertimeRule::Jurisdiction(JurisdictionTag::Az),
        }
    }

    fn run(records: &[ClassifiedRecord]) -> WeeklyCapResult {
        apply_weekly_cap(records, &ThresholdConfig::default(), 1).unwrap()
    }

    #[test]
    fn test_week_under_cap_is_unchanged() {
        let records: Vec<_> = (1..=5).map(|day| record(18, day, "8", "0")).collect();
        let result = run(&records);

        assert!(result.records.iter().all(|r| r.regular_hours == dec("8")));
        assert!(result.records.iter().all(|r| r.overtime_hours == dec("0")));
        assert!(result.audit_steps.is_empty());
    }

    #[test]
    fn test_crossing_record_splits_and_later_records_are_all_overtime() {
        let result = run(&[
            record(18, 1, "12", "0"),
            record(18, 2, "12", "0"),
            record(18, 3, "12", "0"),
            record(18, 4, "12", "1"),
            record(18, 5, "6", "0"),
        ]);

        assert_eq!(result.records[2].regular_hours, dec("12"));
        assert_eq!(result.records[3].regular_hours, dec("4"));
        assert_eq!(result.records[3].overtime_hours, dec("9"));
        assert_eq!(result.records[4].regular_hours, dec("0"));
        assert_eq!(result.records[4].overtime_hours, dec("6"));
        assert_eq!(result.audit_steps.len(), 2);
    }

    #[test]
    fn test_no_double_time_on_weekly_path() {
        let result = run(&[record(18, 1, "60", "10")]);
        let computed = &result.records[0];

        assert_eq!(computed.regular_hours, dec("40"));
        assert_eq!(computed.overtime_hours, dec("30"));
        assert_eq!(computed.other_hours, dec("0"));
        assert_eq!(computed.hour_type, "");
    }

    #[test]
    fn test_running_sum_resets_each_week() {
        let result = run(&[
            record(18, 1, "40", "0"),
            record(11, 1, "40", "0"),
            record(18, 2, "2", "0"),
        ]);

        // The week ending on the 11th sorts first.
        assert_eq!(result.records[0].source.canonical().week_ending.to_string(), "2026-01-11");
        assert_eq!(result.records[0].regular_hours, dec("40"));
        assert_eq!(result.records[1].regular_hours, dec("40"));
        assert_eq!(result.records[2].regular_hours, dec("0"));
        assert_eq!(result.records[2].overtime_hours, dec("2"));
    }

    #[test]
    fn test_days_are_summed_chronologically() {
        let result = run(&[record(18, 5, "10", "0"), record(18, 1, "35", "0")]);

        assert_eq!(result.records[0].source.canonical().day_of_week, 1);
        assert_eq!(result.records[0].regular_hours, dec("35"));
        assert_eq!(result.records[1].regular_hours, dec("5"));
        assert_eq!(result.records[1].overtime_hours, dec("5"));
    }

    #[test]
    fn test_other_hours_and_type_pass_through() {
        let mut holiday = record(18, 1, "41", "0");
        holiday.resolved.record.other = dec("8");
        holiday.resolved.record.hour_type = "HL".to_string();

        let result = run(&[holiday]);

        assert_eq!(result.records[0].other_hours, dec("8"));
        assert_eq!(result.records[0].hour_type, "HL");
        assert_eq!(result.records[0].overtime_hours, dec("1"));
    }

    #[test]
    fn test_week_hours_are_conserved() {
        let records = vec![
            record(18, 1, "11.5", "0.5"),
            record(18, 2, "10.25", "0"),
            record(18, 3, "9.75", "2"),
            record(18, 4, "12", "0"),
        ];
        let original: Decimal = records.iter().map(|r| r.canonical().total_hours()).sum();

        let result = run(&records);
        let computed: Decimal = result.records.iter().map(ComputedHoursRecord::total_hours).sum();
        let regular: Decimal = result.records.iter().map(|r| r.regular_hours).sum();

        assert_eq!(computed, original);
        assert_eq!(regular, dec("40"));
        let carried: Decimal = result.records.iter().map(ComputedHoursRecord::original_hours).sum();
        assert_eq!(carried, original);
    }

    #[test]
    fn test_daily_cap_record_is_rejected() {
        let mut daily = record(18, 1, "8", "0");
        daily.overtime_rule = OvertimeRule::DailyCap;

        let result = apply_weekly_cap(&[daily], &ThresholdConfig::default(), 1);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_audit_step_content() {
        let result = apply_weekly_cap(&[record(18, 1, "44", "0")], &ThresholdConfig::default(), 9)
            .unwrap();
        let step = &result.audit_steps[0];

        assert_eq!(step.step_number, 9);
        assert_eq!(step.rule_id, "weekly_cap_overtime");
        assert_eq!(step.input["jurisdiction"], "AZ");
        assert_eq!(step.input["regular"], "44");
        assert_eq!(step.output["regular"], "40");
        assert_eq!(step.output["overtime"], "4");
    }
}
