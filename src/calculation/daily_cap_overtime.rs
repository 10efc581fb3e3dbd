//! Daily-cap overtime engine.
//!
//! Records governed by the daily-cap rule are reallocated one day-group at a
//! time. Regular hours beyond the daily regular cap (8 by default) become
//! overtime, and overtime beyond the daily overtime cap (4 by default)
//! becomes double-time.

use rust_decimal::Decimal;

use crate::config::ThresholdConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, ClassifiedRecord, ComputedHoursRecord, DOUBLE_TIME_HOUR_TYPE};

use super::threshold::{split_at_threshold, verify_conservation};

/// The result of running the daily-cap engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyCapResult {
    /// Computed records in day-group order.
    pub records: Vec<ComputedHoursRecord>,
    /// One audit step per record whose hours were reallocated.
    pub audit_steps: Vec<AuditStep>,
}

/// Applies the daily regular and overtime caps.
///
/// Records are stably sorted by day-group (company, employee, department,
/// week-ending, week-number, day-of-week) and each group is walked with two
/// running sums, one of regular hours and one of overtime hours. Both sums
/// reset at every group boundary.
///
/// - Regular hours that fit under the remaining regular capacity stay
///   regular; the rest move to overtime on top of the record's own overtime.
/// - Overtime that fits under the remaining overtime capacity stays
///   overtime. When any of it does not, the excess is added to the other
///   bucket and the record's hour type becomes `"DT"`. A zero excess leaves
///   the hour type alone.
///
/// Audit steps are numbered from `first_step_number`.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when a record is not governed
/// by the daily-cap rule or when a day-group's hours are not conserved.
///
/// # Example
///
/// ```
/// use overtime_ledger::calculation::apply_daily_cap;
/// use overtime_ledger::config::ThresholdConfig;
/// use overtime_ledger::models::{
///     CanonicalRecord, ClassifiedRecord, JurisdictionTag, OvertimeRule, ResolvedRecord,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = ClassifiedRecord {
///     resolved: ResolvedRecord {
///         record: CanonicalRecord {
///             company: "APC".to_string(),
///             employee_number: 100,
///             department: "10".to_string(),
///             week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
///             week_number: 3,
///             day_of_week: 1,
///             job: "2301".to_string(),
///             subjob: String::new(),
///             cost_distribution: String::new(),
///             hour_type: String::new(),
///             regular: Decimal::from(13),
///             overtime: Decimal::ZERO,
///             other: Decimal::ZERO,
///         },
///         jurisdiction: JurisdictionTag::Cahq,
///         project: "2301".to_string(),
///         phase_code_1: String::new(),
///         phase_code_2: String::new(),
///     },
///     overtime_rule: OvertimeRule::DailyCap,
/// };
///
/// let result = apply_daily_cap(&[record], &ThresholdConfig::default(), 1)?;
/// let computed = &result.records[0];
/// assert_eq!(computed.regular_hours, Decimal::from(8));
/// assert_eq!(computed.overtime_hours, Decimal::from(4));
/// assert_eq!(computed.other_hours, Decimal::from(1));
/// assert_eq!(computed.hour_type, "DT");
/// # Ok::<(), overtime_ledger::error::EngineError>(())
/// ```
pub fn apply_daily_cap(
    records: &[ClassifiedRecord],
    thresholds: &ThresholdConfig,
    first_step_number: u32,
) -> EngineResult<DailyCapResult> {
    if let Some(misrouted) = records.iter().find(|r| !r.overtime_rule.is_daily_cap()) {
        return Err(EngineError::CalculationError {
            message: format!(
                "record {} carries rule '{}' and cannot use daily caps",
                misrouted.canonical().day_key(),
                misrouted.overtime_rule
            ),
        });
    }

    let mut ordered: Vec<&ClassifiedRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.canonical().day_key());

    let mut computed = Vec::with_capacity(ordered.len());
    let mut audit_steps = Vec::new();
    let mut step_number = first_step_number;

    for group in ordered.chunk_by(|a, b| a.canonical().day_key() == b.canonical().day_key()) {
        let mut regular_sum = Decimal::ZERO;
        let mut overtime_sum = Decimal::ZERO;
        let mut original_total = Decimal::ZERO;
        let mut computed_total = Decimal::ZERO;

        for source in group {
            let record = source.canonical();

            let regular_split =
                split_at_threshold(regular_sum, record.regular, thresholds.daily_regular_hours);
            let overtime = regular_split.excess + record.overtime;
            let overtime_split =
                split_at_threshold(overtime_sum, overtime, thresholds.daily_overtime_hours);

            let (overtime_hours, other_hours, hour_type) = if overtime_split.excess > Decimal::ZERO
            {
                (
                    overtime_split.within,
                    record.other + overtime_split.excess,
                    DOUBLE_TIME_HOUR_TYPE.to_string(),
                )
            } else {
                (overtime, record.other, record.hour_type.clone())
            };

            let result = ComputedHoursRecord {
                source: (*source).clone(),
                regular_hours: regular_split.within,
                overtime_hours,
                other_hours,
                hour_type,
            };

            if regular_split.excess > Decimal::ZERO || overtime_split.excess > Decimal::ZERO {
                audit_steps.push(AuditStep {
                    step_number,
                    rule_id: "daily_cap_overtime".to_string(),
                    rule_name: "Daily-Cap Overtime Reallocation".to_string(),
                    input: serde_json::json!({
                        "day_group": record.day_key().to_string(),
                        "job": source.resolved.project,
                        "regular": record.regular.normalize().to_string(),
                        "overtime": record.overtime.normalize().to_string(),
                        "other": record.other.normalize().to_string(),
                        "regular_before": regular_sum.normalize().to_string(),
                        "overtime_before": overtime_sum.normalize().to_string()
                    }),
                    output: serde_json::json!({
                        "regular": result.regular_hours.normalize().to_string(),
                        "overtime": result.overtime_hours.normalize().to_string(),
                        "other": result.other_hours.normalize().to_string(),
                        "hour_type": result.hour_type
                    }),
                    reasoning: format!(
                        "{}h regular over the {}h daily cap moved to overtime; {}h overtime over the {}h daily cap moved to double-time",
                        regular_split.excess.normalize(),
                        thresholds.daily_regular_hours.normalize(),
                        overtime_split.excess.normalize(),
                        thresholds.daily_overtime_hours.normalize()
                    ),
                });
                step_number += 1;
            }

            regular_sum += record.regular;
            overtime_sum += overtime;
            original_total += result.original_hours();
            computed_total += result.total_hours();
            computed.push(result);
        }

        if let Some(first) = group.first() {
            verify_conservation(
                &first.canonical().day_key().to_string(),
                original_total,
                computed_total,
            )?;
        }
    }

    Ok(DailyCapResult {
        records: computed,
        audit_steps,
    })
}
