//! Batch pipeline.
//!
//! Runs every stage over one batch of timesheet rows and assembles the
//! resulting [`LedgerBatch`].

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, JobJurisdiction, LedgerBatch, LedgerTotals, PayRate,
    RawTimesheetRow,
};

use super::canonical_builder::build_canonical_records;
use super::daily_cap_overtime::apply_daily_cap;
use super::jurisdiction_resolver::resolve_jurisdictions;
use super::ledger_formatter::format_ledger;
use super::overtime_classifier::classify_overtime_rules;
use super::weekly_cap_overtime::apply_weekly_cap;

/// Everything one batch run consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchInput {
    /// Raw timesheet rows.
    pub rows: Vec<RawTimesheetRow>,
    /// Job-to-state lookup entries.
    #[serde(default)]
    pub jurisdictions: Vec<JobJurisdiction>,
    /// Pay-rate lookup entries.
    #[serde(default)]
    pub pay_rates: Vec<PayRate>,
}

/// Processes a batch into a ledger.
///
/// Stages run in order: canonical records, jurisdiction resolution,
/// overtime classification, the daily-cap and weekly-cap engines over their
/// partitions, then ledger formatting. Audit steps are numbered across the
/// whole run. Lookup misses become warnings; every other failure aborts the
/// batch.
///
/// # Errors
///
/// Propagates the first [`EngineError`](crate::error::EngineError) raised by
/// any stage.
///
/// # Example
///
/// ```
/// use overtime_ledger::calculation::{process_batch, BatchInput};
/// use overtime_ledger::config::PipelineConfig;
/// use overtime_ledger::models::{JobJurisdiction, RawTimesheetRow, RawValue};
/// use rust_decimal::Decimal;
///
/// let input = BatchInput {
///     rows: vec![RawTimesheetRow {
///         company: RawValue::Integer(1),
///         employee_number: RawValue::Integer(100),
///         week_number: RawValue::Integer(3),
///         day_of_week: RawValue::Integer(1),
///         job: RawValue::from("2301"),
///         subjob: None,
///         cost_distribution: None,
///         regular_hours: Some(RawValue::Integer(10)),
///         overtime_hours: None,
///         other_hours: None,
///         other_hours_type: None,
///         department: RawValue::Integer(10),
///         week_ending: RawValue::from("2026-01-18"),
///     }],
///     jurisdictions: vec![JobJurisdiction {
///         company: RawValue::Integer(1),
///         job: RawValue::from("2301"),
///         subjob: None,
///         state_code: RawValue::Integer(50),
///     }],
///     pay_rates: vec![],
/// };
///
/// let batch = process_batch(&input, &PipelineConfig::default())?;
/// assert_eq!(batch.totals.regular_hours, Decimal::from(8));
/// assert_eq!(batch.totals.overtime_hours, Decimal::from(2));
/// # Ok::<(), overtime_ledger::error::EngineError>(())
/// ```
pub fn process_batch(input: &BatchInput, config: &PipelineConfig) -> EngineResult<LedgerBatch> {
    let start_time = Instant::now();
    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    let canonical = build_canonical_records(&input.rows, &config.translations, step_number)?;
    debug!(
        rows = input.rows.len(),
        records = canonical.records.len(),
        "Built canonical records"
    );
    steps.push(canonical.audit_step);
    step_number += 1;

    let week_ending = canonical.records.iter().map(|r| r.week_ending).max();

    let resolution = resolve_jurisdictions(
        &canonical.records,
        &input.jurisdictions,
        &config.translations,
        &config.export,
        step_number,
    );
    debug!(
        records = resolution.records.len(),
        misses = resolution.warnings.len(),
        "Resolved jurisdictions"
    );
    steps.push(resolution.audit_step);
    warnings.extend(resolution.warnings);
    step_number += 1;

    let classification = classify_overtime_rules(&resolution.records, step_number);
    let (daily_cap_records, weekly_cap_records) = classification.partition();
    debug!(
        employees = classification.regimes.len(),
        daily_cap_records = daily_cap_records.len(),
        weekly_cap_records = weekly_cap_records.len(),
        "Classified overtime rules"
    );
    steps.push(classification.audit_step);
    step_number += 1;

    let daily = apply_daily_cap(&daily_cap_records, &config.thresholds, step_number)?;
    step_number += daily.audit_steps.len() as u32;
    steps.extend(daily.audit_steps);

    let weekly = apply_weekly_cap(&weekly_cap_records, &config.thresholds, step_number)?;
    step_number += weekly.audit_steps.len() as u32;
    steps.extend(weekly.audit_steps);

    let mut computed = daily.records;
    computed.extend(weekly.records);

    let formatted = format_ledger(
        &computed,
        &input.pay_rates,
        &config.translations,
        &config.export,
        step_number,
    )?;
    steps.push(formatted.audit_step);
    warnings.extend(formatted.warnings);

    let totals = LedgerTotals::from_rows(&formatted.rows);
    let duration_us = start_time.elapsed().as_micros() as u64;

    info!(
        rows = input.rows.len(),
        ledger_rows = totals.row_count,
        regular_hours = %totals.regular_hours,
        overtime_hours = %totals.overtime_hours,
        double_time_hours = %totals.double_time_hours,
        warnings = warnings.len(),
        duration_us,
        "Batch processed"
    );

    Ok(LedgerBatch {
        batch_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        week_ending,
        rows: formatted.rows,
        totals,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::RawValue;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(company: i64, employee: i64, day: i64, job: &str, regular: &str) -> RawTimesheetRow {
        RawTimesheetRow {
            company: RawValue::Integer(company),
            employee_number: RawValue::Integer(employee),
            week_number: RawValue::Integer(3),
            day_of_week: RawValue::Integer(day),
            job: RawValue::from(job),
            subjob: Some(RawValue::from("1")),
            cost_distribution: Some(RawValue::from("100200300")),
            regular_hours: Some(RawValue::from(regular)),
            overtime_hours: None,
            other_hours: None,
            other_hours_type: None,
            department: RawValue::Integer(10),
            week_ending: RawValue::from("2026-01-18"),
        }
    }

    fn jurisdiction(company: i64, job: &str, state: i64) -> JobJurisdiction {
        JobJurisdiction {
            company: RawValue::Integer(company),
            job: RawValue::from(job),
            subjob: Some(RawValue::from("1")),
            state_code: RawValue::Integer(state),
        }
    }

    fn sample_input() -> BatchInput {
        let mut rows = vec![
            row(1, 100, 1, "2301", "6"),
            row(1, 100, 1, "2400", "4"),
        ];
        rows.extend((1..=5).map(|day| row(30, 200, day, "500", "9")));

        BatchInput {
            rows,
            jurisdictions: vec![
                jurisdiction(1, "2301", 50),
                jurisdiction(1, "2400", 50),
                jurisdiction(30, "500", 31),
            ],
            pay_rates: vec![PayRate {
                company: RawValue::Integer(1),
                employee_number: RawValue::Integer(100),
                rate: dec("31.25"),
            }],
        }
    }

    #[test]
    fn test_batch_totals() {
        let batch = process_batch(&sample_input(), &PipelineConfig::default()).unwrap();

        // Employee 100: 8 REG + 2 OT. Employee 200: 40 REG + 5 OT.
        assert_eq!(batch.totals.regular_hours, dec("48"));
        assert_eq!(batch.totals.overtime_hours, dec("7"));
        assert_eq!(batch.totals.double_time_hours, dec("0"));
        assert_eq!(batch.totals.total_hours(), dec("55"));
        assert_eq!(batch.week_ending, NaiveDate::from_ymd_opt(2026, 1, 18));
        assert_eq!(batch.export_file_stem().as_deref(), Some("20260118_merge"));
    }

    #[test]
    fn test_audit_steps_are_numbered_sequentially() {
        let batch = process_batch(&sample_input(), &PipelineConfig::default()).unwrap();
        let steps = &batch.audit_trace.steps;

        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
        assert_eq!(steps[0].rule_id, "canonical_records");
        assert_eq!(steps[1].rule_id, "jurisdiction_resolution");
        assert_eq!(steps[2].rule_id, "overtime_classification");
        assert_eq!(steps[3].rule_id, "daily_cap_overtime");
        assert_eq!(steps[4].rule_id, "weekly_cap_overtime");
        assert_eq!(steps.last().unwrap().rule_id, "ledger_format");
    }

    #[test]
    fn test_lookup_misses_become_warnings() {
        let mut input = sample_input();
        input.jurisdictions.clear();

        let batch = process_batch(&input, &PipelineConfig::default()).unwrap();
        let codes: Vec<&str> = batch
            .audit_trace
            .warnings
            .iter()
            .map(|w| w.code.as_str())
            .collect();

        // Three job keys without jurisdiction, one employee without a rate.
        assert_eq!(codes, vec!["LOOKUP_MISS"; 4]);
        assert!(batch.rows.iter().all(|r| r.jurisdiction.as_str().is_empty()));
    }

    #[test]
    fn test_malformed_row_fails_batch() {
        let mut input = sample_input();
        input.rows[3].regular_hours = Some(RawValue::from("n/a"));

        let result = process_batch(&input, &PipelineConfig::default());
        assert!(matches!(result, Err(EngineError::DataFormat { row: 4, .. })));
    }

    #[test]
    fn test_empty_batch() {
        let batch = process_batch(&BatchInput::default(), &PipelineConfig::default()).unwrap();

        assert!(batch.rows.is_empty());
        assert_eq!(batch.week_ending, None);
        assert_eq!(batch.totals, LedgerTotals::default());
    }

    #[test]
    fn test_batch_input_deserializes_with_optional_lookups() {
        let json = r#"{"rows": []}"#;
        let input: BatchInput = serde_json::from_str(json).unwrap();
        assert!(input.jurisdictions.is_empty());
        assert!(input.pay_rates.is_empty());
    }
}
