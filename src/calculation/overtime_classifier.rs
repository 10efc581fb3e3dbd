//! Overtime regime classification.
//!
//! An employee who works under the California headquarters jurisdiction
//! anywhere in the batch is paid under the daily-cap rules for every record
//! in the batch. Everyone else is paid under the weekly rules of the
//! jurisdiction each record was worked in.
//!
//! Classification happens in one pass over the whole batch, producing an
//! immutable [`RegimeMap`] that routing reads afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, ClassifiedRecord, OvertimeRule, ResolvedRecord, WeekKey};

/// The overtime regime an employee is paid under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeRegime {
    /// Daily 8-hour and 4-hour caps.
    DailyCap,
    /// Weekly 40-hour cap under each record's own jurisdiction.
    WeeklyCap,
}

/// Employee number to overtime regime, computed once per batch.
pub type RegimeMap = BTreeMap<u32, OvertimeRegime>;

/// The result of classifying a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct OvertimeClassification {
    /// Classified records, in input order.
    pub records: Vec<ClassifiedRecord>,
    /// The regime of every employee in the batch.
    pub regimes: RegimeMap,
    /// The audit step recording the classification.
    pub audit_step: AuditStep,
}

impl OvertimeClassification {
    /// Splits the classified records into the daily-cap partition and the
    /// weekly-cap partition, preserving relative order in each.
    pub fn partition(&self) -> (Vec<ClassifiedRecord>, Vec<ClassifiedRecord>) {
        self.records
            .iter()
            .cloned()
            .partition(|record| record.overtime_rule.is_daily_cap())
    }
}

/// Builds the employee-to-regime map for a batch.
///
/// Records are grouped by week-group and each group is flagged by whether
/// its records are CAHQ. An employee whose groups carry both flags, or any
/// CAHQ flag at all, is daily-cap. The pass spans every pay period in the
/// batch.
pub fn build_regime_map(records: &[ResolvedRecord]) -> RegimeMap {
    let mut flags: BTreeMap<u32, BTreeSet<(bool, WeekKey)>> = BTreeMap::new();
    for resolved in records {
        flags
            .entry(resolved.record.employee_number)
            .or_default()
            .insert((resolved.jurisdiction.is_cahq(), resolved.record.week_key()));
    }

    flags
        .into_iter()
        .map(|(employee, groups)| {
            let distinct_flags: BTreeSet<bool> = groups.iter().map(|(cahq, _)| *cahq).collect();
            let regime = if distinct_flags.len() > 1 || distinct_flags.contains(&true) {
                OvertimeRegime::DailyCap
            } else {
                OvertimeRegime::WeeklyCap
            };
            (employee, regime)
        })
        .collect()
}

/// Assigns an [`OvertimeRule`] to every record.
///
/// Daily-cap employees get [`OvertimeRule::DailyCap`] on every record; all
/// other records carry their own jurisdiction tag.
///
/// # Example
///
/// ```
/// use overtime_ledger::calculation::classify_overtime_rules;
/// use overtime_ledger::models::{
///     CanonicalRecord, JurisdictionTag, OvertimeRule, ResolvedRecord,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let resolved = |week_ending: u32, jurisdiction: JurisdictionTag| ResolvedRecord {
///     record: CanonicalRecord {
///         company: "APC".to_string(),
///         employee_number: 100,
///         department: "10".to_string(),
///         week_ending: NaiveDate::from_ymd_opt(2026, 1, week_ending).unwrap(),
///         week_number: 3,
///         day_of_week: 1,
///         job: "2301".to_string(),
///         subjob: String::new(),
///         cost_distribution: String::new(),
///         hour_type: String::new(),
///         regular: Decimal::from(8),
///         overtime: Decimal::ZERO,
///         other: Decimal::ZERO,
///     },
///     jurisdiction,
///     project: "2301".to_string(),
///     phase_code_1: String::new(),
///     phase_code_2: String::new(),
/// };
///
/// // A CAHQ week anywhere in the batch moves the Arizona week to daily-cap too.
/// let records = vec![resolved(11, JurisdictionTag::Az), resolved(18, JurisdictionTag::Cahq)];
/// let result = classify_overtime_rules(&records, 3);
///
/// assert!(result.records.iter().all(|r| r.overtime_rule == OvertimeRule::DailyCap));
/// ```
pub fn classify_overtime_rules(
    records: &[ResolvedRecord],
    step_number: u32,
) -> OvertimeClassification {
    let regimes = build_regime_map(records);

    let classified: Vec<ClassifiedRecord> = records
        .iter()
        .map(|resolved| {
            let overtime_rule = match regimes.get(&resolved.record.employee_number) {
                Some(OvertimeRegime::DailyCap) => OvertimeRule::DailyCap,
                _ => OvertimeRule::Jurisdiction(resolved.jurisdiction.clone()),
            };
            ClassifiedRecord {
                resolved: resolved.clone(),
                overtime_rule,
            }
        })
        .collect();

    let daily_cap_employees: Vec<u32> = regimes
        .iter()
        .filter(|(_, regime)| **regime == OvertimeRegime::DailyCap)
        .map(|(employee, _)| *employee)
        .collect();
    let daily_cap_records = classified
        .iter()
        .filter(|r| r.overtime_rule.is_daily_cap())
        .count();

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_classification".to_string(),
        rule_name: "Overtime Jurisdiction Classifier".to_string(),
        input: serde_json::json!({
            "records": records.len(),
            "employees": regimes.len()
        }),
        output: serde_json::json!({
            "daily_cap_employees": daily_cap_employees,
            "daily_cap_records": daily_cap_records,
            "weekly_cap_records": classified.len() - daily_cap_records
        }),
        reasoning: format!(
            "{} of {} employees worked CAHQ hours in this batch and are paid under daily caps",
            daily_cap_employees.len(),
            regimes.len()
        ),
    };

    OvertimeClassification {
        records: classified,
        regimes,
        audit_step,
    }
}
