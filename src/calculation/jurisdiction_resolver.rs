//! Jurisdiction resolution.
//!
//! This module joins canonical records against the job-to-state lookup and
//! derives the ledger identifiers (project code and phase codes) each record
//! is exported under.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::config::{ExportConfig, TranslationConfig};
use crate::error::EngineError;
use crate::models::{
    AuditStep, AuditWarning, CanonicalRecord, JobJurisdiction, JurisdictionTag, RawValue,
    ResolvedRecord,
};

/// The result of resolving jurisdictions for a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct JurisdictionResolution {
    /// Resolved records, in input order. No record is ever dropped.
    pub records: Vec<ResolvedRecord>,
    /// One warning per (company, job, subjob) with no lookup entry.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording the join.
    pub audit_step: AuditStep,
}

/// Lookup key: company name, job text and normalized subjob.
type LookupKey = (String, String, String);

/// Resolves the jurisdiction, project code and phase codes of every record.
///
/// The lookup is a left join on (company, job, subjob). Lookup company codes
/// go through the same company table as the timesheet rows, and subjobs are
/// compared without padding so `"001"` and `1` match. When the lookup holds
/// several entries for one key the first entry wins. A record without a
/// match keeps [`JurisdictionTag::Unresolved`] and produces a
/// [`EngineError::LookupMiss`] warning.
///
/// # Example
///
/// ```
/// use overtime_ledger::calculation::resolve_jurisdictions;
/// use overtime_ledger::config::PipelineConfig;
/// use overtime_ledger::models::{CanonicalRecord, JobJurisdiction, JurisdictionTag, RawValue};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = CanonicalRecord {
///     company: "APC".to_string(),
///     employee_number: 100,
///     department: "10".to_string(),
///     week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
///     week_number: 3,
///     day_of_week: 1,
///     job: "2301".to_string(),
///     subjob: "1".to_string(),
///     cost_distribution: "100200300".to_string(),
///     hour_type: String::new(),
///     regular: Decimal::from(8),
///     overtime: Decimal::ZERO,
///     other: Decimal::ZERO,
/// };
/// let lookup = vec![JobJurisdiction {
///     company: RawValue::Integer(1),
///     job: RawValue::from("2301"),
///     subjob: Some(RawValue::from("001")),
///     state_code: RawValue::Integer(50),
/// }];
///
/// let config = PipelineConfig::default();
/// let result = resolve_jurisdictions(&[record], &lookup, &config.translations, &config.export, 1);
///
/// let resolved = &result.records[0];
/// assert_eq!(resolved.jurisdiction, JurisdictionTag::Cahq);
/// assert_eq!(resolved.project, "2301001");
/// assert_eq!(resolved.phase_code_1, "100200");
/// assert_eq!(resolved.phase_code_2, "300");
/// ```
pub fn resolve_jurisdictions(
    records: &[CanonicalRecord],
    lookup: &[JobJurisdiction],
    translations: &TranslationConfig,
    export: &ExportConfig,
    step_number: u32,
) -> JurisdictionResolution {
    let mut table: HashMap<LookupKey, JurisdictionTag> = HashMap::new();
    for entry in lookup {
        let key = (
            translations.company_name(&entry.company.to_code()),
            entry.job.to_text(),
            entry
                .subjob
                .as_ref()
                .map(RawValue::to_code)
                .unwrap_or_default(),
        );
        table.entry(key).or_insert_with(|| {
            JurisdictionTag::from_code(&translations.jurisdiction_code(&entry.state_code.to_code()))
        });
    }

    let mut warnings = Vec::new();
    let mut missed: HashSet<LookupKey> = HashSet::new();
    let mut by_jurisdiction: BTreeMap<String, usize> = BTreeMap::new();

    let resolved: Vec<ResolvedRecord> = records
        .iter()
        .map(|record| {
            let key = (
                record.company.clone(),
                record.job.clone(),
                normalize_subjob(&record.subjob),
            );
            let jurisdiction = match table.get(&key) {
                Some(tag) => tag.clone(),
                None => {
                    if missed.insert(key.clone()) {
                        let miss = EngineError::LookupMiss {
                            lookup: "jurisdiction".to_string(),
                            key: format!("{}/{}/{}", key.0, key.1, key.2),
                        };
                        warn!(error = %miss, "Record left without jurisdiction");
                        warnings.push(AuditWarning::from_error(&miss, "medium"));
                    }
                    JurisdictionTag::Unresolved
                }
            };

            *by_jurisdiction
                .entry(jurisdiction.as_str().to_string())
                .or_insert(0) += 1;

            let (phase_code_1, phase_code_2) =
                split_phase_code(&record.cost_distribution, export.phase_code_split);

            ResolvedRecord {
                record: record.clone(),
                jurisdiction,
                project: format!(
                    "{}{}",
                    record.job,
                    pad_subjob(&record.subjob, export.subjob_width)
                ),
                phase_code_1,
                phase_code_2,
            }
        })
        .collect();

    let unresolved = resolved
        .iter()
        .filter(|r| r.jurisdiction == JurisdictionTag::Unresolved)
        .count();

    let audit_step = AuditStep {
        step_number,
        rule_id: "jurisdiction_resolution".to_string(),
        rule_name: "Jurisdiction Resolver".to_string(),
        input: serde_json::json!({
            "records": records.len(),
            "lookup_entries": lookup.len()
        }),
        output: serde_json::json!({
            "resolved": resolved.len() - unresolved,
            "unresolved": unresolved,
            "by_jurisdiction": by_jurisdiction
        }),
        reasoning: format!(
            "{} of {} records matched a job jurisdiction; {} distinct job keys had no entry",
            resolved.len() - unresolved,
            resolved.len(),
            missed.len()
        ),
    };

    JurisdictionResolution {
        records: resolved,
        warnings,
        audit_step,
    }
}

/// Left-pads a subjob with zeros to `width`. An empty subjob stays empty.
///
/// ```
/// use overtime_ledger::calculation::pad_subjob;
///
/// assert_eq!(pad_subjob("1", 3), "001");
/// assert_eq!(pad_subjob("1234", 3), "1234");
/// assert_eq!(pad_subjob("", 3), "");
/// ```
pub fn pad_subjob(subjob: &str, width: usize) -> String {
    let subjob = subjob.trim();
    if subjob.is_empty() {
        return String::new();
    }
    format!("{:0>width$}", subjob, width = width)
}

/// Splits a cost distribution code into its two phase code segments.
///
/// The split is positional on characters; codes shorter than `at` yield a
/// short first segment and an empty second one.
///
/// ```
/// use overtime_ledger::calculation::split_phase_code;
///
/// assert_eq!(split_phase_code("100200300", 6), ("100200".to_string(), "300".to_string()));
/// assert_eq!(split_phase_code("1002", 6), ("1002".to_string(), String::new()));
/// ```
pub fn split_phase_code(code: &str, at: usize) -> (String, String) {
    let code = code.trim();
    match code.char_indices().nth(at) {
        Some((index, _)) => (code[..index].to_string(), code[index..].to_string()),
        None => (code.to_string(), String::new()),
    }
}

fn normalize_subjob(subjob: &str) -> String {
    if subjob.trim().is_empty() {
        return String::new();
    }
    RawValue::from(subjob).to_code()
}
