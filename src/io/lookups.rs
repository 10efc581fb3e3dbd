//! File-backed lookup sources.
//!
//! The jurisdiction and pay-rate lookups are plain CSV extracts of the
//! payroll database, one row per lookup entry.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{JobJurisdiction, PayRate, RawValue};

use super::timesheet::{infer_cell, text_cell};
use super::{JurisdictionSource, PayRateSource};

#[derive(Debug, Deserialize)]
struct JurisdictionRecord {
    #[serde(rename = "COMPANYNO")]
    company: String,
    #[serde(rename = "JOB")]
    job: String,
    #[serde(rename = "SUB", default)]
    subjob: Option<String>,
    #[serde(rename = "STATE")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct PayRateRecord {
    #[serde(rename = "COMPANYNO")]
    company: String,
    #[serde(rename = "EMPLOYEENO")]
    employee_number: String,
    #[serde(rename = "RATE")]
    rate: String,
}

/// Job-to-state lookup read from a `COMPANYNO,JOB,SUB,STATE` CSV file.
///
/// Entries are returned in file order; when a key repeats, the resolver
/// uses the first entry.
#[derive(Debug, Clone)]
pub struct JurisdictionFile {
    path: PathBuf,
}

impl JurisdictionFile {
    /// Creates a lookup reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JurisdictionSource for JurisdictionFile {
    fn lookup(&self) -> EngineResult<Vec<JobJurisdiction>> {
        let records: Vec<JurisdictionRecord> = read_records(&self.path)?;
        let entries: Vec<JobJurisdiction> = records
            .into_iter()
            .map(|record| JobJurisdiction {
                company: raw(&record.company),
                job: text_cell(&record.job)
                    .unwrap_or_else(|| RawValue::Text(String::new())),
                subjob: record.subjob.as_deref().and_then(text_cell),
                state_code: raw(&record.state),
            })
            .collect();
        info!(path = %self.path.display(), entries = entries.len(), "Loaded jurisdiction lookup");
        Ok(entries)
    }
}

/// Pay-rate lookup read from a `COMPANYNO,EMPLOYEENO,RATE` CSV file.
#[derive(Debug, Clone)]
pub struct PayRateFile {
    path: PathBuf,
}

impl PayRateFile {
    /// Creates a lookup reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PayRateSource for PayRateFile {
    fn lookup(&self) -> EngineResult<Vec<PayRate>> {
        let records: Vec<PayRateRecord> = read_records(&self.path)?;
        let mut rates = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            let rate = Decimal::from_str(record.rate.trim()).map_err(|e| EngineError::DataFormat {
                row: position + 1,
                field: "RATE".to_string(),
                message: format!("'{}': {}", record.rate, e),
            })?;
            rates.push(PayRate {
                company: raw(&record.company),
                employee_number: raw(&record.employee_number),
                rate,
            });
        }
        info!(path = %self.path.display(), entries = rates.len(), "Loaded pay-rate lookup");
        Ok(rates)
    }
}

fn raw(text: &str) -> RawValue {
    infer_cell(text).unwrap_or_else(|| RawValue::Text(String::new()))
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<Vec<T>> {
    let read_error = |message: String| EngineError::InputRead {
        path: path.display().to_string(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| read_error(e.to_string()))?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| read_error(e.to_string()))
}
