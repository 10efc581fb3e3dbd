//! Ledger export.
//!
//! Writes a batch's ledger rows to `<output>/<YYYYMMDD>_merge.csv`. The file
//! is written under a temporary name and renamed into place, so a failed run
//! never leaves a partial ledger behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{LedgerBatch, LedgerRow};

use super::LedgerSink;

const LEDGER_COLUMNS: [&str; 10] = [
    "EMPLOYEENO",
    "COMPANYNO",
    "WORKDATE",
    "HOURSTYPE",
    "HOURS",
    "STATE",
    "PROJECT",
    "JCDIST1",
    "JCDIST2",
    "RATE",
];

/// One exported ledger line, in [`LEDGER_COLUMNS`] order. The week-ending
/// date is not written.
#[derive(Debug, Serialize)]
struct LedgerRecord<'a> {
    #[serde(rename = "EMPLOYEENO")]
    employee_number: u32,
    #[serde(rename = "COMPANYNO")]
    company: &'a str,
    #[serde(rename = "WORKDATE")]
    work_date: String,
    #[serde(rename = "HOURSTYPE")]
    hour_type: &'a str,
    #[serde(rename = "HOURS")]
    hours: String,
    #[serde(rename = "STATE")]
    state: &'a str,
    #[serde(rename = "PROJECT")]
    project: &'a str,
    #[serde(rename = "JCDIST1")]
    phase_code_1: &'a str,
    #[serde(rename = "JCDIST2")]
    phase_code_2: &'a str,
    #[serde(rename = "RATE")]
    rate: Option<String>,
}

impl<'a> From<&'a LedgerRow> for LedgerRecord<'a> {
    fn from(row: &'a LedgerRow) -> Self {
        Self {
            employee_number: row.employee_number,
            company: &row.company,
            work_date: row.work_date.format("%Y-%m-%d").to_string(),
            hour_type: &row.hour_type,
            hours: row.hours.normalize().to_string(),
            state: row.jurisdiction.as_str(),
            project: &row.project,
            phase_code_1: &row.phase_code_1,
            phase_code_2: &row.phase_code_2,
            rate: row.pay_rate.map(|rate| rate.to_string()),
        }
    }
}

/// Writes ledgers as CSV files into an output directory.
#[derive(Debug, Clone)]
pub struct CsvLedgerWriter {
    output_dir: PathBuf,
}

impl CsvLedgerWriter {
    /// Creates a writer placing ledgers in `output_dir`, which is created on
    /// first write if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the path a batch's ledger is written to.
    pub fn ledger_path(&self, batch: &LedgerBatch) -> Option<PathBuf> {
        batch
            .export_file_stem()
            .map(|stem| self.output_dir.join(format!("{}.csv", stem)))
    }
}

impl LedgerSink for CsvLedgerWriter {
    fn write(&self, batch: &LedgerBatch) -> EngineResult<PathBuf> {
        let path = self.ledger_path(batch).ok_or_else(|| EngineError::ExportWrite {
            path: self.output_dir.display().to_string(),
            message: "batch has no week-ending date to name the ledger".to_string(),
        })?;

        fs::create_dir_all(&self.output_dir).map_err(|e| export_error(&self.output_dir, e))?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("ledger.csv");
        let temp_path = self.output_dir.join(format!(".{}.tmp", file_name));

        let written = write_rows(&temp_path, &batch.rows)
            .and_then(|()| fs::rename(&temp_path, &path).map_err(|e| export_error(&path, e)));

        if let Err(error) = written {
            if temp_path.exists() {
                if let Err(e) = fs::remove_file(&temp_path) {
                    warn!(path = %temp_path.display(), error = %e, "Failed to remove temporary ledger");
                }
            }
            return Err(error);
        }

        info!(
            path = %path.display(),
            batch_id = %batch.batch_id,
            rows = batch.rows.len(),
            "Ledger written"
        );
        Ok(path)
    }
}

fn write_rows(path: &Path, rows: &[LedgerRow]) -> EngineResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| export_error(path, e))?;
    writer
        .write_record(LEDGER_COLUMNS)
        .map_err(|e| export_error(path, e))?;
    for row in rows {
        writer
            .serialize(LedgerRecord::from(row))
            .map_err(|e| export_error(path, e))?;
    }
    writer.flush().map_err(|e| export_error(path, e))
}

fn export_error(path: &Path, message: impl ToString) -> EngineError {
    EngineError::ExportWrite {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}
