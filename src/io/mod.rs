//! Batch input and output.
//!
//! The pipeline reads timesheet rows and two lookups, and writes a ledger.
//! Each of those collaborators sits behind a trait so a batch can run
//! against files, in-memory data or anything else that can produce the
//! rows.
//!
//! # Example
//!
//! ```no_run
//! use overtime_ledger::config::PipelineConfig;
//! use overtime_ledger::io::{
//!     run_batch, CsvLedgerWriter, JurisdictionFile, PayRateFile, TimesheetDirectory,
//! };
//!
//! let outcome = run_batch(
//!     &TimesheetDirectory::new("./timesheets"),
//!     &JurisdictionFile::new("./lookups/jobs.csv"),
//!     &PayRateFile::new("./lookups/rates.csv"),
//!     &CsvLedgerWriter::new("./ledgers"),
//!     &PipelineConfig::default(),
//! )?;
//! println!("Ledger written to {}", outcome.ledger_path.display());
//! # Ok::<(), overtime_ledger::error::EngineError>(())
//! ```

mod export;
mod lookups;
mod timesheet;

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::info;

use crate::calculation::{process_batch, BatchInput};
use crate::config::PipelineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{JobJurisdiction, LedgerBatch, PayRate, RawTimesheetRow};

pub use export::CsvLedgerWriter;
pub use lookups::{JurisdictionFile, PayRateFile};
pub use timesheet::{read_timesheet_file, TimesheetDirectory};

/// Produces the raw timesheet rows of a batch.
pub trait TimesheetSource {
    /// Loads every row of the batch.
    fn load(&self) -> EngineResult<Vec<RawTimesheetRow>>;
}

/// Produces the job-to-state lookup.
pub trait JurisdictionSource {
    /// Returns every lookup entry, preferred entries first.
    fn lookup(&self) -> EngineResult<Vec<JobJurisdiction>>;
}

/// Produces the pay-rate lookup.
pub trait PayRateSource {
    /// Returns every lookup entry, preferred entries first.
    fn lookup(&self) -> EngineResult<Vec<PayRate>>;
}

/// Persists a processed batch.
pub trait LedgerSink {
    /// Writes the batch and returns where it was written.
    fn write(&self, batch: &LedgerBatch) -> EngineResult<PathBuf>;
}

impl TimesheetSource for Vec<RawTimesheetRow> {
    fn load(&self) -> EngineResult<Vec<RawTimesheetRow>> {
        Ok(self.clone())
    }
}

impl JurisdictionSource for Vec<JobJurisdiction> {
    fn lookup(&self) -> EngineResult<Vec<JobJurisdiction>> {
        Ok(self.clone())
    }
}

impl PayRateSource for Vec<PayRate> {
    fn lookup(&self) -> EngineResult<Vec<PayRate>> {
        Ok(self.clone())
    }
}

/// Collects batches in memory. The returned path is the export file stem.
impl LedgerSink for Mutex<Vec<LedgerBatch>> {
    fn write(&self, batch: &LedgerBatch) -> EngineResult<PathBuf> {
        let stem = batch
            .export_file_stem()
            .unwrap_or_else(|| batch.batch_id.to_string());
        self.lock()
            .map_err(|e| EngineError::ExportWrite {
                path: stem.clone(),
                message: e.to_string(),
            })?
            .push(batch.clone());
        Ok(PathBuf::from(stem))
    }
}

/// A processed and persisted batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// The processed batch.
    pub batch: LedgerBatch,
    /// Where the sink wrote the ledger.
    pub ledger_path: PathBuf,
}

/// Loads a batch from its sources, processes it and writes the ledger.
///
/// # Errors
///
/// Returns the first error from any source, from
/// [`process_batch`], or from the sink. Nothing is written unless
/// processing succeeds.
pub fn run_batch(
    timesheets: &dyn TimesheetSource,
    jurisdictions: &dyn JurisdictionSource,
    pay_rates: &dyn PayRateSource,
    sink: &dyn LedgerSink,
    config: &PipelineConfig,
) -> EngineResult<BatchOutcome> {
    let input = BatchInput {
        rows: timesheets.load()?,
        jurisdictions: jurisdictions.lookup()?,
        pay_rates: pay_rates.lookup()?,
    };
    info!(
        rows = input.rows.len(),
        jurisdictions = input.jurisdictions.len(),
        pay_rates = input.pay_rates.len(),
        "Batch inputs loaded"
    );

    let batch = process_batch(&input, config)?;
    let ledger_path = sink.write(&batch)?;

    Ok(BatchOutcome { batch, ledger_path })
}
