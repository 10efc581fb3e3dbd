//! Error types for the overtime ledger engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure that can occur while turning timesheet exports into
//! a ledger.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the overtime ledger engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use overtime_ledger::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/thresholds.yaml".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Configuration file not found: /missing/thresholds.yaml"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A raw timesheet field could not be coerced to its expected type.
    #[error("Invalid value in row {row}, field '{field}': {message}")]
    DataFormat {
        /// The 1-based position of the row in the input.
        row: usize,
        /// The name of the offending field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// Summing duplicate rows produced a negative hour bucket.
    #[error("Negative {field} hours ({hours}) for employee {employee_number}")]
    NegativeHours {
        /// The employee the record belongs to.
        employee_number: u32,
        /// The hour bucket that went negative.
        field: String,
        /// The aggregated value.
        hours: Decimal,
    },

    /// A jurisdiction or pay-rate lookup had no entry for a key.
    ///
    /// The pipeline never fails with this error; it is recorded as an
    /// audit warning and the record carries on without the value.
    #[error("No {lookup} entry for {key}")]
    LookupMiss {
        /// Which lookup missed (e.g. "jurisdiction", "pay rate").
        lookup: String,
        /// The key that was looked up.
        key: String,
    },

    /// An input file could not be read.
    #[error("Failed to read input '{path}': {message}")]
    InputRead {
        /// The path that failed.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The ledger export could not be written.
    #[error("Failed to write ledger '{path}': {message}")]
    ExportWrite {
        /// The destination path.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
