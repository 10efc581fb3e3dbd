//! Audit trail models.
//!
//! Every pipeline stage records what it did as an [`AuditStep`]; problems
//! that do not stop the batch are recorded as [`AuditWarning`]s.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Builds a warning from a non-fatal engine error.
    ///
    /// # Example
    ///
    /// ```
    /// use overtime_ledger::error::EngineError;
    /// use overtime_ledger::models::AuditWarning;
    ///
    /// let miss = EngineError::LookupMiss {
    ///     lookup: "pay rate".to_string(),
    ///     key: "APC/100".to_string(),
    /// };
    /// let warning = AuditWarning::from_error(&miss, "low");
    /// assert_eq!(warning.code, "LOOKUP_MISS");
    /// assert_eq!(warning.message, "No pay rate entry for APC/100");
    /// ```
    pub fn from_error(error: &EngineError, severity: &str) -> Self {
        let code = match error {
            EngineError::LookupMiss { .. } => "LOOKUP_MISS",
            EngineError::DataFormat { .. } => "DATA_FORMAT",
            EngineError::NegativeHours { .. } => "NEGATIVE_HOURS",
            EngineError::InputRead { .. } => "INPUT_READ",
            EngineError::ExportWrite { .. } => "EXPORT_WRITE",
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG"
            }
            EngineError::CalculationError { .. } => "CALCULATION",
        };
        Self {
            code: code.to_string(),
            message: error.to_string(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for a batch.
///
/// # Example
///
/// ```
/// use overtime_ledger::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "canonical_records".to_string(),
            rule_name: "Canonical Record Builder".to_string(),
            input: serde_json::json!({"rows": 3}),
            output: serde_json::json!({"records": 2}),
            reasoning: "3 rows collapsed into 2 records".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step_number\":1"));
        assert!(json.contains("\"rule_id\":\"canonical_records\""));
        assert!(json.contains("\"records\":2"));
    }

    #[test]
    fn test_warning_from_calculation_error() {
        let error = EngineError::CalculationError {
            message: "boom".to_string(),
        };
        let warning = AuditWarning::from_error(&error, "high");
        assert_eq!(warning.code, "CALCULATION");
        assert_eq!(warning.severity, "high");
        assert_eq!(warning.message, "Calculation error: boom");
    }

    #[test]
    fn test_audit_trace_round_trip() {
        let trace = AuditTrace {
            steps: vec![],
            warnings: vec![AuditWarning {
                code: "LOOKUP_MISS".to_string(),
                message: "No jurisdiction entry for APC/2301/".to_string(),
                severity: "low".to_string(),
            }],
            duration_us: 42,
        };

        let json = serde_json::to_string(&trace).unwrap();
        let deserialized: AuditTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(trace, deserialized);
    }
}
