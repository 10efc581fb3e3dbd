//! Request types for the overtime ledger API.
//!
//! This module defines the JSON request structure for the `/ledger` endpoint.

use serde::{Deserialize, Serialize};

use crate::calculation::BatchInput;
use crate::models::{JobJurisdiction, PayRate, RawTimesheetRow};

/// Request body for the `/ledger` endpoint.
///
/// Carries one batch of timesheet rows together with the lookups needed to
/// resolve jurisdictions and pay rates. Both lookups may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRequest {
    /// The raw timesheet rows of the batch.
    pub rows: Vec<RawTimesheetRow>,
    /// Job-to-state lookup entries, preferred entries first.
    #[serde(default)]
    pub jurisdictions: Vec<JobJurisdiction>,
    /// Pay-rate lookup entries, preferred entries first.
    #[serde(default)]
    pub pay_rates: Vec<PayRate>,
}

impl From<LedgerRequest> for BatchInput {
    fn from(req: LedgerRequest) -> Self {
        BatchInput {
            rows: req.rows,
            jurisdictions: req.jurisdictions,
            pay_rates: req.pay_rates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawValue;

    #[test]
    fn test_deserialize_ledger_request() {
        let json = r#"{
            "rows": [{
                "company": 1,
                "employee_number": "100",
                "week_number": 3,
                "day_of_week": 1,
                "job": 2301,
                "subjob": "1",
                "regular_hours": 6.5,
                "department": 10,
                "week_ending": "2026-01-18"
            }],
            "jurisdictions": [
                {"company": 1, "job": "2301", "subjob": "001", "state_code": 50}
            ],
            "pay_rates": [
                {"company": 1, "employee_number": 100, "rate": "31.25"}
            ]
        }"#;

        let request: LedgerRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.rows.len(), 1);
        assert_eq!(request.rows[0].job, RawValue::Integer(2301));
        assert_eq!(request.rows[0].regular_hours, Some(RawValue::Float(6.5)));
        assert_eq!(request.jurisdictions[0].state_code, RawValue::Integer(50));
        assert_eq!(request.pay_rates.len(), 1);
    }

    #[test]
    fn test_lookups_default_to_empty() {
        let request: LedgerRequest = serde_json::from_str(r#"{"rows": []}"#).unwrap();
        let input: BatchInput = request.into();

        assert!(input.rows.is_empty());
        assert!(input.jurisdictions.is_empty());
        assert!(input.pay_rates.is_empty());
    }

    #[test]
    fn test_missing_rows_is_rejected() {
        let result: Result<LedgerRequest, _> = serde_json::from_str(r#"{"jurisdictions": []}"#);
        assert!(result.is_err());
    }
}
