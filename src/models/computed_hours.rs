//! Per-stage record generations.
//!
//! Each pipeline stage wraps the previous generation in a new value rather
//! than mutating it: [`ResolvedRecord`] after jurisdiction resolution,
//! [`ClassifiedRecord`] after overtime classification, and
//! [`ComputedHoursRecord`] after an overtime engine has reallocated hours.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CanonicalRecord, JurisdictionTag, OvertimeRule};

/// A canonical record joined with its jurisdiction and ledger identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// The canonical record.
    #[serde(flatten)]
    pub record: CanonicalRecord,
    /// The jurisdiction the job is worked under.
    pub jurisdiction: JurisdictionTag,
    /// Job number followed by the zero-padded subjob.
    pub project: String,
    /// First segment of the cost distribution code.
    pub phase_code_1: String,
    /// Remainder of the cost distribution code.
    pub phase_code_2: String,
}

/// A resolved record tagged with the overtime rule that governs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    /// The resolved record.
    #[serde(flatten)]
    pub resolved: ResolvedRecord,
    /// The overtime rule assigned by the classifier.
    pub overtime_rule: OvertimeRule,
}

impl ClassifiedRecord {
    /// Returns the underlying canonical record.
    pub fn canonical(&self) -> &CanonicalRecord {
        &self.resolved.record
    }
}

/// A classified record after an overtime engine has run.
///
/// `regular_hours`, `overtime_hours` and `other_hours` are the compliant
/// buckets (REG/OVT/OTH); `hour_type` is the final type tag of the other
/// bucket, which becomes "DT" when double-time was carved out of overtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedHoursRecord {
    /// The record the hours were computed from.
    pub source: ClassifiedRecord,
    /// Compliant regular hours.
    pub regular_hours: Decimal,
    /// Overtime hours.
    pub overtime_hours: Decimal,
    /// Double-time or other hours.
    pub other_hours: Decimal,
    /// Final hour-type tag for the other bucket.
    pub hour_type: String,
}

impl ComputedHoursRecord {
    /// Returns the sum of the computed buckets.
    pub fn total_hours(&self) -> Decimal {
        self.regular_hours + self.overtime_hours + self.other_hours
    }

    /// Returns the hours the source record carried before reallocation.
    pub fn original_hours(&self) -> Decimal {
        self.source.canonical().total_hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_classified() -> ClassifiedRecord {
        ClassifiedRecord {
            resolved: ResolvedRecord {
                record: CanonicalRecord {
                    company: "APC".to_string(),
                    employee_number: 100,
                    department: "10".to_string(),
                    week_ending: NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
                    week_number: 3,
                    day_of_week: 1,
                    job: "2301".to_string(),
                    subjob: "1".to_string(),
                    cost_distribution: "100200300".to_string(),
                    hour_type: String::new(),
                    regular: dec("10"),
                    overtime: dec("0"),
                    other: dec("0"),
                },
                jurisdiction: JurisdictionTag::Cahq,
                project: "2301001".to_string(),
                phase_code_1: "100200".to_string(),
                phase_code_2: "300".to_string(),
            },
            overtime_rule: OvertimeRule::DailyCap,
        }
    }

    #[test]
    fn test_computed_hours_totals() {
        let computed = ComputedHoursRecord {
            source: sample_classified(),
            regular_hours: dec("8"),
            overtime_hours: dec("2"),
            other_hours: dec("0"),
            hour_type: String::new(),
        };

        assert_eq!(computed.total_hours(), dec("10"));
        assert_eq!(computed.original_hours(), computed.total_hours());
    }

    #[test]
    fn test_classified_record_serializes_flat() {
        let json = serde_json::to_value(sample_classified()).unwrap();
        assert_eq!(json["employee_number"], 100);
        assert_eq!(json["jurisdiction"], "CAHQ");
        assert_eq!(json["overtime_rule"], "CA");
        assert_eq!(json["project"], "2301001");
    }
}
