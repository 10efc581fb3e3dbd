//! Configuration types for overtime allocation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every structure has a
//! `Default` matching the rules the engine ships with.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Hour thresholds applied by the overtime engines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThresholdConfig {
    /// Regular hours allowed per day before overtime (daily-cap rule).
    pub daily_regular_hours: Decimal,
    /// Overtime hours allowed per day before double-time (daily-cap rule).
    pub daily_overtime_hours: Decimal,
    /// Regular hours allowed per week before overtime (weekly-cap rule).
    pub weekly_regular_hours: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            daily_regular_hours: Decimal::from(8),
            daily_overtime_hours: Decimal::from(4),
            weekly_regular_hours: Decimal::from(40),
        }
    }
}

/// Fixed translation tables.
///
/// Keys are normalized codes: numeric codes are written without leading
/// zeros or fractions. Codes missing from a table pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationConfig {
    /// Company number to company name.
    pub companies: HashMap<String, String>,
    /// Raw state code to jurisdiction tag.
    pub jurisdictions: HashMap<String, String>,
    /// Hour-type tag to ledger label.
    pub hour_types: HashMap<String, String>,
}

impl TranslationConfig {
    /// Translates a normalized company code to its name.
    pub fn company_name(&self, code: &str) -> String {
        translate(&self.companies, code)
    }

    /// Translates a normalized raw state code to a jurisdiction tag code.
    pub fn jurisdiction_code(&self, code: &str) -> String {
        translate(&self.jurisdictions, code)
    }

    /// Translates an hour-type tag to its ledger label.
    pub fn hour_type_label(&self, tag: &str) -> String {
        translate(&self.hour_types, tag)
    }
}

fn translate(table: &HashMap<String, String>, code: &str) -> String {
    table
        .get(code)
        .cloned()
        .unwrap_or_else(|| code.to_string())
}

fn table(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            companies: table(&[("1", "APC"), ("30", "MEE"), ("40", "GCS")]),
            jurisdictions: table(&[
                ("30", "AZ"),
                ("31", "AZ"),
                ("50", "CAHQ"),
                ("320", "NM"),
                ("290", "NV"),
                ("380", "OR"),
                ("631", "AZ"),
                ("650", "OR"),
            ]),
            hour_types: table(&[("DT", "DT"), ("OT", "OT"), ("HL", "HOL"), ("VA", "VAC")]),
        }
    }
}

/// Identifier formatting for the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    /// Width subjobs are zero-padded to.
    pub subjob_width: usize,
    /// Number of characters in the first phase code segment.
    pub phase_code_split: usize,
    /// Label for other hours that carry no type tag.
    pub untyped_other_label: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            subjob_width: 3,
            phase_code_split: 6,
            untyped_other_label: "OTH".to_string(),
        }
    }
}

/// The complete engine configuration.
///
/// # Example
///
/// ```
/// use overtime_ledger::config::PipelineConfig;
/// use rust_decimal::Decimal;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.thresholds.weekly_regular_hours, Decimal::from(40));
/// assert_eq!(config.translations.company_name("30"), "MEE");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Overtime thresholds.
    pub thresholds: ThresholdConfig,
    /// Translation tables.
    pub translations: TranslationConfig,
    /// Identifier formatting.
    pub export: ExportConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(thresholds.daily_regular_hours, Decimal::from(8));
        assert_eq!(thresholds.daily_overtime_hours, Decimal::from(4));
        assert_eq!(thresholds.weekly_regular_hours, Decimal::from(40));
    }

    #[test]
    fn test_company_translation_passes_unknown_through() {
        let translations = TranslationConfig::default();
        assert_eq!(translations.company_name("1"), "APC");
        assert_eq!(translations.company_name("40"), "GCS");
        assert_eq!(translations.company_name("99"), "99");
    }

    #[test]
    fn test_jurisdiction_translation() {
        let translations = TranslationConfig::default();
        assert_eq!(translations.jurisdiction_code("50"), "CAHQ");
        assert_eq!(translations.jurisdiction_code("631"), "AZ");
        assert_eq!(translations.jurisdiction_code("650"), "OR");
        assert_eq!(translations.jurisdiction_code("290"), "NV");
        assert_eq!(translations.jurisdiction_code("320"), "NM");
        assert_eq!(translations.jurisdiction_code("777"), "777");
    }

    #[test]
    fn test_hour_type_relabeling() {
        let translations = TranslationConfig::default();
        assert_eq!(translations.hour_type_label("HL"), "HOL");
        assert_eq!(translations.hour_type_label("VA"), "VAC");
        assert_eq!(translations.hour_type_label("DT"), "DT");
        assert_eq!(translations.hour_type_label("REG"), "REG");
    }

    #[test]
    fn test_thresholds_deserialize_from_yaml() {
        let yaml = "daily_regular_hours: 8\ndaily_overtime_hours: 4\nweekly_regular_hours: 37.5\n";
        let thresholds: ThresholdConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(thresholds.weekly_regular_hours, Decimal::new(375, 1));
    }
}
