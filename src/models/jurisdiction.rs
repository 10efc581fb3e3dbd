//! Jurisdiction models.
//!
//! This module defines the normalized [`JurisdictionTag`] a record is worked
//! under, the [`JobJurisdiction`] lookup entries it is resolved from, and the
//! [`OvertimeRule`] the classifier assigns to each record.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RawValue;

/// The rule code marking a record for the daily-cap (California-style) engine.
pub const DAILY_CAP_RULE_CODE: &str = "CA";

/// A normalized jurisdiction tag.
///
/// Known tags have their own variants. Raw state codes that the translation
/// table does not know pass through as [`JurisdictionTag::Other`], and a
/// record with no lookup match is [`JurisdictionTag::Unresolved`].
///
/// # Example
///
/// ```
/// use overtime_ledger::models::JurisdictionTag;
///
/// assert_eq!(JurisdictionTag::from_code("CAHQ"), JurisdictionTag::Cahq);
/// assert_eq!(JurisdictionTag::from_code(""), JurisdictionTag::Unresolved);
/// assert_eq!(JurisdictionTag::from_code("999").as_str(), "999");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JurisdictionTag {
    /// Arizona.
    Az,
    /// California headquarters.
    Cahq,
    /// New Mexico.
    Nm,
    /// Nevada.
    Nv,
    /// Oregon.
    Or,
    /// No jurisdiction could be resolved.
    Unresolved,
    /// An unmapped code passed through unchanged.
    Other(String),
}

impl JurisdictionTag {
    /// Parses a tag from its code. Blank codes are unresolved.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "" => JurisdictionTag::Unresolved,
            "AZ" => JurisdictionTag::Az,
            "CAHQ" => JurisdictionTag::Cahq,
            "NM" => JurisdictionTag::Nm,
            "NV" => JurisdictionTag::Nv,
            "OR" => JurisdictionTag::Or,
            other => JurisdictionTag::Other(other.to_string()),
        }
    }

    /// Returns the tag code as it appears in the ledger.
    pub fn as_str(&self) -> &str {
        match self {
            JurisdictionTag::Az => "AZ",
            JurisdictionTag::Cahq => "CAHQ",
            JurisdictionTag::Nm => "NM",
            JurisdictionTag::Nv => "NV",
            JurisdictionTag::Or => "OR",
            JurisdictionTag::Unresolved => "",
            JurisdictionTag::Other(code) => code,
        }
    }

    /// Returns true for the California headquarters tag.
    pub fn is_cahq(&self) -> bool {
        *self == JurisdictionTag::Cahq
    }
}

impl fmt::Display for JurisdictionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for JurisdictionTag {
    fn from(code: String) -> Self {
        JurisdictionTag::from_code(&code)
    }
}

impl From<JurisdictionTag> for String {
    fn from(tag: JurisdictionTag) -> Self {
        tag.as_str().to_string()
    }
}

/// A job-to-state lookup entry as returned by the jurisdiction query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobJurisdiction {
    /// Company number.
    pub company: RawValue,
    /// Job number.
    pub job: RawValue,
    /// Subjob number; `None` for jobs without subjobs.
    #[serde(default)]
    pub subjob: Option<RawValue>,
    /// Raw state code (e.g. 50, 290).
    pub state_code: RawValue,
}

/// The overtime regime governing a record.
///
/// `DailyCap` is the California-style daily rule set; any other record is
/// governed by the weekly rule set of its own jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OvertimeRule {
    /// Daily 8-hour regular and 4-hour overtime caps ("CA").
    DailyCap,
    /// Weekly 40-hour cap under the record's jurisdiction.
    Jurisdiction(JurisdictionTag),
}

impl OvertimeRule {
    /// Returns true for the daily-cap rule.
    pub fn is_daily_cap(&self) -> bool {
        matches!(self, OvertimeRule::DailyCap)
    }

    /// Returns the rule code ("CA" or the jurisdiction tag).
    pub fn code(&self) -> &str {
        match self {
            OvertimeRule::DailyCap => DAILY_CAP_RULE_CODE,
            OvertimeRule::Jurisdiction(tag) => tag.as_str(),
        }
    }
}

impl fmt::Display for OvertimeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<String> for OvertimeRule {
    fn from(code: String) -> Self {
        if code == DAILY_CAP_RULE_CODE {
            OvertimeRule::DailyCap
        } else {
            OvertimeRule::Jurisdiction(JurisdictionTag::from_code(&code))
        }
    }
}

impl From<OvertimeRule> for String {
    fn from(rule: OvertimeRule) -> Self {
        rule.code().to_string()
    }
}
