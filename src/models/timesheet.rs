//! Timesheet input models.
//!
//! This module defines the loosely-typed [`RawTimesheetRow`] produced by the
//! ingestion collaborators and the normalized [`CanonicalRecord`] that every
//! later stage works from, along with the grouping keys the overtime engines
//! evaluate their running sums over.

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day zero of the spreadsheet serial date system (1900 system, with the
/// leap-year bug folded in).
const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Text formats accepted for week-ending dates.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A loosely-typed cell value from a timesheet export or lookup query.
///
/// Exports are inconsistent about whether job numbers, subjobs and cost
/// distribution codes arrive as numbers or text, so every raw field is held
/// as a `RawValue` and coerced by the stage that consumes it.
///
/// # Example
///
/// ```
/// use overtime_ledger::models::RawValue;
///
/// assert_eq!(RawValue::Float(2301.0).to_text(), "2301");
/// assert_eq!(RawValue::from(" 12A ").to_text(), "12A");
/// assert_eq!(RawValue::from("030").to_code(), "30");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// An integral number.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl RawValue {
    /// Renders the value as trimmed text.
    ///
    /// Floats with no fractional part render without a decimal point, so a
    /// job number read as `2301.0` becomes `"2301"`.
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Integer(n) => n.to_string(),
            RawValue::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => (*n as i64).to_string(),
            RawValue::Float(n) => n.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Returns true for empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }

    /// Coerces the value to an integer.
    ///
    /// Text is accepted when it holds an integer or an integral decimal
    /// such as `"10027.0"`.
    pub fn to_integer(&self) -> Result<i64, String> {
        match self {
            RawValue::Integer(n) => Ok(*n),
            RawValue::Float(n) if n.fract() == 0.0 && n.is_finite() => Ok(*n as i64),
            RawValue::Float(n) => Err(format!("{} is not a whole number", n)),
            RawValue::Text(s) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(n);
                }
                match Decimal::from_str(trimmed) {
                    Ok(d) if d.fract().is_zero() => {
                        i64::try_from(d.trunc()).map_err(|_| format!("'{}' is out of range", trimmed))
                    }
                    _ => Err(format!("'{}' is not a whole number", trimmed)),
                }
            }
        }
    }

    /// Coerces the value to a decimal.
    pub fn to_decimal(&self) -> Result<Decimal, String> {
        match self {
            RawValue::Integer(n) => Ok(Decimal::from(*n)),
            RawValue::Float(n) => {
                Decimal::from_str(&n.to_string()).map_err(|_| format!("{} is not a number", n))
            }
            RawValue::Text(s) => {
                let trimmed = s.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .map_err(|_| format!("'{}' is not a number", trimmed))
            }
        }
    }

    /// Coerces the value to a calendar date.
    ///
    /// Accepts ISO dates, `MM/DD/YYYY`, ISO date-times (the time is
    /// discarded) and spreadsheet serial day numbers.
    pub fn to_date(&self) -> Result<NaiveDate, String> {
        match self {
            RawValue::Integer(n) => serial_to_date(*n),
            RawValue::Float(n) if n.is_finite() => serial_to_date(n.floor() as i64),
            RawValue::Float(n) => Err(format!("{} is not a date", n)),
            RawValue::Text(s) => {
                let trimmed = s.trim();
                for format in DATE_FORMATS {
                    if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                        return Ok(date);
                    }
                }
                for format in DATETIME_FORMATS {
                    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                        return Ok(datetime.date());
                    }
                }
                if let Ok(serial) = trimmed.parse::<i64>() {
                    return serial_to_date(serial);
                }
                Err(format!("'{}' is not a recognised date", trimmed))
            }
        }
    }

    /// Renders a lookup code, normalizing numeric codes.
    ///
    /// `"030"`, `30` and `30.0` all render as `"30"`; anything that is not
    /// a whole number renders as trimmed text.
    pub fn to_code(&self) -> String {
        match self.to_integer() {
            Ok(n) => n.to_string(),
            Err(_) => self.to_text(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

fn serial_to_date(serial: i64) -> Result<NaiveDate, String> {
    let (y, m, d) = SPREADSHEET_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| "invalid epoch".to_string())?;
    u64::try_from(serial)
        .ok()
        .and_then(|days| epoch.checked_add_days(Days::new(days)))
        .ok_or_else(|| format!("{} is not a valid serial date", serial))
}

/// One row of a timesheet export, as delivered by the ingestion collaborator.
///
/// Blank optional cells are `None`. Hour cells that are blank count as zero
/// once the row is canonicalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTimesheetRow {
    /// Company number (e.g. 1, 30, 40).
    pub company: RawValue,
    /// Employee number.
    pub employee_number: RawValue,
    /// Payroll week number.
    pub week_number: RawValue,
    /// Day of the week, 1 through 7, where 7 is the week-ending day.
    pub day_of_week: RawValue,
    /// Project/job number.
    pub job: RawValue,
    /// Sub project/job number.
    #[serde(default)]
    pub subjob: Option<RawValue>,
    /// Job cost distribution (two-level phase code).
    #[serde(default)]
    pub cost_distribution: Option<RawValue>,
    /// Regular hours.
    #[serde(default)]
    pub regular_hours: Option<RawValue>,
    /// Overtime hours.
    #[serde(default)]
    pub overtime_hours: Option<RawValue>,
    /// Other hours (holiday, vacation, ...).
    #[serde(default)]
    pub other_hours: Option<RawValue>,
    /// Type tag for the other hours (e.g. "HL", "VA").
    #[serde(default)]
    pub other_hours_type: Option<RawValue>,
    /// Department number.
    pub department: RawValue,
    /// Week-ending date.
    pub week_ending: RawValue,
}

/// Key of the week-group scope used by the weekly-cap engine and the
/// overtime classifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekKey {
    /// Company name.
    pub company: String,
    /// Employee number.
    pub employee_number: u32,
    /// Department number.
    pub department: String,
    /// Week-ending date.
    pub week_ending: NaiveDate,
    /// Payroll week number.
    pub week_number: u32,
}

/// Key of the day-group scope used by the daily-cap engine.
///
/// Orders by week first, then by day of week, which is the chronological
/// order the running sums require.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey {
    /// The enclosing week-group.
    pub week: WeekKey,
    /// Day of the week, 1 through 7.
    pub day_of_week: u8,
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/wk{}/day{}",
            self.week.company,
            self.week.employee_number,
            self.week.department,
            self.week.week_ending,
            self.week.week_number,
            self.day_of_week
        )
    }
}

/// A normalized timesheet record.
///
/// One record exists per (company, employee, department, week-ending,
/// week-number, day-of-week, job, subjob, cost distribution, hour type);
/// duplicate raw rows are summed into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Company name after translation (e.g. "APC").
    pub company: String,
    /// Employee number.
    pub employee_number: u32,
    /// Department number.
    pub department: String,
    /// Week-ending date.
    pub week_ending: NaiveDate,
    /// Payroll week number.
    pub week_number: u32,
    /// Day of the week, 1 through 7.
    pub day_of_week: u8,
    /// Job number as text.
    pub job: String,
    /// Subjob number as text, unpadded.
    pub subjob: String,
    /// Cost distribution code as text.
    pub cost_distribution: String,
    /// Other-hours type tag; empty when the row carries none.
    pub hour_type: String,
    /// Regular hours.
    pub regular: Decimal,
    /// Overtime hours.
    pub overtime: Decimal,
    /// Other hours.
    pub other: Decimal,
}

impl CanonicalRecord {
    /// Returns the sum of all three hour buckets.
    pub fn total_hours(&self) -> Decimal {
        self.regular + self.overtime + self.other
    }

    /// Returns the week-group key of this record.
    pub fn week_key(&self) -> WeekKey {
        WeekKey {
            company: self.company.clone(),
            employee_number: self.employee_number,
            department: self.department.clone(),
            week_ending: self.week_ending,
            week_number: self.week_number,
        }
    }

    /// Returns the day-group key of this record.
    pub fn day_key(&self) -> DayKey {
        DayKey {
            week: self.week_key(),
            day_of_week: self.day_of_week,
        }
    }
}
