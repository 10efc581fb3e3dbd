//! Timesheet export ingestion.
//!
//! Reads the `.csv` and `.xlsx` timesheet exports found in a directory. Both
//! formats carry the same column headers; columns are matched by header
//! name, so their order does not matter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{EngineError, EngineResult};
use crate::models::{RawTimesheetRow, RawValue};

use super::TimesheetSource;

const COMPANY: &str = "Company Number";
const EMPLOYEE: &str = "Employee Number";
const WEEK_NUMBER: &str = "Week Number";
const DAY_OF_WEEK: &str = "Day of Week";
const JOB: &str = "Project/Job Number";
const SUBJOB: &str = "Sub Project / Job Number";
const COST_DISTRIBUTION: &str = "Job Cost Distribution";
const REGULAR_HOURS: &str = "Regular Hours";
const OVERTIME_HOURS: &str = "Overtime Hours";
const OTHER_HOURS: &str = "Other Hours";
const OTHER_HOURS_TYPE: &str = "Other Hours Type";
const DEPARTMENT: &str = "Department Number";
const WEEK_ENDING: &str = "Week Ending Date";

const REQUIRED_COLUMNS: [&str; 7] = [
    COMPANY,
    EMPLOYEE,
    WEEK_NUMBER,
    DAY_OF_WEEK,
    JOB,
    DEPARTMENT,
    WEEK_ENDING,
];

/// Identifier columns read from CSV as text so leading zeros survive.
const CODE_COLUMNS: [&str; 3] = [JOB, SUBJOB, COST_DISTRIBUTION];

/// A directory of timesheet exports.
///
/// Every `.csv` and `.xlsx` file below the directory is read, in file-name
/// order, and the rows of all files are concatenated. Spreadsheet lock files
/// (`~$...`) are skipped, as are fully blank rows.
#[derive(Debug, Clone)]
pub struct TimesheetDirectory {
    root: PathBuf,
}

impl TimesheetDirectory {
    /// Creates a source reading the exports below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the export files that will be read, in reading order.
    pub fn files(&self) -> EngineResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(EngineError::InputRead {
                path: self.root.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| EngineError::InputRead {
                path: self.root.display().to_string(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if path.is_file() && export_kind(path).is_some() {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

impl TimesheetSource for TimesheetDirectory {
    fn load(&self) -> EngineResult<Vec<RawTimesheetRow>> {
        let mut rows = Vec::new();
        for path in self.files()? {
            let loaded = read_timesheet_file(&path)?;
            info!(path = %path.display(), rows = loaded.len(), "Loaded timesheet export");
            rows.extend(loaded);
        }
        Ok(rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Csv,
    Xlsx,
}

fn export_kind(path: &Path) -> Option<ExportKind> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with("~$") {
        return None;
    }
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "csv" => Some(ExportKind::Csv),
        "xlsx" => Some(ExportKind::Xlsx),
        _ => None,
    }
}

/// Reads one `.csv` or `.xlsx` timesheet export.
///
/// # Errors
///
/// Returns [`EngineError::InputRead`] when the file cannot be opened or
/// parsed, or when a required column header is missing.
pub fn read_timesheet_file(path: &Path) -> EngineResult<Vec<RawTimesheetRow>> {
    match export_kind(path) {
        Some(ExportKind::Csv) => read_csv(path),
        Some(ExportKind::Xlsx) => read_xlsx(path),
        None => Err(input_error(path, "unsupported file type")),
    }
}

fn read_csv(path: &Path) -> EngineResult<Vec<RawTimesheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| input_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| input_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let columns = ColumnMap::new(path, &headers)?;
    let code_positions = columns.positions(&CODE_COLUMNS);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| input_error(path, e))?;
        let cells: Vec<Option<RawValue>> = record
            .iter()
            .enumerate()
            .map(|(position, text)| {
                if code_positions.contains(&position) {
                    text_cell(text)
                } else {
                    infer_cell(text)
                }
            })
            .collect();
        if let Some(row) = columns.build_row(&cells) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_xlsx(path: &Path) -> EngineResult<Vec<RawTimesheetRow>> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| input_error(path, e))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| input_error(path, "workbook contains no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| input_error(path, format!("sheet '{}': {}", sheet_name, e)))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| data_to_raw(cell).map(|v| v.to_text()).unwrap_or_default())
            .collect(),
        None => return Ok(Vec::new()),
    };
    let columns = ColumnMap::new(path, &headers)?;
    debug!(path = %path.display(), sheet = %sheet_name, "Reading timesheet sheet");

    Ok(sheet_rows
        .filter_map(|row| {
            let cells: Vec<Option<RawValue>> = row.iter().map(data_to_raw).collect();
            columns.build_row(&cells)
        })
        .collect())
}

/// Header name to column index for one export file.
struct ColumnMap {
    index: HashMap<String, usize>,
}

impl ColumnMap {
    fn new(path: &Path, headers: &[String]) -> EngineResult<Self> {
        let mut index = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            index.entry(header.trim().to_string()).or_insert(position);
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !index.contains_key(*column))
            .collect();
        if !missing.is_empty() {
            return Err(input_error(
                path,
                format!("missing columns: {}", missing.join(", ")),
            ));
        }

        Ok(Self { index })
    }

    fn positions(&self, columns: &[&str]) -> Vec<usize> {
        columns
            .iter()
            .filter_map(|column| self.index.get(*column).copied())
            .collect()
    }

    fn cell(&self, cells: &[Option<RawValue>], column: &str) -> Option<RawValue> {
        self.index
            .get(column)
            .and_then(|&position| cells.get(position))
            .cloned()
            .flatten()
    }

    fn required(&self, cells: &[Option<RawValue>], column: &str) -> RawValue {
        self.cell(cells, column)
            .unwrap_or_else(|| RawValue::Text(String::new()))
    }

    /// Builds a raw row, or `None` when every cell is blank.
    fn build_row(&self, cells: &[Option<RawValue>]) -> Option<RawTimesheetRow> {
        if cells.iter().all(Option::is_none) {
            return None;
        }
        Some(RawTimesheetRow {
            company: self.required(cells, COMPANY),
            employee_number: self.required(cells, EMPLOYEE),
            week_number: self.required(cells, WEEK_NUMBER),
            day_of_week: self.required(cells, DAY_OF_WEEK),
            job: self.required(cells, JOB),
            subjob: self.cell(cells, SUBJOB),
            cost_distribution: self.cell(cells, COST_DISTRIBUTION),
            regular_hours: self.cell(cells, REGULAR_HOURS),
            overtime_hours: self.cell(cells, OVERTIME_HOURS),
            other_hours: self.cell(cells, OTHER_HOURS),
            other_hours_type: self.cell(cells, OTHER_HOURS_TYPE),
            department: self.required(cells, DEPARTMENT),
            week_ending: self.required(cells, WEEK_ENDING),
        })
    }
}

/// Types a text cell the way a spreadsheet would: integers and decimals
/// become numbers, blank cells become `None`, anything else stays text.
pub(crate) fn infer_cell(text: &str) -> Option<RawValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(RawValue::Integer(n));
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(RawValue::Float(n)),
        _ => Some(RawValue::Text(trimmed.to_string())),
    }
}

/// Keeps a cell as trimmed text; blank cells become `None`.
pub(crate) fn text_cell(text: &str) -> Option<RawValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(RawValue::Text(trimmed.to_string()))
    }
}

fn data_to_raw(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(RawValue::Text(s.clone())),
        Data::Float(n) => Some(RawValue::Float(*n)),
        Data::Int(n) => Some(RawValue::Integer(*n)),
        Data::Bool(b) => Some(RawValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string())),
        Data::Error(e) => Some(RawValue::Text(format!("#{:?}", e))),
        // Dates arrive as serial day numbers, which RawValue::to_date accepts.
        Data::DateTime(dt) => Some(RawValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(RawValue::Text(s.clone())),
    }
}

fn input_error(path: &Path, message: impl ToString) -> EngineError {
    EngineError::InputRead {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}
