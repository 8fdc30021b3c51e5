// ********* Input data structures ***********

/// The largest count that is kept. Larger counts are capped to it, so that any
/// difference of two counts fits in an `i64`.
pub const MAX_COUNT: u64 = i64::MAX as u64;

use std::error::Error;
use std::fmt::Display;

/// One cell of a tabular source, as handed over by a spreadsheet or CSV reader.
///
/// The readers only need to map their own cell types onto these few cases.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// The text form of the cell, used for identifiers and column names.
    ///
    /// Whole numbers print without a fractional part, so that a code typed as `12345`
    /// in a spreadsheet matches the scanned text `12345`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => "".to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Number(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", *f as i64)
            }
            Cell::Number(f) => f.to_string(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
        }
    }

    /// Best-effort count: numbers are truncated, text is parsed as a number,
    /// everything else (and anything negative) counts as zero. Counts are capped to
    /// [MAX_COUNT].
    pub fn as_count(&self) -> u64 {
        let value: Option<f64> = match self {
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Empty | Cell::Bool(_) => None,
        };
        match value {
            // The float to integer cast saturates at u64::MAX.
            Some(f) if f.is_finite() && f > 0.0 => (f.trunc() as u64).min(MAX_COUNT),
            Some(f) if f == f64::INFINITY => MAX_COUNT,
            _ => 0,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Cell {
        Cell::Number(f)
    }
}

/// The content of a tabular source.
///
/// Row 1 (in the 1-based convention of spreadsheets) is `rows[0]`. Rows do not need to
/// have the same length.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable { rows }
    }
}

// ******** Output data structures *********

/// How an observed count compares to the expected count.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum DeltaStatus {
    /// Fewer items were found than expected.
    Shortage,
    Match,
    /// More items were found than expected.
    Surplus,
}

/// One line of the reconciliation report.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ReportRow {
    pub identifier: String,
    pub expected: u64,
    pub observed: u64,
    /// observed - expected
    pub delta: i64,
}

impl ReportRow {
    pub fn new(identifier: &str, expected: u64, observed: u64) -> ReportRow {
        let delta = i128::from(observed) - i128::from(expected);
        let delta = i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX });
        ReportRow {
            identifier: identifier.to_string(),
            expected,
            observed,
            delta,
        }
    }

    pub fn status(&self) -> DeltaStatus {
        match self.delta {
            d if d < 0 => DeltaStatus::Shortage,
            0 => DeltaStatus::Match,
            _ => DeltaStatus::Surplus,
        }
    }
}

/// The rows of a reconciliation, sorted by (delta, identifier).
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn total_expected(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.expected))
    }

    pub fn total_observed(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.observed))
    }

    /// The number of rows with the given status.
    pub fn count_status(&self, status: DeltaStatus) -> usize {
        self.rows.iter().filter(|r| r.status() == status).count()
    }
}

/// What a batch of scanned codes did to the tally, for one distinct code.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScanFeedback {
    pub identifier: String,
    /// How many times the code appeared in the batch.
    pub added: u64,
    /// The count after the batch was applied.
    pub total: u64,
}

/// Errors that prevent a reference table from being loaded.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ValidationError {
    /// The header row does not name all the required columns.
    MissingColumns {
        header_row: usize,
        missing: Vec<String>,
    },
    /// The header row is past the end of the source.
    HeaderRowOutOfRange { header_row: usize, num_rows: usize },
    /// Header rows are counted from 1.
    InvalidHeaderRow,
}

impl Error for ValidationError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingColumns {
                header_row,
                missing,
            } => write!(
                f,
                "the header in row {} is missing the required column(s): {}. Check that the header row is correct.",
                header_row,
                missing.join(", ")
            ),
            ValidationError::HeaderRowOutOfRange {
                header_row,
                num_rows,
            } => write!(
                f,
                "header row {} is out of range, the source has {} row(s)",
                header_row, num_rows
            ),
            ValidationError::InvalidHeaderRow => {
                write!(f, "the header row must be 1 or greater")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts() {
        assert_eq!(Cell::from(" 4 ").as_count(), 4);
        assert_eq!(Cell::Number(2.9).as_count(), 2);
        assert_eq!(Cell::Number(-3.0).as_count(), 0);
        assert_eq!(Cell::from("n/a").as_count(), 0);
        assert_eq!(Cell::from("nan").as_count(), 0);
        assert_eq!(Cell::Bool(true).as_count(), 0);
    }

    #[test]
    fn huge_counts_are_capped() {
        assert_eq!(Cell::from("1e19").as_count(), MAX_COUNT);
        assert_eq!(Cell::from("inf").as_count(), MAX_COUNT);
        assert_eq!(Cell::Number(9223372036854775808.0).as_count(), MAX_COUNT);
        assert_eq!(Cell::Number(1e300).as_count(), MAX_COUNT);
    }

    #[test]
    fn delta_keeps_its_sign() {
        let row = ReportRow::new("A", MAX_COUNT, 0);
        assert_eq!(row.delta, -i64::MAX);
        assert_eq!(row.status(), DeltaStatus::Shortage);

        let row = ReportRow::new("A", u64::MAX, 0);
        assert_eq!(row.delta, i64::MIN);
        assert_eq!(row.status(), DeltaStatus::Shortage);

        let row = ReportRow::new("A", 0, u64::MAX);
        assert_eq!(row.delta, i64::MAX);
        assert_eq!(row.status(), DeltaStatus::Surplus);
    }

    #[test]
    fn totals_saturate() {
        let report = Report {
            rows: vec![
                ReportRow::new("A", MAX_COUNT, 1),
                ReportRow::new("B", MAX_COUNT, 2),
                ReportRow::new("C", 5, 3),
            ],
        };
        assert_eq!(report.total_expected(), u64::MAX);
        assert_eq!(report.total_observed(), 6);
    }
}
