use log::{debug, info};

use std::collections::HashMap;

use crate::config::*;

/// The column holding the item code.
pub const MODEL_COLUMN: &str = "model";
/// The column holding the expected count ("stan" is the stock level).
pub const STOCK_COLUMN: &str = "stan";

/// The expected inventory: how many items of each identifier should be found.
///
/// A table is frozen once built. Identifiers are trimmed, and when the same identifier
/// appears several times the last occurrence wins.
///
/// ```
/// use stock_tally::{Cell, RawTable, ReferenceTable};
///
/// let source = RawTable::new(vec![
///     vec![Cell::from("Model "), Cell::from("STAN")],
///     vec![Cell::from(" A-100"), Cell::from(4.0)],
///     vec![Cell::from("B-200"), Cell::from("n/a")],
/// ]);
/// let reference = ReferenceTable::load(&source, None)?;
/// assert_eq!(reference.get("A-100"), Some(4));
/// assert_eq!(reference.get("B-200"), Some(0));
/// # Ok::<(), stock_tally::ValidationError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReferenceTable {
    expected: HashMap<String, u64>,
}

impl ReferenceTable {
    pub fn empty() -> ReferenceTable {
        ReferenceTable::default()
    }

    /// Loads the table from a tabular source.
    ///
    /// `header_row` is the 1-based row that holds the column names (the first row if not
    /// provided). All the rows below it are data rows. The column names are matched after
    /// trimming and ignoring case.
    pub fn load(
        source: &RawTable,
        header_row: Option<usize>,
    ) -> Result<ReferenceTable, ValidationError> {
        let header_row = header_row.unwrap_or(1);
        if header_row == 0 {
            return Err(ValidationError::InvalidHeaderRow);
        }
        let header = source
            .rows
            .get(header_row - 1)
            .ok_or(ValidationError::HeaderRowOutOfRange {
                header_row,
                num_rows: source.rows.len(),
            })?;

        let col_names: Vec<String> = header
            .iter()
            .map(|c| c.as_text().trim().to_lowercase())
            .collect();
        debug!("load: header row {}: {:?}", header_row, col_names);

        let position = |name: &str| col_names.iter().position(|c| c == name);
        let (model_idx, stock_idx) = match (position(MODEL_COLUMN), position(STOCK_COLUMN)) {
            (Some(m), Some(s)) => (m, s),
            (m, s) => {
                let mut missing: Vec<String> = Vec::new();
                if m.is_none() {
                    missing.push(MODEL_COLUMN.to_string());
                }
                if s.is_none() {
                    missing.push(STOCK_COLUMN.to_string());
                }
                return Err(ValidationError::MissingColumns {
                    header_row,
                    missing,
                });
            }
        };

        let empty = Cell::Empty;
        let entries = source.rows[header_row..].iter().map(|row| {
            let identifier = row.get(model_idx).unwrap_or(&empty).as_text();
            let count = row.get(stock_idx).unwrap_or(&empty).as_count();
            (identifier, count)
        });
        let table = ReferenceTable::from_entries(entries);
        info!(
            "Loaded reference table: {} identifier(s) from {} data row(s)",
            table.len(),
            source.rows.len() - header_row
        );
        Ok(table)
    }

    /// Builds a table from (identifier, expected count) pairs.
    pub fn from_entries<I, S>(entries: I) -> ReferenceTable
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut expected: HashMap<String, u64> = HashMap::new();
        for (identifier, count) in entries {
            let identifier = identifier.as_ref().trim();
            let count = count.min(MAX_COUNT);
            if let Some(previous) = expected.insert(identifier.to_string(), count) {
                debug!(
                    "from_entries: duplicate identifier {:?}: {} replaced by {}",
                    identifier, previous, count
                );
            }
        }
        ReferenceTable { expected }
    }

    pub fn get(&self, identifier: &str) -> Option<u64> {
        self.expected.get(identifier).cloned()
    }

    /// The expected count, 0 for unknown identifiers.
    pub fn expected_count(&self, identifier: &str) -> u64 {
        self.get(identifier).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    /// All the entries, sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .expected
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        entries.sort();
        entries.into_iter()
    }

    pub(crate) fn identifiers(&self) -> impl Iterator<Item = &String> {
        self.expected.keys()
    }
}
