mod config;
use log::{debug, info, warn};

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

pub mod capture;
pub mod manual;
pub mod reference;

pub use crate::config::*;
pub use crate::reference::ReferenceTable;

// **** Identifiers ****

/// Trims an identifier. Blank identifiers are not identifiers.
pub fn normalize_identifier(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Identifiers that never make it to a report.
///
/// Empty cells, `nan` and `0` are what malformed spreadsheet rows turn into once read as
/// text. They are placeholders, not item codes.
pub fn is_placeholder(identifier: &str) -> bool {
    let trimmed = identifier.trim();
    trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("nan")
}

// **** Engine ****

/// The running tally of a stocktaking session.
///
/// Every observation of an item code increments its count by one. The tally only grows
/// until it is cleared.
///
/// ```
/// use stock_tally::{ReconciliationEngine, ReferenceTable, ReportRow};
///
/// let reference = ReferenceTable::from_entries(vec![("A", 5), ("B", 2)]);
/// let mut engine = ReconciliationEngine::new();
/// engine.record_batch(["A", "A", "B", "C", "A", "B"]);
///
/// let report = engine.build_report(Some(&reference));
/// assert_eq!(
///     report.rows,
///     vec![
///         ReportRow::new("A", 5, 3),
///         ReportRow::new("B", 2, 2),
///         ReportRow::new("C", 0, 1),
///     ]
/// );
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReconciliationEngine {
    tally: HashMap<String, u64>,
}

impl ReconciliationEngine {
    pub fn new() -> ReconciliationEngine {
        ReconciliationEngine::default()
    }

    /// Records one observation of an identifier.
    ///
    /// Returns the new count, or `None` if the identifier was blank (in which case
    /// nothing is recorded).
    pub fn record(&mut self, identifier: &str) -> Option<u64> {
        let identifier = normalize_identifier(identifier)?;
        let count = self.tally.entry(identifier.to_string()).or_insert(0);
        *count += 1;
        debug!("record: {:?} -> {}", identifier, count);
        Some(*count)
    }

    /// Records all the identifiers decoded from a single capture, in order.
    ///
    /// The feedback has one entry per distinct identifier, in the order in which they
    /// first appear in the batch.
    pub fn record_batch<I, S>(&mut self, identifiers: I) -> Vec<ScanFeedback>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut feedback: Vec<ScanFeedback> = Vec::new();
        for raw in identifiers {
            let total = match self.record(raw.as_ref()) {
                Some(total) => total,
                None => {
                    warn!("record_batch: skipping blank code {:?}", raw.as_ref());
                    continue;
                }
            };
            let identifier = raw.as_ref().trim();
            match feedback.iter_mut().find(|f| f.identifier == identifier) {
                Some(f) => {
                    f.added += 1;
                    f.total = total;
                }
                None => feedback.push(ScanFeedback {
                    identifier: identifier.to_string(),
                    added: 1,
                    total,
                }),
            }
        }
        feedback
    }

    /// Forgets all the observations.
    pub fn clear(&mut self) {
        info!("Clearing {} scanned identifier(s)", self.tally.len());
        self.tally.clear();
    }

    pub fn count(&self, identifier: &str) -> u64 {
        normalize_identifier(identifier)
            .and_then(|id| self.tally.get(id).cloned())
            .unwrap_or(0)
    }

    /// The number of distinct identifiers observed.
    pub fn len(&self) -> usize {
        self.tally.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tally.is_empty()
    }

    pub fn total_observations(&self) -> u64 {
        self.tally.values().sum()
    }

    /// The current counts, sorted by identifier.
    pub fn counts(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> =
            self.tally.iter().map(|(k, v)| (k.clone(), *v)).collect();
        counts.sort();
        counts
    }

    /// Compares the tally with the expected inventory.
    ///
    /// Every identifier known to either side gets a row, except placeholders
    /// (see [is_placeholder]). Rows are sorted by delta, largest shortages first, then
    /// by identifier. Without a reference table, every expected count is 0.
    pub fn build_report(&self, reference: Option<&ReferenceTable>) -> Report {
        let empty = ReferenceTable::empty();
        let reference = reference.unwrap_or(&empty);

        let all_identifiers: BTreeSet<&String> =
            reference.identifiers().chain(self.tally.keys()).collect();

        let mut rows: Vec<ReportRow> = Vec::new();
        for identifier in all_identifiers {
            if is_placeholder(identifier) {
                debug!("build_report: dropping placeholder {:?}", identifier);
                continue;
            }
            let expected = reference.expected_count(identifier);
            let observed = self.tally.get(identifier).cloned().unwrap_or(0);
            rows.push(ReportRow::new(identifier, expected, observed));
        }
        sort_rows(&mut rows);

        debug!(
            "build_report: {} row(s) from {} reference identifier(s) and {} scanned identifier(s)",
            rows.len(),
            reference.len(),
            self.tally.len()
        );
        Report { rows }
    }
}

/// The report order: by delta, then by identifier.
pub fn sort_rows(rows: &mut [ReportRow]) {
    rows.sort_by(|a, b| {
        a.delta
            .cmp(&b.delta)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
}

/// An engine that can be fed from several capture sources at once.
///
/// All the operations take the same lock, and none of them blocks while holding it.
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<ReconciliationEngine>>,
}

impl SharedEngine {
    pub fn new() -> SharedEngine {
        SharedEngine::default()
    }

    pub fn from_engine(engine: ReconciliationEngine) -> SharedEngine {
        SharedEngine {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    // The engine is never left half-updated by a panic, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, ReconciliationEngine> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, identifier: &str) -> Option<u64> {
        self.lock().record(identifier)
    }

    pub fn record_batch<I, S>(&self, identifiers: I) -> Vec<ScanFeedback>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lock().record_batch(identifiers)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    pub fn build_report(&self, reference: Option<&ReferenceTable>) -> Report {
        self.lock().build_report(reference)
    }

    pub fn snapshot_counts(&self) -> Vec<(String, u64)> {
        self.lock().counts()
    }
}
