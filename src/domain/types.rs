//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during selection and classification
//! - persisted to SQLite and exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Number of dependent series in the training table (`y1..y4`).
pub const TRAIN_SERIES_COUNT: usize = 4;

/// Maximum number of candidate functions in the catalog (`y1..y50`).
pub const MAX_CANDIDATES: usize = 50;

/// The three tables this tool reads and writes.
///
/// Table identity is a closed set; free-form string dispatch exists nowhere
/// outside the SQL text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    TrainData,
    IdealFunctions,
    TestData,
}

impl TableKind {
    /// The SQLite table name.
    pub fn table_name(self) -> &'static str {
        match self {
            TableKind::TrainData => "train_data",
            TableKind::IdealFunctions => "ideal_functions",
            TableKind::TestData => "test_data",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// One named y-column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub y: Vec<f64>,
}

/// A shared x-domain plus an ordered, fixed-width sequence of named y-columns.
///
/// Column order is the catalog order (`y1`, `y2`, ...) and is load-bearing:
/// the selector breaks least-squares ties in favor of the first column to
/// reach the minimum.
///
/// Invariants enforced by the constructors:
/// - every column has exactly as many values as there are x entries
/// - x values are unique within the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    kind_name: String,
    x: Vec<f64>,
    columns: Vec<NamedSeries>,
}

impl SeriesTable {
    /// Build a table after checking the shape invariants.
    pub fn new(
        kind: TableKind,
        x: Vec<f64>,
        columns: Vec<NamedSeries>,
    ) -> Result<Self, AppError> {
        for col in &columns {
            if col.y.len() != x.len() {
                return Err(AppError::LengthMismatch {
                    left_name: format!("{kind}.x"),
                    left_len: x.len(),
                    right_name: format!("{kind}.{}", col.name),
                    right_len: col.y.len(),
                });
            }
        }

        // Duplicate x values would make value-based lookups ambiguous.
        let mut seen = std::collections::HashSet::with_capacity(x.len());
        for &xv in &x {
            if !seen.insert(x_key(xv)) {
                return Err(AppError::Schema {
                    table: kind.table_name().to_string(),
                    message: format!("duplicate x value {xv}"),
                });
            }
        }

        Ok(Self {
            kind_name: kind.table_name().to_string(),
            x,
            columns,
        })
    }

    /// Build a training table: exactly [`TRAIN_SERIES_COUNT`] columns.
    pub fn training(x: Vec<f64>, columns: Vec<NamedSeries>) -> Result<Self, AppError> {
        if columns.len() != TRAIN_SERIES_COUNT {
            return Err(AppError::Schema {
                table: TableKind::TrainData.table_name().to_string(),
                message: format!(
                    "expected exactly {TRAIN_SERIES_COUNT} training series, got {}",
                    columns.len()
                ),
            });
        }
        Self::new(TableKind::TrainData, x, columns)
    }

    /// Build a candidate table: 1..=[`MAX_CANDIDATES`] columns.
    pub fn candidates(x: Vec<f64>, columns: Vec<NamedSeries>) -> Result<Self, AppError> {
        if columns.is_empty() || columns.len() > MAX_CANDIDATES {
            return Err(AppError::Schema {
                table: TableKind::IdealFunctions.table_name().to_string(),
                message: format!(
                    "expected between 1 and {MAX_CANDIDATES} candidate series, got {}",
                    columns.len()
                ),
            });
        }
        Self::new(TableKind::IdealFunctions, x, columns)
    }

    /// Name of the table this data came from (for error context).
    pub fn kind_name(&self) -> &str {
        &self.kind_name
    }

    /// Number of rows (x entries).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.columns.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn columns(&self) -> &[NamedSeries] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&NamedSeries> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Row index of an exact x value, if present.
    pub fn position_of_x(&self, x: f64) -> Option<usize> {
        let key = x_key(x);
        self.x.iter().position(|&xv| x_key(xv) == key)
    }
}

/// Lookup key for an x value.
///
/// Uses the bit pattern so the key is hashable; `-0.0` is folded into `0.0`
/// so the two compare equal here just as they do under `==`.
pub(crate) fn x_key(x: f64) -> u64 {
    if x == 0.0 { 0.0_f64.to_bits() } else { x.to_bits() }
}

/// One test observation.
///
/// Created with `ideal_function`/`delta_y` unset; the classifier fills both
/// in when (and only when) the point falls within tolerance of one of the
/// selected functions. Points are never deleted, only updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPoint {
    pub x: f64,
    pub y: f64,
    /// Name of the assigned candidate function, if any.
    pub ideal_function: Option<String>,
    /// Residual |y − ideal_y|, rounded to 8 decimals, if assigned.
    pub delta_y: Option<f64>,
}

impl TestPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ideal_function: None,
            delta_y: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.ideal_function.is_some()
    }
}

/// The per-training-series choice of best-fit candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFunction {
    /// Training series name (`y1`..`y4`).
    pub train: String,
    /// Selected candidate function name.
    pub ideal: String,
    /// Maximum |train − ideal| observed over the shared x-domain.
    pub max_deviation: f64,
}

/// Output of the function selector: exactly one entry per training series,
/// in training-column order.
///
/// Read-only after construction; the classifier visits entries in this
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    entries: Vec<SelectedFunction>,
}

impl SelectionResult {
    pub fn from_entries(entries: Vec<SelectedFunction>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SelectedFunction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a given training series name.
    pub fn for_train(&self, train: &str) -> Option<&SelectedFunction> {
        self.entries.iter().find(|e| e.train == train)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train_csv: PathBuf,
    pub ideal_csv: PathBuf,
    pub test_csv: PathBuf,

    /// SQLite database file backing the three tables.
    pub db_path: PathBuf,

    pub plot: bool,
    /// Directory PNG charts are written to.
    pub plot_dir: PathBuf,
    pub plot_width: u32,
    pub plot_height: u32,

    /// Export classified test points to CSV.
    pub export_results: Option<PathBuf>,
    /// Export the selection (train → ideal + max deviation) to JSON.
    pub export_selection: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, y: &[f64]) -> NamedSeries {
        NamedSeries {
            name: name.to_string(),
            y: y.to_vec(),
        }
    }

    #[test]
    fn training_table_requires_four_series() {
        let x = vec![0.0, 1.0];
        let err = SeriesTable::training(x, vec![col("y1", &[1.0, 2.0])]).unwrap_err();
        assert!(matches!(err, AppError::Schema { .. }));
    }

    #[test]
    fn ragged_column_is_rejected() {
        let err = SeriesTable::candidates(vec![0.0, 1.0], vec![col("y1", &[1.0])]).unwrap_err();
        assert!(matches!(err, AppError::LengthMismatch { .. }));
    }

    #[test]
    fn duplicate_x_is_rejected() {
        let err =
            SeriesTable::candidates(vec![0.5, 0.5], vec![col("y1", &[1.0, 2.0])]).unwrap_err();
        assert!(matches!(err, AppError::Schema { .. }));
    }

    #[test]
    fn position_of_x_matches_exact_values_only() {
        let t = SeriesTable::candidates(vec![-0.1, 0.0, 0.1], vec![col("y1", &[1.0, 2.0, 3.0])])
            .unwrap();
        assert_eq!(t.position_of_x(-0.1), Some(0));
        assert_eq!(t.position_of_x(-0.0), Some(1));
        assert_eq!(t.position_of_x(0.05), None);
    }
}
