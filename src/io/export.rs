//! Export classified results.
//!
//! - per-point results as CSV (easy to consume in spreadsheets)
//! - the selection as pretty-printed JSON (the "portable" summary of a run)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{SelectionResult, TestPoint};
use crate::error::AppError;

/// Write classified test points to a CSV file.
///
/// Unassigned points keep empty `delta_y` / `ideal_function` fields, the CSV
/// equivalent of the nullable database columns.
pub fn write_results_csv(path: &Path, points: &[TestPoint]) -> Result<(), AppError> {
    let mut file =
        File::create(path).map_err(|e| AppError::io("failed to create export CSV", path, e))?;

    writeln!(file, "x,y,delta_y,ideal_function")
        .map_err(|e| AppError::io("failed to write export CSV", path, e))?;

    for p in points {
        writeln!(
            file,
            "{},{},{},{}",
            p.x,
            p.y,
            p.delta_y.map(|v| format!("{v:.8}")).unwrap_or_default(),
            p.ideal_function.as_deref().unwrap_or(""),
        )
        .map_err(|e| AppError::io("failed to write export CSV", path, e))?;
    }

    Ok(())
}

/// Write the selection (train series → ideal function + max deviation) to JSON.
pub fn write_selection_json(path: &Path, selection: &SelectionResult) -> Result<(), AppError> {
    let file =
        File::create(path).map_err(|e| AppError::io("failed to create selection JSON", path, e))?;
    serde_json::to_writer_pretty(file, selection)?;
    Ok(())
}
