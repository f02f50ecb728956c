//! CSV ingest and normalization.
//!
//! Turns the three source files into validated in-memory tables.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Line-numbered errors** for every field that fails to parse
//! - **Separation of concerns**: no matching logic here
//!
//! Expected layouts (header row required):
//! - training CSV: `x,y1,y2,y3,y4`
//! - candidate CSV: `x,y1,...,y50` (up to 50 y-columns)
//! - test CSV: `x,y` (extra columns are ignored)

use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{NamedSeries, SeriesTable, TestPoint};
use crate::error::AppError;

/// Load the training table: shared x plus exactly four y-series.
pub fn load_training_csv(path: &Path) -> Result<SeriesTable, AppError> {
    let (x, columns) = read_series_columns(path)?;
    SeriesTable::training(x, columns)
}

/// Load the candidate catalog: shared x plus up to fifty y-series.
pub fn load_candidate_csv(path: &Path) -> Result<SeriesTable, AppError> {
    let (x, columns) = read_series_columns(path)?;
    SeriesTable::candidates(x, columns)
}

/// Load test observations as unassigned points.
pub fn load_test_csv(path: &Path) -> Result<Vec<TestPoint>, AppError> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;

    let x_idx = require_column(&headers, "x", path)?;
    let y_idx = require_column(&headers, "y", path)?;

    let mut points = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|source| AppError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record_line(&record, i);
        let x = parse_field(&record, x_idx, "x", line, path)?;
        let y = parse_field(&record, y_idx, "y", line, path)?;
        points.push(TestPoint::new(x, y));
    }

    Ok(points)
}

/// Read a `x,y...` file into the shared x vector plus one column per
/// remaining header, in header order.
fn read_series_columns(path: &Path) -> Result<(Vec<f64>, Vec<NamedSeries>), AppError> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader, path)?;

    let x_idx = require_column(&headers, "x", path)?;
    let series_headers: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != x_idx)
        .map(|(idx, name)| (idx, name.to_string()))
        .collect();

    let mut x = Vec::new();
    let mut columns: Vec<NamedSeries> = series_headers
        .iter()
        .map(|(_, name)| NamedSeries {
            name: name.clone(),
            y: Vec::new(),
        })
        .collect();

    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|source| AppError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record_line(&record, i);

        x.push(parse_field(&record, x_idx, "x", line, path)?);
        for (slot, (idx, name)) in columns.iter_mut().zip(&series_headers) {
            slot.y.push(parse_field(&record, *idx, name, line, path)?);
        }
    }

    Ok((x, columns))
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path).map_err(|e| AppError::io("failed to open CSV", path, e))?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_headers(reader: &mut csv::Reader<File>, path: &Path) -> Result<StringRecord, AppError> {
    reader
        .headers()
        .map(|h| h.clone())
        .map_err(|source| AppError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn require_column(headers: &StringRecord, name: &str, path: &Path) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| AppError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn parse_field(
    record: &StringRecord,
    idx: usize,
    column: &str,
    line: usize,
    path: &Path,
) -> Result<f64, AppError> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>().map_err(|_| AppError::BadField {
        path: path.to_path_buf(),
        line,
        column: column.to_string(),
        message: format!("'{raw}' is not a number"),
    })
}

/// 1-based file line of a record; falls back to counting from the header.
fn record_line(record: &StringRecord, index: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(index + 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_training_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "train.csv",
            "x,y1,y2,y3,y4\n-0.1,1,2,3,4\n0.0,5,6,7,8\n",
        );

        let table = load_training_csv(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.x(), &[-0.1, 0.0]);
        assert_eq!(table.column("y3").unwrap().y, vec![3.0, 7.0]);
    }

    #[test]
    fn training_csv_with_wrong_series_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "train.csv", "x,y1,y2\n0.0,1,2\n");

        let err = load_training_csv(&path).unwrap_err();
        assert!(matches!(err, AppError::Schema { .. }));
    }

    #[test]
    fn missing_x_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "ideal.csv", "y1,y2\n1,2\n");

        let err = load_candidate_csv(&path).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn { .. }));
    }

    #[test]
    fn bad_float_reports_line_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "ideal.csv", "x,y1\n0.0,1.5\n1.0,oops\n");

        let err = load_candidate_csv(&path).unwrap_err();
        match err {
            AppError::BadField { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "y1");
            }
            other => panic!("expected BadField, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_x_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "ideal.csv", "x,y1\n0.5,1\n0.5,2\n");

        let err = load_candidate_csv(&path).unwrap_err();
        assert!(matches!(err, AppError::Schema { .. }));
    }

    #[test]
    fn loads_test_csv_with_extra_columns_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "test.csv", "x,y,comment\n0.5,17.3,keep\n");

        let points = load_test_csv(&path).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 0.5);
        assert_eq!(points[0].y, 17.3);
        assert!(!points[0].is_assigned());
    }
}
