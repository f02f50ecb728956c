//! SQLite-backed table store.
//!
//! The persistence collaborator for the pipeline: the three known tables
//! (`train_data`, `ideal_functions`, `test_data`) addressed through
//! [`TableKind`], each with "replace with new rows" and "load as typed rows"
//! operations. Replace semantics are drop-and-recreate, matching how the
//! classified test results overwrite the raw test table.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::domain::{NamedSeries, SeriesTable, TableKind, TestPoint};
use crate::error::AppError;

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Drop all three known tables.
    pub fn reset(&self) -> Result<(), AppError> {
        for kind in [
            TableKind::TrainData,
            TableKind::IdealFunctions,
            TableKind::TestData,
        ] {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {}", kind.table_name()))?;
        }
        Ok(())
    }

    /// Replace a series table (training or candidate catalog) wholesale.
    pub fn replace_series_table(&mut self, table: &SeriesTable) -> Result<(), AppError> {
        let name = table.kind_name().to_string();

        let mut ddl = format!("DROP TABLE IF EXISTS {name};\nCREATE TABLE {name} (\n    x REAL NOT NULL");
        for col in table.columns() {
            ddl.push_str(&format!(",\n    \"{}\" REAL NOT NULL", col.name));
        }
        ddl.push_str("\n);");
        self.conn.execute_batch(&ddl)?;

        let placeholders: Vec<String> = (1..=table.columns().len() + 1)
            .map(|i| format!("?{i}"))
            .collect();
        let insert = format!("INSERT INTO {name} VALUES ({})", placeholders.join(", "));

        // Bulk insert inside a transaction for performance
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for (row, &x) in table.x().iter().enumerate() {
                let mut values: Vec<f64> = Vec::with_capacity(table.columns().len() + 1);
                values.push(x);
                values.extend(table.columns().iter().map(|c| c.y[row]));
                stmt.execute(rusqlite::params_from_iter(values))?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    /// Load a series table, preserving column order and row insertion order.
    pub fn load_series_table(&self, kind: TableKind) -> Result<SeriesTable, AppError> {
        if kind == TableKind::TestData {
            return Err(AppError::Schema {
                table: kind.table_name().to_string(),
                message: "test_data holds points, not series; use load_test_points".to_string(),
            });
        }

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", kind.table_name()))?;

        let col_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let x_idx = col_names.iter().position(|c| c == "x").ok_or_else(|| {
            AppError::Schema {
                table: kind.table_name().to_string(),
                message: "stored table has no 'x' column".to_string(),
            }
        })?;

        let series_cols: Vec<(usize, String)> = col_names
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| *idx != x_idx)
            .collect();

        let mut x = Vec::new();
        let mut columns: Vec<NamedSeries> = series_cols
            .iter()
            .map(|(_, name)| NamedSeries {
                name: name.clone(),
                y: Vec::new(),
            })
            .collect();

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            x.push(row.get::<_, f64>(x_idx)?);
            for (slot, (idx, _)) in columns.iter_mut().zip(&series_cols) {
                slot.y.push(row.get::<_, f64>(*idx)?);
            }
        }

        match kind {
            TableKind::TrainData => SeriesTable::training(x, columns),
            TableKind::IdealFunctions => SeriesTable::candidates(x, columns),
            TableKind::TestData => unreachable!("rejected above"),
        }
    }

    /// Replace the test table wholesale.
    ///
    /// `delta_y` and `ideal_function` are nullable: NULL for unassigned
    /// points, filled for classified ones.
    pub fn replace_test_points(&mut self, points: &[TestPoint]) -> Result<(), AppError> {
        let name = TableKind::TestData.table_name();
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name};\n\
             CREATE TABLE {name} (\n    \
                 x REAL NOT NULL,\n    \
                 y REAL NOT NULL,\n    \
                 delta_y REAL,\n    \
                 ideal_function TEXT\n\
             );"
        ))?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {name} (x, y, delta_y, ideal_function) VALUES (?1, ?2, ?3, ?4)"
            ))?;
            for p in points {
                stmt.execute(params![p.x, p.y, p.delta_y, p.ideal_function])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    /// Load test points in insertion order.
    pub fn load_test_points(&self) -> Result<Vec<TestPoint>, AppError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT x, y, delta_y, ideal_function FROM {} ORDER BY rowid",
            TableKind::TestData.table_name()
        ))?;

        let mut points = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            points.push(TestPoint {
                x: row.get(0)?,
                y: row.get(1)?,
                delta_y: row.get::<_, Option<f64>>(2)?,
                ideal_function: row.get::<_, Option<String>>(3)?,
            });
        }

        Ok(points)
    }
}
