//! PNG charts of a run, rendered with Plotters.
//!
//! Two charts per run:
//! - `train_vs_ideal.png`: a 2×2 panel grid comparing each training series
//!   (colored) with its selected ideal function (black)
//! - `test_scatter.png`: every test observation, colored by the function it
//!   was assigned to, with unassigned points drawn as grey crosses
//!
//! The charts carry no text; panel order follows the selection order, which
//! the terminal report prints alongside. This keeps the bitmap path free of
//! any font backend (see the Plotters feature note in Cargo.toml).

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::{RunConfig, SelectionResult, SeriesTable, TestPoint};
use crate::error::AppError;

/// One color per training series / selected function panel.
const SERIES_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

const UNASSIGNED_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Render both charts into `config.plot_dir`; returns the written paths.
pub fn render_run_charts(
    training: &SeriesTable,
    candidates: &SeriesTable,
    selection: &SelectionResult,
    test_points: &[TestPoint],
    config: &RunConfig,
) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(&config.plot_dir)
        .map_err(|e| AppError::io("failed to create plot dir", &config.plot_dir, e))?;

    let size = (config.plot_width, config.plot_height);

    let panels = config.plot_dir.join("train_vs_ideal.png");
    draw_train_vs_ideal(&panels, training, candidates, selection, size)
        .map_err(|e| render_error(&panels, e))?;

    let scatter = config.plot_dir.join("test_scatter.png");
    draw_test_scatter(&scatter, candidates, selection, test_points, size)
        .map_err(|e| render_error(&scatter, e))?;

    Ok(vec![panels, scatter])
}

fn render_error(path: &Path, e: Box<dyn std::error::Error>) -> AppError {
    AppError::Render {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn draw_train_vs_ideal(
    path: &Path,
    training: &SeriesTable,
    candidates: &SeriesTable,
    selection: &SelectionResult,
    size: (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    for (i, (panel, entry)) in panels.iter().zip(selection.entries()).enumerate() {
        let train_col = training
            .column(&entry.train)
            .ok_or_else(|| format!("training series '{}' missing", entry.train))?;
        let ideal_col = candidates
            .column(&entry.ideal)
            .ok_or_else(|| format!("ideal function '{}' missing", entry.ideal))?;

        let (x0, x1) = padded_bounds(training.x().iter().copied());
        let (y0, y1) = padded_bounds(train_col.y.iter().chain(&ideal_col.y).copied());

        let mut chart = ChartBuilder::on(panel)
            .margin(12)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        chart.draw_series(LineSeries::new(
            training.x().iter().zip(&train_col.y).map(|(&x, &y)| (x, y)),
            color.stroke_width(2),
        ))?;
        chart.draw_series(LineSeries::new(
            candidates.x().iter().zip(&ideal_col.y).map(|(&x, &y)| (x, y)),
            BLACK.stroke_width(1),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn draw_test_scatter(
    path: &Path,
    candidates: &SeriesTable,
    selection: &SelectionResult,
    test_points: &[TestPoint],
    size: (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) =
        padded_bounds(test_points.iter().map(|p| p.x).chain(candidates.x().iter().copied()));
    let (y0, y1) = padded_bounds(test_points.iter().map(|p| p.y));

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    // Selected ideal functions as context lines.
    for (i, entry) in selection.entries().iter().enumerate() {
        let Some(col) = candidates.column(&entry.ideal) else {
            continue;
        };
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        chart.draw_series(LineSeries::new(
            candidates.x().iter().zip(&col.y).map(|(&x, &y)| (x, y)),
            color.mix(0.4).stroke_width(1),
        ))?;
    }

    // Assigned points, colored to match their function's context line.
    for (i, entry) in selection.entries().iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        chart.draw_series(
            test_points
                .iter()
                .filter(|p| p.ideal_function.as_deref() == Some(entry.ideal.as_str()))
                .map(|p| Circle::new((p.x, p.y), 3, color.filled())),
        )?;
    }

    chart.draw_series(
        test_points
            .iter()
            .filter(|p| !p.is_assigned())
            .map(|p| Cross::new((p.x, p.y), 3, &UNASSIGNED_COLOR)),
    )?;

    root.present()?;
    Ok(())
}

/// Finite, slightly padded bounds; degenerate or empty input falls back to a
/// unit range so chart building never fails on it.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if (max - min).abs() < 1e-12 {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}
