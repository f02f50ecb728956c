//! Best-fit candidate selection by least squares.
//!
//! For each training series we scan the candidate catalog in column order
//! and keep the candidate with the smallest sum of squared deviations.
//!
//! Selection rules:
//! 1. Strict improvement only (`s < best`), so the first candidate to reach
//!    the minimum wins ties.
//! 2. The recorded max-deviation is recomputed against the candidate that
//!    triggered the improvement, inside the same branch. It can never refer
//!    to a previously-best candidate.
//! 3. Candidate order is the catalog order, which makes the result
//!    deterministic for identical inputs.

use log::info;
use rayon::prelude::*;

use crate::domain::{NamedSeries, SelectedFunction, SelectionResult, SeriesTable};
use crate::error::AppError;
use crate::math::{max_absolute_deviation, sum_squared_deviation};

/// Select the best-fit candidate for every training series.
///
/// Both tables must share the same x-domain, pairwise equal and in the same
/// order; anything else is a `DomainMismatch`, never a silent positional
/// alignment.
pub fn select_functions(
    training: &SeriesTable,
    candidates: &SeriesTable,
) -> Result<SelectionResult, AppError> {
    if training.is_empty() {
        return Err(empty(training, "select from"));
    }
    if candidates.is_empty() {
        return Err(empty(candidates, "select against"));
    }
    check_shared_domain(training, candidates)?;

    // The per-series scans are independent and write disjoint output slots,
    // so they can run in parallel. `collect` preserves training-column order.
    let entries = training
        .columns()
        .par_iter()
        .map(|train_col| select_one(train_col, candidates))
        .collect::<Result<Vec<_>, AppError>>()?;

    for e in &entries {
        info!(
            "selected {} for {} (max deviation {:.6})",
            e.ideal, e.train, e.max_deviation
        );
    }

    Ok(SelectionResult::from_entries(entries))
}

/// Scan the catalog for the candidate minimizing Σ(train − candidate)².
fn select_one(
    train: &NamedSeries,
    candidates: &SeriesTable,
) -> Result<SelectedFunction, AppError> {
    let mut best_sum = f64::INFINITY;
    let mut best: Option<SelectedFunction> = None;

    for cand in candidates.columns() {
        let s = sum_squared_deviation(&train.name, &train.y, &cand.name, &cand.y)?;
        if s < best_sum {
            best_sum = s;
            let max_dev = max_absolute_deviation(&train.name, &train.y, &cand.name, &cand.y)?;
            best = Some(SelectedFunction {
                train: train.name.clone(),
                ideal: cand.name.clone(),
                max_deviation: max_dev,
            });
        }
    }

    // Unreachable with a non-empty catalog unless every sum was NaN.
    best.ok_or_else(|| AppError::Schema {
        table: candidates.kind_name().to_string(),
        message: format!("no candidate produced a finite least-squares sum for {}", train.name),
    })
}

/// Require pairwise-equal x-domains, same order.
fn check_shared_domain(training: &SeriesTable, candidates: &SeriesTable) -> Result<(), AppError> {
    if training.len() != candidates.len() {
        return Err(AppError::LengthMismatch {
            left_name: format!("{}.x", training.kind_name()),
            left_len: training.len(),
            right_name: format!("{}.x", candidates.kind_name()),
            right_len: candidates.len(),
        });
    }
    for (row, (&tx, &cx)) in training.x().iter().zip(candidates.x()).enumerate() {
        if tx != cx {
            return Err(AppError::DomainMismatch {
                left_table: training.kind_name().to_string(),
                right_table: candidates.kind_name().to_string(),
                row,
                left_x: tx,
                right_x: cx,
            });
        }
    }
    Ok(())
}

fn empty(table: &SeriesTable, operation: &str) -> AppError {
    AppError::EmptyInput {
        table: table.kind_name().to_string(),
        operation: operation.to_string(),
    }
}
