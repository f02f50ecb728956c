//! Test-point classification against the selected ideal functions.
//!
//! Each test observation is compared with all four selected functions at its
//! x value. A function is eligible when the observed deviation stays within
//! `max_deviation × √2` (inclusive); among eligible functions the one with
//! the smallest deviation wins. Stopping at the first eligible function
//! would produce different results and is deliberately not what this does.
//!
//! Points are classified independently, so the loop is parallelized across
//! points: candidates and selection are shared read-only, each point is
//! mutated by exactly one worker.

use std::collections::HashMap;

use log::info;
use rayon::prelude::*;

use crate::domain::types::x_key;
use crate::domain::{NamedSeries, SelectedFunction, SelectionResult, SeriesTable, TestPoint};
use crate::error::AppError;

/// Acceptance bound multiplier on the recorded max deviation.
///
/// Doubles the single-function worst case under independent, comparably
/// scaled training and measurement errors. Fixed policy, not a tunable.
pub const THRESHOLD_FACTOR: f64 = std::f64::consts::SQRT_2;

/// Counts for reporting after a classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifySummary {
    pub assigned: usize,
    pub unassigned: usize,
    /// Assignment counts per selected function, in selection order.
    pub per_function: Vec<(String, usize)>,
}

/// Classify every test point in place.
///
/// A point whose x is absent from the candidate x-domain is a hard failure
/// (`XNotFound`), not a skip. A point no selected function accepts stays
/// unassigned, which is a valid terminal state.
pub fn classify_test_points(
    points: &mut [TestPoint],
    candidates: &SeriesTable,
    selection: &SelectionResult,
) -> Result<ClassifySummary, AppError> {
    // Resolve selection entries to their candidate columns up front so the
    // per-point loop is pure indexing.
    let resolved: Vec<(&SelectedFunction, &NamedSeries)> = selection
        .entries()
        .iter()
        .map(|entry| {
            candidates
                .column(&entry.ideal)
                .map(|col| (entry, col))
                .ok_or_else(|| AppError::Schema {
                    table: candidates.kind_name().to_string(),
                    message: format!("selected function '{}' is not in the catalog", entry.ideal),
                })
        })
        .collect::<Result<_, _>>()?;

    let x_index: HashMap<u64, usize> = candidates
        .x()
        .iter()
        .enumerate()
        .map(|(row, &x)| (x_key(x), row))
        .collect();

    points
        .par_iter_mut()
        .try_for_each(|p| classify_point(p, &x_index, &resolved, candidates.kind_name()))?;

    let summary = summarize(points, selection);
    info!(
        "classified {} test points: {} assigned, {} unassigned",
        points.len(),
        summary.assigned,
        summary.unassigned
    );
    Ok(summary)
}

fn classify_point(
    point: &mut TestPoint,
    x_index: &HashMap<u64, usize>,
    resolved: &[(&SelectedFunction, &NamedSeries)],
    candidate_table: &str,
) -> Result<(), AppError> {
    let row = *x_index
        .get(&x_key(point.x))
        .ok_or_else(|| AppError::XNotFound {
            x: point.x,
            table: candidate_table.to_string(),
        })?;

    // Reclassification must not inherit a previous run's assignment.
    point.ideal_function = None;
    point.delta_y = None;

    let mut best_deviation = f64::INFINITY;
    for (entry, col) in resolved {
        let ideal_y = col.y[row];
        let deviation = (point.y - ideal_y).abs();
        let threshold = entry.max_deviation * THRESHOLD_FACTOR;

        // Inclusive on the threshold, strict on the running minimum: the
        // assignment ends up on the smallest-deviation eligible function,
        // ties going to the earlier selection entry.
        if deviation <= threshold && deviation < best_deviation {
            best_deviation = deviation;
            point.ideal_function = Some(entry.ideal.clone());
            point.delta_y = Some(round8(deviation));
        }
    }

    Ok(())
}

fn summarize(points: &[TestPoint], selection: &SelectionResult) -> ClassifySummary {
    let mut per_function: Vec<(String, usize)> = selection
        .entries()
        .iter()
        .map(|e| (e.ideal.clone(), 0))
        .collect();
    let mut assigned = 0;

    for p in points {
        let Some(name) = &p.ideal_function else {
            continue;
        };
        assigned += 1;
        if let Some(slot) = per_function.iter_mut().find(|(n, _)| n == name) {
            slot.1 += 1;
        }
    }

    ClassifySummary {
        assigned,
        unassigned: points.len() - assigned,
        per_function,
    }
}

/// Round half-away-from-zero to 8 decimal digits.
fn round8(v: f64) -> f64 {
    (v * 1e8).round() / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TableKind;

    fn col(name: &str, y: &[f64]) -> NamedSeries {
        NamedSeries {
            name: name.to_string(),
            y: y.to_vec(),
        }
    }

    fn candidates() -> SeriesTable {
        SeriesTable::new(
            TableKind::IdealFunctions,
            vec![-0.1, 0.0, 0.1, 0.2],
            vec![
                col("y11", &[2.0, 3.0, 4.0, 5.0]),
                col("y12", &[-11.0, -21.0, -21.0, -41.0]),
            ],
        )
        .unwrap()
    }

    fn selection() -> SelectionResult {
        SelectionResult::from_entries(vec![
            SelectedFunction {
                train: "y1".to_string(),
                ideal: "y11".to_string(),
                max_deviation: 1.0,
            },
            SelectedFunction {
                train: "y2".to_string(),
                ideal: "y12".to_string(),
                max_deviation: 9.0,
            },
        ])
    }

    #[test]
    fn assigns_points_within_threshold() {
        // (x=-0.1, y=1) vs y11 where ideal_y=2: deviation 1 <= 1*sqrt(2).
        let mut points = vec![
            TestPoint::new(-0.1, 1.0),
            TestPoint::new(0.0, -19.0),
            TestPoint::new(0.0, 2.0),
            TestPoint::new(0.2, -39.0),
        ];

        let summary = classify_test_points(&mut points, &candidates(), &selection()).unwrap();

        assert_eq!(summary.assigned, 4);
        assert_eq!(summary.unassigned, 0);
        assert_eq!(points[0].ideal_function.as_deref(), Some("y11"));
        assert_eq!(points[0].delta_y, Some(1.0));
        assert_eq!(points[1].ideal_function.as_deref(), Some("y12"));
        assert_eq!(points[1].delta_y, Some(2.0));
        assert_eq!(points[2].ideal_function.as_deref(), Some("y11"));
        assert_eq!(points[2].delta_y, Some(1.0));
        assert_eq!(points[3].ideal_function.as_deref(), Some("y12"));
        assert_eq!(points[3].delta_y, Some(2.0));
    }

    #[test]
    fn far_points_stay_unassigned() {
        let mut points = vec![TestPoint::new(0.0, 1000.0)];
        let summary = classify_test_points(&mut points, &candidates(), &selection()).unwrap();

        assert_eq!(summary.assigned, 0);
        assert_eq!(summary.unassigned, 1);
        assert!(!points[0].is_assigned());
        assert_eq!(points[0].delta_y, None);
    }

    #[test]
    fn deviation_exactly_at_threshold_is_accepted() {
        let cands = SeriesTable::new(
            TableKind::IdealFunctions,
            vec![0.0],
            vec![col("y1", &[0.0])],
        )
        .unwrap();
        let sel = SelectionResult::from_entries(vec![SelectedFunction {
            train: "y1".to_string(),
            ideal: "y1".to_string(),
            max_deviation: 1.0,
        }]);

        // ideal_y = 0, so the observed deviation is exactly the threshold.
        let mut points = vec![TestPoint::new(0.0, THRESHOLD_FACTOR)];
        classify_test_points(&mut points, &cands, &sel).unwrap();

        assert_eq!(points[0].ideal_function.as_deref(), Some("y1"));
    }

    #[test]
    fn smallest_deviation_wins_not_first_match() {
        // Both functions accept the point; the second fits better. A naive
        // first-match-wins classifier would stop at y1.
        let cands = SeriesTable::new(
            TableKind::IdealFunctions,
            vec![0.0],
            vec![col("y1", &[5.0]), col("y2", &[7.5])],
        )
        .unwrap();
        let sel = SelectionResult::from_entries(vec![
            SelectedFunction {
                train: "y1".to_string(),
                ideal: "y1".to_string(),
                max_deviation: 10.0,
            },
            SelectedFunction {
                train: "y2".to_string(),
                ideal: "y2".to_string(),
                max_deviation: 10.0,
            },
        ]);

        let mut points = vec![TestPoint::new(0.0, 8.0)];
        classify_test_points(&mut points, &cands, &sel).unwrap();

        assert_eq!(points[0].ideal_function.as_deref(), Some("y2"));
        assert_eq!(points[0].delta_y, Some(0.5));
    }

    #[test]
    fn assigned_deviation_never_exceeds_threshold() {
        let cands = candidates();
        let sel = selection();
        let mut points: Vec<TestPoint> = (0..40)
            .map(|i| TestPoint::new(0.1, -30.0 + i as f64 * 2.0))
            .collect();

        classify_test_points(&mut points, &cands, &sel).unwrap();

        for p in &points {
            if let Some(name) = &p.ideal_function {
                let entry = sel.entries().iter().find(|e| &e.ideal == name).unwrap();
                let ideal_y = cands.column(name).unwrap().y[2];
                let deviation = (p.y - ideal_y).abs();
                assert!(deviation <= entry.max_deviation * THRESHOLD_FACTOR);
            }
        }
    }

    #[test]
    fn x_off_the_candidate_grid_is_a_hard_failure() {
        let mut points = vec![TestPoint::new(0.05, 1.0)];
        let err = classify_test_points(&mut points, &candidates(), &selection()).unwrap_err();
        match err {
            AppError::XNotFound { x, .. } => assert_eq!(x, 0.05),
            other => panic!("expected XNotFound, got {other:?}"),
        }
    }

    #[test]
    fn reclassification_reproduces_assignments() {
        let cands = candidates();
        let sel = selection();
        let mut points = vec![
            TestPoint::new(-0.1, 1.0),
            TestPoint::new(0.1, 999.0),
            TestPoint::new(0.2, -40.5),
        ];

        classify_test_points(&mut points, &cands, &sel).unwrap();
        let first_pass = points.clone();

        classify_test_points(&mut points, &cands, &sel).unwrap();
        assert_eq!(points, first_pass);
    }

    #[test]
    fn stale_assignments_are_cleared() {
        let mut point = TestPoint::new(0.0, 1000.0);
        point.ideal_function = Some("y11".to_string());
        point.delta_y = Some(0.5);

        let mut points = vec![point];
        classify_test_points(&mut points, &candidates(), &selection()).unwrap();

        assert!(!points[0].is_assigned());
        assert_eq!(points[0].delta_y, None);
    }

    #[test]
    fn residual_is_rounded_to_eight_decimals() {
        let cands = SeriesTable::new(
            TableKind::IdealFunctions,
            vec![0.0],
            vec![col("y1", &[0.0])],
        )
        .unwrap();
        let sel = SelectionResult::from_entries(vec![SelectedFunction {
            train: "y1".to_string(),
            ideal: "y1".to_string(),
            max_deviation: 1.0,
        }]);

        let mut points = vec![TestPoint::new(0.0, 0.123456789)];
        classify_test_points(&mut points, &cands, &sel).unwrap();

        assert_eq!(points[0].delta_y, Some(0.12345679));
    }
}
