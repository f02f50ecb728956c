//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the matching code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{SelectionResult, SeriesTable};
use crate::fit::ClassifySummary;

/// Format the selection summary (one line per training series).
pub fn format_selection(
    training: &SeriesTable,
    candidates: &SeriesTable,
    selection: &SelectionResult,
) -> String {
    let mut out = String::new();

    out.push_str("=== ifit - Ideal Function Matching ===\n");
    out.push_str(&format!(
        "Training: {} series over {} rows | Catalog: {} candidates\n",
        training.columns().len(),
        training.len(),
        candidates.columns().len(),
    ));

    out.push_str("\nSelected functions:\n");
    for e in selection.entries() {
        out.push_str(&format!(
            "  {:<4} -> {:<4} (max deviation {:.6})\n",
            e.train, e.ideal, e.max_deviation
        ));
    }

    out
}

/// Format the classification summary (assignment counts per function).
pub fn format_classification(summary: &ClassifySummary) -> String {
    let mut out = String::new();
    let total = summary.assigned + summary.unassigned;

    out.push_str("\nTest classification:\n");
    out.push_str(&format!("  assigned: {} / {total}\n", summary.assigned));
    for (name, count) in &summary.per_function {
        out.push_str(&format!("  {name:<4} <- {count}\n"));
    }
    out.push_str(&format!("  unassigned: {}\n", summary.unassigned));

    out
}
