//! Shared pipeline logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> persist -> selection -> classification -> persist results
//!
//! The CLI front-end can then focus on presentation (printing, charts,
//! exports).

use log::info;

use crate::domain::{RunConfig, SelectionResult, SeriesTable, TableKind, TestPoint};
use crate::error::AppError;
use crate::fit::{ClassifySummary, classify_test_points, select_functions};
use crate::io::{load_candidate_csv, load_test_csv, load_training_csv};
use crate::store::Store;

/// All computed outputs of a single `ifit run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub training: SeriesTable,
    pub candidates: SeriesTable,
    pub selection: SelectionResult,
    pub test_points: Vec<TestPoint>,
    pub summary: ClassifySummary,
}

/// Execute the full pipeline and return the computed outputs.
///
/// The matching stages deliberately consume the tables from storage rather
/// than from the freshly parsed CSVs, so a run exercises the same contract a
/// later storage-only rerun would.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Ingest the three source files.
    info!("loading source CSVs");
    let training = load_training_csv(&config.train_csv)?;
    let candidates = load_candidate_csv(&config.ideal_csv)?;
    let test_points = load_test_csv(&config.test_csv)?;

    // 2) Reset the database and persist the raw tables.
    info!("resetting database {}", config.db_path.display());
    let mut store = Store::open(&config.db_path)?;
    store.reset()?;
    store.replace_series_table(&training)?;
    store.replace_series_table(&candidates)?;
    store.replace_test_points(&test_points)?;

    // 3) Select the best-fit ideal function per training series.
    let training = store.load_series_table(TableKind::TrainData)?;
    let candidates = store.load_series_table(TableKind::IdealFunctions)?;
    let selection = select_functions(&training, &candidates)?;

    // 4) Classify the test observations and write them back.
    let mut test_points = store.load_test_points()?;
    let summary = classify_test_points(&mut test_points, &candidates, &selection)?;
    store.replace_test_points(&test_points)?;
    info!("classified test data written back to '{}'", TableKind::TestData);

    Ok(RunOutput {
        training,
        candidates,
        selection,
        test_points,
        summary,
    })
}

/// Selection only, straight from the CSVs (no database involved).
pub fn run_select(
    train_csv: &std::path::Path,
    ideal_csv: &std::path::Path,
) -> Result<(SeriesTable, SeriesTable, SelectionResult), AppError> {
    let training = load_training_csv(train_csv)?;
    let candidates = load_candidate_csv(ideal_csv)?;
    let selection = select_functions(&training, &candidates)?;
    Ok((training, candidates, selection))
}
