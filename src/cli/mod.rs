//! Command-line parsing for the ideal-function matcher.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the matching/storage code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ifit",
    version,
    about = "Least-squares ideal-function selection and test-point classification"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: load CSVs, persist, select, classify, report.
    Run(RunArgs),
    /// Select best-fit ideal functions only and print the summary.
    Select(SelectArgs),
    /// Generate a synthetic train/ideal/test CSV triple.
    Sample(SampleArgs),
}

/// Options for the full pipeline.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Training CSV (columns x,y1..y4).
    #[arg(long, default_value = "data/train.csv")]
    pub train: PathBuf,

    /// Candidate catalog CSV (columns x,y1..y50).
    #[arg(long, default_value = "data/ideal.csv")]
    pub ideal: PathBuf,

    /// Test observations CSV (columns x,y).
    #[arg(long, default_value = "data/test.csv")]
    pub test: PathBuf,

    /// SQLite database file backing the three tables.
    #[arg(long, default_value = "ifit.db")]
    pub db: PathBuf,

    /// Render PNG charts of the run.
    #[arg(long)]
    pub plot: bool,

    /// Directory charts are written to.
    #[arg(long, default_value = "output")]
    pub plot_dir: PathBuf,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 960)]
    pub height: u32,

    /// Export classified test points to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the selection (train -> ideal + max deviation) to JSON.
    #[arg(long = "export-selection")]
    pub export_selection: Option<PathBuf>,
}

/// Options for selection-only runs.
#[derive(Debug, Parser)]
pub struct SelectArgs {
    /// Training CSV (columns x,y1..y4).
    #[arg(long, default_value = "data/train.csv")]
    pub train: PathBuf,

    /// Candidate catalog CSV (columns x,y1..y50).
    #[arg(long, default_value = "data/ideal.csv")]
    pub ideal: PathBuf,

    /// Export the selection to JSON.
    #[arg(long = "export-selection")]
    pub export_selection: Option<PathBuf>,
}

/// Options for synthetic dataset generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Directory the CSVs are written to.
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Random seed (the same seed writes identical files).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of grid rows in the training and candidate tables.
    #[arg(long, default_value_t = 400)]
    pub rows: usize,

    /// Number of test observations.
    #[arg(long, default_value_t = 100)]
    pub test_count: usize,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.25)]
    pub noise: f64,

    /// Fraction of test observations turned into far outliers.
    #[arg(long, default_value_t = 0.05)]
    pub outliers: f64,
}
