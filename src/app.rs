//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the load/select/classify pipeline
//! - prints reports
//! - writes optional charts and exports

use clap::Parser;
use log::info;

use crate::cli::{Command, RunArgs, SampleArgs, SelectArgs};
use crate::data::SampleConfig;
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ifit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Select(args) => handle_select(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    println!(
        "{}",
        crate::report::format_selection(&run.training, &run.candidates, &run.selection)
    );
    println!("{}", crate::report::format_classification(&run.summary));

    if config.plot {
        let written = crate::plot::render_run_charts(
            &run.training,
            &run.candidates,
            &run.selection,
            &run.test_points,
            &config,
        )?;
        for path in written {
            info!("chart written to {}", path.display());
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.test_points)?;
    }
    if let Some(path) = &config.export_selection {
        crate::io::write_selection_json(path, &run.selection)?;
    }

    Ok(())
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    let (training, candidates, selection) = pipeline::run_select(&args.train, &args.ideal)?;

    println!(
        "{}",
        crate::report::format_selection(&training, &candidates, &selection)
    );

    if let Some(path) = &args.export_selection {
        crate::io::write_selection_json(path, &selection)?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        out_dir: args.out_dir,
        seed: args.seed,
        rows: args.rows,
        test_count: args.test_count,
        noise_sigma: args.noise,
        outlier_fraction: args.outliers,
    };
    let paths = crate::data::generate_sample(&config)?;

    println!("wrote {}", paths.train.display());
    println!("wrote {}", paths.ideal.display());
    println!("wrote {}", paths.test.display());

    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        train_csv: args.train.clone(),
        ideal_csv: args.ideal.clone(),
        test_csv: args.test.clone(),
        db_path: args.db.clone(),
        plot: args.plot,
        plot_dir: args.plot_dir.clone(),
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_selection: args.export_selection.clone(),
    }
}
