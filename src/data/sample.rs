//! Synthetic dataset generation.
//!
//! Writes a consistent `train.csv` / `ideal.csv` / `test.csv` triple so the
//! pipeline can be exercised end to end without external data:
//!
//! - the candidate catalog is a fixed family of fifty analytic functions
//!   evaluated on a shared x-grid
//! - the four training series are four catalog members plus Gaussian noise
//! - test observations sample the chosen members on the same grid, with a
//!   configurable fraction of large outliers that should end up unassigned
//!
//! Generation is fully seeded; the same config writes identical files.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{MAX_CANDIDATES, TRAIN_SERIES_COUNT};
use crate::error::AppError;

/// Multiplier on the noise sigma used for outlier jumps.
const OUTLIER_K: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub out_dir: PathBuf,
    pub seed: u64,
    /// Number of grid rows shared by the training and candidate tables.
    pub rows: usize,
    /// Number of test observations.
    pub test_count: usize,
    /// Standard deviation of the Gaussian noise on training and test y.
    pub noise_sigma: f64,
    /// Fraction of test observations turned into far outliers.
    pub outlier_fraction: f64,
}

/// Paths of the files a generation run produced.
#[derive(Debug, Clone)]
pub struct SamplePaths {
    pub train: PathBuf,
    pub ideal: PathBuf,
    pub test: PathBuf,
}

/// Generate and write the three CSVs.
pub fn generate_sample(config: &SampleConfig) -> Result<SamplePaths, AppError> {
    if config.rows < 2 {
        return Err(AppError::Schema {
            table: "sample".to_string(),
            message: format!("need at least 2 grid rows, got {}", config.rows),
        });
    }
    if config.test_count == 0 {
        return Err(AppError::Schema {
            table: "sample".to_string(),
            message: "test_count must be > 0".to_string(),
        });
    }
    if !(config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(AppError::Schema {
            table: "sample".to_string(),
            message: "noise_sigma must be finite and non-negative".to_string(),
        });
    }
    if !(0.0..1.0).contains(&config.outlier_fraction) {
        return Err(AppError::Schema {
            table: "sample".to_string(),
            message: "outlier_fraction must be in [0, 1)".to_string(),
        });
    }

    create_dir_all(&config.out_dir)
        .map_err(|e| AppError::io("failed to create output dir", &config.out_dir, e))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_sigma).map_err(|e| AppError::Schema {
        table: "sample".to_string(),
        message: format!("noise distribution error: {e}"),
    })?;

    // Shared grid over [-20, 20]. Values are written with Rust's round-trip
    // float formatting, so the test x-values reparse to exactly the grid.
    let grid: Vec<f64> = (0..config.rows)
        .map(|i| -20.0 + 40.0 * i as f64 / (config.rows - 1) as f64)
        .collect();

    // Pick four distinct catalog members for the training series.
    let mut indices: Vec<usize> = (0..MAX_CANDIDATES).collect();
    indices.shuffle(&mut rng);
    let chosen: Vec<usize> = indices[..TRAIN_SERIES_COUNT].to_vec();

    let paths = SamplePaths {
        train: config.out_dir.join("train.csv"),
        ideal: config.out_dir.join("ideal.csv"),
        test: config.out_dir.join("test.csv"),
    };

    write_ideal_csv(&paths.ideal, &grid)?;
    write_train_csv(&paths.train, &grid, &chosen, &mut rng, &noise)?;
    write_test_csv(&paths.test, &grid, &chosen, &mut rng, &noise, config)?;

    Ok(paths)
}

/// Value of catalog function `idx` (0-based) at `x`.
///
/// Ten shapes cycled through five amplitude tiers; every function is finite
/// over the [-20, 20] grid.
pub fn ideal_value(idx: usize, x: f64) -> f64 {
    let a = (idx / 10 + 1) as f64;
    match idx % 10 {
        0 => a * x,
        1 => a * x + 5.0,
        2 => 0.1 * a * x * x,
        3 => 0.01 * a * x * x * x,
        4 => 5.0 * a * x.sin(),
        5 => 5.0 * a * (0.5 * x).cos(),
        6 => a * x.abs().sqrt(),
        7 => 10.0 * a * (0.2 * x).tanh(),
        8 => a * (0.15 * x).exp(),
        9 => a * (x.sin() + 0.5 * x),
        _ => unreachable!(),
    }
}

fn write_ideal_csv(path: &Path, grid: &[f64]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| AppError::io("failed to create CSV", path, e))?;

    let header: Vec<String> = (1..=MAX_CANDIDATES).map(|i| format!("y{i}")).collect();
    writeln!(file, "x,{}", header.join(","))
        .map_err(|e| AppError::io("failed to write CSV", path, e))?;

    for &x in grid {
        let row: Vec<String> = (0..MAX_CANDIDATES)
            .map(|idx| ideal_value(idx, x).to_string())
            .collect();
        writeln!(file, "{x},{}", row.join(","))
            .map_err(|e| AppError::io("failed to write CSV", path, e))?;
    }

    Ok(())
}

fn write_train_csv(
    path: &Path,
    grid: &[f64],
    chosen: &[usize],
    rng: &mut StdRng,
    noise: &Normal<f64>,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| AppError::io("failed to create CSV", path, e))?;

    let header: Vec<String> = (1..=TRAIN_SERIES_COUNT).map(|i| format!("y{i}")).collect();
    writeln!(file, "x,{}", header.join(","))
        .map_err(|e| AppError::io("failed to write CSV", path, e))?;

    for &x in grid {
        let row: Vec<String> = chosen
            .iter()
            .map(|&idx| (ideal_value(idx, x) + noise.sample(rng)).to_string())
            .collect();
        writeln!(file, "{x},{}", row.join(","))
            .map_err(|e| AppError::io("failed to write CSV", path, e))?;
    }

    Ok(())
}

fn write_test_csv(
    path: &Path,
    grid: &[f64],
    chosen: &[usize],
    rng: &mut StdRng,
    noise: &Normal<f64>,
    config: &SampleConfig,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| AppError::io("failed to create CSV", path, e))?;

    writeln!(file, "x,y").map_err(|e| AppError::io("failed to write CSV", path, e))?;

    for _ in 0..config.test_count {
        let x = grid[rng.gen_range(0..grid.len())];
        let idx = chosen[rng.gen_range(0..chosen.len())];

        let mut y = ideal_value(idx, x) + noise.sample(rng);
        if rng.gen_bool(config.outlier_fraction) {
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            y += sign * OUTLIER_K * config.noise_sigma.max(0.5);
        }

        writeln!(file, "{x},{y}").map_err(|e| AppError::io("failed to write CSV", path, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{load_candidate_csv, load_test_csv, load_training_csv};

    fn config(dir: &Path, seed: u64) -> SampleConfig {
        SampleConfig {
            out_dir: dir.to_path_buf(),
            seed,
            rows: 50,
            test_count: 30,
            noise_sigma: 0.25,
            outlier_fraction: 0.1,
        }
    }

    #[test]
    fn generated_files_load_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let paths = generate_sample(&config(dir.path(), 42)).unwrap();

        let training = load_training_csv(&paths.train).unwrap();
        let candidates = load_candidate_csv(&paths.ideal).unwrap();
        let test_points = load_test_csv(&paths.test).unwrap();

        assert_eq!(training.len(), 50);
        assert_eq!(training.columns().len(), TRAIN_SERIES_COUNT);
        assert_eq!(candidates.columns().len(), MAX_CANDIDATES);
        assert_eq!(test_points.len(), 30);
        assert_eq!(training.x(), candidates.x());
    }

    #[test]
    fn test_x_values_lie_on_the_candidate_grid() {
        let dir = tempfile::tempdir().unwrap();
        let paths = generate_sample(&config(dir.path(), 7)).unwrap();

        let candidates = load_candidate_csv(&paths.ideal).unwrap();
        let test_points = load_test_csv(&paths.test).unwrap();

        for p in &test_points {
            assert!(candidates.position_of_x(p.x).is_some(), "x={} off grid", p.x);
        }
    }

    #[test]
    fn same_seed_writes_identical_files() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();

        let a = generate_sample(&config(dir_a.path(), 9)).unwrap();
        let b = generate_sample(&config(dir_b.path(), 9)).unwrap();

        for (pa, pb) in [(&a.train, &b.train), (&a.ideal, &b.ideal), (&a.test, &b.test)] {
            assert_eq!(
                std::fs::read_to_string(pa).unwrap(),
                std::fs::read_to_string(pb).unwrap()
            );
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = config(dir.path(), 1);
        bad.rows = 1;
        assert!(generate_sample(&bad).is_err());

        let mut bad = config(dir.path(), 1);
        bad.outlier_fraction = 1.0;
        assert!(generate_sample(&bad).is_err());
    }
}
