//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the column-wise series table (`SeriesTable`, `NamedSeries`)
//! - test observations (`TestPoint`)
//! - the selection output (`SelectionResult`, `SelectedFunction`)
//! - typed table identity (`TableKind`) and run configuration (`RunConfig`)

pub mod types;

pub use types::*;
