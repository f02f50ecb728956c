//! Curve matching.
//!
//! Responsibilities:
//!
//! - pick the best-fit ideal function per training series (`selection`)
//! - map test observations onto the selected functions (`classify`)

pub mod classify;
pub mod selection;

pub use classify::*;
pub use selection::*;
