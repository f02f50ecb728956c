//! Dataset generation.

pub mod sample;

pub use sample::*;
