//! Synthetic datasets for trying out the fitter.

pub mod synth;

pub use synth::*;
