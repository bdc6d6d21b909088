//! Mathematical utilities: harmonic basis terms and linear least squares.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;
