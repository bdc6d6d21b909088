//! Fourier series fitting.
//!
//! Responsibilities:
//!
//! - least-squares objective + analytic gradient (argmin problem)
//! - optimizer stages: BFGS, basin hopping, Nelder–Mead, frequency grid
//! - chaining stages and scoring the final point

pub mod basin;
pub mod fitter;
pub mod freq_grid;
pub mod local;
pub mod objective;
pub mod quality;

pub use fitter::*;
pub use objective::LeastSquares;
pub use quality::*;
