//! Fourier series model implementations.
//!
//! The model is a small value type with pure evaluation functions so that
//! fitting/search code can stay generic over the series kind.

pub mod model;

pub use model::*;
