//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`SeriesKind`, `Strategy`, `PlotMode`)
//! - loaded data (`Samples`, `DatasetStats`)
//! - fit outputs (`ParamSet`, `FitQuality`, `StageReport`)

pub mod types;

pub use types::*;
