//! Input/output helpers.
//!
//! - whitespace-delimited data ingest (`ingest`)
//! - fitted parameter JSON read/write (`params`)
//! - residual CSV export (`export`)

pub mod export;
pub mod ingest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use params::*;
