//! Input/output helpers.
//!
//! - CSV ingest + row validation (`ingest`)
//! - chart JSON / ratio CSV exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
