//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives here so the model stays free of presentation concerns and
//! output changes stay localized.

pub mod format;

pub use format::*;
