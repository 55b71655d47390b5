//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`Record`) and the view toggle (`ViewMode`)
//! - derived chart structures (`SpeciesSeries`, `AggregateAgePoint`, `Totals`)
//! - filter configuration (`ChartConfig`) and axis domains (`AxisDomains`)

pub mod types;

pub use types::*;
