//! Data shaping: raw records in, plotting-ready series and domains out.
//!
//! - label normalization + row filter (`filter`)
//! - grouping, ranking, aggregation and ratio/domain computation (`chart`)

pub mod chart;
pub mod filter;

pub use chart::ChartDataModel;
pub use filter::{filter_records, normalize_species};
