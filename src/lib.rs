//! `species-ages` library crate.
//!
//! The binary (`ages`) is a thin wrapper around this library so that:
//!
//! - the chart model is testable without spawning processes or a terminal
//! - an external renderer can depend on the model and exports directly
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod model;
pub mod plot;
pub mod report;
pub mod tui;

pub use domain::{AxisDomains, ChartConfig, Record, ViewMode};
pub use model::ChartDataModel;
