//! Renderer-side helpers: terminal ASCII plot and pixel-space geometry.

pub mod ascii;
pub mod geometry;

pub use ascii::{render_ascii_chart, series_glyph};
pub use geometry::{ChartFrame, ChartGeometry, LinearScale, Polyline};
