//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while shaping the chart
//! - exported to JSON/CSV for an external renderer
//! - inspected in tests without any terminal or file plumbing

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One observational row, already coerced from the raw CSV strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub year: i64,
    pub species: String,
    pub age: i64,
    /// Sample size at this age. Non-negative by construction in ingest.
    pub size: f64,
}

impl Record {
    pub fn new(year: i64, species: impl Into<String>, age: i64, size: f64) -> Self {
        Self {
            year,
            species: species.into(),
            age,
            size,
        }
    }
}

/// How `ratio` values are derived and how the y-axis is framed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Share of each species' own total at each age.
    #[default]
    Absolute,
    /// Deviation of that share from the population-wide share at the same age.
    Relative,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Absolute => ViewMode::Relative,
            ViewMode::Relative => ViewMode::Absolute,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ViewMode::Absolute => "absolute",
            ViewMode::Relative => "relative",
        }
    }
}

/// A single age bucket within one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgePoint {
    pub age: i64,
    pub size: f64,
    /// Mode-dependent; recomputed in place by `ChartDataModel::set_mode`.
    pub ratio: f64,
}

/// All retained age buckets of one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSeries {
    pub species: String,
    /// Strictly ascending by age.
    pub ages: Vec<AgePoint>,
    pub total_size: f64,
}

impl SpeciesSeries {
    /// Legend label, e.g. `Bear (30)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.species, fmt_size(self.total_size))
    }

    /// Lowercased key used to match a species between legend and chart.
    pub fn key(&self) -> String {
        self.species.to_lowercase()
    }
}

/// Population-wide size at one age (the baseline series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateAgePoint {
    pub age: i64,
    pub size: f64,
    pub ratio: f64,
}

/// Sums over the retained species.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_size: f64,
    pub age_totals: BTreeMap<i64, f64>,
}

/// Axis domains handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDomains {
    /// `[min_age, max_age]`.
    pub x: [f64; 2],
    /// `[y_min, y_max]`; symmetric about zero in relative mode.
    pub y: [f64; 2],
}

/// Filter and ranking knobs for building the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub year: i64,
    pub min_age: i64,
    pub max_age: i64,
    /// Species whose (lowercased) label contains this are dropped.
    pub exclude_substring: String,
    /// Removed once from every raw species label before grouping.
    pub strip_substring: String,
    pub top_n: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            year: 2009,
            min_age: 1,
            max_age: 40,
            exclude_substring: "other".to_string(),
            strip_substring: "Animal".to_string(),
            top_n: 20,
        }
    }
}

/// Format a size without a trailing `.0` when it is integral.
pub fn fmt_size(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Format a ratio as a whole percent (`0.333` -> `33%`).
pub fn fmt_percent(v: f64) -> String {
    let pct = (v * 100.0).round();
    // avoid "-0%"
    let pct = if pct == 0.0 { 0.0 } else { pct };
    format!("{pct:.0}%")
}
