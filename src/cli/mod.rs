//! Command-line parsing for the species-by-age chart tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data-shaping code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartConfig, ViewMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ages", version, about = "Species size-by-age chart (absolute vs relative share)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print dataset stats, the species table and the per-age baseline.
    Summary(ViewArgs),
    /// Render an ASCII chart in the terminal.
    Plot(PlotArgs),
    /// Write the chart as JSON (with pixel geometry) and/or a flat ratios CSV.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    ///
    /// Space toggles between absolute and relative mode; arrow keys highlight
    /// a species.
    Tui(DataArgs),
}

/// Input file and filter options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// CSV file with `Year,Species,Age,SampleSize` columns.
    #[arg(long, env = "AGES_DATA", default_value = "data/data.csv")]
    pub data: PathBuf,

    /// Observation year to keep.
    #[arg(long, default_value_t = 2009)]
    pub year: i64,

    /// Smallest age to keep (inclusive).
    #[arg(long, default_value_t = 1)]
    pub min_age: i64,

    /// Largest age to keep (inclusive).
    #[arg(long, default_value_t = 40)]
    pub max_age: i64,

    /// Number of species (largest totals first) to chart.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Drop species whose label contains this text (case-insensitive).
    #[arg(long, default_value = "other")]
    pub exclude: String,

    /// Remove this text from raw species labels before grouping.
    #[arg(long, default_value = "Animal")]
    pub strip: String,
}

impl DataArgs {
    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig {
            year: self.year,
            min_age: self.min_age,
            max_age: self.max_age,
            exclude_substring: self.exclude.clone(),
            strip_substring: self.strip.clone(),
            top_n: self.top,
        }
    }
}

/// Data options plus the view mode.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// How ratios are computed.
    #[arg(long, value_enum, default_value_t = ViewMode::Absolute)]
    pub mode: ViewMode,
}

/// Options for the ASCII plot.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for exports.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Chart JSON output (mode, domains, series, pixel polylines).
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Flat `species,age,size,ratio` CSV output.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chart_config() {
        let cli = Cli::parse_from(["ages", "summary", "--data", "x.csv"]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.mode, ViewMode::Absolute);
        assert_eq!(args.data.chart_config(), ChartConfig::default());
    }

    #[test]
    fn parses_mode_and_filters() {
        let cli = Cli::parse_from([
            "ages", "plot", "--data", "x.csv", "--mode", "relative", "--top", "5", "--year", "2010", "--width", "40",
        ]);
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(args.view.mode, ViewMode::Relative);
        assert_eq!(args.view.data.top, 5);
        assert_eq!(args.view.data.year, 2010);
        assert_eq!(args.width, 40);
    }
}
