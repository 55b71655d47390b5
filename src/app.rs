//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the chart pipeline
//! - prints summaries/plots, writes exports, or starts the TUI

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DataArgs, ExportArgs, PlotArgs, ViewArgs};
use crate::domain::ViewMode;
use crate::error::AppError;
use crate::plot::{ChartFrame, ChartGeometry};

pub mod pipeline;

/// Entry point for the `ages` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `ages` and `ages --data x.csv` behave like `ages tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_tracing(matches!(cli.command, Command::Tui(_)));

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// Install the global `tracing` subscriber (stderr).
///
/// The TUI owns the terminal, so unless `RUST_LOG` asks for more it only lets
/// warnings through.
fn init_tracing(tui: bool) {
    let default = if tui { "warn" } else { "species_ages=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_summary(args: ViewArgs) -> Result<(), AppError> {
    let config = args.data.chart_config();
    let run = pipeline::run(&args.data.data, &config, args.mode)?;

    println!(
        "{}",
        crate::report::format_summary(&run.ingest, &run.model, &config)
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let config = args.view.data.chart_config();
    let run = pipeline::run(&args.view.data.data, &config, args.view.mode)?;
    run.require_domains()?;

    let plot = crate::plot::render_ascii_chart(&run.model, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    if args.json.is_none() && args.csv.is_none() {
        return Err(AppError::input("Nothing to export: pass `--json` and/or `--csv`."));
    }

    let config = args.view.data.chart_config();
    let run = pipeline::run(&args.view.data.data, &config, args.view.mode)?;
    if run.domains.is_none() {
        warn!("no species remain after filtering; exporting an empty chart");
    }

    if let Some(path) = &args.json {
        let geometry = ChartGeometry::project(&run.model, ChartFrame::default());
        crate::io::export::write_chart_json(path, &run.model, geometry)?;
    }
    if let Some(path) = &args.csv {
        crate::io::export::write_ratios_csv(path, &run.model)?;
    }

    Ok(())
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    let config = args.chart_config();
    let run = pipeline::run(&args.data, &config, ViewMode::Absolute)?;
    run.require_domains()?;

    info!("starting TUI");
    crate::tui::run(run.model)
}

/// Rewrite argv so `ages` defaults to `ages tui`.
///
/// Rules:
/// - `ages`                      -> `ages tui`
/// - `ages --data x.csv ...`     -> `ages tui --data x.csv ...`
/// - `ages --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "plot" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
