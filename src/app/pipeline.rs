//! Shared "chart pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV load -> filter/group/rank/aggregate -> ratios + domains for a mode
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use tracing::info;

use crate::domain::{AxisDomains, ChartConfig, ViewMode};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_records};
use crate::model::ChartDataModel;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub model: ChartDataModel,
    /// `None` when no species survived the filter.
    pub domains: Option<AxisDomains>,
}

impl RunOutput {
    /// Domains, or an error for commands that cannot draw an empty chart.
    pub fn require_domains(&self) -> Result<AxisDomains, AppError> {
        self.domains.ok_or_else(|| {
            AppError::no_data(format!(
                "No species remain after filtering ({} rows read, {} usable).",
                self.ingest.rows_read,
                self.ingest.rows_used(),
            ))
        })
    }
}

/// Load the CSV at `path` and build the model in `mode`.
pub fn run(path: &Path, config: &ChartConfig, mode: ViewMode) -> Result<RunOutput, AppError> {
    let ingest = load_records(path)?;
    Ok(run_with_ingest(ingest, config, mode))
}

/// Build the model from already-loaded records.
pub fn run_with_ingest(ingest: IngestedData, config: &ChartConfig, mode: ViewMode) -> RunOutput {
    let mut model = ChartDataModel::ingest(&ingest.records, config);
    let domains = model.set_mode(mode);

    info!(
        species = model.species().len(),
        ages = model.baseline().len(),
        mode = mode.display_name(),
        "chart model ready"
    );

    RunOutput {
        ingest,
        model,
        domains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;

    #[test]
    fn empty_run_requires_domains() {
        let ingest = IngestedData {
            records: vec![Record::new(2008, "Bear", 5, 1.0)],
            row_errors: Vec::new(),
            rows_read: 1,
        };
        let run = run_with_ingest(ingest, &ChartConfig::default(), ViewMode::Absolute);
        assert!(run.model.is_empty());
        let err = run.require_domains().unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
    }

    #[test]
    fn run_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "Year,Species,Age,SampleSize\n2009,BearAnimal,5,10\n2009,BearAnimal,6,20\n2009,WolfAnimal,5,5\n",
        )
        .unwrap();

        let run = run(&path, &ChartConfig::default(), ViewMode::Relative).unwrap();
        let domains = run.require_domains().unwrap();
        assert_eq!(domains.x, [5.0, 6.0]);
        assert_eq!(domains.y[0], -domains.y[1]);
        assert_eq!(run.model.mode(), Some(ViewMode::Relative));
    }
}
