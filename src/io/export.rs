//! Export the chart model for external renderers.
//!
//! - JSON: the whole chart (mode, domains, totals, series, baseline, and
//!   pixel polylines) in one portable file
//! - CSV: flat `species,age,size,ratio` rows, easy to consume in spreadsheets

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AggregateAgePoint, AxisDomains, SpeciesSeries, Totals, ViewMode};
use crate::error::AppError;
use crate::model::ChartDataModel;
use crate::plot::ChartGeometry;

/// Species label used for the baseline rows in the CSV export.
pub const BASELINE_LABEL: &str = "__baseline__";

/// Schema of the JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFile {
    pub tool: String,
    pub mode: Option<ViewMode>,
    pub domains: Option<AxisDomains>,
    pub totals: Totals,
    pub species: Vec<SpeciesSeries>,
    pub baseline: Vec<AggregateAgePoint>,
    pub geometry: Option<ChartGeometry>,
}

impl ChartFile {
    pub fn from_model(model: &ChartDataModel, geometry: Option<ChartGeometry>) -> Self {
        Self {
            tool: "ages".to_string(),
            mode: model.mode(),
            domains: model.domains(),
            totals: model.totals().clone(),
            species: model.species().to_vec(),
            baseline: model.baseline().to_vec(),
            geometry,
        }
    }
}

#[derive(Debug, Serialize)]
struct RatioRow<'a> {
    species: &'a str,
    age: i64,
    size: f64,
    ratio: f64,
}

/// Write the chart JSON file.
pub fn write_chart_json(
    path: &Path,
    model: &ChartDataModel,
    geometry: Option<ChartGeometry>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create chart JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ChartFile::from_model(model, geometry))
        .map_err(|e| AppError::input(format!("Failed to write chart JSON: {e}")))?;

    info!(path = %path.display(), "wrote chart JSON");
    Ok(())
}

/// Read a chart JSON file.
pub fn read_chart_json(path: &Path) -> Result<ChartFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open chart JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid chart JSON: {e}")))
}

/// Write per-age ratios (species rows, then baseline rows) to a CSV file.
pub fn write_ratios_csv(path: &Path, model: &ChartDataModel) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let species_rows = model.species().iter().flat_map(|s| {
        s.ages.iter().map(move |p| RatioRow {
            species: &s.species,
            age: p.age,
            size: p.size,
            ratio: p.ratio,
        })
    });
    let baseline_rows = model.baseline().iter().map(|p| RatioRow {
        species: BASELINE_LABEL,
        age: p.age,
        size: p.size,
        ratio: p.ratio,
    });

    for row in species_rows.chain(baseline_rows) {
        writer
            .serialize(row)
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), "wrote ratios CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartConfig, Record};
    use crate::plot::ChartFrame;

    fn model() -> ChartDataModel {
        let rows = vec![
            Record::new(2009, "Bear", 5, 10.0),
            Record::new(2009, "Bear", 6, 20.0),
            Record::new(2009, "Wolf", 5, 5.0),
        ];
        let mut model = ChartDataModel::ingest(&rows, &ChartConfig::default());
        model.set_mode(ViewMode::Absolute);
        model
    }

    #[test]
    fn chart_json_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        let model = model();
        let geometry = ChartGeometry::project(&model, ChartFrame::default());

        write_chart_json(&path, &model, geometry).unwrap();
        let file = read_chart_json(&path).unwrap();

        assert_eq!(file.mode, Some(ViewMode::Absolute));
        assert_eq!(file.species.len(), 2);
        assert_eq!(file.totals.total_size, 35.0);
        assert_eq!(file.totals.age_totals.get(&6), Some(&20.0));
        let geometry = file.geometry.unwrap();
        assert_eq!(geometry.species[0].points.len(), 2);
        assert_eq!(geometry.baseline.points.len(), 2);
    }

    #[test]
    fn ratios_csv_lists_species_then_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratios.csv");
        write_ratios_csv(&path, &model()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "species,age,size,ratio");
        assert_eq!(lines[1], "Bear,5,10.0,0.3333333333333333");
        assert_eq!(lines[3], "Wolf,5,5.0,1.0");
        assert!(lines[4].starts_with("__baseline__,5,15.0,"));
        assert_eq!(lines.len(), 6);
    }
}
