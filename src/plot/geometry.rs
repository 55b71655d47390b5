//! Pixel-space projection of the chart model.
//!
//! A renderer that draws into a fixed canvas (SVG, PNG, canvas element) needs
//! the same two linear scales the chart uses on screen. `ChartGeometry` bakes
//! them so the JSON export carries ready-to-draw polylines.

use serde::{Deserialize, Serialize};

use crate::domain::AxisDomains;
use crate::model::ChartDataModel;

/// Outer canvas size and margins, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub outer_width: f64,
    pub outer_height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
}

impl ChartFrame {
    /// Width of the plot area (outer width minus horizontal margins).
    pub fn width(&self) -> f64 {
        (self.outer_width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Height of the plot area (outer height minus vertical margins).
    pub fn height(&self) -> f64 {
        (self.outer_height - self.margin_top - self.margin_bottom).max(0.0)
    }
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self {
            outer_width: 960.0,
            outer_height: 500.0,
            margin_top: 20.0,
            margin_right: 80.0,
            margin_bottom: 35.0,
            margin_left: 50.0,
        }
    }
}

/// Linear map from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    #[inline]
    pub fn map(&self, v: f64) -> f64 {
        let span = self.domain[1] - self.domain[0];
        if span.abs() < 1e-12 {
            return (self.range[0] + self.range[1]) * 0.5;
        }
        let u = (v - self.domain[0]) / span;
        self.range[0] + u * (self.range[1] - self.range[0])
    }
}

/// One projected polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub label: String,
    /// `(x_px, y_px)` relative to the plot-area origin (top-left).
    pub points: Vec<(f64, f64)>,
}

/// All polylines of the chart for the model's current mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub frame: ChartFrame,
    pub domains: AxisDomains,
    pub species: Vec<Polyline>,
    pub baseline: Polyline,
}

impl ChartGeometry {
    /// Project the model; `None` until `set_mode` has produced domains.
    pub fn project(model: &ChartDataModel, frame: ChartFrame) -> Option<Self> {
        let domains = model.domains()?;
        let x = LinearScale::new(domains.x, [0.0, frame.width()]);
        // y grows downward on screen.
        let y = LinearScale::new(domains.y, [frame.height(), 0.0]);

        let species = model
            .species()
            .iter()
            .map(|s| Polyline {
                label: s.species.clone(),
                points: s
                    .ages
                    .iter()
                    .map(|p| (x.map(p.age as f64), y.map(p.ratio)))
                    .collect(),
            })
            .collect();

        let baseline = Polyline {
            label: "total".to_string(),
            points: model
                .baseline()
                .iter()
                .map(|p| (x.map(p.age as f64), y.map(p.ratio)))
                .collect(),
        };

        Some(Self {
            frame,
            domains,
            species,
            baseline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartConfig, Record, ViewMode};

    #[test]
    fn default_frame_matches_plot_area() {
        let frame = ChartFrame::default();
        assert_eq!(frame.width(), 830.0);
        assert_eq!(frame.height(), 445.0);
    }

    #[test]
    fn scale_maps_endpoints_and_degenerate_domain() {
        let s = LinearScale::new([5.0, 6.0], [0.0, 100.0]);
        assert_eq!(s.map(5.0), 0.0);
        assert_eq!(s.map(6.0), 100.0);
        assert_eq!(s.map(5.5), 50.0);

        let flat = LinearScale::new([3.0, 3.0], [0.0, 100.0]);
        assert_eq!(flat.map(3.0), 50.0);
    }

    #[test]
    fn projects_relative_baseline_onto_center_line() {
        let rows = vec![
            Record::new(2009, "Bear", 5, 10.0),
            Record::new(2009, "Bear", 6, 20.0),
            Record::new(2009, "Wolf", 5, 5.0),
        ];
        let mut model = ChartDataModel::ingest(&rows, &ChartConfig::default());
        assert!(ChartGeometry::project(&model, ChartFrame::default()).is_none());

        model.set_mode(ViewMode::Relative);
        let geo = ChartGeometry::project(&model, ChartFrame::default()).unwrap();
        assert_eq!(geo.species.len(), 2);
        assert_eq!(geo.species[0].label, "Bear");
        assert_eq!(geo.species[0].points[0].0, 0.0);
        assert_eq!(geo.species[0].points[1].0, 830.0);
        for &(_, y) in &geo.baseline.points {
            assert!((y - 222.5).abs() < 1e-9);
        }
    }
}
