//! Plotters-powered species-by-age chart widget for Ratatui.
//!
//! Plotters gives us axes and line series without hand-rolling a canvas; the
//! output lands in the Ratatui buffer through `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Line colors, cycled by species rank.
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 0, 255),
    RGBColor(255, 255, 0),
    RGBColor(0, 255, 0),
    RGBColor(255, 128, 0),
    RGBColor(128, 128, 255),
    RGBColor(255, 0, 0),
    RGBColor(0, 160, 255),
];

const FADED: RGBColor = RGBColor(70, 70, 70);

/// Palette color for the species at `idx`.
pub fn species_color(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct AgesPlottersChart<'a> {
    /// One `(age, ratio)` polyline per species, in rank order.
    pub species: &'a [Vec<(f64, f64)>],
    /// Population-wide `(age, ratio)` polyline.
    pub baseline: &'a [(f64, f64)],
    /// Species drawn in full color while the rest are faded.
    pub highlighted: Option<usize>,
    /// X bounds (age).
    pub x_bounds: [f64; 2],
    /// Y bounds (ratio).
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for AgesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a tiny chart; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Tick labels are drawn by the TUI around the chart rect; the mesh
            // only contributes the axis lines here.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(&WHITE)
                .draw()?;

            // 1) Baseline.
            chart.draw_series(LineSeries::new(self.baseline.iter().copied(), &WHITE))?;

            // 2) Species, highlighted one last so it sits on top.
            let order = (0..self.species.len())
                .filter(|&i| Some(i) != self.highlighted)
                .chain(self.highlighted.filter(|&h| h < self.species.len()));

            for idx in order {
                let color = match self.highlighted {
                    Some(h) if h != idx => FADED,
                    _ => species_color(idx),
                };
                let points = &self.species[idx];
                chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
                // Single-age species would otherwise be invisible.
                chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
