//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - baseline (population-wide share): `-` line
//! - species: one letter per species (`a`, `b`, ...), listed in a legend

use crate::domain::fmt_percent;
use crate::model::ChartDataModel;

const BASELINE: char = '-';

/// Render the model in its current mode.
pub fn render_ascii_chart(model: &ChartDataModel, width: usize, height: usize) -> String {
    let (Some(domains), Some(mode)) = (model.domains(), model.mode()) else {
        return "Plot: no data to plot\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let (a_min, a_max) = (domains.x[0], domains.x[1]);
    let (y_min, y_max) = pad_range(domains.y[0], domains.y[1], 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Baseline first so species lines sit on top of it.
    let baseline: Vec<(f64, f64)> = model
        .baseline()
        .iter()
        .map(|p| (p.age as f64, p.ratio))
        .collect();
    draw_polyline(&mut grid, &baseline, a_min, a_max, y_min, y_max, BASELINE);

    for (idx, series) in model.species().iter().enumerate() {
        let points: Vec<(f64, f64)> = series.ages.iter().map(|p| (p.age as f64, p.ratio)).collect();
        draw_polyline(&mut grid, &points, a_min, a_max, y_min, y_max, series_glyph(idx));
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: mode={} | age=[{a_min:.0}, {a_max:.0}] | ratio=[{}, {}]\n",
        mode.display_name(),
        fmt_percent(domains.y[0]),
        fmt_percent(domains.y[1]),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, series) in model.species().iter().enumerate() {
        out.push_str(&format!("{} {}\n", series_glyph(idx), series.label()));
    }

    out
}

/// Letter used for the species at `idx` (wraps after `z`).
pub fn series_glyph(idx: usize) -> char {
    (b'a' + (idx % 26) as u8) as char
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(a: f64, a_min: f64, a_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let span = a_max - a_min;
    let u = if span.abs() < 1e-12 { 0.5 } else { ((a - a_min) / span).clamp(0.0, 1.0) };
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    a_min: f64,
    a_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(a, y) in points {
        let x = map_x(a, a_min, a_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => put(grid, x as isize, yy as isize, ch),
        }
        prev = Some((x, yy));
    }
}

/// Species may cover the baseline but never another species.
fn put(grid: &mut [Vec<char>], x: isize, y: isize, ch: char) {
    if y < 0 || x < 0 || (y as usize) >= grid.len() || (x as usize) >= grid[0].len() {
        return;
    }
    let cell = &mut grid[y as usize][x as usize];
    if *cell == ' ' || (*cell == BASELINE && ch != BASELINE) {
        *cell = ch;
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(grid, x0, y0, ch);

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
