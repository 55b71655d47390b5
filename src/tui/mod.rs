//! Ratatui-based terminal UI.
//!
//! Shows the species lines against the population baseline, a legend with
//! `Species (total)` labels, and lets the user flip between absolute and
//! relative mode or single out one species.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::debug;

use crate::domain::{AxisDomains, ViewMode, fmt_percent, fmt_size};
use crate::error::AppError;
use crate::model::ChartDataModel;

mod plotters_chart;

use plotters_chart::{AgesPlottersChart, species_color};

/// Start the TUI on an already-built model.
pub fn run(model: ChartDataModel) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(model);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    model: ChartDataModel,
    mode: ViewMode,
    domains: Option<AxisDomains>,
    highlighted: Option<usize>,
    status: String,
}

impl App {
    fn new(mut model: ChartDataModel) -> Self {
        let mode = model.mode().unwrap_or_default();
        let domains = model.set_mode(mode);
        Self {
            model,
            mode,
            domains,
            highlighted: None,
            status: format!("mode: {}", mode.display_name()),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char(' ') | KeyCode::Char('t') => self.toggle_mode(),
            KeyCode::Char('a') => self.apply_mode(ViewMode::Absolute),
            KeyCode::Char('r') => self.apply_mode(ViewMode::Relative),
            KeyCode::Up => self.move_highlight(-1),
            KeyCode::Down => self.move_highlight(1),
            KeyCode::Esc => {
                self.highlighted = None;
                self.status = "highlight cleared".to_string();
            }
            _ => {}
        }
        false
    }

    fn toggle_mode(&mut self) {
        self.apply_mode(self.mode.toggled());
    }

    fn apply_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        // Keep the previous axes when there is nothing to frame.
        if let Some(domains) = self.model.set_mode(mode) {
            self.domains = Some(domains);
        }
        self.status = format!("mode: {}", mode.display_name());
        debug!(mode = mode.display_name(), "view mode changed");
    }

    fn move_highlight(&mut self, delta: isize) {
        let n = self.model.species().len();
        if n == 0 {
            return;
        }
        let next = match self.highlighted {
            None if delta >= 0 => 0,
            None => n - 1,
            Some(cur) => (cur as isize + delta).rem_euclid(n as isize) as usize,
        };
        self.highlighted = Some(next);
        self.status = self.model.species()[next].label();
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("ages", Style::default().fg(Color::Cyan)),
            Span::raw(" | species size by age"),
        ]));

        let domain_text = self
            .domains
            .map(|d| {
                format!(
                    "age=[{:.0}, {:.0}] | ratio=[{}, {}]",
                    d.x[0],
                    d.x[1],
                    fmt_percent(d.y[0]),
                    fmt_percent(d.y[1])
                )
            })
            .unwrap_or_else(|| "no data".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "mode: {} | species: {} | total: {} | {domain_text}",
                self.mode.display_name(),
                self.model.species().len(),
                fmt_size(self.model.totals().total_size),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_legend(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.mode {
            ViewMode::Absolute => "Share of species total by age",
            ViewMode::Relative => "Deviation from population share",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(domains) = self.domains else {
            let msg = Paragraph::new("No species to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (species, baseline) = chart_series(&self.model);
        let x_bounds = x_bounds(domains);
        let y_bounds = y_bounds(domains);

        let (chart_rect, insets) = chart_layout(inner);
        let widget = AgesPlottersChart {
            species: &species,
            baseline: &baseline,
            highlighted: self.highlighted,
            x_bounds,
            y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_legend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .model
            .species()
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let faded = matches!(self.highlighted, Some(h) if h != idx);
                let color = if faded {
                    Color::DarkGray
                } else {
                    let c = species_color(idx);
                    Color::Rgb(c.0, c.1, c.2)
                };
                ListItem::new(s.label()).style(Style::default().fg(color))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Species").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(self.highlighted);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "space toggle  a/r mode  ↑/↓ highlight  Esc clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// `(age, ratio)` polylines for every species plus the baseline.
fn chart_series(model: &ChartDataModel) -> (Vec<Vec<(f64, f64)>>, Vec<(f64, f64)>) {
    let species = model
        .species()
        .iter()
        .map(|s| s.ages.iter().map(|p| (p.age as f64, p.ratio)).collect())
        .collect();
    let baseline = model.baseline().iter().map(|p| (p.age as f64, p.ratio)).collect();
    (species, baseline)
}

/// A single-age chart still needs a non-empty x range.
fn x_bounds(d: AxisDomains) -> [f64; 2] {
    if d.x[1] > d.x[0] { d.x } else { [d.x[0] - 1.0, d.x[1] + 1.0] }
}

fn y_bounds(d: AxisDomains) -> [f64; 2] {
    let pad = ((d.y[1] - d.y[0]).abs() * 0.05).max(1e-3);
    [d.y[0] - pad, d.y[1] + pad]
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 6,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_percent(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Age")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }
}
