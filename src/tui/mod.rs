//! Ratatui-based plot viewer.
//!
//! Shows the raw data and the fitted curve in the terminal and blocks until
//! the user quits with `q` or `Esc`.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use crate::domain::Residual;
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::FitPlottersChart;

/// Everything the viewer needs to draw one fit.
#[derive(Debug, Clone)]
pub struct PlotView {
    pub title: String,
    /// Extra header lines (model expression, quality, ...).
    pub details: Vec<String>,
    pub data: Vec<(f64, f64)>,
    pub fitted: Vec<(f64, f64)>,
}

impl PlotView {
    /// Build the two series from per-sample residuals, sorted by `x`.
    pub fn from_residuals(title: impl Into<String>, details: Vec<String>, residuals: &[Residual]) -> Self {
        let mut rows: Vec<&Residual> = residuals.iter().collect();
        rows.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            title: title.into(),
            details,
            data: rows.iter().map(|r| (r.x, r.y)).collect(),
            fitted: rows.iter().map(|r| (r.x, r.y_fit)).collect(),
        }
    }

    fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in self.data.iter().chain(&self.fitted) {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
            let c = if x_min.is_finite() { x_min } else { 0.0 };
            x_min = c - 0.5;
            x_max = c + 0.5;
        }
        if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
            let c = if y_min.is_finite() { y_min } else { 0.0 };
            y_min = c - 0.5;
            y_max = c + 0.5;
        }

        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
        ([x_min, x_max], [y_min - pad, y_max + pad])
    }
}

/// Show the viewer; returns when the user quits.
pub fn run_viewer(view: &PlotView) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::fit(format!("Failed to initialize terminal: {e}")))?;

    event_loop(&mut terminal, view)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::fit(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::fit(format!("Failed to enter alternate screen: {e}")));
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

fn event_loop<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, view: &PlotView) -> Result<(), AppError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal
                .draw(|f| draw(f, view))
                .map_err(|e| AppError::fit(format!("Terminal draw error: {e}")))?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::fit(format!("Event poll error: {e}")))? {
            continue;
        }

        match event::read().map_err(|e| AppError::fit(format!("Event read error: {e}")))? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if is_quit_key(key.code) {
                    break;
                }
            }
            Event::Resize(_, _) => needs_redraw = true,
            _ => {}
        }
    }
    tracing::debug!("plot viewer closed");
    Ok(())
}

fn is_quit_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
}

fn draw(frame: &mut ratatui::Frame<'_>, view: &PlotView) {
    let header_height = 2 + 1 + view.details.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(0), Constraint::Length(3)])
        .split(frame.area());

    draw_header(frame, chunks[0], view);
    draw_chart(frame, chunks[1], view);
    draw_footer(frame, chunks[2], view);
}

fn draw_header(frame: &mut ratatui::Frame<'_>, area: Rect, view: &PlotView) {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("ffit", Style::default().fg(Color::Cyan)),
        Span::raw(format!(" | {}", view.title)),
    ]));
    for detail in &view.details {
        lines.push(Line::from(Span::styled(detail.clone(), Style::default().fg(Color::Gray))));
    }

    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, view: &PlotView) {
    let block = Block::default().title("Data vs fit").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if view.data.is_empty() {
        let msg = Paragraph::new("No data to plot.").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    }

    let (x_bounds, y_bounds) = view.bounds();
    let (chart_rect, insets) = chart_layout(inner);
    let widget = FitPlottersChart {
        data: &view.data,
        fitted: &view.fitted,
        x_bounds,
        y_bounds,
        x_label: "x",
        y_label: "y",
        fmt_x: fmt_axis,
        fmt_y: fmt_axis,
    };

    frame.render_widget(widget, chart_rect);
    if let Some(insets) = insets {
        draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
    }
}

fn draw_footer(frame: &mut ratatui::Frame<'_>, area: Rect, view: &PlotView) {
    let line = Line::from(vec![
        Span::styled("q/Esc quit", Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled("data", Style::default().fg(Color::White)),
        Span::raw(" / "),
        Span::styled("fit", Style::default().fg(Color::Cyan)),
        Span::raw(format!(" | n={}", view.data.len())),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn fmt_axis(v: f64) -> String {
    format!("{v:.2}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
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
        let label = format!("{x_val:.2}");
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
        let label = format!("{y_val:.2}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
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

    let x_label = Paragraph::new("x")
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

    let y_label = Paragraph::new("y").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn view() -> PlotView {
        let residuals = vec![
            Residual { x: 2.0, y: 1.0, y_fit: 1.5, residual: -0.5 },
            Residual { x: 0.0, y: 3.0, y_fit: 2.5, residual: 0.5 },
            Residual { x: 1.0, y: 2.0, y_fit: 2.0, residual: 0.0 },
        ];
        PlotView::from_residuals("data.dat", vec!["y = a0".to_string()], &residuals)
    }

    #[test]
    fn series_are_sorted_by_x() {
        let v = view();
        assert_eq!(v.data, vec![(0.0, 3.0), (1.0, 2.0), (2.0, 1.0)]);
        assert_eq!(v.fitted, vec![(0.0, 2.5), (1.0, 2.0), (2.0, 1.5)]);
    }

    #[test]
    fn bounds_cover_both_series_with_padding() {
        let (x, y) = view().bounds();
        assert_eq!(x, [0.0, 2.0]);
        assert!((y[0] - 0.9).abs() < 1e-12);
        assert!((y[1] - 3.1).abs() < 1e-12);
    }

    #[test]
    fn constant_series_still_has_a_y_range() {
        let residuals = vec![
            Residual { x: 0.0, y: 1.0, y_fit: 1.0, residual: 0.0 },
            Residual { x: 1.0, y: 1.0, y_fit: 1.0, residual: 0.0 },
        ];
        let (_, y) = PlotView::from_residuals("t", vec![], &residuals).bounds();
        assert!(y[0] < 1.0 && y[1] > 1.0);
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(KeyCode::Char('q')));
        assert!(is_quit_key(KeyCode::Esc));
        assert!(!is_quit_key(KeyCode::Enter));
    }

    #[test]
    fn small_area_skips_axis_insets() {
        let (rect, insets) = chart_layout(Rect::new(0, 0, 15, 6));
        assert_eq!(rect, Rect::new(0, 0, 15, 6));
        assert!(insets.is_none());

        let (rect, insets) = chart_layout(Rect::new(0, 0, 80, 30));
        assert!(insets.is_some());
        assert_eq!(rect, Rect::new(9, 1, 69, 27));
    }

    #[test]
    fn header_and_footer_render_into_buffer() {
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        let v = view();
        terminal
            .draw(|f| {
                let area = f.area();
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Length(3)])
                    .split(area);
                draw_header(f, rows[0], &v);
                draw_footer(f, rows[1], &v);
            })
            .unwrap();
        let buf = terminal.backend().buffer();
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("ffit | data.dat"));
        assert!(text.contains("q/Esc quit"));
        assert!(text.contains("n=3"));
    }
}
