//! Chart view rendering.
//!
//! Plots frame rate against frame index for every visible series using
//! ratatui's braille line chart.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;

/// Bounds that contain every point, padded so flat series stay visible.
pub fn bounds(points: &[Vec<(f64, f64)>]) -> ([f64; 2], [f64; 2]) {
    let mut x_max = 1.0f64;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for &(x, y) in points.iter().flatten() {
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() {
        return ([1.0, 2.0], [0.0, 1.0]);
    }

    let pad = ((y_max - y_min) * 0.05).max(y_max.abs() * 0.01).max(f64::EPSILON);
    ([1.0, x_max.max(2.0)], [y_min - pad, y_max + pad])
}

fn axis_labels(lo: f64, hi: f64, precision: usize) -> Vec<Line<'static>> {
    let mid = (lo + hi) / 2.0;
    [lo, mid, hi]
        .iter()
        .map(|v| Line::from(format!("{:.*}", precision, v)))
        .collect()
}

/// Render the Chart view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Frame rate ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let visible: Vec<(usize, &crate::data::RateSeries)> = app.visible_series().collect();
    if visible.is_empty() {
        let msg = if app.series.is_empty() {
            "No series loaded"
        } else {
            "All series hidden (space toggles, a shows all)"
        };
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    // Datasets borrow their points, so collect them first.
    let points: Vec<Vec<(f64, f64)>> = visible.iter().map(|(_, s)| s.points()).collect();
    let (x_bounds, y_bounds) = bounds(&points);

    let datasets: Vec<Dataset> = visible
        .iter()
        .zip(&points)
        .map(|((i, series), data)| {
            Dataset::default()
                .name(series.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(*i)))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .legend_position(Some(LegendPosition::TopRight))
        .x_axis(
            Axis::default()
                .title("Frame Number")
                .style(Style::default().fg(app.theme.border))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds[0], x_bounds[1], 0)),
        )
        .y_axis(
            Axis::default()
                .title("Frame rate (fps)")
                .style(Style::default().fg(app.theme.border))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds[0], y_bounds[1], 1)),
        );

    frame.render_widget(chart, area);
}
