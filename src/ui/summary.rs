//! Summary view rendering.
//!
//! Displays a table of all series with sample counts, rate statistics,
//! mean frame interval and a sparkline of the most recent rates.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::{format_duration, format_rate};
use crate::data::{RateSeries, RateStats};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Number of trailing samples shown in the trend column.
const SPARKLINE_WIDTH: usize = 8;

/// Column to sort by in the Summary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by label alphabetically.
    #[default]
    Label,
    /// Sort by number of samples.
    Samples,
    /// Sort by mean rate.
    Mean,
    /// Sort by minimum rate.
    Min,
    /// Sort by maximum rate.
    Max,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Label => SortColumn::Samples,
            SortColumn::Samples => SortColumn::Mean,
            SortColumn::Mean => SortColumn::Min,
            SortColumn::Min => SortColumn::Max,
            SortColumn::Max => SortColumn::Label,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SortColumn::Label => "label",
            SortColumn::Samples => "samples",
            SortColumn::Mean => "mean",
            SortColumn::Min => "min",
            SortColumn::Max => "max",
        }
    }
}

/// Render the Summary view showing all series in a sortable table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let order = app.display_order();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from(format_header("Series", SortColumn::Label, app)),
        Cell::from("Source"),
        Cell::from(format_header("Samples", SortColumn::Samples, app)),
        Cell::from(format_header("Min", SortColumn::Min, app)),
        Cell::from(format_header("Mean", SortColumn::Mean, app)),
        Cell::from(format_header("Max", SortColumn::Max, app)),
        Cell::from("Interval"),
        Cell::from("Trend"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = order
        .iter()
        .map(|&i| {
            let series = &app.series[i];
            let visible = app.visible.get(i).copied().unwrap_or(true);
            let stats = app.stats.get(i).copied().flatten();
            let dash = || "-".to_string();

            Row::new(vec![
                Cell::from(if visible { "●" } else { "○" })
                    .style(app.theme.series_style(i, true)),
                Cell::from(series.label.clone()).style(app.theme.series_style(i, visible)),
                Cell::from(series.source_key.clone()),
                Cell::from(series.len().to_string()),
                Cell::from(stats.map(|s| format_rate(s.min_hz)).unwrap_or_else(dash)),
                Cell::from(stats.map(|s| format_rate(s.mean_hz)).unwrap_or_else(dash)),
                Cell::from(stats.map(|s| format_rate(s.max_hz)).unwrap_or_else(dash)),
                Cell::from(
                    stats
                        .map(|s| format_duration(s.mean_interval))
                        .unwrap_or_else(dash),
                ),
                Cell::from(render_sparkline(series)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(8),
    ];

    let selected = app.selected_index.min(order.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };
    let position_info = if !order.is_empty() {
        format!(" [{}/{}]", selected + 1, order.len())
    } else {
        String::new()
    };

    let title = format!(
        " Series ({}) [s:sort {}{}]{} ",
        order.len(),
        app.sort_column.label(),
        sort_dir,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort raw series indices by the given column and direction.
pub fn sort_series_by(
    order: &mut [usize],
    series: &[RateSeries],
    stats: &[Option<RateStats>],
    column: SortColumn,
    ascending: bool,
) {
    let stat = |i: usize, f: fn(&RateStats) -> f64| {
        stats.get(i).copied().flatten().map(|s| f(&s)).unwrap_or(f64::NEG_INFINITY)
    };

    order.sort_by(|&a, &b| {
        let primary = match column {
            SortColumn::Label => series[a].label.cmp(&series[b].label),
            SortColumn::Samples => series[a].len().cmp(&series[b].len()),
            SortColumn::Mean => stat(a, |s| s.mean_hz).total_cmp(&stat(b, |s| s.mean_hz)),
            SortColumn::Min => stat(a, |s| s.min_hz).total_cmp(&stat(b, |s| s.min_hz)),
            SortColumn::Max => stat(a, |s| s.max_hz).total_cmp(&stat(b, |s| s.max_hz)),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by original position keeps equal rows stable
        if primary == Ordering::Equal {
            a.cmp(&b)
        } else {
            primary
        }
    });
}

/// Sparkline of the last few rates, scaled between their min and max.
fn render_sparkline(series: &RateSeries) -> String {
    let tail: Vec<f64> = series
        .samples
        .iter()
        .rev()
        .take(SPARKLINE_WIDTH)
        .rev()
        .map(|s| s.rate_hz)
        .collect();

    if tail.is_empty() {
        return " ".repeat(SPARKLINE_WIDTH);
    }

    let min = tail.iter().copied().fold(f64::INFINITY, f64::min);
    let max = tail.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = (max - min).max(f64::EPSILON);

    tail.iter()
        .map(|&v| {
            let level = ((v - min) / range * 7.0).round() as usize;
            SPARKLINE_CHARS[level.min(7)]
        })
        .collect()
}
