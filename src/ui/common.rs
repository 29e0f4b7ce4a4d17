//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_rate;

/// Render the header bar with an overview of the loaded series.
///
/// Displays: series count, total samples, overall rate range.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.last_loaded.is_none() {
        let line = Line::from(vec![
            Span::styled(" FRAMESCOPE ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let total = app.series.len();
    let visible = app.visible_series().count();
    let samples: usize = app.series.iter().map(|s| s.len()).sum();
    let empty = app.series.iter().filter(|s| s.is_empty()).count();

    let stats: Vec<_> = app.stats.iter().flatten().collect();
    let range = if stats.is_empty() {
        "-".to_string()
    } else {
        let min = stats.iter().map(|s| s.min_hz).fold(f64::INFINITY, f64::min);
        let max = stats.iter().map(|s| s.max_hz).fold(f64::NEG_INFINITY, f64::max);
        format!("{} .. {}", format_rate(min), format_rate(max))
    };

    let status_style = if app.load_error.is_some() {
        Style::default().fg(app.theme.critical)
    } else {
        Style::default().fg(app.theme.highlight)
    };

    let mut spans = vec![
        Span::styled(" ● ", status_style),
        Span::styled("FRAMESCOPE ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", visible), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("/{} series │ ", total)),
        Span::raw(format!("{} samples │ ", samples)),
        Span::raw(range),
    ];
    if empty > 0 {
        spans.push(Span::styled(
            format!(" │ {} empty", empty),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Chart "), Line::from(" 2:Summary ")];

    let selected = match app.current_view {
        View::Chart => 0,
        View::Summary => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source description, time since last load, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else if let Some(loaded) = app.last_loaded {
        let controls = match app.current_view {
            View::Chart => "↑↓:select space:toggle a:all Tab:switch ?:help q:quit",
            View::Summary => "↑↓:select space:toggle s:sort S:reverse Tab:switch ?:help q:quit",
        };
        format!(
            " {} | Loaded {:.0}s ago | {}",
            app.source_description(),
            loaded.elapsed().as_secs_f64(),
            controls,
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2         Chart / Summary"),
        Line::from("  ↑/↓ j/k     Select series"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Series",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Space     Show/hide selected"),
        Line::from("  a         Show all"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Reload logs"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
