//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for errors and hidden-series markers.
    pub critical: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Colors assigned to series, cycled by raw series index.
    pub series: Vec<Color>,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            critical: Color::Red,
            border: Color::Gray,
            series: vec![
                Color::LightBlue,
                Color::LightYellow,
                Color::LightGreen,
                Color::LightRed,
                Color::LightMagenta,
                Color::LightCyan,
            ],
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            critical: Color::Red,
            border: Color::DarkGray,
            series: vec![
                Color::Blue,
                Color::Rgb(200, 100, 0),
                Color::Green,
                Color::Red,
                Color::Magenta,
                Color::Cyan,
            ],
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color of the series at raw index `index`.
    pub fn series_color(&self, index: usize) -> Color {
        self.series
            .get(index % self.series.len().max(1))
            .copied()
            .unwrap_or(self.highlight)
    }

    /// Style for a series, dimmed when hidden from the chart.
    pub fn series_style(&self, index: usize, visible: bool) -> Style {
        let style = Style::default().fg(self.series_color(index));
        if visible {
            style
        } else {
            style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
        }
    }
}
