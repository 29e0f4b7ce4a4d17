//! Application state and navigation logic for the terminal viewer.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use crate::data::{RateSeries, RateStats};
use crate::pipeline::Pipeline;
use crate::ui::summary::SortColumn;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Frame rate over frame index, one line per visible series.
    Chart,
    /// Table of per-series statistics.
    Summary,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Chart => View::Summary,
            View::Summary => View::Chart,
        }
    }

    /// Cycle to the previous view. With two views this is the same as `next`.
    pub fn prev(self) -> Self {
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Chart => "Chart",
            View::Summary => "Summary",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data
    pipeline: Pipeline,
    pub series: Vec<RateSeries>,
    pub stats: Vec<Option<RateStats>>,
    /// Per-series visibility in the chart, parallel to `series`.
    pub visible: Vec<bool>,
    pub load_error: Option<String>,
    pub last_loaded: Option<Instant>,

    // Navigation state
    pub selected_index: usize,

    // Sorting (Summary view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // UI
    pub theme: Theme,
    export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a pipeline. Call [`App::reload_data`] to load.
    pub fn new(pipeline: Pipeline, export_path: PathBuf) -> Self {
        Self::with_theme(pipeline, export_path, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (skips terminal detection).
    pub fn with_theme(pipeline: Pipeline, export_path: PathBuf, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Chart,
            show_help: false,
            pipeline,
            series: Vec::new(),
            stats: Vec::new(),
            visible: Vec::new(),
            load_error: None,
            last_loaded: None,
            selected_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            theme,
            export_path,
            status_message: None,
        }
    }

    /// Returns a description of the loaded sources.
    pub fn source_description(&self) -> &str {
        self.pipeline.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Re-read the logs and derive all series.
    ///
    /// On failure the previous series are kept and the error is shown in the
    /// status bar. Visibility is preserved for series whose source key
    /// survives the reload.
    pub fn reload_data(&mut self) -> Result<bool> {
        let series = match self.pipeline.run() {
            Ok(series) => series,
            Err(e) => {
                warn!("Reload failed: {:#}", e);
                self.load_error = Some(format!("{:#}", e));
                return Ok(false);
            }
        };

        let visible = series
            .iter()
            .map(|s| {
                self.series
                    .iter()
                    .position(|old| old.source_key == s.source_key)
                    .and_then(|i| self.visible.get(i).copied())
                    .unwrap_or(true)
            })
            .collect();

        self.stats = series.iter().map(RateStats::from_series).collect();
        self.visible = visible;
        self.series = series;
        self.load_error = None;
        self.last_loaded = Some(Instant::now());

        if self.selected_index >= self.series.len() {
            self.selected_index = self.series.len().saturating_sub(1);
        }
        Ok(true)
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one series.
    pub fn select_next(&mut self) {
        let max = self.series.len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    /// Move selection up by one series.
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Jump to the first series.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last series.
    pub fn select_last(&mut self) {
        self.selected_index = self.series.len().saturating_sub(1);
    }

    /// Show or hide the series at the current visual position.
    pub fn toggle_selected(&mut self) {
        if let Some(raw) = self.selected_raw_index() {
            if let Some(v) = self.visible.get_mut(raw) {
                *v = !*v;
            }
        }
    }

    /// Make every series visible again.
    pub fn show_all(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = true);
    }

    /// Raw indices into `series` in display order (Summary sorting applied).
    pub fn display_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.series.len()).collect();
        crate::ui::summary::sort_series_by(
            &mut order,
            &self.series,
            &self.stats,
            self.sort_column,
            self.sort_ascending,
        );
        order
    }

    /// Raw index of the series at the current visual position.
    pub fn selected_raw_index(&self) -> Option<usize> {
        self.display_order().get(self.selected_index).copied()
    }

    /// Series currently shown in the chart, with their raw indices.
    pub fn visible_series(&self) -> impl Iterator<Item = (usize, &RateSeries)> {
        self.series
            .iter()
            .enumerate()
            .filter(|(i, _)| self.visible.get(*i).copied().unwrap_or(true))
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Where the `e` key exports to.
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Export the derived series to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.series.is_empty() {
            anyhow::bail!("No data to export");
        }
        crate::export::write_json(path, &self.series)
    }
}
