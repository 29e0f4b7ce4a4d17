//! Chart rendering to a self-contained SVG or HTML file.
//!
//! One polyline per series, x = frame index, y = frame rate. The output has
//! no external references and opens in any browser.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::data::RateSeries;

/// Series colors, cycled in order.
const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 220.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TARGET_TICKS: f64 = 6.0;
const FONT: &str = "Courier New, monospace";

/// Errors that can occur when writing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to write chart to {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    /// Standalone SVG image.
    Svg,
    /// HTML page embedding the SVG inline.
    #[default]
    Html,
}

impl ChartFormat {
    /// Guess the format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(ChartFormat::Svg),
            "html" | "htm" => Ok(ChartFormat::Html),
            other => Err(format!("unknown chart format: {}", other)),
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartFormat::Svg => f.write_str("svg"),
            ChartFormat::Html => f.write_str("html"),
        }
    }
}

/// Cosmetic chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Frame Rate Analysis".to_string(),
            x_title: "Frame Number".to_string(),
            y_title: "Frame rate (fps)".to_string(),
            width: 1200,
            height: 600,
        }
    }
}

/// Axis range with evenly spaced ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Axis {
    lo: f64,
    hi: f64,
    step: f64,
}

impl Axis {
    fn fit(min: f64, max: f64) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
            (min - pad, max + pad)
        } else {
            (min, max)
        };
        let step = nice_step((max - min) / TARGET_TICKS);
        Self {
            lo: (min / step).floor() * step,
            hi: (max / step).ceil() * step,
            step,
        }
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let count = ((self.hi - self.lo) / self.step).round() as usize;
        (0..=count).map(move |i| self.lo + i as f64 * self.step)
    }

    /// Map `v` into `[0, 1]`.
    fn unit(&self, v: f64) -> f64 {
        (v - self.lo) / (self.hi - self.lo)
    }
}

/// Round `raw` up to 1, 2, 5 or 10 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn format_tick(v: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{:.0}", v)
    } else {
        let decimals = (-step.log10().floor()) as usize;
        format!("{:.*}", decimals, v)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render series as SVG markup.
pub fn render_svg(series: &[RateSeries], options: &ChartOptions) -> String {
    let width = options.width as f64;
    let height = options.height as f64;
    let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

    let points = series.iter().flat_map(|s| s.samples.iter());
    let (mut x_max, mut y_min, mut y_max) = (1.0f64, f64::INFINITY, f64::NEG_INFINITY);
    for sample in points {
        x_max = x_max.max(sample.frame_index as f64);
        y_min = y_min.min(sample.rate_hz);
        y_max = y_max.max(sample.rate_hz);
    }
    if !y_min.is_finite() {
        (y_min, y_max) = (0.0, 1.0);
    }

    let x_axis = Axis::fit(1.0, x_max);
    let y_axis = Axis::fit(y_min, y_max);
    let px = |x: f64| MARGIN_LEFT + x_axis.unit(x) * plot_w;
    let py = |y: f64| MARGIN_TOP + (1.0 - y_axis.unit(y)) * plot_h;

    let mut svg = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{FONT}">"#,
        w = options.width,
        h = options.height,
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="20" text-anchor="middle">{}</text>"#,
        width / 2.0,
        MARGIN_TOP / 2.0 + 7.0,
        escape(&options.title)
    );

    // Grid and tick labels
    for x in x_axis.ticks() {
        let _ = writeln!(
            svg,
            r##"<line x1="{0:.1}" y1="{1:.1}" x2="{0:.1}" y2="{2:.1}" stroke="#e5e5e5"/><text x="{0:.1}" y="{3:.1}" font-size="12" text-anchor="middle">{4}</text>"##,
            px(x),
            MARGIN_TOP,
            MARGIN_TOP + plot_h,
            MARGIN_TOP + plot_h + 18.0,
            format_tick(x, x_axis.step)
        );
    }
    for y in y_axis.ticks() {
        let _ = writeln!(
            svg,
            r##"<line x1="{0:.1}" y1="{2:.1}" x2="{1:.1}" y2="{2:.1}" stroke="#e5e5e5"/><text x="{3:.1}" y="{4:.1}" font-size="12" text-anchor="end">{5}</text>"##,
            MARGIN_LEFT,
            MARGIN_LEFT + plot_w,
            py(y),
            MARGIN_LEFT - 8.0,
            py(y) + 4.0,
            format_tick(y, y_axis.step)
        );
    }
    let _ = writeln!(
        svg,
        r##"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w:.1}" height="{plot_h:.1}" fill="none" stroke="#444444"/>"##
    );

    // Axis titles
    let _ = writeln!(
        svg,
        r##"<text x="{:.1}" y="{:.1}" font-size="18" fill="#0c0c0c" text-anchor="middle">{}</text>"##,
        MARGIN_LEFT + plot_w / 2.0,
        height - 12.0,
        escape(&options.x_title)
    );
    let _ = writeln!(
        svg,
        r##"<text x="20" y="{0:.1}" font-size="18" fill="#0c0c0c" text-anchor="middle" transform="rotate(-90 20 {0:.1})">{1}</text>"##,
        MARGIN_TOP + plot_h / 2.0,
        escape(&options.y_title)
    );

    // Series and legend
    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        if !s.is_empty() {
            let coords: Vec<String> = s
                .samples
                .iter()
                .map(|p| format!("{:.2},{:.2}", px(p.frame_index as f64), py(p.rate_hz)))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                color,
                coords.join(" ")
            );
        }

        let ly = MARGIN_TOP + 10.0 + i as f64 * 22.0;
        let lx = MARGIN_LEFT + plot_w + 20.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{lx:.1}" y1="{ly:.1}" x2="{:.1}" y2="{ly:.1}" stroke="{color}" stroke-width="3"/><text x="{:.1}" y="{:.1}" font-size="13">{}</text>"#,
            lx + 24.0,
            lx + 30.0,
            ly + 4.0,
            escape(&s.label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render series in the requested format.
pub fn render(series: &[RateSeries], options: &ChartOptions, format: ChartFormat) -> String {
    let svg = render_svg(series, options);
    match format {
        ChartFormat::Svg => svg,
        ChartFormat::Html => format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape(&options.title),
            svg
        ),
    }
}

/// Render and write the chart to `path`.
pub fn write(
    path: &Path,
    series: &[RateSeries],
    options: &ChartOptions,
    format: ChartFormat,
) -> Result<(), ChartError> {
    let content = render(series, options, format);
    debug!(bytes = content.len(), %format, "Rendered chart");
    fs::write(path, content).map_err(|source| ChartError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), series = series.len(), "Wrote chart");
    Ok(())
}
