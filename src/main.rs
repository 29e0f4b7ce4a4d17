use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use framescope::chart::{self, ChartFormat};
use framescope::data::duration::format_rate;
use framescope::{
    events, export, ui, App, CsvColumn, IntervalPolicy, InputFormat, Pipeline, RateSeries,
    RateStats, Settings, TimeUnit,
};

#[derive(Parser, Debug)]
#[command(name = "framescope")]
#[command(about = "Frame rate analysis for camera capture timestamps", version)]
struct Args {
    /// Log files or directories of logs
    inputs: Vec<PathBuf>,

    /// TOML config file (layered over built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input log format
    #[arg(long, value_name = "csv|pylon")]
    input_format: Option<InputFormat>,

    /// CSV timestamp column as NAME=UNIT (repeatable). UNIT is one of
    /// nanoseconds, calendar-microseconds, calendar-full-precision.
    #[arg(long = "column", value_name = "NAME=UNIT", value_parser = parse_column)]
    columns: Vec<CsvColumn>,

    /// Display name for a source key as KEY=NAME (repeatable)
    #[arg(long = "name", value_name = "KEY=NAME", value_parser = parse_pair)]
    names: Vec<(String, String)>,

    /// Extension of log files picked up from directories
    #[arg(long)]
    extension: Option<String>,

    /// Source keys are the file name prefix before this character
    #[arg(long)]
    separator: Option<char>,

    /// Skip zero or negative frame intervals instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Chart output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chart format (defaults to the output file extension)
    #[arg(long, value_name = "svg|html")]
    chart_format: Option<ChartFormat>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Export derived series to a JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Browse the series in an interactive terminal view instead of writing a chart
    #[arg(short, long)]
    tui: bool,

    /// Re-read the logs every N seconds in the terminal view
    #[arg(short, long, requires = "tui")]
    refresh: Option<u64>,
}

impl Args {
    /// Layer command line flags over the configured settings.
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;

        if !self.inputs.is_empty() {
            settings.inputs = self.inputs.clone();
        }
        if let Some(format) = self.input_format {
            settings.input_format = format;
        }
        if !self.columns.is_empty() {
            settings.columns = self.columns.clone();
        }
        for (key, name) in &self.names {
            settings.display_names.insert(key.clone(), name.clone());
        }
        if let Some(ref extension) = self.extension {
            settings.extension = extension.clone();
        }
        if let Some(separator) = self.separator {
            settings.key_separator = separator.to_string();
        }
        if self.skip_invalid {
            settings.policy = IntervalPolicy::Skip;
        }
        if self.output.is_some() {
            settings.output = self.output.clone();
        }
        if self.chart_format.is_some() {
            settings.format = self.chart_format;
        }
        if let Some(ref title) = self.title {
            settings.chart.title = title.clone();
        }
        if self.export.is_some() {
            settings.export = self.export.clone();
        }

        if settings.inputs.is_empty() {
            return Err(anyhow!("No inputs given (pass log files or set `inputs` in the config)"));
        }
        Ok(settings)
    }
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

fn parse_column(s: &str) -> Result<CsvColumn, String> {
    match s.rsplit_once('=') {
        Some((name, unit)) => Ok(CsvColumn::new(name.trim(), unit.parse::<TimeUnit>()?)),
        None => Ok(CsvColumn::new(s.trim(), TimeUnit::default())),
    }
}

/// Starts logging to stderr. `RUST_LOG` overrides the default level.
fn start_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());
    let subscriber = Registry::default().with(
        fmt::layer()
            .without_time()
            .with_writer(io::stderr)
            .with_filter(filter),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("unable to set global subscriber")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Anything below error would scribble over the terminal view
    start_logging(if args.tui { "error" } else { "warn" })?;

    let settings = args.settings()?;
    let pipeline = Pipeline::from_settings(&settings)?;

    if args.tui {
        let export_path = settings
            .export
            .clone()
            .unwrap_or_else(|| PathBuf::from("framescope_export.json"));
        let refresh = args.refresh.map(Duration::from_secs);
        return run_tui(pipeline, export_path, refresh);
    }

    let series = pipeline.run()?;
    print_summary(&series);

    if let Some(ref output) = settings.output {
        chart::write(output, &series, &settings.chart, settings.chart_format())?;
        println!("Wrote chart to: {}", output.display());
    }

    if let Some(ref export_path) = settings.export {
        export::write_json(export_path, &series)?;
        println!("Exported rates to: {}", export_path.display());
    }

    Ok(())
}

/// Print one line of statistics per series
fn print_summary(series: &[RateSeries]) {
    for s in series {
        match RateStats::from_series(s) {
            Some(stats) => println!(
                "{}: {} samples, min {}, mean {}, max {}",
                s.label,
                stats.count,
                format_rate(stats.min_hz),
                format_rate(stats.mean_hz),
                format_rate(stats.max_hz),
            ),
            None => {
                warn!(source = %s.source_key, "Series has fewer than two timestamps");
                println!("{}: no samples", s.label);
            }
        }
    }
}

/// Run the TUI with the given pipeline
fn run_tui(pipeline: Pipeline, export_path: PathBuf, refresh: Option<Duration>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and load initial data
    let mut app = App::new(pipeline, export_path);
    let _ = app.reload_data();
    info!(source = app.source_description(), "Started viewer");

    let result = run_app(&mut terminal, &mut app, refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh: Option<Duration>,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if let Some(interval) = refresh {
            if last_refresh.elapsed() >= interval {
                let _ = app.reload_data();
                last_refresh = Instant::now();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column() {
        let column = parse_column("Timestamp=calendar-microseconds").unwrap();
        assert_eq!(column, CsvColumn::new("Timestamp", TimeUnit::CalendarMicroseconds));

        let column = parse_column("timestamp2").unwrap();
        assert_eq!(column.unit, TimeUnit::Nanoseconds);

        assert!(parse_column("timestamp2=weeks").is_err());
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("d3cd6a96 = Row unit 3").unwrap(),
            ("d3cd6a96".to_string(), "Row unit 3".to_string())
        );
        assert!(parse_pair("d3cd6a96").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let args = Args::try_parse_from([
            "framescope",
            "logs",
            "--column",
            "timestamp2=ns",
            "--name",
            "a=b",
            "--skip-invalid",
            "--chart-format",
            "svg",
        ])
        .unwrap();
        assert_eq!(args.inputs, vec![PathBuf::from("logs")]);
        assert_eq!(args.columns.len(), 1);
        assert_eq!(args.chart_format, Some(ChartFormat::Svg));
        assert!(args.skip_invalid);
    }
}
