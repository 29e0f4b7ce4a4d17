use std::fs;
use std::path::Path;

use ratatui::{backend::TestBackend, Terminal};
use tempfile::TempDir;

use framescope::{
    chart, export, ui, App, ChartFormat, CsvColumn, InputFormat, IntervalPolicy, Pipeline,
    Settings, TimeUnit,
};

fn write_log(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn csv_settings(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.inputs = vec![dir.to_path_buf()];
    settings.columns = vec![CsvColumn::new("timestamp2", TimeUnit::Nanoseconds)];
    settings
}

#[test]
fn csv_directory_to_chart_and_export() {
    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "d3cd6a96_2024-05-01.csv",
        "Timestamp,timestamp2\n\
         2024-05-01 10:00:00.000000,0\n\
         2024-05-01 10:00:01.000000,1000000000\n\
         2024-05-01 10:00:03.000000,3000000000\n\
         2024-05-01 10:00:03.500000,3500000000\n",
    );
    write_log(
        dir.path(),
        "a11b0c2f_2024-05-01.csv",
        "Timestamp,timestamp2\n\
         2024-05-01 10:00:00.000000,0\n\
         2024-05-01 10:00:00.100000,100000000\n",
    );
    write_log(dir.path(), "notes.txt", "not a log\n");

    let mut settings = csv_settings(dir.path());
    settings.display_names.insert("d3cd6a96", "Row unit 3");

    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let series = pipeline.run().unwrap();

    // Directory entries are sorted by name
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].source_key, "a11b0c2f");
    assert_eq!(series[0].label, "a11b0c2f");
    assert_eq!(series[1].label, "Row unit 3");

    let hz: Vec<f64> = series[1].samples.iter().map(|s| s.rate_hz).collect();
    assert_eq!(hz, vec![1.0, 0.5, 2.0]);
    let indices: Vec<usize> = series[1].samples.iter().map(|s| s.frame_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    let chart_path = dir.path().join("comparison.svg");
    chart::write(&chart_path, &series, &settings.chart, ChartFormat::Svg).unwrap();
    let svg = fs::read_to_string(&chart_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Row unit 3"));
    assert!(svg.contains("Frame Rate Analysis"));

    let export_path = dir.path().join("rates.json");
    export::write_json(&export_path, &series).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(doc["summary"]["total_series"], 2);
    assert_eq!(doc["summary"]["total_samples"], 4);
    assert_eq!(doc["series"][1]["stats"]["max_hz"], 2.0);
}

#[test]
fn calendar_column_keeps_microsecond_truncation() {
    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "cam_1.csv",
        "Timestamp\n\
         2024-05-01 10:00:00.000000\n\
         2024-05-01 10:00:00.000001\n\
         2024-05-01 10:00:01.000002\n",
    );

    let mut settings = csv_settings(dir.path());
    settings.columns = vec![CsvColumn::new("Timestamp", TimeUnit::CalendarMicroseconds)];
    let series = Pipeline::from_settings(&settings).unwrap().run().unwrap();

    // 1.000001 s apart but only the sub-second part counts
    let hz: Vec<f64> = series[0].samples.iter().map(|s| s.rate_hz).collect();
    assert_eq!(hz, vec![1_000_000.0, 1_000_000.0]);

    settings.columns = vec![CsvColumn::new("Timestamp", TimeUnit::CalendarFullPrecision)];
    let series = Pipeline::from_settings(&settings).unwrap().run().unwrap();
    assert!((series[0].samples[1].rate_hz - 1.0 / 1.000001).abs() < 1e-9);
}

#[test]
fn invalid_interval_aborts_unless_skipped() {
    let dir = TempDir::new().unwrap();
    write_log(dir.path(), "cam_1.csv", "timestamp2\n0\n10\n10\n30\n");

    let mut settings = csv_settings(dir.path());
    let err = Pipeline::from_settings(&settings).unwrap().run().unwrap_err();
    assert!(format!("{err:#}").contains("cam"));

    settings.policy = IntervalPolicy::Skip;
    let series = Pipeline::from_settings(&settings).unwrap().run().unwrap();
    let indices: Vec<usize> = series[0].samples.iter().map(|s| s.frame_index).collect();
    assert_eq!(indices, vec![1, 3]);
}

#[test]
fn pylon_log_gives_one_series_per_camera() {
    let dir = TempDir::new().unwrap();
    write_log(
        dir.path(),
        "grab.txt",
        "Camera 0: acA1300-60gc (21734321)\n\
         Timestamp: 0\n\
         Camera 1: acA1300-60gc (21734322)\n\
         Timestamp: 0\n\
         Camera 0: acA1300-60gc (21734321)\n\
         Timestamp: 40000000\n\
         Camera 1: acA1300-60gc (21734322)\n\
         Timestamp: 50000000\n",
    );

    let mut settings = Settings::default();
    settings.inputs = vec![dir.path().to_path_buf()];
    settings.input_format = InputFormat::Pylon;

    let series = Pipeline::from_settings(&settings).unwrap().run().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].label, "acA1300-60gc (21734321)");
    assert!((series[0].samples[0].rate_hz - 25.0).abs() < 1e-9);
    assert!((series[1].samples[0].rate_hz - 20.0).abs() < 1e-9);
}

#[test]
fn viewer_draws_loaded_series() {
    let dir = TempDir::new().unwrap();
    write_log(dir.path(), "cam_1.csv", "timestamp2\n0\n20000000\n40000000\n");

    let settings = csv_settings(dir.path());
    let pipeline = Pipeline::from_settings(&settings).unwrap();
    let mut app = App::with_theme(pipeline, dir.path().join("rates.json"), ui::Theme::dark());
    assert!(app.reload_data().unwrap());

    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| ui::draw(frame, &app)).unwrap();

    let buffer = terminal.backend().buffer();
    let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
    assert!(text.contains("FRAMESCOPE"));
    assert!(text.contains("1:Chart"));

    app.set_view(framescope::app::View::Summary);
    terminal.draw(|frame| ui::draw(frame, &app)).unwrap();
    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(text.contains("cam"));
}
