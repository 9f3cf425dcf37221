//! analyze 명령 통합 테스트.

use std::fs;
use std::path::PathBuf;

use cseval_cli::commands::analyze::{run_analyze, AnalyzeCliConfig};
use cseval_core::AppConfig;

const RAW: &str = "\
Ticker,DlyCalDt,DlyPrc,DlyOpen,DlyHigh,DlyLow,DlyClose,DlyVol
XYZ,2024-01-02,111,112,113,110,111,1000
XYZ,2024-01-03,105,110,111,104,105,1000
XYZ,2024-01-04,100,105,106,99,100,1000
XYZ,2024-01-05,95,100,101,94,95,1000
XYZ,2024-01-08,96,95,96.5,88,96,1000
XYZ,2024-01-09,99,96,100,95,99,1000
XYZ,2024-01-10,97,99,100,96,97,1000
XYZ,2024-01-11,101,96.5,102,96,101,1000
XYZ,2024-01-12,103,101,104,100,103,1000
XYZ,2024-01-16,104,103,105,102,104,1000
ABC,2024-01-02,20,19,21,18.5,20,500
ABC,2024-01-03,21,20,21.5,19.5,21,500
ABC,2024-01-04,20.5,21,21.2,20,20.5,500
ABC,2024-01-05,22,20.4,22.5,20.3,22,500
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cseval-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_analyze_writes_reports() {
    let dir = scratch_dir("pooled");
    let input = dir.join("daily.csv");
    fs::write(&input, RAW).unwrap();

    let config = AnalyzeCliConfig {
        input,
        output: Some(dir.join("out/report.csv")),
        json: Some(dir.join("out/report.json")),
        chart: Some(dir.join("out/chart.json")),
        metric: Some("TP_wilson".to_string()),
        error_bars: true,
        ..Default::default()
    };
    run_analyze(config, &AppConfig::default()).unwrap();

    let csv = fs::read_to_string(dir.join("out/report.csv")).unwrap();
    assert!(csv.starts_with("pattern,TP,FP,total_instances"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("out/report.json")).unwrap()).unwrap();
    assert!(report.is_array() || report.is_object());

    let chart: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("out/chart.json")).unwrap()).unwrap();
    assert!(chart.get("layout").is_some());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_analyze_per_ticker_suffixes_outputs() {
    let dir = scratch_dir("per-ticker");
    let input = dir.join("daily.csv");
    fs::write(&input, RAW).unwrap();

    let config = AnalyzeCliConfig {
        input,
        per_ticker: true,
        output: Some(dir.join("report.csv")),
        ..Default::default()
    };
    run_analyze(config, &AppConfig::default()).unwrap();

    assert!(dir.join("report_ABC.csv").exists());
    assert!(dir.join("report_XYZ.csv").exists());
    assert!(!dir.join("report.csv").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_analyze_unknown_pattern_fails() {
    let dir = scratch_dir("unknown");
    let input = dir.join("daily.csv");
    fs::write(&input, RAW).unwrap();

    let config = AnalyzeCliConfig {
        input,
        patterns: vec!["three_inside_out".to_string()],
        ..Default::default()
    };
    assert!(run_analyze(config, &AppConfig::default()).is_err());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_analyze_missing_input_fails() {
    let config = AnalyzeCliConfig {
        input: PathBuf::from("/nonexistent/cseval/daily.csv"),
        ..Default::default()
    };
    assert!(run_analyze(config, &AppConfig::default()).is_err());
}
