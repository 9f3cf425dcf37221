//! CSV 적재부터 패턴 성과 보고서까지의 통합 테스트.
//!
//! 1. 원본 컬럼명을 가진 CSV를 적재
//! 2. 수익률 파생
//! 3. 내장 감지기와 사용자 감지기로 시그널 테이블 생성
//! 4. 성과 집계 및 출력 검증

use cseval_analytics::{
    derive_returns, BarChart, ChartOptions, DetectorRegistry, Pipeline, PerformanceAggregator,
    SignalTableBuilder, CSV_HEADER,
};
use cseval_core::{AnalysisConfig, Metric, MismatchPolicy};
use cseval_data::{CsvBarLoader, LoadOptions};

/// 하락 3일 → 망치형 → 상승, 이후 상승 장악형이 나오는 시계열.
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
";

fn load() -> Vec<cseval_core::PriceBar> {
    let (bars, report) = CsvBarLoader::new(LoadOptions::default())
        .load_reader(RAW.as_bytes())
        .unwrap();
    assert_eq!(report.rows_kept, 10);
    bars
}

#[test]
fn test_hammer_and_engulfing_scored() {
    let bars = load();
    let registry = DetectorRegistry::with_builtin()
        .select(&["hammer", "engulfing"])
        .unwrap();

    let eval = Pipeline::new(&registry, AnalysisConfig::default())
        .run(&bars)
        .unwrap();

    // 첫 봉과 마지막 봉 제외
    assert_eq!(eval.derived.len(), 8);

    // 2024-01-08 망치형, 다음 날 상승 → TP
    let hammer = eval.performance.get("hammer").unwrap();
    assert_eq!(hammer.true_positive_count, 1);
    assert_eq!(hammer.false_positive_count, 0);
    assert!((hammer.wilson_center - 0.6032746571886187).abs() < 1e-6);

    // 2024-01-11 상승 장악형, 다음 날 상승 → TP
    let engulfing = eval.performance.get("engulfing").unwrap();
    assert!(engulfing.total_instances >= 1);
    assert!(engulfing.true_positive_count >= 1);

    for row in eval.performance.rows() {
        assert_eq!(
            row.true_positive_count + row.false_positive_count,
            row.total_instances
        );
    }
}

#[test]
fn test_all_zero_detector_absent_from_report() {
    let bars = load();
    let mut registry = DetectorRegistry::new();
    registry
        .register_fn("never", |ohlc| Ok(vec![0; ohlc.len()]))
        .unwrap();

    let derived = derive_returns(&bars);
    let (table, build) = SignalTableBuilder::new(&registry).build(&derived).unwrap();
    assert_eq!(table.len(), 0);
    assert_eq!(build.rows_for("never"), Some(0));

    let report = PerformanceAggregator::new().aggregate(&table);
    assert!(report.get("never").is_none());
    assert!(report.is_empty());
}

#[test]
fn test_mismatch_policy_from_config() {
    let bars = load();
    let mut registry = DetectorRegistry::with_builtin().select(&["doji"]).unwrap();
    registry
        .register_fn("truncated", |ohlc| Ok(vec![100; ohlc.len() / 2]))
        .unwrap();

    let skip = Pipeline::new(&registry, AnalysisConfig::default())
        .run(&bars)
        .unwrap();
    assert!(skip.performance.get("truncated").is_none());
    assert_eq!(skip.build_report.skipped.len(), 1);

    let config = AnalysisConfig {
        mismatch_policy: MismatchPolicy::FailFast,
        ..Default::default()
    };
    assert!(Pipeline::new(&registry, config).run(&bars).is_err());
}

#[test]
fn test_report_outputs() {
    let bars = load();
    let registry = DetectorRegistry::with_builtin();
    let config = AnalysisConfig {
        parallel: true,
        ..Default::default()
    };
    let eval = Pipeline::new(&registry, config).run(&bars).unwrap();

    let mut buf = Vec::new();
    eval.performance.write_csv(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().next().unwrap(), CSV_HEADER.join(","));
    assert_eq!(text.lines().count(), eval.performance.len() + 1);

    let chart = BarChart::from_report(
        &eval.performance,
        &ChartOptions::new(Metric::WilsonCenter)
            .with_error_bars(true)
            .with_performance_bands(true),
    );
    assert_eq!(chart.bars.len(), eval.performance.len());
    let json = chart.to_plotly_json();
    assert_eq!(json["layout"]["width"], 800);
}

#[test]
fn test_idempotent_aggregation() {
    let bars = load();
    let registry = DetectorRegistry::with_builtin();
    let derived = derive_returns(&bars);
    let (table, _) = SignalTableBuilder::new(&registry).build(&derived).unwrap();

    let aggregator = PerformanceAggregator::new();
    assert_eq!(aggregator.aggregate(&table), aggregator.aggregate(&table));
}
