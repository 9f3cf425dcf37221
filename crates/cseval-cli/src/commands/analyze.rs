//! 패턴 성과 분석 명령어.
//!
//! CSV 일봉 파일을 적재해 캔들스틱 패턴별 다음 날 방향 예측 성과를 계산합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 내장 패턴으로 분석
//! cseval analyze -i data/crsp_daily.csv
//!
//! # 특정 종목, 기간, 패턴만 분석하고 결과 저장
//! cseval analyze -i data/crsp_daily.csv --ticker AAPL -f 2020-01-01 -t 2023-12-31 \
//!     --patterns hammer,engulfing,doji -o results/aapl.csv
//!
//! # 종목별 분석 + 윌슨 중심값 차트
//! cseval analyze -i data/crsp_daily.csv --per-ticker --chart results/chart.json \
//!     --metric TP_wilson --error-bars --bands
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use cseval_analytics::{tickers, BarChart, ChartOptions, DetectorRegistry, Evaluation, Pipeline};
use cseval_core::{AppConfig, Metric, MismatchPolicy};
use cseval_data::{CsvBarLoader, LoadOptions};

/// 분석 CLI 설정
#[derive(Debug, Clone, Default)]
pub struct AnalyzeCliConfig {
    /// 입력 CSV 경로
    pub input: PathBuf,
    /// 종목 필터
    pub ticker: Option<String>,
    /// 시작일
    pub start_date: Option<NaiveDate>,
    /// 종료일
    pub end_date: Option<NaiveDate>,
    /// 분석할 패턴 (비어 있으면 설정 파일 또는 전체)
    pub patterns: Vec<String>,
    /// 종목별 분석 여부
    pub per_ticker: bool,
    /// 길이 불일치 시 즉시 중단
    pub fail_fast: bool,
    /// 패턴 병렬 실행
    pub parallel: bool,
    /// CSV 보고서 경로
    pub output: Option<PathBuf>,
    /// JSON 보고서 경로
    pub json: Option<PathBuf>,
    /// 차트 JSON 경로
    pub chart: Option<PathBuf>,
    /// 차트 지표 (없으면 설정 파일 값)
    pub metric: Option<String>,
    /// 오차 막대 표시
    pub error_bars: bool,
    /// 성과 구간 표시
    pub bands: bool,
}

/// 분석 명령 실행.
pub fn run_analyze(config: AnalyzeCliConfig, app: &AppConfig) -> Result<()> {
    // 적재 옵션: 설정 파일 값 위에 CLI 인자를 덮어씀
    let mut options = LoadOptions::from(&app.ingestion);
    if let Some(ticker) = &config.ticker {
        options = options.with_ticker(ticker.clone());
    }
    options.start_date = config.start_date.or(options.start_date);
    options.end_date = config.end_date.or(options.end_date);

    let loader = CsvBarLoader::new(options.clone());
    let (bars, load_report) = loader
        .load_path(&config.input)
        .with_context(|| format!("Failed to load daily bars: {}", config.input.display()))?;

    println!("\n📥 데이터 적재");
    println!("  읽은 행:       {}", load_report.rows_read);
    println!("  결측 제거:     {}", load_report.missing_dropped);
    println!("  필터 제외:     {}", load_report.filtered_out);
    println!("  중복 제거:     {}", load_report.duplicates_dropped);
    println!("  사용 행:       {}", load_report.rows_kept);

    if bars.is_empty() {
        warn!("No bars left after loading and filtering");
        println!("\n분석할 데이터가 없습니다.");
        return Ok(());
    }

    let registry = build_registry(&config, app)?;
    info!(patterns = registry.len(), "Detector registry ready");

    let mut analysis = app.analysis.clone();
    if config.fail_fast {
        analysis.mismatch_policy = MismatchPolicy::FailFast;
    }
    analysis.parallel = analysis.parallel || config.parallel;

    let chart_options = chart_options(&config, app, &options)?;
    let pipeline = Pipeline::new(&registry, analysis);

    if config.per_ticker {
        let total = tickers(&bars).len();
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );

        let results = pipeline.run_per_ticker(&bars, |ticker, _| {
            pb.set_message(ticker.to_string());
            pb.inc(1);
        })?;
        pb.finish_with_message("완료");

        for (ticker, eval) in &results {
            print_evaluation(Some(ticker.as_str()), eval);
            let suffix = if chart_options.title_suffix.is_empty() {
                ticker.clone()
            } else {
                format!("{} {}", ticker, chart_options.title_suffix)
            };
            let options = chart_options.clone().with_title_suffix(suffix);
            write_outputs(&config, eval, &options, Some(ticker.as_str()))?;
        }
    } else {
        let eval = pipeline.run(&bars)?;
        print_evaluation(None, &eval);
        write_outputs(&config, &eval, &chart_options, None)?;
    }

    Ok(())
}

/// 레지스트리 구성: CLI 패턴 > 설정 파일 패턴 > 전체 내장 패턴.
fn build_registry(config: &AnalyzeCliConfig, app: &AppConfig) -> Result<DetectorRegistry> {
    let registry = DetectorRegistry::with_builtin();
    let requested = if !config.patterns.is_empty() {
        &config.patterns
    } else {
        &app.analysis.patterns
    };

    if requested.is_empty() {
        Ok(registry)
    } else {
        Ok(registry.select(requested)?)
    }
}

fn chart_options(
    config: &AnalyzeCliConfig,
    app: &AppConfig,
    load: &LoadOptions,
) -> Result<ChartOptions> {
    let mut options = ChartOptions::try_from(&app.chart)?;
    if let Some(metric) = &config.metric {
        options.metric = metric
            .parse::<Metric>()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    options.error_bars = options.error_bars || config.error_bars;
    options.performance_bands = options.performance_bands || config.bands;

    let suffix = match (load.start_date, load.end_date) {
        (Some(start), Some(end)) => format!("{} ~ {}", start, end),
        _ => String::new(),
    };
    Ok(options.with_title_suffix(suffix))
}

fn print_evaluation(ticker: Option<&str>, eval: &Evaluation) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    match ticker {
        Some(ticker) => println!("📊 패턴 성과: {}", ticker),
        None => println!("📊 패턴 성과"),
    }
    println!("═══════════════════════════════════════════════════════════════");
    println!(
        "  분석 봉: {}  |  시그널: {}  |  상승 비율: {:.2}%  |  샤프 비율: {:.4}",
        eval.returns.bars,
        eval.signals.len(),
        eval.returns.up_day_ratio * 100.0,
        eval.returns.sharpe_ratio
    );
    println!();

    if eval.performance.is_empty() {
        println!("감지된 패턴이 없습니다.");
    } else {
        println!("{}", eval.performance.summary_table());
    }

    if eval.build_report.has_warnings() {
        println!();
        println!("⚠️  제외된 패턴:");
        for skipped in &eval.build_report.skipped {
            println!("  {:<22} [{}] {}", skipped.pattern, skipped.ticker, skipped.reason);
        }
    }
}

fn write_outputs(
    config: &AnalyzeCliConfig,
    eval: &Evaluation,
    chart_options: &ChartOptions,
    ticker: Option<&str>,
) -> Result<()> {
    if let Some(path) = &config.output {
        let path = output_path(path, ticker);
        ensure_parent(&path)?;
        eval.performance
            .save_csv(&path)
            .with_context(|| format!("Failed to write CSV report: {}", path.display()))?;
        println!("💾 CSV 저장: {}", path.display());
    }

    if let Some(path) = &config.json {
        let path = output_path(path, ticker);
        ensure_parent(&path)?;
        eval.performance
            .save_json(&path)
            .with_context(|| format!("Failed to write JSON report: {}", path.display()))?;
        println!("💾 JSON 저장: {}", path.display());
    }

    if let Some(path) = &config.chart {
        let path = output_path(path, ticker);
        ensure_parent(&path)?;
        BarChart::from_report(&eval.performance, chart_options)
            .save(&path)
            .with_context(|| format!("Failed to write chart: {}", path.display()))?;
        println!("📈 차트 저장: {}", path.display());
    }

    Ok(())
}

/// 날짜 문자열 파싱 (YYYY-MM-DD).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
}

/// 쉼표로 구분된 패턴 목록 파싱.
pub fn parse_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// 종목별 출력이면 파일명에 종목 코드를 붙입니다 (`out.csv` → `out_AAPL.csv`).
pub fn output_path(path: &Path, ticker: Option<&str>) -> PathBuf {
    let Some(ticker) = ticker else {
        return path.to_path_buf();
    };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, ticker, ext),
        None => format!("{}_{}", stem, ticker),
    };
    path.with_file_name(file_name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}
