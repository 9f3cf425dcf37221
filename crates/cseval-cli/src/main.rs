//! 캔들스틱 패턴 성과 평가 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 전체 종목, 전체 내장 패턴 분석
//! cseval analyze -i data/crsp_daily.csv
//!
//! # 단일 종목, 기간 지정, CSV/차트 저장
//! cseval analyze -i data/crsp_daily.csv --ticker AAPL -f 2020-01-01 -t 2023-12-31 \
//!     -o results/aapl.csv --chart results/aapl_chart.json --metric TP_wilson --error-bars
//!
//! # 내장 패턴 목록 보기
//! cseval patterns
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use cseval_cli::commands::analyze::{parse_date, parse_patterns, run_analyze, AnalyzeCliConfig};
use cseval_cli::commands::patterns::print_patterns;
use cseval_core::{init_logging, init_logging_from_env, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "cseval")]
#[command(about = "Candlestick pattern evaluator - 캔들스틱 패턴 다음 날 방향 예측 성과 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// CSV 일봉 데이터로 패턴 성과 분석
    Analyze {
        /// 입력 CSV 파일 경로
        #[arg(short, long)]
        input: PathBuf,

        /// 종목 코드 필터 (예: AAPL)
        #[arg(long)]
        ticker: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<String>,

        /// 분석할 패턴 (쉼표 구분, 예: hammer,engulfing)
        #[arg(short, long)]
        patterns: Option<String>,

        /// 종목별로 따로 분석
        #[arg(long, default_value = "false")]
        per_ticker: bool,

        /// 감지기 출력 길이가 맞지 않으면 즉시 중단
        #[arg(long, default_value = "false")]
        fail_fast: bool,

        /// 패턴 감지 병렬 실행
        #[arg(long, default_value = "false")]
        parallel: bool,

        /// 성과 CSV 저장 경로
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 성과 JSON 저장 경로
        #[arg(long)]
        json: Option<PathBuf>,

        /// 차트(Plotly JSON) 저장 경로
        #[arg(long)]
        chart: Option<PathBuf>,

        /// 차트 지표 (total_instances, TP, FP, precision, TP_wilson, margin, ci_lower, ci_upper)
        #[arg(short, long)]
        metric: Option<String>,

        /// 신뢰구간 오차 막대 표시
        #[arg(long, default_value = "false")]
        error_bars: bool,

        /// 성과 구간 배경 표시
        #[arg(long, default_value = "false")]
        bands: bool,
    },

    /// 내장 패턴 목록 보기
    Patterns,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let app = match AppConfig::load(&cli.config) {
        Ok(app) => app,
        Err(e) => {
            init_logging_from_env().map_err(|e| anyhow!(e.to_string()))?;
            error!("Failed to load config {}: {}", cli.config.display(), e);
            return Err(e.into());
        }
    };

    init_logging(LogConfig::from_settings(&app.logging).with_env_overrides())
        .map_err(|e| anyhow!(e.to_string()))?;

    match cli.command {
        Commands::Analyze {
            input,
            ticker,
            from,
            to,
            patterns,
            per_ticker,
            fail_fast,
            parallel,
            output,
            json,
            chart,
            metric,
            error_bars,
            bands,
        } => {
            let start_date = from.as_deref().map(parse_date).transpose()?;
            let end_date = to.as_deref().map(parse_date).transpose()?;

            if let (Some(start), Some(end)) = (start_date, end_date) {
                if start > end {
                    bail!("Start date must be before end date");
                }
            }

            let config = AnalyzeCliConfig {
                input,
                ticker,
                start_date,
                end_date,
                patterns: patterns.as_deref().map(parse_patterns).unwrap_or_default(),
                per_ticker,
                fail_fast,
                parallel,
                output,
                json,
                chart,
                metric,
                error_bars,
                bands,
            };

            info!(input = %config.input.display(), "Starting pattern evaluation");

            match run_analyze(config, &app) {
                Ok(()) => {
                    info!("✅ Pattern evaluation finished");
                }
                Err(e) => {
                    error!("Analysis failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Patterns => {
            print_patterns();
        }
    }

    Ok(())
}
