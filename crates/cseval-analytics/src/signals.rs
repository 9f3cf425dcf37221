//! 패턴 시그널 테이블 생성.
//!
//! 레지스트리의 모든 감지기를 종목별 OHLC 배열에 한 번씩 실행하고,
//! 0이 아닌 시그널만 모아 긴 형식의 테이블을 만듭니다.
//!
//! # 이상 상황 처리
//!
//! - 감지기 에러: 해당 종목 시계열에서 0행 기여, 경고 기록
//! - 출력 길이 불일치: `MismatchPolicy::Skip`이면 패턴 전체를 제외하고 경고,
//!   `MismatchPolicy::FailFast`이면 `CsevalError::ShapeMismatch` 반환
//!
//! 병렬 실행 여부와 관계없이 출력 행 순서는 같습니다
//! (패턴 등록 순서 → 종목 등장 순서 → 날짜).

use std::collections::HashMap;

use cseval_core::{
    pattern_span, AnalysisConfig, CsevalError, CsevalResult, DerivedBar, MismatchPolicy,
    OhlcSeries, PatternSignal, SignalTable,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::detectors::{DetectorRegistry, PatternDetector};

/// 패턴 제외 사유.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SkipReason {
    /// 감지기 출력 길이가 입력과 다름
    ShapeMismatch { expected: usize, actual: usize },
    /// 감지기 실행 에러
    DetectorFailed { message: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ShapeMismatch { expected, actual } => {
                write!(f, "출력 길이 불일치 (입력 {}, 출력 {})", expected, actual)
            }
            SkipReason::DetectorFailed { message } => write!(f, "감지기 에러: {}", message),
        }
    }
}

/// 제외된 패턴 기록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPattern {
    /// 패턴 이름
    pub pattern: String,
    /// 문제가 발생한 종목
    pub ticker: String,
    /// 제외 사유
    pub reason: SkipReason,
}

/// 시그널 테이블 생성 보고서.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// 입력 봉 수
    pub bars: usize,
    /// 종목 수
    pub tickers: usize,
    /// 패턴별 기여 행 수 (등록 순서)
    pub rows_per_pattern: Vec<(String, usize)>,
    /// 제외 기록
    pub skipped: Vec<SkippedPattern>,
}

impl BuildReport {
    /// 전체 행 수.
    pub fn total_rows(&self) -> usize {
        self.rows_per_pattern.iter().map(|(_, rows)| rows).sum()
    }

    /// 특정 패턴의 기여 행 수.
    pub fn rows_for(&self, pattern: &str) -> Option<usize> {
        self.rows_per_pattern
            .iter()
            .find(|(name, _)| name == pattern)
            .map(|(_, rows)| *rows)
    }

    /// 경고가 있었는지 확인합니다.
    pub fn has_warnings(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// 종목 하나의 시계열.
struct TickerSeries<'a> {
    ticker: &'a str,
    bars: Vec<&'a DerivedBar>,
    ohlc: OhlcSeries,
}

/// 패턴 하나의 스캔 결과.
struct PatternScan {
    pattern: String,
    rows: Vec<PatternSignal>,
    skipped: Vec<SkippedPattern>,
    mismatch: Option<SkippedPattern>,
}

/// 시그널 테이블 생성기.
pub struct SignalTableBuilder<'a> {
    registry: &'a DetectorRegistry,
    policy: MismatchPolicy,
    parallel: bool,
}

impl<'a> SignalTableBuilder<'a> {
    /// 기본 정책(Skip, 순차 실행)으로 생성합니다.
    pub fn new(registry: &'a DetectorRegistry) -> Self {
        Self {
            registry,
            policy: MismatchPolicy::default(),
            parallel: false,
        }
    }

    /// 분석 설정으로 생성합니다.
    pub fn from_config(registry: &'a DetectorRegistry, config: &AnalysisConfig) -> Self {
        Self::new(registry)
            .with_policy(config.mismatch_policy)
            .with_parallel(config.parallel)
    }

    /// 길이 불일치 정책 설정.
    pub fn with_policy(mut self, policy: MismatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 병렬 실행 설정.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 시그널 테이블을 생성합니다.
    ///
    /// 입력은 종목별로 날짜순 정렬되어 있어야 합니다.
    /// 입력이 비어 있으면 빈 테이블을 반환합니다.
    pub fn build(&self, bars: &[DerivedBar]) -> CsevalResult<(SignalTable, BuildReport)> {
        let series = split_series(bars);
        let detectors: Vec<&dyn PatternDetector> = self.registry.iter().map(|d| &**d).collect();

        let scans: Vec<PatternScan> = if self.parallel {
            detectors
                .par_iter()
                .map(|detector| scan_pattern(*detector, &series))
                .collect()
        } else {
            detectors
                .iter()
                .map(|detector| scan_pattern(*detector, &series))
                .collect()
        };

        let mut table = SignalTable::new();
        let mut report = BuildReport {
            bars: bars.len(),
            tickers: series.len(),
            ..Default::default()
        };

        for scan in scans {
            for skipped in &scan.skipped {
                warn!(
                    pattern = %skipped.pattern,
                    ticker = %skipped.ticker,
                    reason = %skipped.reason,
                    "감지기 실행 실패, 해당 시계열 제외"
                );
            }
            report.skipped.extend(scan.skipped);

            if let Some(mismatch) = scan.mismatch {
                if let (MismatchPolicy::FailFast, SkipReason::ShapeMismatch { expected, actual }) =
                    (self.policy, &mismatch.reason)
                {
                    return Err(CsevalError::ShapeMismatch {
                        pattern: mismatch.pattern,
                        expected: *expected,
                        actual: *actual,
                    });
                }
                warn!(
                    pattern = %mismatch.pattern,
                    ticker = %mismatch.ticker,
                    reason = %mismatch.reason,
                    "패턴 출력 길이 불일치, 패턴 제외"
                );
                report.rows_per_pattern.push((scan.pattern, 0));
                report.skipped.push(mismatch);
                continue;
            }

            report.rows_per_pattern.push((scan.pattern, scan.rows.len()));
            for row in scan.rows {
                table.push(row);
            }
        }

        info!(
            bars = report.bars,
            tickers = report.tickers,
            patterns = report.rows_per_pattern.len(),
            rows = table.len(),
            skipped = report.skipped.len(),
            "시그널 테이블 생성 완료"
        );

        Ok((table, report))
    }
}

/// 파생 일봉을 종목별 시계열로 나눕니다 (처음 등장한 순서).
fn split_series(bars: &[DerivedBar]) -> Vec<TickerSeries<'_>> {
    let mut groups: Vec<(&str, Vec<&DerivedBar>)> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for bar in bars {
        let index = *index_of.entry(bar.ticker()).or_insert_with(|| {
            groups.push((bar.ticker(), Vec::new()));
            groups.len() - 1
        });
        groups[index].1.push(bar);
    }

    groups
        .into_iter()
        .map(|(ticker, bars)| {
            let ohlc = OhlcSeries::from_bars(bars.iter().copied());
            TickerSeries { ticker, bars, ohlc }
        })
        .collect()
}

fn scan_pattern(detector: &dyn PatternDetector, series: &[TickerSeries<'_>]) -> PatternScan {
    let pattern = detector.name().to_string();
    let mut scan = PatternScan {
        pattern: pattern.clone(),
        rows: Vec::new(),
        skipped: Vec::new(),
        mismatch: None,
    };

    for s in series {
        let _span = pattern_span!("detect", pattern, s.ticker).entered();

        let signals = match detector.detect(&s.ohlc) {
            Ok(signals) => signals,
            Err(e) => {
                scan.skipped.push(SkippedPattern {
                    pattern: pattern.clone(),
                    ticker: s.ticker.to_string(),
                    reason: SkipReason::DetectorFailed {
                        message: e.to_string(),
                    },
                });
                continue;
            }
        };

        if signals.len() != s.bars.len() {
            scan.rows.clear();
            scan.mismatch = Some(SkippedPattern {
                pattern: pattern.clone(),
                ticker: s.ticker.to_string(),
                reason: SkipReason::ShapeMismatch {
                    expected: s.bars.len(),
                    actual: signals.len(),
                },
            });
            return scan;
        }

        scan.rows.extend(
            signals
                .iter()
                .zip(&s.bars)
                .filter(|(signal, _)| **signal != 0)
                .map(|(signal, bar)| PatternSignal::new(pattern.as_str(), *signal, (*bar).clone())),
        );
    }

    scan
}
