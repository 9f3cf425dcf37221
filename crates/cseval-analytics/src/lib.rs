//! 캔들스틱 패턴 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 일봉 수익률 파생 및 샤프 비율
//! - 캔들스틱 패턴 감지기와 레지스트리
//! - 패턴 시그널 테이블 생성
//! - 패턴별 방향 예측 성과 (TP/FP, 윌슨 신뢰구간)
//! - 성과 막대 차트 데이터
//!
//! # Re-exports
//!
//! - [`detectors`]: 패턴 감지기 (PatternDetector, DetectorRegistry 등)
//! - [`performance`]: 성과 집계 (PerformanceAggregator, WilsonInterval 등)
//! - [`presentation`]: 차트 모델 (BarChart, PerformanceBand 등)

pub mod detectors;
pub mod error;
pub mod performance;
pub mod pipeline;
pub mod presentation;
pub mod returns;
pub mod signals;

pub use detectors::{
    BuiltinDetector, BuiltinPattern, DetectorError, DetectorRegistry, DetectorResult, FnDetector,
    PatternConfig, PatternDetector,
};
pub use error::{AnalyticsError, Result};
pub use performance::{
    label_signal, Label, PerformanceAggregator, PerformanceReport, WilsonInterval, CSV_HEADER,
    Z_95,
};
pub use pipeline::{tickers, Evaluation, Pipeline};
pub use presentation::{BarChart, ChartBar, ChartOptions, PerformanceBand};
pub use returns::{derive_returns, sharpe_ratio, ReturnSummary, TRADING_DAYS_PER_YEAR};
pub use signals::{BuildReport, SignalTableBuilder, SkipReason, SkippedPattern};
