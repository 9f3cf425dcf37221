//! 평가 파이프라인.
//!
//! 일봉 → 수익률 파생 → 시그널 테이블 → 패턴 성과 순서로 실행합니다.

use std::collections::HashSet;

use cseval_core::{AnalysisConfig, CsevalResult, DerivedBar, PriceBar, SignalTable};
use serde::Serialize;
use tracing::info;

use crate::detectors::DetectorRegistry;
use crate::performance::{PerformanceAggregator, PerformanceReport};
use crate::returns::{derive_returns, ReturnSummary};
use crate::signals::{BuildReport, SignalTableBuilder};

/// 평가 결과.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// 분석에 사용된 파생 일봉
    pub derived: Vec<DerivedBar>,
    /// 시그널 테이블
    pub signals: SignalTable,
    /// 시그널 테이블 생성 보고서
    pub build_report: BuildReport,
    /// 패턴별 성과
    pub performance: PerformanceReport,
    /// 수익률 요약
    pub returns: ReturnSummary,
}

/// 평가 파이프라인.
pub struct Pipeline<'a> {
    registry: &'a DetectorRegistry,
    config: AnalysisConfig,
}

impl<'a> Pipeline<'a> {
    /// 새 파이프라인을 생성합니다.
    pub fn new(registry: &'a DetectorRegistry, config: AnalysisConfig) -> Self {
        Self { registry, config }
    }

    /// 일봉 목록을 평가합니다.
    pub fn run(&self, bars: &[PriceBar]) -> CsevalResult<Evaluation> {
        let derived = derive_returns(bars);
        info!(bars = bars.len(), derived = derived.len(), "수익률 파생 완료");
        self.run_derived(derived)
    }

    /// 이미 파생된 일봉을 평가합니다.
    pub fn run_derived(&self, derived: Vec<DerivedBar>) -> CsevalResult<Evaluation> {
        let (signals, build_report) =
            SignalTableBuilder::from_config(self.registry, &self.config).build(&derived)?;
        let performance = PerformanceAggregator::new().aggregate(&signals);
        let returns = ReturnSummary::from_bars(
            &derived,
            self.config.risk_free_rate,
            self.config.periods_per_year,
        );

        Ok(Evaluation {
            derived,
            signals,
            build_report,
            performance,
            returns,
        })
    }

    /// 종목별로 따로 평가합니다 (처음 등장한 순서).
    ///
    /// 종목 하나의 평가가 끝날 때마다 `on_ticker`가 호출됩니다.
    pub fn run_per_ticker<F>(
        &self,
        bars: &[PriceBar],
        mut on_ticker: F,
    ) -> CsevalResult<Vec<(String, Evaluation)>>
    where
        F: FnMut(&str, &Evaluation),
    {
        let mut results = Vec::new();
        for ticker in tickers(bars) {
            let subset: Vec<PriceBar> = bars
                .iter()
                .filter(|bar| bar.ticker == ticker)
                .cloned()
                .collect();
            let eval = self.run(&subset)?;
            on_ticker(ticker, &eval);
            results.push((ticker.to_string(), eval));
        }
        Ok(results)
    }
}

/// 일봉 목록에 등장하는 종목 (처음 등장한 순서).
pub fn tickers(bars: &[PriceBar]) -> Vec<&str> {
    let mut seen = HashSet::new();
    bars.iter()
        .map(|bar| bar.ticker.as_str())
        .filter(|ticker| seen.insert(*ticker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn bar(ticker: &str, day: u32, open: Decimal, close: Decimal) -> PriceBar {
        PriceBar {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            open,
            high: open.max(close) + dec!(1),
            low: open.min(close) - dec!(1),
            close,
            volume: 500,
        }
    }

    fn registry() -> DetectorRegistry {
        let mut registry = DetectorRegistry::new();
        registry
            .register_fn("follow_candle", |ohlc| {
                Ok(ohlc
                    .open
                    .iter()
                    .zip(&ohlc.close)
                    .map(|(o, c)| if c > o { 100 } else if c < o { -100 } else { 0 })
                    .collect())
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_run_end_to_end() {
        let bars = vec![
            bar("AAA", 1, dec!(100), dec!(101)),
            bar("AAA", 2, dec!(101), dec!(102)),
            bar("AAA", 3, dec!(102), dec!(103)),
            bar("AAA", 4, dec!(103), dec!(101)),
            bar("AAA", 5, dec!(101), dec!(100)),
        ];
        let registry = registry();
        let eval = Pipeline::new(&registry, AnalysisConfig::default())
            .run(&bars)
            .unwrap();

        // 2일(+, 다음 +), 3일(+, 다음 -), 4일(-, 다음 -)
        assert_eq!(eval.derived.len(), 3);
        let perf = eval.performance.get("follow_candle").unwrap();
        assert_eq!(perf.true_positive_count, 2);
        assert_eq!(perf.false_positive_count, 1);
        assert_eq!(eval.returns.bars, 3);
    }

    #[test]
    fn test_run_per_ticker() {
        let bars = vec![
            bar("BBB", 1, dec!(10), dec!(11)),
            bar("BBB", 2, dec!(11), dec!(12)),
            bar("BBB", 3, dec!(12), dec!(13)),
            bar("AAA", 1, dec!(100), dec!(101)),
            bar("AAA", 2, dec!(101), dec!(100)),
            bar("AAA", 3, dec!(100), dec!(99)),
        ];
        let registry = registry();
        let mut seen = Vec::new();
        let results = Pipeline::new(&registry, AnalysisConfig::default())
            .run_per_ticker(&bars, |ticker, _| seen.push(ticker.to_string()))
            .unwrap();

        assert_eq!(seen, vec!["BBB", "AAA"]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "BBB");
        assert_eq!(results[1].0, "AAA");
        assert_eq!(results[1].1.derived.len(), 1);
    }

    #[test]
    fn test_tickers_first_appearance() {
        let bars = vec![
            bar("CCC", 1, dec!(10), dec!(11)),
            bar("AAA", 1, dec!(10), dec!(11)),
            bar("CCC", 2, dec!(10), dec!(11)),
            bar("BBB", 1, dec!(10), dec!(11)),
            bar("AAA", 2, dec!(10), dec!(11)),
        ];
        assert_eq!(tickers(&bars), vec!["CCC", "AAA", "BBB"]);
        assert!(tickers(&[]).is_empty());
    }
}
