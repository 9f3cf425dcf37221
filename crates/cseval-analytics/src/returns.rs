//! 일봉 수익률 파생 및 요약 통계.
//!
//! 종목별 시계열마다 다음 필드를 계산합니다:
//! - 장중 수익률 `(종가 - 시가) / 시가`와 그 부호
//! - 전일 종가 대비 로그 수익률
//! - 다음 거래일 장중 수익률과 그 부호
//!
//! 파생 값이 하나라도 비는 봉(시계열의 첫 봉과 마지막 봉)은 결과에서 제외됩니다.
//! 계산은 종목 경계를 넘지 않습니다.

use cseval_core::{decimal_sign, DerivedBar, PriceBar};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 연간 거래일 수.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// 일봉 목록에서 파생 일봉을 계산합니다.
///
/// 입력은 여러 종목을 포함할 수 있으며, 종목은 처음 등장한 순서로,
/// 종목 안에서는 날짜순으로 출력됩니다.
pub fn derive_returns(bars: &[PriceBar]) -> Vec<DerivedBar> {
    let mut derived = Vec::with_capacity(bars.len());
    for (ticker, mut series) in group_by_ticker(bars) {
        series.sort_by_key(|bar| bar.date);
        let before = derived.len();
        derive_series(&series, &mut derived);
        debug!(
            ticker = %ticker,
            bars = series.len(),
            derived = derived.len() - before,
            "수익률 파생 완료"
        );
    }
    derived
}

fn group_by_ticker(bars: &[PriceBar]) -> Vec<(&str, Vec<&PriceBar>)> {
    let mut groups: Vec<(&str, Vec<&PriceBar>)> = Vec::new();
    for bar in bars {
        match groups.iter_mut().find(|(ticker, _)| *ticker == bar.ticker) {
            Some((_, series)) => series.push(bar),
            None => groups.push((bar.ticker.as_str(), vec![bar])),
        }
    }
    groups
}

fn derive_series(series: &[&PriceBar], out: &mut Vec<DerivedBar>) {
    let intraday: Vec<Option<Decimal>> = series.iter().map(|bar| intraday_return(bar)).collect();

    // 첫 봉은 로그 수익률이, 마지막 봉은 다음 날 값이 없음
    for i in 1..series.len().saturating_sub(1) {
        let (Some(today), Some(next)) = (intraday[i], intraday[i + 1]) else {
            debug!(ticker = %series[i].ticker, date = %series[i].date, "장중 수익률 계산 불가, 제외");
            continue;
        };
        let Some(log_return) = log_return(series[i - 1].close, series[i].close) else {
            debug!(ticker = %series[i].ticker, date = %series[i].date, "로그 수익률 계산 불가, 제외");
            continue;
        };

        out.push(DerivedBar {
            bar: series[i].clone(),
            intraday_return: today,
            sign_intraday_return: decimal_sign(today),
            log_return,
            next_intraday_return: Some(next),
            sign_next_day_return: Some(decimal_sign(next)),
        });
    }
}

/// 장중 수익률 `(종가 - 시가) / 시가`.
pub fn intraday_return(bar: &PriceBar) -> Option<Decimal> {
    (bar.close - bar.open).checked_div(bar.open)
}

/// 로그 수익률 `ln(현재 종가 / 직전 종가)`.
pub fn log_return(prev_close: Decimal, close: Decimal) -> Option<f64> {
    let ratio = close.checked_div(prev_close)?.to_f64()?;
    if ratio > 0.0 {
        Some(ratio.ln())
    } else {
        None
    }
}

/// 샤프 비율 계산.
///
/// `mean(r - rf/periods) / stdev(r) * sqrt(periods)`.
/// 표준편차는 표본 표준편차(n-1)이며, 관측치가 2개 미만이거나
/// 표준편차가 0이면 0을 반환합니다.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: u32) -> f64 {
    if returns.len() < 2 || periods_per_year == 0 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let per_period_rf = risk_free_rate / periods_per_year as f64;

    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    (mean - per_period_rf) / std_dev * (periods_per_year as f64).sqrt()
}

/// 파생 일봉 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    /// 봉 수
    pub bars: usize,
    /// 평균 장중 수익률
    pub mean_intraday_return: f64,
    /// 장중 상승 봉 비율
    pub up_day_ratio: f64,
    /// 평균 로그 수익률
    pub mean_log_return: f64,
    /// 장중 수익률 기준 연율화 샤프 비율
    pub sharpe_ratio: f64,
}

impl ReturnSummary {
    /// 파생 일봉에서 요약을 계산합니다.
    pub fn from_bars(bars: &[DerivedBar], risk_free_rate: f64, periods_per_year: u32) -> Self {
        if bars.is_empty() {
            return Self {
                bars: 0,
                mean_intraday_return: 0.0,
                up_day_ratio: 0.0,
                mean_log_return: 0.0,
                sharpe_ratio: 0.0,
            };
        }

        let n = bars.len() as f64;
        let intraday: Vec<f64> = bars
            .iter()
            .filter_map(|bar| bar.intraday_return.to_f64())
            .collect();
        let up_days = bars.iter().filter(|bar| bar.sign_intraday_return > 0).count();

        Self {
            bars: bars.len(),
            mean_intraday_return: intraday.iter().sum::<f64>() / intraday.len().max(1) as f64,
            up_day_ratio: up_days as f64 / n,
            mean_log_return: bars.iter().map(|bar| bar.log_return).sum::<f64>() / n,
            sharpe_ratio: sharpe_ratio(&intraday, risk_free_rate, periods_per_year),
        }
    }
}
