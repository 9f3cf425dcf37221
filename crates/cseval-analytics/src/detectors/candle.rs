//! 캔들 기하 계산 보조 함수.

use cseval_core::OhlcSeries;
use rust_decimal::Decimal;

/// 단일 캔들 데이터.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candle {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// 시계열의 `index` 위치 캔들.
    pub fn at(ohlc: &OhlcSeries, index: usize) -> Self {
        Self {
            open: ohlc.open[index],
            high: ohlc.high[index],
            low: ohlc.low[index],
            close: ohlc.close[index],
        }
    }

    /// 캔들 몸통 크기.
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 전체 캔들 크기.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 상단 그림자 크기.
    pub fn upper_shadow(&self) -> Decimal {
        self.high - self.open.max(self.close)
    }

    /// 하단 그림자 크기.
    pub fn lower_shadow(&self) -> Decimal {
        self.open.min(self.close) - self.low
    }

    /// 몸통 중간값.
    pub fn midpoint(&self) -> Decimal {
        (self.open + self.close) / Decimal::TWO
    }

    /// 상승 캔들 여부.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 하락 캔들 여부.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 몸통/범위 비율. 범위가 0이면 None.
    pub fn body_ratio(&self) -> Option<Decimal> {
        let range = self.range();
        if range.is_zero() {
            None
        } else {
            Some(self.body() / range)
        }
    }

    /// 도지 여부. 범위가 0인 캔들(시가=고가=저가=종가)도 도지로 봅니다.
    pub fn is_doji(&self, body_ratio_threshold: Decimal) -> bool {
        match self.body_ratio() {
            Some(ratio) => ratio < body_ratio_threshold,
            None => true,
        }
    }
}

/// `index` 직전 `lookback`개 봉이 하락 추세인지 확인합니다.
///
/// 직전 봉들이 모두 음봉이거나 구간 시작 종가보다 낮게 마감해야 합니다.
pub(crate) fn is_downtrend(ohlc: &OhlcSeries, index: usize, lookback: usize) -> bool {
    if lookback == 0 || index < lookback {
        return false;
    }
    let start = index - lookback;
    let anchor = ohlc.close[start];
    (start..index).all(|i| ohlc.close[i] < ohlc.open[i] || ohlc.close[i] < anchor)
}

/// `index` 직전 `lookback`개 봉이 상승 추세인지 확인합니다.
pub(crate) fn is_uptrend(ohlc: &OhlcSeries, index: usize, lookback: usize) -> bool {
    if lookback == 0 || index < lookback {
        return false;
    }
    let start = index - lookback;
    let anchor = ohlc.close[start];
    (start..index).all(|i| ohlc.close[i] > ohlc.open[i] || ohlc.close[i] > anchor)
}
