//! 일봉 가격 데이터 타입.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하루치 OHLCV 관측값.
///
/// 적재 단계에서 생성된 이후 변경되지 않습니다.
/// 같은 종목 안에서 날짜는 엄격하게 증가하며 중복되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 종목 코드
    pub ticker: String,
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: u64,
}

impl PriceBar {
    /// 캔들 몸통 크기(|종가 - 시가|)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// 수익률 파생 필드가 추가된 일봉.
///
/// `sign_next_day_return`은 다음 거래일의 `sign_intraday_return`과 같습니다.
/// 시계열의 마지막 봉은 다음 날 값이 없으므로 분석 전에 제거됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedBar {
    /// 원본 일봉
    #[serde(flatten)]
    pub bar: PriceBar,
    /// 장중 수익률 (종가 - 시가) / 시가
    pub intraday_return: Decimal,
    /// 장중 수익률 부호 (-1, 0, 1)
    pub sign_intraday_return: i8,
    /// 전일 종가 대비 로그 수익률
    pub log_return: f64,
    /// 다음 거래일 장중 수익률
    pub next_intraday_return: Option<Decimal>,
    /// 다음 거래일 장중 수익률 부호
    pub sign_next_day_return: Option<i8>,
}

impl DerivedBar {
    /// 종목 코드.
    pub fn ticker(&self) -> &str {
        &self.bar.ticker
    }

    /// 거래일.
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

/// 감지기에 전달되는 OHLC 배열 묶음.
///
/// 네 배열은 위치로 정렬되어 있으며 길이가 같습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcSeries {
    pub open: Vec<Decimal>,
    pub high: Vec<Decimal>,
    pub low: Vec<Decimal>,
    pub close: Vec<Decimal>,
}

impl OhlcSeries {
    /// 파생 일봉 목록에서 OHLC 배열을 추출합니다.
    pub fn from_bars<'a, I>(bars: I) -> Self
    where
        I: IntoIterator<Item = &'a DerivedBar>,
    {
        let bars = bars.into_iter();
        let capacity = bars.size_hint().0;
        let mut series = Self {
            open: Vec::with_capacity(capacity),
            high: Vec::with_capacity(capacity),
            low: Vec::with_capacity(capacity),
            close: Vec::with_capacity(capacity),
        };

        for derived in bars {
            series.open.push(derived.bar.open);
            series.high.push(derived.bar.high);
            series.low.push(derived.bar.low);
            series.close.push(derived.bar.close);
        }

        series
    }

    /// 봉 개수.
    pub fn len(&self) -> usize {
        self.open.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// 네 배열의 길이가 모두 같은지 확인합니다.
    pub fn is_aligned(&self) -> bool {
        let n = self.open.len();
        self.high.len() == n && self.low.len() == n && self.close.len() == n
    }
}

/// 값의 부호를 -1, 0, 1로 반환합니다.
pub fn decimal_sign(value: Decimal) -> i8 {
    if value > Decimal::ZERO {
        1
    } else if value < Decimal::ZERO {
        -1
    } else {
        0
    }
}
