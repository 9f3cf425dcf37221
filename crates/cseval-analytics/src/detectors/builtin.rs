//! 내장 캔들스틱 패턴 감지기.
//!
//! ## 지원 패턴
//! - **단일 캔들**: 도지 계열, 망치형/교수형, 역망치형/유성형, 마루보주, 팽이형
//! - **이중 캔들**: 장악형, 잉태형, 관통형, 먹구름형, 집게형
//! - **삼중 캔들**: 샛별형/석별형, 적삼병/흑삼병, 버려진 아기형
//!
//! 모든 감지기는 TA-Lib 관례를 따라 강세 `100`, 약세 `-100`, 없음 `0`을 반환합니다.
//! 패턴에 필요한 봉 수보다 앞선 위치는 항상 `0`입니다.

use std::str::FromStr;

use cseval_core::OhlcSeries;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::candle::{is_downtrend, is_uptrend, Candle};
use super::{ensure_aligned, DetectorError, DetectorResult, PatternDetector};

const BULLISH: i32 = 100;
const BEARISH: i32 = -100;
const NONE: i32 = 0;

/// 내장 패턴 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPattern {
    Doji,
    DragonflyDoji,
    GravestoneDoji,
    Hammer,
    HangingMan,
    InvertedHammer,
    ShootingStar,
    Marubozu,
    SpinningTop,
    Engulfing,
    Harami,
    PiercingLine,
    DarkCloudCover,
    Tweezer,
    MorningStar,
    EveningStar,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
    AbandonedBaby,
}

impl BuiltinPattern {
    /// 등록 순서대로 나열한 모든 내장 패턴.
    pub const ALL: [BuiltinPattern; 19] = [
        BuiltinPattern::Doji,
        BuiltinPattern::DragonflyDoji,
        BuiltinPattern::GravestoneDoji,
        BuiltinPattern::Hammer,
        BuiltinPattern::HangingMan,
        BuiltinPattern::InvertedHammer,
        BuiltinPattern::ShootingStar,
        BuiltinPattern::Marubozu,
        BuiltinPattern::SpinningTop,
        BuiltinPattern::Engulfing,
        BuiltinPattern::Harami,
        BuiltinPattern::PiercingLine,
        BuiltinPattern::DarkCloudCover,
        BuiltinPattern::Tweezer,
        BuiltinPattern::MorningStar,
        BuiltinPattern::EveningStar,
        BuiltinPattern::ThreeWhiteSoldiers,
        BuiltinPattern::ThreeBlackCrows,
        BuiltinPattern::AbandonedBaby,
    ];

    /// 레지스트리 이름.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinPattern::Doji => "doji",
            BuiltinPattern::DragonflyDoji => "dragonfly_doji",
            BuiltinPattern::GravestoneDoji => "gravestone_doji",
            BuiltinPattern::Hammer => "hammer",
            BuiltinPattern::HangingMan => "hanging_man",
            BuiltinPattern::InvertedHammer => "inverted_hammer",
            BuiltinPattern::ShootingStar => "shooting_star",
            BuiltinPattern::Marubozu => "marubozu",
            BuiltinPattern::SpinningTop => "spinning_top",
            BuiltinPattern::Engulfing => "engulfing",
            BuiltinPattern::Harami => "harami",
            BuiltinPattern::PiercingLine => "piercing_line",
            BuiltinPattern::DarkCloudCover => "dark_cloud_cover",
            BuiltinPattern::Tweezer => "tweezer",
            BuiltinPattern::MorningStar => "morning_star",
            BuiltinPattern::EveningStar => "evening_star",
            BuiltinPattern::ThreeWhiteSoldiers => "three_white_soldiers",
            BuiltinPattern::ThreeBlackCrows => "three_black_crows",
            BuiltinPattern::AbandonedBaby => "abandoned_baby",
        }
    }

    /// 패턴을 구성하는 캔들 수.
    pub fn candle_count(&self) -> usize {
        match self {
            BuiltinPattern::Doji
            | BuiltinPattern::DragonflyDoji
            | BuiltinPattern::GravestoneDoji
            | BuiltinPattern::Hammer
            | BuiltinPattern::HangingMan
            | BuiltinPattern::InvertedHammer
            | BuiltinPattern::ShootingStar
            | BuiltinPattern::Marubozu
            | BuiltinPattern::SpinningTop => 1,
            BuiltinPattern::Engulfing
            | BuiltinPattern::Harami
            | BuiltinPattern::PiercingLine
            | BuiltinPattern::DarkCloudCover
            | BuiltinPattern::Tweezer => 2,
            BuiltinPattern::MorningStar
            | BuiltinPattern::EveningStar
            | BuiltinPattern::ThreeWhiteSoldiers
            | BuiltinPattern::ThreeBlackCrows
            | BuiltinPattern::AbandonedBaby => 3,
        }
    }
}

impl std::fmt::Display for BuiltinPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        BuiltinPattern::ALL
            .iter()
            .copied()
            .find(|p| p.name() == lowered)
            .ok_or_else(|| format!("Unknown builtin pattern: {}", s))
    }
}

/// 캔들스틱 패턴 임계값.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Doji 인식을 위한 몸통/범위 비율 (기본: 0.1 = 10%)
    pub doji_body_ratio: Decimal,
    /// Hammer/Shooting Star 꼬리/몸통 비율 (기본: 2.0)
    pub shadow_body_ratio: Decimal,
    /// Marubozu 꼬리 허용 비율 (기본: 0.05 = 5%)
    pub marubozu_shadow_ratio: Decimal,
    /// Engulfing 감싸기 최소 비율 (기본: 1.0)
    pub engulfing_ratio: Decimal,
    /// Tweezer 가격 허용 오차 (직전 봉 범위 대비, 기본: 0.02)
    pub tweezer_tolerance: Decimal,
    /// 추세 확인 봉 수 (기본: 3)
    pub trend_lookback: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            doji_body_ratio: dec!(0.1),
            shadow_body_ratio: dec!(2.0),
            marubozu_shadow_ratio: dec!(0.05),
            engulfing_ratio: dec!(1.0),
            tweezer_tolerance: dec!(0.02),
            trend_lookback: 3,
        }
    }
}

/// 내장 패턴 감지기.
#[derive(Debug, Clone)]
pub struct BuiltinDetector {
    pattern: BuiltinPattern,
    config: PatternConfig,
}

impl BuiltinDetector {
    /// 기본 임계값으로 감지기를 생성합니다.
    pub fn new(pattern: BuiltinPattern) -> Self {
        Self::with_config(pattern, PatternConfig::default())
    }

    /// 사용자 임계값으로 감지기를 생성합니다.
    pub fn with_config(pattern: BuiltinPattern, config: PatternConfig) -> Self {
        Self { pattern, config }
    }

    fn signal_at(&self, ohlc: &OhlcSeries, index: usize) -> DetectorResult<i32> {
        if index + 1 < self.pattern.candle_count() {
            return Ok(NONE);
        }

        match self.pattern {
            BuiltinPattern::Doji
            | BuiltinPattern::DragonflyDoji
            | BuiltinPattern::GravestoneDoji => Ok(self.doji_family(Candle::at(ohlc, index))),
            BuiltinPattern::Hammer
            | BuiltinPattern::HangingMan
            | BuiltinPattern::InvertedHammer
            | BuiltinPattern::ShootingStar => self.shadow_family(ohlc, index),
            BuiltinPattern::Marubozu => Ok(self.marubozu(Candle::at(ohlc, index))),
            BuiltinPattern::SpinningTop => Ok(spinning_top(Candle::at(ohlc, index))),
            BuiltinPattern::Engulfing => {
                self.engulfing(Candle::at(ohlc, index - 1), Candle::at(ohlc, index))
            }
            BuiltinPattern::Harami => Ok(harami(Candle::at(ohlc, index - 1), Candle::at(ohlc, index))),
            BuiltinPattern::PiercingLine | BuiltinPattern::DarkCloudCover => Ok(self.penetration(
                Candle::at(ohlc, index - 1),
                Candle::at(ohlc, index),
            )),
            BuiltinPattern::Tweezer => {
                Ok(self.tweezer(Candle::at(ohlc, index - 1), Candle::at(ohlc, index)))
            }
            _ => Ok(self.triple(
                Candle::at(ohlc, index - 2),
                Candle::at(ohlc, index - 1),
                Candle::at(ohlc, index),
            )),
        }
    }

    /// Doji 계열
    fn doji_family(&self, candle: Candle) -> i32 {
        if !candle.is_doji(self.config.doji_body_ratio) {
            return NONE;
        }

        let range = candle.range();
        if range.is_zero() {
            // 시가=고가=저가=종가는 일반 도지로만 취급
            return if self.pattern == BuiltinPattern::Doji {
                BULLISH
            } else {
                NONE
            };
        }

        let upper_ratio = candle.upper_shadow() / range;
        let lower_ratio = candle.lower_shadow() / range;

        match self.pattern {
            BuiltinPattern::Doji => BULLISH,
            BuiltinPattern::DragonflyDoji if lower_ratio > dec!(0.6) && upper_ratio < dec!(0.1) => {
                BULLISH
            }
            BuiltinPattern::GravestoneDoji if upper_ratio > dec!(0.6) && lower_ratio < dec!(0.1) => {
                BEARISH
            }
            _ => NONE,
        }
    }

    /// 긴 꼬리 + 작은 몸통 계열. 직전 추세로 강세/약세 형태를 구분합니다.
    fn shadow_family(&self, ohlc: &OhlcSeries, index: usize) -> DetectorResult<i32> {
        let candle = Candle::at(ohlc, index);
        let body = candle.body();
        let range = candle.range();
        if body.is_zero() || range.is_zero() {
            return Ok(NONE);
        }

        let upper_ratio = candle.upper_shadow() / range;
        let lower_ratio = candle.lower_shadow() / range;
        let lower_to_body = checked_ratio(candle.lower_shadow(), body)?;
        let upper_to_body = checked_ratio(candle.upper_shadow(), body)?;

        let long_lower = lower_to_body >= self.config.shadow_body_ratio && upper_ratio < dec!(0.2);
        let long_upper = upper_to_body >= self.config.shadow_body_ratio && lower_ratio < dec!(0.2);
        let lookback = self.config.trend_lookback;

        let signal = match self.pattern {
            BuiltinPattern::Hammer if long_lower && is_downtrend(ohlc, index, lookback) => BULLISH,
            BuiltinPattern::HangingMan if long_lower && is_uptrend(ohlc, index, lookback) => BEARISH,
            BuiltinPattern::InvertedHammer if long_upper && is_downtrend(ohlc, index, lookback) => {
                BULLISH
            }
            BuiltinPattern::ShootingStar if long_upper && is_uptrend(ohlc, index, lookback) => {
                BEARISH
            }
            _ => NONE,
        };
        Ok(signal)
    }

    /// Marubozu (꼬리 거의 없음)
    fn marubozu(&self, candle: Candle) -> i32 {
        let range = candle.range();
        if range.is_zero() || candle.body().is_zero() {
            return NONE;
        }
        let threshold = self.config.marubozu_shadow_ratio;
        if candle.upper_shadow() / range < threshold && candle.lower_shadow() / range < threshold {
            direction(candle)
        } else {
            NONE
        }
    }

    fn engulfing(&self, prev: Candle, curr: Candle) -> DetectorResult<i32> {
        if prev.body().is_zero() {
            return Ok(NONE);
        }
        let engulf_ratio = checked_ratio(curr.body(), prev.body())?;
        if engulf_ratio < self.config.engulfing_ratio {
            return Ok(NONE);
        }

        if prev.is_bearish() && curr.is_bullish() && curr.open <= prev.close && curr.close >= prev.open
        {
            Ok(BULLISH)
        } else if prev.is_bullish()
            && curr.is_bearish()
            && curr.open >= prev.close
            && curr.close <= prev.open
        {
            Ok(BEARISH)
        } else {
            Ok(NONE)
        }
    }

    /// Piercing Line / Dark Cloud Cover
    fn penetration(&self, prev: Candle, curr: Candle) -> i32 {
        let prev_mid = prev.midpoint();
        match self.pattern {
            BuiltinPattern::PiercingLine
                if prev.is_bearish()
                    && curr.is_bullish()
                    && curr.open < prev.close
                    && curr.close > prev_mid
                    && curr.close < prev.open =>
            {
                BULLISH
            }
            BuiltinPattern::DarkCloudCover
                if prev.is_bullish()
                    && curr.is_bearish()
                    && curr.open > prev.close
                    && curr.close < prev_mid
                    && curr.close > prev.open =>
            {
                BEARISH
            }
            _ => NONE,
        }
    }

    /// Tweezer Bottom / Top
    fn tweezer(&self, prev: Candle, curr: Candle) -> i32 {
        let tolerance = prev.range() * self.config.tweezer_tolerance;
        if prev.is_bearish() && curr.is_bullish() && (prev.low - curr.low).abs() <= tolerance {
            BULLISH
        } else if prev.is_bullish() && curr.is_bearish() && (prev.high - curr.high).abs() <= tolerance
        {
            BEARISH
        } else {
            NONE
        }
    }

    fn triple(&self, first: Candle, second: Candle, third: Candle) -> i32 {
        let small_middle = second.body() < first.body() / dec!(3);
        let first_mid = first.midpoint();

        match self.pattern {
            BuiltinPattern::MorningStar
                if first.is_bearish()
                    && small_middle
                    && third.is_bullish()
                    && third.close > first_mid =>
            {
                BULLISH
            }
            BuiltinPattern::EveningStar
                if first.is_bullish()
                    && small_middle
                    && third.is_bearish()
                    && third.close < first_mid =>
            {
                BEARISH
            }
            BuiltinPattern::ThreeWhiteSoldiers
                if first.is_bullish()
                    && second.is_bullish()
                    && third.is_bullish()
                    && second.close > first.close
                    && third.close > second.close
                    && second.open > first.open
                    && third.open > second.open =>
            {
                BULLISH
            }
            BuiltinPattern::ThreeBlackCrows
                if first.is_bearish()
                    && second.is_bearish()
                    && third.is_bearish()
                    && second.close < first.close
                    && third.close < second.close
                    && second.open < first.open
                    && third.open < second.open =>
            {
                BEARISH
            }
            BuiltinPattern::AbandonedBaby if second.is_doji(self.config.doji_body_ratio) => {
                // 갭으로 분리된 도지
                if first.is_bearish()
                    && third.is_bullish()
                    && second.high < first.low
                    && second.high < third.low
                {
                    BULLISH
                } else if first.is_bullish()
                    && third.is_bearish()
                    && second.low > first.high
                    && second.low > third.high
                {
                    BEARISH
                } else {
                    NONE
                }
            }
            _ => NONE,
        }
    }
}

impl PatternDetector for BuiltinDetector {
    fn name(&self) -> &str {
        self.pattern.name()
    }

    fn detect(&self, ohlc: &OhlcSeries) -> DetectorResult<Vec<i32>> {
        ensure_aligned(ohlc)?;
        (0..ohlc.len()).map(|i| self.signal_at(ohlc, i)).collect()
    }
}

/// Harami (직전 몸통 안에 갇힌 반대 색 캔들)
fn harami(prev: Candle, curr: Candle) -> i32 {
    if curr.body() >= prev.body() {
        return NONE;
    }
    if prev.is_bearish() && curr.is_bullish() && curr.open > prev.close && curr.close < prev.open {
        BULLISH
    } else if prev.is_bullish()
        && curr.is_bearish()
        && curr.open < prev.close
        && curr.close > prev.open
    {
        BEARISH
    } else {
        NONE
    }
}

/// Spinning Top (짧은 몸통, 긴 양쪽 꼬리). 방향은 캔들 색을 따릅니다.
fn spinning_top(candle: Candle) -> i32 {
    let range = candle.range();
    if range.is_zero() {
        return NONE;
    }
    let body_ratio = candle.body() / range;
    let upper_ratio = candle.upper_shadow() / range;
    let lower_ratio = candle.lower_shadow() / range;

    if body_ratio < dec!(0.3) && upper_ratio > dec!(0.3) && lower_ratio > dec!(0.3) {
        if candle.is_bearish() {
            BEARISH
        } else {
            BULLISH
        }
    } else {
        NONE
    }
}

fn direction(candle: Candle) -> i32 {
    if candle.is_bullish() {
        BULLISH
    } else if candle.is_bearish() {
        BEARISH
    } else {
        NONE
    }
}

fn checked_ratio(numerator: Decimal, denominator: Decimal) -> DetectorResult<Decimal> {
    numerator.checked_div(denominator).ok_or_else(|| {
        DetectorError::CalculationError(format!("비율 계산 실패: {} / {}", numerator, denominator))
    })
}
