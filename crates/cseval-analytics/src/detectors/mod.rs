//! 캔들스틱 패턴 감지기.
//!
//! 감지기는 같은 길이의 OHLC 배열을 받아 같은 길이의 부호 있는 정수 배열을
//! 반환합니다. 양수는 강세, 음수는 약세, 0은 패턴 없음입니다.
//! 내장 감지기는 TA-Lib 관례대로 ±100을 사용합니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use cseval_analytics::detectors::DetectorRegistry;
//!
//! let mut registry = DetectorRegistry::with_builtin();
//! registry.register_fn("always_bullish", |ohlc| Ok(vec![100; ohlc.len()]))?;
//!
//! for name in registry.names() {
//!     println!("{}", name);
//! }
//! ```

mod builtin;
mod candle;
mod registry;

use cseval_core::OhlcSeries;
use thiserror::Error;

pub use builtin::{BuiltinDetector, BuiltinPattern, PatternConfig};
pub use registry::DetectorRegistry;

/// 감지기 오류.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 감지 결과 타입.
pub type DetectorResult<T> = Result<T, DetectorError>;

/// 패턴 감지 기능.
///
/// 반환 배열은 입력과 길이가 같고 위치로 정렬되어야 합니다.
/// 길이가 다르면 시그널 테이블 생성 단계에서 해당 패턴이 제외됩니다.
pub trait PatternDetector: Send + Sync {
    /// 패턴 이름 (레지스트리 키).
    fn name(&self) -> &str;

    /// OHLC 배열에 대해 봉별 시그널을 계산합니다.
    fn detect(&self, ohlc: &OhlcSeries) -> DetectorResult<Vec<i32>>;
}

/// 클로저 기반 감지기.
pub struct FnDetector<F> {
    name: String,
    func: F,
}

impl<F> FnDetector<F>
where
    F: Fn(&OhlcSeries) -> DetectorResult<Vec<i32>> + Send + Sync,
{
    /// 새 클로저 감지기를 생성합니다.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> PatternDetector for FnDetector<F>
where
    F: Fn(&OhlcSeries) -> DetectorResult<Vec<i32>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, ohlc: &OhlcSeries) -> DetectorResult<Vec<i32>> {
        ensure_aligned(ohlc)?;
        (self.func)(ohlc)
    }
}

impl<F> std::fmt::Debug for FnDetector<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnDetector").field("name", &self.name).finish()
    }
}

/// 감지기 호출 전 입력 검증.
pub(crate) fn ensure_aligned(ohlc: &OhlcSeries) -> DetectorResult<()> {
    if ohlc.is_aligned() {
        Ok(())
    } else {
        Err(DetectorError::InvalidInput(
            "시가, 고가, 저가, 종가 데이터의 길이가 일치하지 않습니다".to_string(),
        ))
    }
}
