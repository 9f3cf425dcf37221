//! 분석 단계 에러 타입.

use cseval_core::CsevalError;
use thiserror::Error;

/// 분석 및 출력 에러.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// 코어 에러
    #[error(transparent)]
    Core(#[from] CsevalError),

    /// CSV 출력 에러
    #[error("CSV 출력 에러: {0}")]
    Csv(#[from] csv::Error),

    /// JSON 직렬화 에러
    #[error("JSON 직렬화 에러: {0}")]
    Json(#[from] serde_json::Error),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 분석 작업 Result 타입.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

impl From<AnalyticsError> for CsevalError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Core(inner) => inner,
            AnalyticsError::Csv(e) => CsevalError::Serialization(e.to_string()),
            AnalyticsError::Json(e) => CsevalError::Serialization(e.to_string()),
            AnalyticsError::Io(e) => CsevalError::Io(e.to_string()),
        }
    }
}
