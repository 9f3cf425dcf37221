//! 데이터 모듈 오류 타입.

use cseval_core::CsevalError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 파일 입출력 오류
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 파싱 오류
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 필수 컬럼 누락
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// 잘못된 기간
    #[error("Invalid date range: {start} > {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

impl From<DataError> for CsevalError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Io(e) => CsevalError::Io(e.to_string()),
            other => CsevalError::Data(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
