//! 패턴 평가 시스템의 에러 타입.
//!
//! 이 모듈은 평가 파이프라인 전반에서 사용되는 에러 타입을 정의합니다.
//! 코어 단계(시그널 테이블 생성, 성과 집계)의 이상 상황은 대부분 기본값으로
//! 처리되며, 여기 정의된 에러는 호출자가 반드시 알아야 하는 경우에만 사용됩니다.

use thiserror::Error;

/// 핵심 평가 에러.
#[derive(Debug, Error)]
pub enum CsevalError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 감지기 출력 길이 불일치
    #[error("패턴 '{pattern}' 출력 길이 불일치: 입력 {expected}개, 출력 {actual}개")]
    ShapeMismatch {
        pattern: String,
        expected: usize,
        actual: usize,
    },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 평가 작업을 위한 Result 타입.
pub type CsevalResult<T> = Result<T, CsevalError>;

impl From<serde_json::Error> for CsevalError {
    fn from(err: serde_json::Error) -> Self {
        CsevalError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CsevalError {
    fn from(err: std::io::Error) -> Self {
        CsevalError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for CsevalError {
    fn from(err: config::ConfigError) -> Self {
        CsevalError::Config(err.to_string())
    }
}
