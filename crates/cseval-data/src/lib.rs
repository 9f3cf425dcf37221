//! 일봉 데이터 적재.
//!
//! 이 crate는 다음을 제공합니다:
//! - CSV 파일에서 OHLCV 일봉 데이터 로드
//! - 원본 컬럼명 → 표준 컬럼명 변환
//! - 종목/기간 필터링
//! - 결측 행 제거, (종목, 날짜) 정렬 및 중복 제거

pub mod csv_loader;
pub mod error;

pub use csv_loader::{CsvBarLoader, LoadOptions, LoadReport};
pub use error::{DataError, Result};
