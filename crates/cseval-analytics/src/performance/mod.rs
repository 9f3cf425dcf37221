//! 패턴 성과 분석 모듈
//!
//! 시그널 테이블을 패턴별 방향 예측 성과로 집계합니다.
//!
//! # 모듈 구성
//!
//! - [`aggregator`]: TP/FP 라벨링, 패턴별 집계, 정렬
//! - [`wilson`]: 윌슨 점수 신뢰구간
//! - [`report`]: 보고서 출력 (텍스트, CSV, JSON)

pub mod aggregator;
pub mod report;
pub mod wilson;

pub use aggregator::*;
pub use report::*;
pub use wilson::*;
