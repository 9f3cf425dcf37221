//! # Cseval Core
//!
//! 캔들스틱 패턴 성과 평가 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 평가 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 데이터 (PriceBar) 및 파생 수익률 (DerivedBar)
//! - 패턴 시그널 테이블 (PatternSignal, SignalTable)
//! - 패턴별 성과 집계 결과 (PatternPerformance)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
