//! 캔들스틱 패턴 평가 CLI 라이브러리.

pub mod commands;

pub use commands::*;
