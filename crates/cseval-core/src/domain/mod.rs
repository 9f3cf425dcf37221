//! 패턴 평가를 위한 도메인 모델.

mod bar;
mod performance;
mod signal;

pub use bar::*;
pub use performance::*;
pub use signal::*;
