//! 윌슨 점수 신뢰구간.
//!
//! 표본 비율 `p̂ = k/n`에 대해:
//!
//! ```text
//! denom  = 1 + z²/n
//! center = (p̂ + z²/(2n)) / denom
//! margin = z · sqrt(p̂(1-p̂)/n + z²/(4n²)) / denom
//! ```
//!
//! 정규 근사 구간과 달리 표본이 작거나 비율이 0, 1에 가까워도 [0, 1]을 벗어나지 않습니다.

use serde::{Deserialize, Serialize};

/// 95% 신뢰수준의 표준정규 분위수 (97.5 백분위).
pub const Z_95: f64 = 1.959963984540054;

/// 윌슨 점수 구간.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WilsonInterval {
    /// 구간 중심
    pub center: f64,
    /// 구간 반폭
    pub margin: f64,
    /// 하한 (center - margin, [0, 1]로 제한)
    pub lower: f64,
    /// 상한 (center + margin, [0, 1]로 제한)
    pub upper: f64,
}

impl WilsonInterval {
    /// 95% 신뢰수준 구간.
    ///
    /// `trials == 0`이면 모든 값이 0인 구간을 반환합니다.
    pub fn from_counts(successes: u64, trials: u64) -> Self {
        Self::with_z(successes, trials, Z_95)
    }

    /// 임의의 z 값으로 구간을 계산합니다.
    pub fn with_z(successes: u64, trials: u64, z: f64) -> Self {
        if trials == 0 {
            return Self::default();
        }

        let n = trials as f64;
        let p = successes.min(trials) as f64 / n;
        let z2 = z * z;

        let denom = 1.0 + z2 / n;
        let center = (p + z2 / (2.0 * n)) / denom;
        let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;

        Self {
            center,
            margin,
            lower: (center - margin).clamp(0.0, 1.0),
            upper: (center + margin).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_single_success() {
        let ci = WilsonInterval::from_counts(1, 1);
        assert_close(ci.center, 0.6032746571886187);
        assert_close(ci.margin, 0.3967253428113813);
        assert_close(ci.lower, 0.20654931437723745);
        assert_close(ci.upper, 1.0);
    }

    #[test]
    fn test_half_of_four() {
        let ci = WilsonInterval::from_counts(2, 4);
        assert_close(ci.center, 0.5);
        assert_close(ci.margin, 0.34996101084785053);
        assert_close(ci.lower, 0.15003898915214947);
        assert_close(ci.upper, 0.8499610108478506);
    }

    #[test]
    fn test_zero_trials() {
        let ci = WilsonInterval::from_counts(0, 0);
        assert_eq!(ci, WilsonInterval::default());
        assert_eq!(ci.upper - ci.lower, 0.0);
    }

    #[test]
    fn test_bounds_clamped() {
        for (k, n) in [(0, 1), (0, 3), (7, 7), (3, 10), (1, 1000)] {
            let ci = WilsonInterval::from_counts(k, n);
            assert!(ci.lower >= 0.0 && ci.upper <= 1.0);
            assert!(ci.lower <= ci.center && ci.center <= ci.upper);
        }
        let none = WilsonInterval::from_counts(0, 3);
        assert!(none.lower.abs() < EPS);
        assert!(none.upper > 0.2);
    }

    #[test]
    fn test_wider_z_is_wider() {
        let narrow = WilsonInterval::with_z(30, 100, 1.0);
        let wide = WilsonInterval::from_counts(30, 100);
        assert!(wide.upper - wide.lower > narrow.upper - narrow.lower);
    }
}
