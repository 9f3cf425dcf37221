//! 패턴별 성과 집계 결과.
//!
//! 집계 실행마다 새로 생성되며 실행 간 상태를 공유하지 않습니다.

use serde::{Deserialize, Serialize};

/// 패턴 하나의 방향 예측 성과.
///
/// `total_instances > 0`이면 `0 ≤ ci_lower ≤ center ≤ ci_upper ≤ 1`이 성립합니다.
/// `total_instances == 0`이면 비율과 구간 값은 모두 0입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternPerformance {
    /// 패턴 이름
    pub pattern: String,
    /// 방향을 맞힌 시그널 수
    #[serde(rename = "TP")]
    pub true_positive_count: u64,
    /// 방향을 틀린 시그널 수
    #[serde(rename = "FP")]
    pub false_positive_count: u64,
    /// TP + FP
    pub total_instances: u64,
    /// TP / total_instances
    pub precision: f64,
    /// 윌슨 구간 중심
    #[serde(rename = "center")]
    pub wilson_center: f64,
    /// 윌슨 구간 반폭
    #[serde(rename = "margin")]
    pub wilson_margin: f64,
    /// 신뢰구간 하한
    pub ci_lower: f64,
    /// 신뢰구간 상한
    pub ci_upper: f64,
}

impl PatternPerformance {
    /// 윌슨 중심값 (차트용 별칭 `TP_wilson`).
    pub fn tp_wilson(&self) -> f64 {
        self.wilson_center
    }

    /// 선택한 지표 값을 반환합니다.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalInstances => self.total_instances as f64,
            Metric::TruePositives => self.true_positive_count as f64,
            Metric::FalsePositives => self.false_positive_count as f64,
            Metric::Precision => self.precision,
            Metric::WilsonCenter => self.wilson_center,
            Metric::WilsonMargin => self.wilson_margin,
            Metric::CiLower => self.ci_lower,
            Metric::CiUpper => self.ci_upper,
        }
    }
}

/// 성과 테이블의 지표 컬럼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    TotalInstances,
    TruePositives,
    FalsePositives,
    Precision,
    WilsonCenter,
    WilsonMargin,
    CiLower,
    CiUpper,
}

impl Metric {
    /// 모든 지표.
    pub const ALL: [Metric; 8] = [
        Metric::TotalInstances,
        Metric::TruePositives,
        Metric::FalsePositives,
        Metric::Precision,
        Metric::WilsonCenter,
        Metric::WilsonMargin,
        Metric::CiLower,
        Metric::CiUpper,
    ];

    /// 테이블 컬럼명.
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::TotalInstances => "total_instances",
            Metric::TruePositives => "TP",
            Metric::FalsePositives => "FP",
            Metric::Precision => "precision",
            Metric::WilsonCenter => "TP_wilson",
            Metric::WilsonMargin => "margin",
            Metric::CiLower => "ci_lower",
            Metric::CiUpper => "ci_upper",
        }
    }

    /// 0~1 사이의 비율 지표인지 확인합니다.
    ///
    /// 비율 지표만 신뢰구간 오차 막대와 성과 구간을 의미 있게 표시할 수 있습니다.
    pub fn is_proportion(&self) -> bool {
        !matches!(
            self,
            Metric::TotalInstances | Metric::TruePositives | Metric::FalsePositives
        )
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_instances" => Ok(Metric::TotalInstances),
            "TP" | "tp" => Ok(Metric::TruePositives),
            "FP" | "fp" => Ok(Metric::FalsePositives),
            "precision" => Ok(Metric::Precision),
            "TP_wilson" | "tp_wilson" | "center" => Ok(Metric::WilsonCenter),
            "margin" => Ok(Metric::WilsonMargin),
            "ci_lower" => Ok(Metric::CiLower),
            "ci_upper" => Ok(Metric::CiUpper),
            _ => Err(format!(
                "Unknown metric: {}. Supported: total_instances, TP, FP, precision, TP_wilson, margin, ci_lower, ci_upper",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_round_trip_names() {
        for metric in Metric::ALL {
            assert_eq!(metric.column_name().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!("center".parse::<Metric>().unwrap(), Metric::WilsonCenter);
        assert!("sharpe".parse::<Metric>().is_err());
    }

    #[test]
    fn test_serialized_column_names() {
        let perf = PatternPerformance {
            pattern: "doji".to_string(),
            true_positive_count: 3,
            false_positive_count: 1,
            total_instances: 4,
            precision: 0.75,
            wilson_center: 0.6,
            wilson_margin: 0.3,
            ci_lower: 0.3,
            ci_upper: 0.9,
        };
        let json = serde_json::to_value(&perf).unwrap();
        assert_eq!(json["TP"], 3);
        assert_eq!(json["FP"], 1);
        assert_eq!(json["center"], 0.6);
        assert_eq!(perf.value(Metric::TruePositives), 3.0);
    }
}
