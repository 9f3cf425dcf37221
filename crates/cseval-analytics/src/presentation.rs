//! 성과 막대 차트 데이터 구조.
//!
//! 렌더링 라이브러리에 의존하지 않는 차트 모델을 만들고,
//! Plotly figure JSON으로 직렬화합니다.
//!
//! # 구성 요소
//!
//! - 보고서 순서대로 정렬된 패턴별 막대
//! - 선택적 비대칭 오차 막대 (`ci_upper - 값`, `값 - ci_lower`)
//! - 선택적 성과 구간 배경 (`[0, 0.5)` 부진, `[0.5, 0.55)` 경계, `[0.55, 1.0]` 양호)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cseval_core::{ChartConfig, CsevalError, CsevalResult, Metric, PatternPerformance};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::Result;
use crate::performance::PerformanceReport;

/// 배경 구간 투명도.
const BAND_OPACITY: f64 = 0.4;

/// 성과 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    /// 0.5 미만
    Poor,
    /// 0.5 이상 0.55 미만
    Marginal,
    /// 0.55 이상 1.0 이하
    Good,
}

impl PerformanceBand {
    /// 낮은 구간부터 나열한 모든 구간.
    pub const ALL: [PerformanceBand; 3] = [
        PerformanceBand::Poor,
        PerformanceBand::Marginal,
        PerformanceBand::Good,
    ];

    /// 구간 경계 `(y0, y1)`.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            PerformanceBand::Poor => (0.0, 0.5),
            PerformanceBand::Marginal => (0.5, 0.55),
            PerformanceBand::Good => (0.55, 1.0),
        }
    }

    /// 배경 색상.
    pub fn color(&self) -> &'static str {
        match self {
            PerformanceBand::Poor => "red",
            PerformanceBand::Marginal => "yellow",
            PerformanceBand::Good => "green",
        }
    }

    /// 값이 속한 구간. [0, 1] 밖이면 None.
    pub fn classify(value: f64) -> Option<Self> {
        if !(0.0..=1.0).contains(&value) {
            None
        } else if value < 0.5 {
            Some(PerformanceBand::Poor)
        } else if value < 0.55 {
            Some(PerformanceBand::Marginal)
        } else {
            Some(PerformanceBand::Good)
        }
    }
}

/// 차트 옵션.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Y축 지표
    pub metric: Metric,
    /// 신뢰구간 오차 막대 표시
    pub error_bars: bool,
    /// 성과 구간 배경 표시
    pub performance_bands: bool,
    /// 제목 두 번째 줄
    pub title_suffix: String,
    /// 너비 (px)
    pub width: u32,
    /// 높이 (px)
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            metric: Metric::TotalInstances,
            error_bars: false,
            performance_bands: false,
            title_suffix: String::new(),
            width: 800,
            height: 800,
        }
    }
}

impl ChartOptions {
    /// 지표를 지정해 생성합니다.
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            ..Default::default()
        }
    }

    /// 오차 막대 설정.
    pub fn with_error_bars(mut self, enabled: bool) -> Self {
        self.error_bars = enabled;
        self
    }

    /// 성과 구간 설정.
    pub fn with_performance_bands(mut self, enabled: bool) -> Self {
        self.performance_bands = enabled;
        self
    }

    /// 제목 두 번째 줄 설정.
    pub fn with_title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = suffix.into();
        self
    }
}

impl TryFrom<&ChartConfig> for ChartOptions {
    type Error = CsevalError;

    fn try_from(config: &ChartConfig) -> CsevalResult<Self> {
        let metric = config
            .metric
            .parse::<Metric>()
            .map_err(CsevalError::InvalidInput)?;

        Ok(Self {
            metric,
            error_bars: config.error_bars,
            performance_bands: config.performance_bands,
            title_suffix: String::new(),
            width: config.width,
            height: config.height,
        })
    }
}

/// 패턴 하나의 막대.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    /// 패턴 이름 (X축)
    pub pattern: String,
    /// 지표 값 (Y축)
    pub value: f64,
    /// 위쪽 오차 (`ci_upper - 값`, 0 이상)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_plus: Option<f64>,
    /// 아래쪽 오차 (`값 - ci_lower`, 0 이상)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_minus: Option<f64>,
    /// 성과 구간
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<PerformanceBand>,
}

/// 성과 막대 차트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    /// 제목
    pub title: String,
    /// X축 제목
    pub x_axis_title: String,
    /// Y축 제목
    pub y_axis_title: String,
    /// 표시 지표
    pub metric: Metric,
    /// 막대 (보고서 순서)
    pub bars: Vec<ChartBar>,
    /// 표시할 배경 구간
    pub bands: Vec<PerformanceBand>,
    /// 너비 (px)
    pub width: u32,
    /// 높이 (px)
    pub height: u32,
}

impl BarChart {
    /// 성과 보고서에서 차트를 생성합니다.
    ///
    /// 횟수 지표에 오차 막대나 성과 구간을 요청하면 경고 후 표시하지 않습니다.
    pub fn from_report(report: &PerformanceReport, options: &ChartOptions) -> Self {
        Self::from_rows(report.rows(), options)
    }

    /// 성과 행에서 차트를 생성합니다.
    pub fn from_rows(rows: &[PatternPerformance], options: &ChartOptions) -> Self {
        let metric = options.metric;
        let proportion = metric.is_proportion();

        let error_bars = options.error_bars && proportion;
        if options.error_bars && !proportion {
            warn!(metric = %metric, "횟수 지표에는 신뢰구간 오차 막대를 표시하지 않음");
        }
        let show_bands = options.performance_bands && proportion;
        if options.performance_bands && !proportion {
            warn!(metric = %metric, "횟수 지표에는 성과 구간을 표시하지 않음");
        }

        let bars = rows
            .iter()
            .map(|row| {
                let value = row.value(metric);
                ChartBar {
                    pattern: row.pattern.clone(),
                    value,
                    error_plus: error_bars.then(|| (row.ci_upper - value).max(0.0)),
                    error_minus: error_bars.then(|| (value - row.ci_lower).max(0.0)),
                    band: if proportion {
                        PerformanceBand::classify(value)
                    } else {
                        None
                    },
                }
            })
            .collect::<Vec<_>>();

        let mut title = format!("{} for {} CS patterns", metric, bars.len());
        if !options.title_suffix.is_empty() {
            title.push_str("<br>");
            title.push_str(&options.title_suffix);
        }

        Self {
            title,
            x_axis_title: "CS Pattern".to_string(),
            y_axis_title: metric.to_string(),
            metric,
            bars,
            bands: if show_bands {
                PerformanceBand::ALL.to_vec()
            } else {
                Vec::new()
            },
            width: options.width,
            height: options.height,
        }
    }

    /// 오차 막대 표시 여부.
    pub fn has_error_bars(&self) -> bool {
        self.bars.iter().any(|bar| bar.error_plus.is_some())
    }

    /// Plotly figure JSON.
    pub fn to_plotly_json(&self) -> Value {
        let x: Vec<&str> = self.bars.iter().map(|bar| bar.pattern.as_str()).collect();
        let y: Vec<f64> = self.bars.iter().map(|bar| bar.value).collect();

        let mut trace = json!({
            "type": "bar",
            "name": self.metric.to_string(),
            "x": x,
            "y": y,
        });

        if self.has_error_bars() {
            let plus: Vec<f64> = self.bars.iter().map(|b| b.error_plus.unwrap_or(0.0)).collect();
            let minus: Vec<f64> = self.bars.iter().map(|b| b.error_minus.unwrap_or(0.0)).collect();
            trace["error_y"] = json!({
                "type": "data",
                "symmetric": false,
                "array": plus,
                "arrayminus": minus,
            });
        }

        let shapes: Vec<Value> = self
            .bands
            .iter()
            .map(|band| {
                let (y0, y1) = band.bounds();
                json!({
                    "type": "rect",
                    "xref": "paper",
                    "yref": "y",
                    "x0": 0,
                    "x1": 1,
                    "y0": y0,
                    "y1": y1,
                    "fillcolor": band.color(),
                    "opacity": BAND_OPACITY,
                    "line": { "width": 0 },
                    "layer": "below",
                })
            })
            .collect();

        json!({
            "data": [trace],
            "layout": {
                "title": { "text": self.title },
                "font": { "size": 18 },
                "legend": {
                    "yanchor": "top",
                    "y": 0.99,
                    "xanchor": "right",
                    "x": 0.99,
                    "font": { "size": 20 },
                },
                "xaxis": { "title": { "text": self.x_axis_title } },
                "yaxis": { "title": { "text": self.y_axis_title } },
                "autosize": false,
                "width": self.width,
                "height": self.height,
                "shapes": shapes,
            }
        })
    }

    /// Plotly JSON 파일로 저장합니다.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        file.write_all(serde_json::to_string_pretty(&self.to_plotly_json())?.as_bytes())?;
        info!(path = %path.as_ref().display(), bars = self.bars.len(), "차트 JSON 저장");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perf(pattern: &str, total: u64, center: f64, lower: f64, upper: f64) -> PatternPerformance {
        PatternPerformance {
            pattern: pattern.to_string(),
            true_positive_count: total / 2,
            false_positive_count: total - total / 2,
            total_instances: total,
            precision: 0.5,
            wilson_center: center,
            wilson_margin: (upper - lower) / 2.0,
            ci_lower: lower,
            ci_upper: upper,
        }
    }

    fn report() -> PerformanceReport {
        PerformanceReport::new(vec![
            perf("engulfing", 40, 0.6, 0.45, 0.75),
            perf("hammer", 10, 0.52, 0.3, 0.74),
            perf("doji", 4, 0.3, 0.1, 0.5),
        ])
    }

    #[test]
    fn test_band_classification() {
        assert_eq!(PerformanceBand::classify(0.0), Some(PerformanceBand::Poor));
        assert_eq!(PerformanceBand::classify(0.5), Some(PerformanceBand::Marginal));
        assert_eq!(PerformanceBand::classify(0.549), Some(PerformanceBand::Marginal));
        assert_eq!(PerformanceBand::classify(0.55), Some(PerformanceBand::Good));
        assert_eq!(PerformanceBand::classify(1.0), Some(PerformanceBand::Good));
        assert_eq!(PerformanceBand::classify(12.0), None);
    }

    #[test]
    fn test_title_and_order() {
        let options = ChartOptions::default().with_title_suffix("AAPL 2020-2023");
        let chart = BarChart::from_report(&report(), &options);

        assert_eq!(chart.title, "total_instances for 3 CS patterns<br>AAPL 2020-2023");
        assert_eq!(chart.x_axis_title, "CS Pattern");
        assert_eq!(chart.bars[0].pattern, "engulfing");
        assert_eq!(chart.bars[0].value, 40.0);
        assert_eq!((chart.width, chart.height), (800, 800));
    }

    #[test]
    fn test_asymmetric_error_bars() {
        let options = ChartOptions::new(Metric::WilsonCenter).with_error_bars(true);
        let chart = BarChart::from_report(&report(), &options);

        let hammer = &chart.bars[1];
        assert!((hammer.error_plus.unwrap() - 0.22).abs() < 1e-6);
        assert!((hammer.error_minus.unwrap() - 0.22).abs() < 1e-6);
        assert_eq!(hammer.band, Some(PerformanceBand::Marginal));

        let json = chart.to_plotly_json();
        assert_eq!(json["data"][0]["error_y"]["symmetric"], false);
        assert_eq!(json["layout"]["yaxis"]["title"]["text"], "TP_wilson");
    }

    #[test]
    fn test_error_bars_floor_at_zero() {
        // 정밀도가 구간 밖에 있을 수 있음
        let rows = vec![perf("marubozu", 3, 0.4, 0.6, 0.9)];
        let options = ChartOptions::new(Metric::Precision).with_error_bars(true);
        let chart = BarChart::from_rows(&rows, &options);
        assert_eq!(chart.bars[0].error_minus, Some(0.0));
    }

    #[test]
    fn test_count_metric_disables_intervals() {
        let options = ChartOptions::new(Metric::TotalInstances)
            .with_error_bars(true)
            .with_performance_bands(true);
        let chart = BarChart::from_report(&report(), &options);

        assert!(!chart.has_error_bars());
        assert!(chart.bands.is_empty());
        let json = chart.to_plotly_json();
        assert!(json["data"][0].get("error_y").is_none());
    }

    #[test]
    fn test_band_shapes() {
        let options = ChartOptions::new(Metric::WilsonCenter).with_performance_bands(true);
        let json = BarChart::from_report(&report(), &options).to_plotly_json();

        let shapes = json["layout"]["shapes"].as_array().unwrap();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0]["fillcolor"], "red");
        assert_eq!(shapes[2]["y0"], 0.55);
        assert_eq!(shapes[1]["opacity"], 0.4);
    }

    #[test]
    fn test_options_from_config() {
        let config = ChartConfig {
            metric: "ci_lower".to_string(),
            ..Default::default()
        };
        let options = ChartOptions::try_from(&config).unwrap();
        assert_eq!(options.metric, Metric::CiLower);

        let bad = ChartConfig {
            metric: "sharpe".to_string(),
            ..Default::default()
        };
        assert!(ChartOptions::try_from(&bad).is_err());
    }
}
