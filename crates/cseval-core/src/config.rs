//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일 없이도 실행할 수 있습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 데이터 적재 설정
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 차트 설정
    #[serde(default)]
    pub chart: ChartConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 데이터 적재 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// 원본 컬럼명 → 표준 컬럼명 매핑
    #[serde(default = "default_column_map")]
    pub column_map: BTreeMap<String, String>,
    /// 날짜 형식 (chrono 포맷 문자열)
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// 종목 필터
    #[serde(default)]
    pub ticker: Option<String>,
    /// 시작일 (종료일과 함께 지정해야 적용됨)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// 종료일 (시작일과 함께 지정해야 적용됨)
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// 입력 파일 압축 형식
    #[serde(default)]
    pub compression: Compression,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            column_map: default_column_map(),
            date_format: default_date_format(),
            ticker: None,
            start_date: None,
            end_date: None,
            compression: Compression::default(),
        }
    }
}

/// 일별 주가 파일의 기본 컬럼 매핑.
pub fn default_column_map() -> BTreeMap<String, String> {
    [
        ("Ticker", "ticker"),
        ("DlyCalDt", "date"),
        ("DlyPrc", "prc"),
        ("DlyOpen", "open"),
        ("DlyHigh", "high"),
        ("DlyLow", "low"),
        ("DlyClose", "close"),
        ("DlyVol", "vol"),
        ("DlyPrcVol", "price_vol"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// 입력 파일 압축 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// `.gz` 확장자나 gzip 매직 바이트로 판단
    #[default]
    Infer,
    /// 압축 없음
    None,
    /// gzip
    Gzip,
}

impl std::str::FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "infer" | "auto" => Ok(Self::Infer),
            "none" => Ok(Self::None),
            "gzip" | "gz" => Ok(Self::Gzip),
            _ => Err(format!("Unknown compression: {}", s)),
        }
    }
}

/// 감지기 출력 길이 불일치 처리 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// 해당 패턴만 건너뛰고 경고를 남긴 뒤 계속 진행
    #[default]
    Skip,
    /// 즉시 실행 중단
    FailFast,
}

impl std::str::FromStr for MismatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "skip" => Ok(Self::Skip),
            "fail_fast" => Ok(Self::FailFast),
            _ => Err(format!("Unknown mismatch policy: {}", s)),
        }
    }
}

/// 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// 길이 불일치 처리 정책
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,
    /// 패턴 감지를 병렬로 실행할지 여부
    #[serde(default)]
    pub parallel: bool,
    /// 사용할 패턴 이름 목록 (비어 있으면 등록된 전체 패턴)
    #[serde(default)]
    pub patterns: Vec<String>,
    /// 샤프 비율 계산용 연간 무위험 이자율
    #[serde(default)]
    pub risk_free_rate: f64,
    /// 연간 기간 수 (일봉 기준 252)
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
}

fn default_periods_per_year() -> u32 {
    252
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mismatch_policy: MismatchPolicy::Skip,
            parallel: false,
            patterns: Vec::new(),
            risk_free_rate: 0.0,
            periods_per_year: default_periods_per_year(),
        }
    }
}

/// 차트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Y축 지표 컬럼명
    pub metric: String,
    /// 신뢰구간 오차 막대 표시 여부
    pub error_bars: bool,
    /// 성과 구간(poor/marginal/good) 배경 표시 여부
    pub performance_bands: bool,
    /// 차트 너비 (픽셀)
    pub width: u32,
    /// 차트 높이 (픽셀)
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            metric: "total_instances".to_string(),
            error_bars: false,
            performance_bands: false,
            width: 800,
            height: 800,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("CSEVAL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("analysis.patterns"),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
