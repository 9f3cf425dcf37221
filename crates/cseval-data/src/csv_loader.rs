//! CSV 일봉 데이터 로더.
//!
//! 예상 형식: 헤더가 있는 CSV. 컬럼명은 설정의 매핑을 거쳐 표준 이름
//! (`ticker, date, open, high, low, close, volume|vol`)으로 변환됩니다.
//! `ticker` 컬럼이 없으면 종목 필터 값이나 파일 이름을 종목 코드로 사용합니다.
//! gzip으로 압축된 파일(`.csv.gz`)은 자동으로 풀어서 읽습니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use cseval_data::{CsvBarLoader, LoadOptions};
//!
//! let loader = CsvBarLoader::new(LoadOptions::default().with_ticker("AAPL"));
//! let (bars, report) = loader.load_path("data/daily.csv")?;
//! ```

use chrono::NaiveDate;
use cseval_core::{default_column_map, Compression, IngestionConfig, PriceBar};
use flate2::read::GzDecoder;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{DataError, Result};

/// 로드 옵션.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// 원본 컬럼명 → 표준 컬럼명
    pub column_map: BTreeMap<String, String>,
    /// 날짜 형식
    pub date_format: String,
    /// 종목 필터
    pub ticker: Option<String>,
    /// 시작일 (포함)
    pub start_date: Option<NaiveDate>,
    /// 종료일 (포함)
    pub end_date: Option<NaiveDate>,
    /// 압축 형식
    pub compression: Compression,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            column_map: default_column_map(),
            date_format: "%Y-%m-%d".to_string(),
            ticker: None,
            start_date: None,
            end_date: None,
            compression: Compression::default(),
        }
    }
}

impl LoadOptions {
    /// 종목 필터 설정.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// 기간 필터 설정. 두 날짜가 모두 있어야 적용됩니다.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

impl From<&IngestionConfig> for LoadOptions {
    fn from(config: &IngestionConfig) -> Self {
        Self {
            column_map: config.column_map.clone(),
            date_format: config.date_format.clone(),
            ticker: config.ticker.clone(),
            start_date: config.start_date,
            end_date: config.end_date,
            compression: config.compression,
        }
    }
}

/// 로드 결과 요약.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// 읽은 데이터 행 수
    pub rows_read: usize,
    /// 결측/파싱 실패로 제거된 행 수
    pub missing_dropped: usize,
    /// 종목/기간 필터로 제외된 행 수
    pub filtered_out: usize,
    /// 중복 (종목, 날짜)로 제거된 행 수
    pub duplicates_dropped: usize,
    /// 최종 행 수
    pub rows_kept: usize,
}

/// 표준 컬럼 위치.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    ticker: Option<usize>,
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

/// CSV 일봉 로더.
#[derive(Debug, Clone, Default)]
pub struct CsvBarLoader {
    options: LoadOptions,
}

impl CsvBarLoader {
    /// 새 로더를 생성합니다.
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// 파일에서 일봉을 로드합니다.
    ///
    /// `Compression::Infer`이면 `.gz` 확장자나 gzip 매직 바이트가 있을 때 압축을 풉니다.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<(Vec<PriceBar>, LoadReport)> {
        let path = path.as_ref();
        let mut file = BufReader::new(File::open(path)?);
        let gzip = match self.options.compression {
            Compression::Gzip => true,
            Compression::None => false,
            Compression::Infer => {
                has_gz_extension(path) || file.fill_buf()?.starts_with(&GZIP_MAGIC)
            }
        };

        info!(gzip, "Loading daily bars from {}", path.display());
        let fallback = fallback_ticker(path);
        if gzip {
            self.load_reader_with_fallback(GzDecoder::new(file), fallback)
        } else {
            self.load_reader_with_fallback(file, fallback)
        }
    }

    /// 임의의 reader에서 일봉을 로드합니다.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<(Vec<PriceBar>, LoadReport)> {
        self.load_reader_with_fallback(reader, None)
    }

    fn load_reader_with_fallback<R: Read>(
        &self,
        reader: R,
        fallback_ticker: Option<String>,
    ) -> Result<(Vec<PriceBar>, LoadReport)> {
        let date_range = self.date_range()?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = self.resolve_columns(&headers)?;

        let default_ticker = self
            .options
            .ticker
            .clone()
            .or(fallback_ticker)
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let mut report = LoadReport::default();
        let mut bars = Vec::new();

        for (line_no, record) in rdr.records().enumerate() {
            let record = record?;
            report.rows_read += 1;

            let Some(bar) = self.parse_record(&record, &columns, &default_ticker) else {
                debug!(line = line_no + 2, "Dropping row with missing or invalid values");
                report.missing_dropped += 1;
                continue;
            };

            if !self.matches_filters(&bar, date_range) {
                report.filtered_out += 1;
                continue;
            }

            bars.push(bar);
        }

        // (종목, 날짜) 정렬 후 중복 제거. 안정 정렬이므로 파일상 첫 행이 남음
        bars.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.date.cmp(&b.date)));
        let before = bars.len();
        bars.dedup_by(|later, earlier| later.ticker == earlier.ticker && later.date == earlier.date);
        report.duplicates_dropped = before - bars.len();
        report.rows_kept = bars.len();

        if report.duplicates_dropped > 0 {
            warn!(
                "Dropped {} duplicate (ticker, date) rows",
                report.duplicates_dropped
            );
        }

        info!(
            rows_read = report.rows_read,
            missing_dropped = report.missing_dropped,
            filtered_out = report.filtered_out,
            rows_kept = report.rows_kept,
            "Daily bars loaded"
        );

        Ok((bars, report))
    }

    /// 기간 필터를 검증합니다. 한쪽만 지정되면 무시합니다.
    fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        match (self.options.start_date, self.options.end_date) {
            (Some(start), Some(end)) if start > end => {
                Err(DataError::InvalidDateRange { start, end })
            }
            (Some(start), Some(end)) => Ok(Some((start, end))),
            (None, None) => Ok(None),
            _ => {
                warn!("Date filter ignored: both start and end dates are required");
                Ok(None)
            }
        }
    }

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<ColumnIndex> {
        let canonical: Vec<String> = headers
            .iter()
            .map(|h| {
                self.options
                    .column_map
                    .get(h)
                    .or_else(|| {
                        // 설정 파일을 거친 키는 소문자로 바뀌어 있을 수 있음
                        self.options
                            .column_map
                            .iter()
                            .find(|(from, _)| from.eq_ignore_ascii_case(h))
                            .map(|(_, to)| to)
                    })
                    .cloned()
                    .unwrap_or_else(|| h.to_lowercase())
            })
            .collect();

        let find = |name: &str| canonical.iter().position(|c| c == name);
        let require =
            |name: &str| find(name).ok_or_else(|| DataError::MissingColumn(name.to_string()));

        Ok(ColumnIndex {
            ticker: find("ticker"),
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume")
                .or_else(|| find("vol"))
                .ok_or_else(|| DataError::MissingColumn("volume".to_string()))?,
        })
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        columns: &ColumnIndex,
        default_ticker: &str,
    ) -> Option<PriceBar> {
        let field = |idx: usize| record.get(idx).filter(|s| !s.is_empty());

        let ticker = match columns.ticker {
            Some(idx) => field(idx)?.to_string(),
            None => default_ticker.to_string(),
        };
        let date = NaiveDate::parse_from_str(field(columns.date)?, &self.options.date_format).ok()?;

        let open = parse_price(field(columns.open)?)?;
        let high = parse_price(field(columns.high)?)?;
        let low = parse_price(field(columns.low)?)?;
        let close = parse_price(field(columns.close)?)?;
        let volume = parse_volume(field(columns.volume)?)?;

        Some(PriceBar {
            ticker,
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    fn matches_filters(&self, bar: &PriceBar, date_range: Option<(NaiveDate, NaiveDate)>) -> bool {
        if let Some(ticker) = &self.options.ticker {
            if &bar.ticker != ticker {
                return false;
            }
        }

        match date_range {
            Some((start, end)) => start <= bar.date && bar.date <= end,
            None => true,
        }
    }
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn has_gz_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// 파일 이름에서 종목 코드 후보를 만듭니다 (`aapl.csv.gz` → `AAPL`).
fn fallback_ticker(path: &Path) -> Option<String> {
    let name = if has_gz_extension(path) {
        Path::new(path.file_stem()?)
    } else {
        path
    };
    name.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_uppercase)
}

/// 양수 가격 파싱. 지수 표기도 허용합니다.
fn parse_price(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;
    (value > Decimal::ZERO).then_some(value)
}

/// 거래량 파싱. 소수점 이하는 버립니다.
fn parse_volume(raw: &str) -> Option<u64> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}
