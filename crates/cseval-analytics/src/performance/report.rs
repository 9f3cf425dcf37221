//! 성과 보고서 출력 (텍스트 표, CSV, JSON).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cseval_core::PatternPerformance;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// CSV 헤더.
pub const CSV_HEADER: [&str; 10] = [
    "pattern",
    "TP",
    "FP",
    "total_instances",
    "precision",
    "center",
    "margin",
    "ci_lower",
    "ci_upper",
    "TP_wilson",
];

/// 패턴별 성과 보고서.
///
/// 행은 `(total_instances, TP)` 내림차순으로 정렬되어 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    rows: Vec<PatternPerformance>,
}

impl PerformanceReport {
    /// 정렬된 행으로 보고서를 생성합니다.
    pub fn new(rows: Vec<PatternPerformance>) -> Self {
        Self { rows }
    }

    /// 행 슬라이스.
    pub fn rows(&self) -> &[PatternPerformance] {
        &self.rows
    }

    /// 패턴 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 행 반복자.
    pub fn iter(&self) -> std::slice::Iter<'_, PatternPerformance> {
        self.rows.iter()
    }

    /// 패턴 이름으로 조회합니다.
    pub fn get(&self, pattern: &str) -> Option<&PatternPerformance> {
        self.rows.iter().find(|row| row.pattern == pattern)
    }

    /// 전체 시그널 수.
    pub fn total_signals(&self) -> u64 {
        self.rows.iter().map(|row| row.total_instances).sum()
    }

    /// 고정폭 텍스트 표.
    pub fn summary_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:<22} {:>7} {:>7} {:>9} {:>10} {:>10} {:>10} {:>10}\n",
            "PATTERN", "TP", "FP", "TOTAL", "PRECISION", "TP_WILSON", "CI_LOWER", "CI_UPPER"
        ));
        output.push_str(&"-".repeat(90));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<22} {:>7} {:>7} {:>9} {:>10.4} {:>10.4} {:>10.4} {:>10.4}\n",
                row.pattern,
                row.true_positive_count,
                row.false_positive_count,
                row.total_instances,
                row.precision,
                row.tp_wilson(),
                row.ci_lower,
                row.ci_upper,
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "Total: {} patterns, {} signals",
            self.rows.len(),
            self.total_signals()
        ));
        output
    }

    /// CSV로 기록합니다.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(CSV_HEADER)?;
        for row in &self.rows {
            wtr.write_record(&[
                row.pattern.clone(),
                row.true_positive_count.to_string(),
                row.false_positive_count.to_string(),
                row.total_instances.to_string(),
                row.precision.to_string(),
                row.wilson_center.to_string(),
                row.wilson_margin.to_string(),
                row.ci_lower.to_string(),
                row.ci_upper.to_string(),
                row.tp_wilson().to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// CSV 파일로 저장합니다.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(file)?;
        info!(path = %path.as_ref().display(), rows = self.rows.len(), "CSV 보고서 저장");
        Ok(())
    }

    /// JSON 문자열.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    /// JSON 파일로 저장합니다.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        file.write_all(self.to_json()?.as_bytes())?;
        info!(path = %path.as_ref().display(), rows = self.rows.len(), "JSON 보고서 저장");
        Ok(())
    }
}

impl IntoIterator for PerformanceReport {
    type Item = PatternPerformance;
    type IntoIter = std::vec::IntoIter<PatternPerformance>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a PerformanceReport {
    type Item = &'a PatternPerformance;
    type IntoIter = std::slice::Iter<'a, PatternPerformance>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perf(pattern: &str, tp: u64, fp: u64) -> PatternPerformance {
        PatternPerformance {
            pattern: pattern.to_string(),
            true_positive_count: tp,
            false_positive_count: fp,
            total_instances: tp + fp,
            precision: 0.5,
            wilson_center: 0.5,
            wilson_margin: 0.35,
            ci_lower: 0.15,
            ci_upper: 0.85,
        }
    }

    #[test]
    fn test_csv_columns() {
        let report = PerformanceReport::new(vec![perf("engulfing", 2, 2)]);
        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "pattern,TP,FP,total_instances,precision,center,margin,ci_lower,ci_upper,TP_wilson"
        );
        assert_eq!(
            lines.next().unwrap(),
            "engulfing,2,2,4,0.5,0.5,0.35,0.15,0.85,0.5"
        );
    }

    #[test]
    fn test_summary_table() {
        let report = PerformanceReport::new(vec![perf("hammer", 3, 1), perf("doji", 1, 1)]);
        let table = report.summary_table();
        assert!(table.starts_with("PATTERN"));
        assert!(table.contains("hammer"));
        assert!(table.ends_with("Total: 2 patterns, 6 signals"));
    }

    #[test]
    fn test_json_output() {
        let report = PerformanceReport::new(vec![perf("harami", 1, 0)]);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["pattern"], "harami");
        assert_eq!(json[0]["TP"], 1);
        assert_eq!(report.get("harami").unwrap().total_instances, 1);
        assert!(report.get("doji").is_none());
    }
}
