//! 패턴별 방향 예측 성과 집계.
//!
//! 1. 시그널 행마다 다음 날 방향과 비교해 TP/FP 라벨 부여
//! 2. 패턴별 TP, FP 합산
//! 3. 윌슨 점수 구간 계산
//! 4. `(total_instances, TP)` 내림차순 정렬 (동률은 등장 순서 유지)

use std::collections::HashMap;

use cseval_core::{PatternPerformance, PatternSignal, SignalTable};
use tracing::{debug, info};

use super::report::PerformanceReport;
use super::wilson::WilsonInterval;

/// 시그널 행 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// 시그널 방향과 다음 날 방향이 일치
    TruePositive,
    /// 시그널 방향과 다음 날 방향이 불일치 (다음 날 값이 없는 경우 포함)
    FalsePositive,
    /// 시그널 값이 0이라 채점하지 않음
    Unscored,
}

/// 시그널 행에 라벨을 붙입니다.
///
/// 다음 날 부호가 없으면 일치할 수 없으므로 FalsePositive로 셉니다.
/// 다음 날 장중 수익률이 0(보합)이면 0이 아닌 시그널과 일치하지 않으므로 역시 FalsePositive입니다.
pub fn label_signal(signal: i32, sign_next_day_return: Option<i8>) -> Label {
    if signal == 0 {
        return Label::Unscored;
    }
    match sign_next_day_return {
        Some(next) if i32::from(next) == signal.signum() => Label::TruePositive,
        _ => Label::FalsePositive,
    }
}

/// 패턴별 카운트 누적값.
#[derive(Debug, Clone, Default)]
struct Tally {
    pattern: String,
    tp: u64,
    fp: u64,
}

impl Tally {
    fn into_performance(self) -> PatternPerformance {
        let total = self.tp + self.fp;
        let precision = if total == 0 {
            0.0
        } else {
            self.tp as f64 / total as f64
        };
        let ci = WilsonInterval::from_counts(self.tp, total);

        PatternPerformance {
            pattern: self.pattern,
            true_positive_count: self.tp,
            false_positive_count: self.fp,
            total_instances: total,
            precision,
            wilson_center: ci.center,
            wilson_margin: ci.margin,
            ci_lower: ci.lower,
            ci_upper: ci.upper,
        }
    }
}

/// 성과 집계기.
///
/// 상태가 없으며, 같은 입력에 대해 항상 같은 결과를 냅니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAggregator;

impl PerformanceAggregator {
    /// 새 집계기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 시그널 테이블을 패턴별 성과 보고서로 집계합니다.
    ///
    /// 입력이 비어 있으면 빈 보고서를 반환합니다.
    /// 테이블에 없는 패턴은 결과에도 나타나지 않습니다.
    pub fn aggregate(&self, table: &SignalTable) -> PerformanceReport {
        self.aggregate_rows(table.iter())
    }

    /// 시그널 행 반복자를 집계합니다.
    pub fn aggregate_rows<'a, I>(&self, rows: I) -> PerformanceReport
    where
        I: IntoIterator<Item = &'a PatternSignal>,
    {
        let mut tallies: Vec<Tally> = Vec::new();
        let mut index_of: HashMap<&'a str, usize> = HashMap::new();
        let mut missing_next = 0usize;
        let mut unscored = 0usize;

        for row in rows {
            let index = *index_of.entry(row.pattern.as_str()).or_insert_with(|| {
                tallies.push(Tally {
                    pattern: row.pattern.clone(),
                    ..Default::default()
                });
                tallies.len() - 1
            });

            if row.signal != 0 && row.sign_next_day_return().is_none() {
                missing_next += 1;
            }

            match label_signal(row.signal, row.sign_next_day_return()) {
                Label::TruePositive => tallies[index].tp += 1,
                Label::FalsePositive => tallies[index].fp += 1,
                Label::Unscored => unscored += 1,
            }
        }

        if missing_next > 0 {
            debug!(rows = missing_next, "다음 날 부호가 없는 시그널을 FP로 처리");
        }
        if unscored > 0 {
            debug!(rows = unscored, "시그널 값 0인 행은 채점하지 않음");
        }

        let mut rows: Vec<PatternPerformance> =
            tallies.into_iter().map(Tally::into_performance).collect();

        // 안정 정렬: 동률은 등장 순서 유지
        rows.sort_by(|a, b| {
            b.total_instances
                .cmp(&a.total_instances)
                .then_with(|| b.true_positive_count.cmp(&a.true_positive_count))
        });

        info!(patterns = rows.len(), "패턴 성과 집계 완료");
        PerformanceReport::new(rows)
    }
}
