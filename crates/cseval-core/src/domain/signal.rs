//! 패턴 시그널 테이블.
//!
//! 패턴별 감지 결과를 (패턴, 종목, 날짜) 단위의 긴 형식 테이블로 표현합니다.
//! 한 날짜에 여러 패턴이 동시에 발생할 수 있습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::bar::DerivedBar;

/// 단일 패턴 시그널.
///
/// `signal`은 감지기가 낸 부호 있는 정수로, 양수는 강세, 음수는 약세입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSignal {
    /// 패턴 이름
    pub pattern: String,
    /// 감지기 시그널 값
    pub signal: i32,
    /// 시그널이 발생한 봉
    pub bar: DerivedBar,
}

impl PatternSignal {
    /// 새 시그널 행을 생성합니다.
    pub fn new(pattern: impl Into<String>, signal: i32, bar: DerivedBar) -> Self {
        Self {
            pattern: pattern.into(),
            signal,
            bar,
        }
    }

    /// 거래일.
    pub fn date(&self) -> NaiveDate {
        self.bar.bar.date
    }

    /// 종목 코드.
    pub fn ticker(&self) -> &str {
        &self.bar.bar.ticker
    }

    /// 다음 거래일 수익률 부호 (마지막 봉이면 None).
    pub fn sign_next_day_return(&self) -> Option<i8> {
        self.bar.sign_next_day_return
    }

    /// 시그널 방향 (-1, 0, 1).
    pub fn direction(&self) -> i8 {
        self.signal.signum() as i8
    }
}

/// 패턴 시그널 테이블.
///
/// 행 순서는 생성 순서를 그대로 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalTable {
    rows: Vec<PatternSignal>,
}

impl SignalTable {
    /// 빈 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 행 추가.
    pub fn push(&mut self, row: PatternSignal) {
        self.rows.push(row);
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 행 슬라이스.
    pub fn rows(&self) -> &[PatternSignal] {
        &self.rows
    }

    /// 행 반복자.
    pub fn iter(&self) -> std::slice::Iter<'_, PatternSignal> {
        self.rows.iter()
    }

    /// 테이블에 등장하는 패턴 이름 (처음 등장한 순서).
    pub fn patterns(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .map(|row| row.pattern.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// 특정 패턴의 행만 반환합니다.
    pub fn rows_for<'a>(
        &'a self,
        pattern: &'a str,
    ) -> impl Iterator<Item = &'a PatternSignal> + 'a {
        self.rows.iter().filter(move |row| row.pattern == pattern)
    }
}

impl From<Vec<PatternSignal>> for SignalTable {
    fn from(rows: Vec<PatternSignal>) -> Self {
        Self { rows }
    }
}

impl FromIterator<PatternSignal> for SignalTable {
    fn from_iter<I: IntoIterator<Item = PatternSignal>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SignalTable {
    type Item = PatternSignal;
    type IntoIter = std::vec::IntoIter<PatternSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a SignalTable {
    type Item = &'a PatternSignal;
    type IntoIter = std::slice::Iter<'a, PatternSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
