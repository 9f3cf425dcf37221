//! 패턴 감지기 레지스트리.
//!
//! 등록 순서를 유지하며, 시그널 테이블의 패턴 순서도 이 순서를 따릅니다.

use std::sync::Arc;

use cseval_core::{CsevalError, CsevalResult, OhlcSeries};

use super::builtin::{BuiltinDetector, BuiltinPattern, PatternConfig};
use super::{DetectorResult, FnDetector, PatternDetector};

/// 감지기 레지스트리.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn PatternDetector>>,
}

impl DetectorRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 내장 감지기가 등록된 레지스트리를 생성합니다.
    pub fn with_builtin() -> Self {
        Self::with_builtin_config(PatternConfig::default())
    }

    /// 사용자 임계값으로 내장 감지기를 등록합니다.
    pub fn with_builtin_config(config: PatternConfig) -> Self {
        let detectors = BuiltinPattern::ALL
            .iter()
            .map(|pattern| {
                Arc::new(BuiltinDetector::with_config(*pattern, config.clone()))
                    as Arc<dyn PatternDetector>
            })
            .collect();
        Self { detectors }
    }

    /// 감지기를 등록합니다.
    ///
    /// 이미 같은 이름이 있으면 `InvalidInput` 에러를 반환합니다.
    pub fn register<D>(&mut self, detector: D) -> CsevalResult<()>
    where
        D: PatternDetector + 'static,
    {
        self.register_arc(Arc::new(detector))
    }

    /// 공유 감지기를 등록합니다.
    pub fn register_arc(&mut self, detector: Arc<dyn PatternDetector>) -> CsevalResult<()> {
        if self.contains(detector.name()) {
            return Err(CsevalError::InvalidInput(format!(
                "이미 등록된 패턴입니다: {}",
                detector.name()
            )));
        }
        self.detectors.push(detector);
        Ok(())
    }

    /// 클로저를 감지기로 등록합니다.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F) -> CsevalResult<()>
    where
        F: Fn(&OhlcSeries) -> DetectorResult<Vec<i32>> + Send + Sync + 'static,
    {
        self.register(FnDetector::new(name, func))
    }

    /// 이름으로 감지기를 조회합니다.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn PatternDetector>> {
        self.detectors.iter().find(|d| d.name() == name)
    }

    /// 등록 여부.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 등록된 패턴 이름 (등록 순서).
    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// 등록된 감지기 수.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// 감지기 반복자 (등록 순서).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PatternDetector>> {
        self.detectors.iter()
    }

    /// 지정한 이름만 남긴 레지스트리를 반환합니다.
    ///
    /// 결과 순서는 요청 순서를 따릅니다. 등록되지 않은 이름이 있으면
    /// `NotFound` 에러를 반환합니다. 중복 요청은 한 번만 포함됩니다.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> CsevalResult<Self> {
        let mut selected = Self::new();
        for name in names {
            let name = name.as_ref();
            let detector = self
                .get(name)
                .ok_or_else(|| CsevalError::NotFound(format!("등록되지 않은 패턴: {}", name)))?;
            if !selected.contains(name) {
                selected.detectors.push(Arc::clone(detector));
            }
        }
        Ok(selected)
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("patterns", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration_order() {
        let registry = DetectorRegistry::with_builtin();
        assert_eq!(registry.len(), BuiltinPattern::ALL.len());
        assert_eq!(registry.names()[0], "doji");
        assert_eq!(registry.names()[18], "abandoned_baby");
        assert!(registry.contains("engulfing"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = DetectorRegistry::with_builtin();
        let result = registry.register_fn("doji", |ohlc| Ok(vec![0; ohlc.len()]));
        assert!(matches!(result, Err(CsevalError::InvalidInput(_))));
        assert_eq!(registry.len(), BuiltinPattern::ALL.len());
    }

    #[test]
    fn test_register_closure() {
        let mut registry = DetectorRegistry::new();
        registry
            .register_fn("always_up", |ohlc| Ok(vec![100; ohlc.len()]))
            .unwrap();

        let detector = registry.get("always_up").unwrap();
        let ohlc = OhlcSeries::default();
        assert!(detector.detect(&ohlc).unwrap().is_empty());
    }

    #[test]
    fn test_select_subset() {
        let registry = DetectorRegistry::with_builtin();
        let subset = registry.select(&["hammer", "doji", "hammer"]).unwrap();
        assert_eq!(subset.names(), vec!["hammer", "doji"]);

        let missing = registry.select(&["cup_and_handle"]);
        assert!(matches!(missing, Err(CsevalError::NotFound(_))));
    }
}
