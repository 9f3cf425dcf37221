//! 환경 변수 오버라이드 테스트.
//!
//! 환경 변수는 프로세스 전역이므로 다른 설정 테스트와 분리된 바이너리에서 실행합니다.

use cseval_core::{AppConfig, Compression, MismatchPolicy};

#[test]
fn test_env_overrides_list_and_scalars() {
    std::env::set_var("CSEVAL__ANALYSIS__PATTERNS", "hammer,doji");
    std::env::set_var("CSEVAL__ANALYSIS__MISMATCH_POLICY", "fail_fast");
    std::env::set_var("CSEVAL__INGESTION__COMPRESSION", "gzip");

    let config = AppConfig::load("/nonexistent/cseval/config.toml");

    std::env::remove_var("CSEVAL__ANALYSIS__PATTERNS");
    std::env::remove_var("CSEVAL__ANALYSIS__MISMATCH_POLICY");
    std::env::remove_var("CSEVAL__INGESTION__COMPRESSION");

    let config = config.unwrap();
    assert_eq!(config.analysis.patterns, vec!["hammer", "doji"]);
    assert_eq!(config.analysis.mismatch_policy, MismatchPolicy::FailFast);
    assert_eq!(config.ingestion.compression, Compression::Gzip);
    assert_eq!(config.analysis.periods_per_year, 252);
}
