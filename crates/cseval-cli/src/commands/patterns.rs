//! 등록된 패턴 목록 조회 명령어.

use cseval_analytics::BuiltinPattern;
use cseval_core::Metric;

/// 내장 패턴 목록 출력.
pub fn print_patterns() {
    println!("\n🕯️  내장 캔들스틱 패턴");
    println!("═══════════════════════════════════════════");
    println!("{:<24} {:>6}", "패턴", "봉 수");
    println!("───────────────────────────────────────────");

    for pattern in BuiltinPattern::ALL {
        println!("{:<24} {:>6}", pattern.name(), pattern.candle_count());
    }

    println!("───────────────────────────────────────────");
    println!("총 {} 개", BuiltinPattern::ALL.len());

    println!("\n📐 차트 지표");
    let metrics: Vec<&str> = Metric::ALL.iter().map(|m| m.column_name()).collect();
    println!("  {}", metrics.join(", "));
}
