//! 도메인 타입 속성 테스트.

use chrono::{Duration, NaiveDate};
use cseval_core::{decimal_sign, DerivedBar, OhlcSeries, PatternSignal, PriceBar, SignalTable};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const PATTERNS: [&str; 3] = ["hammer", "doji", "engulfing"];

fn derived(ticker: &str, offset: i64, close: Decimal) -> DerivedBar {
    DerivedBar {
        bar: PriceBar {
            ticker: ticker.to_string(),
            date: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap() + Duration::days(offset),
            open: dec!(10),
            high: close.max(dec!(10)) + dec!(1),
            low: close.min(dec!(10)) - dec!(1),
            close,
            volume: 1,
        },
        intraday_return: (close - dec!(10)) / dec!(10),
        sign_intraday_return: decimal_sign(close - dec!(10)),
        log_return: 0.0,
        next_intraday_return: None,
        sign_next_day_return: Some(1),
    }
}

proptest! {
    #[test]
    fn decimal_sign_matches_integer_sign(value in -1_000_000i64..1_000_000) {
        prop_assert_eq!(decimal_sign(Decimal::from(value)) as i64, value.signum());
    }

    #[test]
    fn ohlc_series_is_aligned(closes in prop::collection::vec(1u32..500, 0..64)) {
        let bars: Vec<DerivedBar> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| derived("AAA", i as i64, Decimal::from(*c)))
            .collect();
        let ohlc = OhlcSeries::from_bars(&bars);
        prop_assert!(ohlc.is_aligned());
        prop_assert_eq!(ohlc.len(), bars.len());
        for (close, bar) in ohlc.close.iter().zip(&bars) {
            prop_assert_eq!(*close, bar.bar.close);
        }
    }

    #[test]
    fn patterns_partition_every_row(rows in prop::collection::vec((0..PATTERNS.len(), -1i32..=1), 0..100)) {
        let table: SignalTable = rows
            .iter()
            .enumerate()
            .map(|(i, (p, s))| PatternSignal::new(PATTERNS[*p], *s * 100, derived("AAA", i as i64, dec!(11))))
            .collect();

        let names = table.patterns();
        let mut unique = names.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), names.len());

        let total: usize = names.iter().map(|name| table.rows_for(name).count()).sum();
        prop_assert_eq!(total, table.len());
        if let Some(first) = table.rows().first() {
            prop_assert_eq!(names[0], first.pattern.as_str());
        }
    }
}
