//! 年龄段分级表的性质测试：任意 (age, heart_rate) 组合下，
//! 分级结果必须与查表边界严格一致。

use heart_capture_wasm::classify::{band_for_age, heart_rate_concerning, parse_age};
use proptest::prelude::*;

proptest! {
    #[test]
    fn classification_matches_band_table(age in 1u8..=120, bpm in 20.0f64..220.0) {
        let band = band_for_age(age).expect("band covers 1-120");
        let expected = bpm < band.min_bpm || bpm > band.max_bpm;
        prop_assert_eq!(heart_rate_concerning(bpm, age), expected);
    }

    #[test]
    fn band_edges_are_inclusive(age in 1u8..=120) {
        let band = band_for_age(age).unwrap();
        prop_assert!(!heart_rate_concerning(band.min_bpm, age));
        prop_assert!(!heart_rate_concerning(band.max_bpm, age));
        prop_assert!(heart_rate_concerning(band.min_bpm - 0.5, age));
        prop_assert!(heart_rate_concerning(band.max_bpm + 0.5, age));
    }

    #[test]
    fn parse_age_roundtrips_valid_range(age in 1u16..=120) {
        prop_assert_eq!(parse_age(&age.to_string()), Ok(age as u8));
    }

    #[test]
    fn parse_age_rejects_out_of_range(age in prop_oneof![Just(0i64), 121i64..100_000]) {
        prop_assert!(parse_age(&age.to_string()).is_err());
    }
}
