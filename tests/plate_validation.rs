//! Reference behaviors for normalization, decoding, and validation.

use common::{CollapseMode, CountryCode, DEFAULT_CHARSET};
use recognition::decode::decode;
use recognition::engine::MockEngine;
use recognition::normalize::clean;
use recognition::PlateValidator;

#[test]
fn clean_is_idempotent_over_messy_inputs() {
    let inputs = [
        "ab-12 34",
        "  ABCD12  ",
        "ñ·x y·12!",
        "",
        "----",
        "lowercase123",
        "AB\u{00a0}12\u{2013}34",
    ];
    for input in inputs {
        let once = clean(input);
        assert_eq!(clean(&once), once, "clean not idempotent for {input:?}");
        assert!(once.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn dominant_sequence_decodes_to_reference_text() {
    // Classes A,A,B,1,2 at 0.95 with threshold 0.7 decode to "AB12".
    let scores = MockEngine::dominant_scores(DEFAULT_CHARSET.len(), &[10, 10, 11, 1, 2], 0.95);
    let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
    assert_eq!(decoded.text, "AB12");
    assert!((decoded.mean_confidence - 0.95).abs() < 1e-5);
}

#[test]
fn all_below_threshold_decodes_to_empty() {
    let scores = MockEngine::dominant_scores(DEFAULT_CHARSET.len(), &[10, 11, 12, 13], 0.6);
    let decoded = decode(&scores, DEFAULT_CHARSET, 0.7, CollapseMode::Accepted).unwrap();
    assert_eq!(decoded.text, "");
}

#[test]
fn chilean_checksum_rejects_abcd12() {
    // Weighted sum of A,B,C,D,1 is 118; expected check digit 3, not 2.
    let validator = PlateValidator::new(CountryCode::Cl);
    assert!(!validator.is_valid("ABCD12"));
}

#[test]
fn forbidden_substring_rejects_ass123() {
    let validator = PlateValidator::new(CountryCode::Cl);
    assert!(!validator.is_valid("ASS123"));
}

#[test]
fn old_format_xy1234_is_valid() {
    let validator = PlateValidator::new(CountryCode::Cl);
    assert!(validator.is_valid("XY1234"));
}

#[test]
fn score_reference_value() {
    let validator = PlateValidator::new(CountryCode::Cl);
    let score = validator.score("XY1234", 90.0);
    assert!((score - 81.0).abs() < 1e-4);
}
