#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// ============================================================================
// Rendering
// ============================================================================

#[test_case(42.0, "42" ; "small integer")]
#[test_case(-7.0, "-7" ; "negative integer")]
#[test_case(0.0, "0" ; "zero")]
#[test_case(-0.0, "0" ; "negative zero")]
#[test_case(2147483647.0, "2147483647" ; "i32 max")]
#[test_case(2147483648.0, "2147483648" ; "just past i32 range")]
#[test_case(3.0e9, "3000000000" ; "large integral uses fixed form")]
#[test_case(3.5, "3.500000" ; "fraction uses fixed form")]
#[test_case(-0.25, "-0.250000" ; "negative fraction")]
#[test_case(1.0e-7, "1.000000e-07" ; "tiny uses exponent form")]
#[test_case(15000000000.5, "1.500000e+10" ; "huge fraction uses exponent form")]
fn Number___display___renders_expected_text(value: f64, expected: &str) {
    let number = Number::new(value);

    assert_eq!(number.to_string(), expected);
}

#[test]
fn Number___exponent_form___keeps_six_fraction_digits_only() {
    let rendered = Number::new(1234567890.5).to_string();

    assert_eq!(rendered, "1.234568e+09");
    assert_eq!(parse_f64(&rendered), Some(1234568000.0));
}

#[test]
fn Number___display___non_finite_renders_null() {
    assert_eq!(Number::new(f64::NAN).to_string(), "null");
    assert_eq!(Number::new(f64::INFINITY).to_string(), "null");
}

#[test]
fn Number___is_integral___true_for_whole_values_in_range() {
    assert!(Number::new(10.0).is_integral());
    assert!(Number::new(-2147483648.0).is_integral());
}

#[test]
fn Number___is_integral___false_for_fractions_and_out_of_range() {
    assert!(!Number::new(0.5).is_integral());
    assert!(!Number::new(1.0e12).is_integral());
    assert!(!Number::new(f64::NAN).is_integral());
}

#[test]
fn Number___as_i32___saturates() {
    assert_eq!(Number::new(1.0e12).as_i32(), i32::MAX);
    assert_eq!(Number::new(-1.0e12).as_i32(), i32::MIN);
}

#[test]
fn Number___from_i32___keeps_both_projections() {
    let number = Number::from(-12);

    assert_eq!(number.as_i32(), -12);
    assert_eq!(number.as_f64(), -12.0);
}

// ============================================================================
// Text helpers
// ============================================================================

#[test_case("42", Some(42))]
#[test_case("  -17x", Some(-17))]
#[test_case("+5", Some(5))]
#[test_case("99999999999999999999", Some(i64::MAX))]
#[test_case("-99999999999999999999", Some(i64::MIN))]
#[test_case("-9223372036854775808", Some(i64::MIN))]
#[test_case("abc", None)]
#[test_case("", None)]
#[test_case("-", None)]
fn parse_i64___input___returns_expected(text: &str, expected: Option<i64>) {
    assert_eq!(parse_i64(text), expected);
}

#[test]
fn parse_f64___valid_text___parses() {
    assert_eq!(parse_f64(" 2.5 "), Some(2.5));
    assert_eq!(parse_f64("1e3"), Some(1000.0));
}

#[test]
fn parse_f64___invalid_text___returns_none() {
    assert_eq!(parse_f64("two"), None);
}
