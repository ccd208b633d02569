#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

use loadgen::validation::{validate_buffer_size, validate_sleep_seconds};
use std::time::Duration;

#[test]
fn ok_zero_sleep() {
    assert_eq!(validate_sleep_seconds(0.0).expect("ok"), Duration::ZERO);
}

#[test]
fn ok_fractional_sleep() {
    assert_eq!(validate_sleep_seconds(0.25).expect("ok"), Duration::from_millis(250));
}

#[test]
fn err_negative_sleep() {
    assert!(validate_sleep_seconds(-0.5).is_err());
}

#[test]
fn err_non_finite_sleep() {
    assert!(validate_sleep_seconds(f64::NAN).is_err());
    assert!(validate_sleep_seconds(f64::INFINITY).is_err());
}

#[test]
fn buffer_size_bounds() {
    assert!(validate_buffer_size(0).is_err());
    assert_eq!(validate_buffer_size(4096).expect("ok"), 4096);
}
