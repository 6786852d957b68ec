use std::str::FromStr;

use num_traits::Zero;

use super::{Num, NumComponent};

// only parse b10 numbers: "12", "-3.25", "+.5"
pub fn parse_decimal(s: &str) -> Option<Num> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let parts = digits.split('.').collect::<Vec<&str>>();
    let magnitude = match parts.as_slice() {
        [int] => num!(parse_digits(int)?, 1),
        [int, fract] => {
            if int.is_empty() && fract.is_empty() {
                return None;
            }
            let int = if int.is_empty() { NumComponent::zero() } else { parse_digits(int)? };
            num!(int, 1) + parse_fract(fract)?
        }
        _ => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_digits(s: &str) -> Option<NumComponent> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    NumComponent::from_str(s).ok()
}

// the fractional digits are read as an integer over 10^len, so "05" is 5/100
fn parse_fract(s: &str) -> Option<Num> {
    if s.is_empty() {
        return Some(Num::zero());
    }
    let comp = parse_digits(s)?;
    let bound = num_traits::pow(NumComponent::from(10), s.len());
    Some(Num::new(comp, bound))
}

/// Reads an exact number written as an integer, a decimal or a fraction `a/b`.
pub fn parse_exact(s: &str) -> Option<Num> {
    match s.split_once('/') {
        Some((numer, denom)) => {
            let numer = parse_decimal(numer)?;
            let denom = parse_decimal(denom)?;
            if denom.is_zero() {
                return None;
            }
            Some(numer / denom)
        }
        None => parse_decimal(s),
    }
}

/// Splits a `VALUE@EXP` summand into its value and exponent text.
/// A summand without `@` is a plain real number.
pub fn split_summand(s: &str) -> (&str, Option<&str>) {
    match s.split_once('@') {
        Some((value, exp)) => (value.trim(), Some(exp.trim())),
        None => (s.trim(), None),
    }
}

#[test]
fn parse_test() {
    assert_eq!(parse_decimal("3.14159"), Some(num!(314159, 100000)));
    assert_eq!(parse_decimal("-3.14159"), Some(num!(-314159, 100000)));
    assert_eq!(parse_decimal("42"), Some(num!(42)));
    assert_eq!(parse_decimal("+.5"), Some(num!(1, 2)));
    assert_eq!(parse_decimal("1.05"), Some(num!(105, 100)));
}

#[test]
fn parse_rejects_garbage_test() {
    assert_eq!(parse_decimal(""), None);
    assert_eq!(parse_decimal("."), None);
    assert_eq!(parse_decimal("1.2.3"), None);
    assert_eq!(parse_decimal("--1"), None);
    assert_eq!(parse_decimal("1e5"), None);
    assert_eq!(parse_exact("1/0"), None);
}

#[test]
fn parse_fraction_test() {
    assert_eq!(parse_exact("-1/2"), Some(num!(-1, 2)));
    assert_eq!(parse_exact("6/4"), Some(num!(3, 2)));
    assert_eq!(parse_exact("0.5/2"), Some(num!(1, 4)));
}

#[test]
fn split_summand_test() {
    assert_eq!(split_summand("3@2"), ("3", Some("2")));
    assert_eq!(split_summand(" 7 @ -1 "), ("7", Some("-1")));
    assert_eq!(split_summand("-5"), ("-5", None));
}
