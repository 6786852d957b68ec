use clap::Parser;
use num_traits::Zero;

use crate::error::{HyperError, Result};
use crate::math::parse::{parse_exact, split_summand};
use crate::math::{Canonicalizer, HyperValue, Num, Numeric};

/// Exact arithmetic on hyperreal numbers.
///
/// A summand is `VALUE` or `VALUE@EXP`: `3` is a real, `1@1` is ε, `2@2` is
/// 2ε², `7@-1` is 7ω. Values may be integers, decimals or fractions `a/b`.
/// Put `--` before summands that start with a minus sign.
#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct Args {
    /// summed into the starting value, `ε - 5 - ε²` when none are given
    #[arg(allow_hyphen_values = true)]
    pub summands: Vec<String>,
    /// multiply by the sum of a comma separated summand list, repeatable
    #[arg(short, long, allow_hyphen_values = true)]
    pub times: Vec<String>,
    /// divide by the sum of a comma separated summand list, repeatable
    #[arg(short, long, allow_hyphen_values = true)]
    pub div: Vec<String>,
    /// raise the result to this power, applied after --times and --div
    #[arg(short, long, allow_hyphen_values = true)]
    pub pow: Option<String>,
    /// print only the standard part, the lead coefficient for a lone infinite term
    #[arg(long)]
    pub st: bool,
    /// append the result to the export file
    #[arg(short, long)]
    pub export: bool,
    /// export file, defaults to the configured one
    #[arg(short, long)]
    pub file: Option<String>,
    /// largest denominator kept when converting decimal input
    #[arg(long)]
    pub max_denominator: Option<u64>,
}

fn numeric(text: &str) -> Result<Numeric> {
    if text.contains('/') {
        let n = parse_exact(text).ok_or_else(|| HyperError::Parse(text.to_owned()))?;
        Ok(Numeric::Rational(n))
    } else {
        Ok(Numeric::Decimal(text.to_owned()))
    }
}

pub fn parse_summand(text: &str, canon: &Canonicalizer) -> Result<HyperValue> {
    match split_summand(text) {
        (value, None) => canon.real(numeric(value)?),
        (value, Some(exp)) => canon.term(numeric(value)?, numeric(exp)?),
    }
}

pub fn parse_sum<'a>(
    summands: impl IntoIterator<Item = &'a str>,
    canon: &Canonicalizer,
) -> Result<HyperValue> {
    summands
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_summand(s, canon))
        .sum()
}

// ε - 5 - ε²
fn demo_value(canon: &Canonicalizer) -> Result<HyperValue> {
    Ok(canon.term(1, 1)? - canon.real(5)? - canon.term(1, 2)?)
}

pub fn evaluate(args: &Args, canon: &Canonicalizer) -> Result<HyperValue> {
    let mut value = if args.summands.is_empty() {
        demo_value(canon)?
    } else {
        parse_sum(args.summands.iter().map(String::as_str), canon)?
    };
    for list in &args.times {
        value = value * parse_sum(list.split(','), canon)?;
    }
    for list in &args.div {
        value = value.checked_div(&parse_sum(list.split(','), canon)?)?;
    }
    if let Some(n) = &args.pow {
        let n: Num = parse_exact(n).ok_or_else(|| HyperError::Parse(n.clone()))?;
        value = value.pow_with(&n, canon)?;
    }
    Ok(value)
}

/// What `--st` prints. A lone infinitesimal term is 0; a lone infinite term
/// has no real standard part and reports its lead coefficient.
pub fn standard_part(value: &HyperValue) -> Num {
    match value {
        HyperValue::Infinitesimal(t) if t.is_infinitesimal() => Num::zero(),
        other => other.st().clone(),
    }
}

#[cfg(test)]
fn args(summands: &[&str]) -> Args {
    Args {
        summands: summands.iter().map(|s| s.to_string()).collect(),
        ..Args::default()
    }
}

#[test]
fn parse_summand_test() {
    let canon = Canonicalizer::default();
    assert_eq!(parse_summand("3", &canon).unwrap(), HyperValue::Real(num!(3)));
    assert_eq!(parse_summand("-2.5", &canon).unwrap(), HyperValue::Real(num!(-5, 2)));
    assert_eq!(parse_summand("1/3@2", &canon).unwrap().to_string(), "1/3ε²");
    assert_eq!(parse_summand("7@-1", &canon).unwrap().to_string(), "7ω");
    assert_eq!(parse_summand("4@0", &canon).unwrap(), HyperValue::Real(num!(4)));
    assert!(matches!(parse_summand("x@1", &canon), Err(HyperError::Parse(_))));
    assert!(matches!(parse_summand("1/0", &canon), Err(HyperError::Parse(_))));
}

#[test]
fn demo_test() {
    let value = evaluate(&Args::default(), &Canonicalizer::default()).unwrap();
    assert_eq!(value.to_string(), "-5 + ε + -ε²");
}

#[test]
fn evaluate_test() {
    let canon = Canonicalizer::default();
    let mut a = args(&["1", "1@1"]);
    a.pow = Some("2".to_owned());
    assert_eq!(evaluate(&a, &canon).unwrap().to_string(), "1 + 2ε + ε²");

    let mut b = args(&["5", "3@1", "7@-1"]);
    b.st = true;
    assert_eq!(evaluate(&b, &canon).unwrap().st(), &num!(5));

    let mut c = args(&["2", "4@1"]);
    c.times = vec!["1@-1".to_owned()];
    c.div = vec!["2".to_owned()];
    assert_eq!(evaluate(&c, &canon).unwrap().to_string(), "2 + ω");
}

#[test]
fn standard_part_test() {
    let canon = Canonicalizer::default();
    let st = |summands: &[&str]| standard_part(&evaluate(&args(summands), &canon).unwrap());
    assert_eq!(st(&["3@1"]), num!(0));
    assert_eq!(st(&["1@-1"]), num!(1));
    assert_eq!(st(&["5", "3@1"]), num!(5));
    assert_eq!(st(&["-2/3"]), num!(-2, 3));
}

#[test]
fn evaluate_errors_test() {
    let canon = Canonicalizer::default();
    let mut a = args(&["1", "1@1"]);
    a.div = vec!["1,1@1".to_owned()];
    assert!(matches!(evaluate(&a, &canon), Err(HyperError::Unsupported { .. })));

    let mut b = args(&["1", "1@1"]);
    b.pow = Some("-1".to_owned());
    assert!(matches!(evaluate(&b, &canon), Err(HyperError::Unsupported { .. })));

    let mut c = args(&["2"]);
    c.pow = Some("2000000000".to_owned());
    assert!(matches!(evaluate(&c, &canon), Err(HyperError::Unsupported { .. })));
}

#[test]
fn cli_parses_test() {
    let a = Args::try_parse_from(["hyperreal", "--times", "1,1@1", "-p", "3", "--", "-5", "1@1"])
        .unwrap();
    assert_eq!(a.summands, vec!["-5", "1@1"]);
    assert_eq!(a.times, vec!["1,1@1"]);
    assert_eq!(a.pow.as_deref(), Some("3"));
}
