//! Conversion of caller-supplied numbers into exact [`Num`] values.
//!
//! Integers and rationals are already exact and pass through untouched.
//! Floats and decimal text are converted exactly and then bounded to the
//! closest fraction whose denominator does not exceed the configured limit,
//! so repeated float round trips cannot blow up the denominators.

use num_traits::{One, Signed, Zero};
use tracing::trace;

use super::parse::parse_decimal;
use super::term::Term;
use super::value::HyperValue;
use super::{Num, NumComponent};
use crate::error::{HyperError, Result};

pub const DEFAULT_MAX_DENOMINATOR: u64 = 100_000_000_000_000;

/// A number as it crosses the public API, before canonicalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Numeric {
    Integer(NumComponent),
    Rational(Num),
    Float(f64),
    /// fixed-point decimal text such as `"-2.75"`
    Decimal(String),
}

macro_rules! numeric_from_int {
    ($($type:ty),*) => {
        $(impl From<$type> for Numeric {
            fn from(n: $type) -> Self {
                Numeric::Integer(NumComponent::from(n))
            }
        })*
    };
}

numeric_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize);

impl From<NumComponent> for Numeric {
    fn from(n: NumComponent) -> Self {
        Numeric::Integer(n)
    }
}

impl From<Num> for Numeric {
    fn from(n: Num) -> Self {
        Numeric::Rational(n)
    }
}

impl From<&Num> for Numeric {
    fn from(n: &Num) -> Self {
        Numeric::Rational(n.clone())
    }
}

impl From<f64> for Numeric {
    fn from(n: f64) -> Self {
        Numeric::Float(n)
    }
}

impl From<f32> for Numeric {
    fn from(n: f32) -> Self {
        Numeric::Float(n.into())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canonicalizer {
    max_denominator: NumComponent,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self {
            max_denominator: NumComponent::from(DEFAULT_MAX_DENOMINATOR),
        }
    }
}

impl Canonicalizer {
    pub fn new(max_denominator: impl Into<NumComponent>) -> Result<Self> {
        let max_denominator = max_denominator.into();
        if max_denominator < NumComponent::one() {
            return Err(HyperError::InvalidPrecision);
        }
        Ok(Self { max_denominator })
    }

    pub fn max_denominator(&self) -> &NumComponent {
        &self.max_denominator
    }

    pub fn canonicalize(&self, n: impl Into<Numeric>) -> Result<Num> {
        match n.into() {
            Numeric::Integer(n) => Ok(Num::from_integer(n)),
            Numeric::Rational(n) => Ok(n),
            Numeric::Float(f) => {
                let exact = Num::from_float(f).ok_or(HyperError::NonFinite(f))?;
                Ok(self.bound(exact))
            }
            Numeric::Decimal(text) => {
                let exact = parse_decimal(&text).ok_or(HyperError::Parse(text))?;
                Ok(self.bound(exact))
            }
        }
    }

    /// Canonicalizes both fields and applies the term smart constructor.
    pub fn term(&self, value: impl Into<Numeric>, exp: impl Into<Numeric>) -> Result<HyperValue> {
        Ok(Term::new(self.canonicalize(value)?, self.canonicalize(exp)?))
    }

    pub fn real(&self, value: impl Into<Numeric>) -> Result<HyperValue> {
        Ok(HyperValue::Real(self.canonicalize(value)?))
    }

    /// Closest fraction to `n` with a denominator no larger than the bound.
    /// Precision beyond the bound is dropped silently.
    pub fn bound(&self, n: Num) -> Num {
        if n.denom() <= &self.max_denominator {
            return n;
        }
        let bounded = limit_denominator(&n.abs(), &self.max_denominator);
        let bounded = if n.is_negative() { -bounded } else { bounded };
        trace!(exact = %n, bounded = %bounded, "rounded to bounded denominator");
        bounded
    }
}

// continued fraction expansion of a positive rational, stopping before the
// convergent denominators pass the bound, then picking the closer of the last
// convergent and the best semiconvergent
fn limit_denominator(n: &Num, max_denominator: &NumComponent) -> Num {
    let (mut p0, mut q0) = (NumComponent::zero(), NumComponent::one());
    let (mut p1, mut q1) = (NumComponent::one(), NumComponent::zero());
    let mut numer = n.numer().clone();
    let mut denom = n.denom().clone();
    loop {
        let a = &numer / &denom;
        let q2 = &q0 + &a * &q1;
        if &q2 > max_denominator {
            break;
        }
        let p2 = &p0 + &a * &p1;
        p0 = std::mem::replace(&mut p1, p2);
        q0 = std::mem::replace(&mut q1, q2);
        let remainder = &numer - &a * &denom;
        numer = std::mem::replace(&mut denom, remainder);
        if denom.is_zero() {
            break;
        }
    }
    let k = (max_denominator - &q0) / &q1;
    let semiconvergent = Num::new(&p0 + &k * &p1, &q0 + &k * &q1);
    let convergent = Num::new(p1, q1);
    if (&convergent - n).abs() <= (&semiconvergent - n).abs() {
        convergent
    } else {
        semiconvergent
    }
}

#[test]
fn exact_inputs_pass_through_test() {
    let canon = Canonicalizer::new(10).unwrap();
    assert_eq!(canon.canonicalize(7).unwrap(), num!(7));
    assert_eq!(canon.canonicalize(num!(1, 1000)).unwrap(), num!(1, 1000));
}

#[test]
fn float_matches_exact_test() {
    let canon = Canonicalizer::default();
    assert_eq!(canon.canonicalize(0.5).unwrap(), num!(1, 2));
    assert_eq!(canon.canonicalize(0.1).unwrap(), num!(1, 10));
    assert_eq!(canon.canonicalize(1.0 / 3.0).unwrap(), num!(1, 3));
    assert_eq!(canon.canonicalize(-2.75f32).unwrap(), num!(-11, 4));
}

#[test]
fn decimal_input_test() {
    let canon = Canonicalizer::default();
    assert_eq!(canon.canonicalize(Numeric::Decimal("-2.75".into())).unwrap(), num!(-11, 4));
    assert_eq!(
        canon.canonicalize(Numeric::Decimal("0.3333333333333333333333".into())).unwrap(),
        num!(1, 3)
    );
    assert!(matches!(
        canon.canonicalize(Numeric::Decimal("abc".into())),
        Err(HyperError::Parse(_))
    ));
}

#[test]
fn bound_truncates_silently_test() {
    let pi = std::f64::consts::PI;
    assert_eq!(Canonicalizer::new(100).unwrap().canonicalize(pi).unwrap(), num!(311, 99));
    assert_eq!(Canonicalizer::new(1000).unwrap().canonicalize(pi).unwrap(), num!(355, 113));
    assert_eq!(Canonicalizer::new(1000).unwrap().canonicalize(-pi).unwrap(), num!(-355, 113));
    assert_eq!(Canonicalizer::new(1).unwrap().canonicalize(2.6).unwrap(), num!(3));
}

#[test]
fn rejects_bad_input_test() {
    assert!(matches!(Canonicalizer::new(0), Err(HyperError::InvalidPrecision)));
    let canon = Canonicalizer::default();
    assert!(matches!(canon.canonicalize(f64::NAN), Err(HyperError::NonFinite(_))));
    assert!(matches!(canon.canonicalize(f64::INFINITY), Err(HyperError::NonFinite(_))));
}

#[test]
fn term_boundary_test() {
    let canon = Canonicalizer::default();
    assert_eq!(canon.term(0.0, 3).unwrap(), HyperValue::Real(num!(0)));
    assert_eq!(canon.term(2.5, 0).unwrap(), HyperValue::Real(num!(5, 2)));
    assert_eq!(canon.term(0.25, -1).unwrap(), Term::new(num!(1, 4), num!(-1)));
}
