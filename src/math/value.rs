use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::Zero;
use tracing::debug;

use super::canonical::Canonicalizer;
use super::expression::Expression;
use super::term::{pow_num, Term};
use super::Num;
use crate::error::{HyperError, Result};

/// Any hyperreal number, in the narrowest shape that holds it.
///
/// Arithmetic on `HyperValue` always hands back the collapsed form, so a
/// product like `ε · ω` is `Real(1)` and never a one-term expression.
/// Structural equality relies on that: an `Expression` variant built by hand
/// with no terms does not compare equal to the matching `Real`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HyperValue {
    Real(Num),
    Infinitesimal(Term),
    Expression(Expression),
}

impl HyperValue {
    pub fn zero() -> Self {
        HyperValue::Real(Num::zero())
    }

    pub fn is_real(&self) -> bool {
        matches!(self, HyperValue::Real(_))
    }

    /// Standard part. For a lone term this is its raw coefficient, see
    /// [`Term::st`].
    pub fn st(&self) -> &Num {
        match self {
            HyperValue::Real(x) => x,
            HyperValue::Infinitesimal(t) => t.st(),
            HyperValue::Expression(e) => e.st(),
        }
    }

    pub fn simplify(self) -> Self {
        match self {
            HyperValue::Expression(e) => e.simplify(),
            HyperValue::Infinitesimal(t) => t.simplify(),
            real => real,
        }
    }

    pub fn checked_div(&self, rhs: &HyperValue) -> Result<HyperValue> {
        match (self, rhs) {
            (_, HyperValue::Real(d)) if d.is_zero() => Err(HyperError::DivisionByZero),
            (HyperValue::Real(a), HyperValue::Real(b)) => Ok(HyperValue::Real(a / b)),
            (HyperValue::Infinitesimal(t), HyperValue::Real(s)) => t.div_scalar(s),
            (HyperValue::Expression(e), HyperValue::Real(s)) => {
                Ok(e.div_scalar(s)?.simplify())
            }
            (HyperValue::Real(s), HyperValue::Infinitesimal(t)) => Ok(t.divide_into(s)),
            (HyperValue::Infinitesimal(a), HyperValue::Infinitesimal(b)) => Ok(a.div_term(b)),
            (HyperValue::Expression(e), HyperValue::Infinitesimal(t)) => {
                Ok(e.div_term(t).simplify())
            }
            (_, HyperValue::Expression(e)) => match e.clone().simplify() {
                HyperValue::Expression(e) => {
                    debug!(divisor = %e, "rejected division by a multi-term expression");
                    Err(HyperError::unsupported("division", format!("the divisor {e}")))
                }
                collapsed => self.checked_div(&collapsed),
            },
        }
    }

    pub fn pow(&self, n: &Num) -> Result<HyperValue> {
        self.pow_with(n, &Canonicalizer::default())
    }

    pub fn pow_with(&self, n: &Num, canon: &Canonicalizer) -> Result<HyperValue> {
        match self {
            HyperValue::Real(x) => Ok(HyperValue::Real(pow_num(x, n, canon)?)),
            HyperValue::Infinitesimal(t) => t.pow_with(n, canon),
            HyperValue::Expression(e) => match e.clone().simplify() {
                HyperValue::Expression(e) => match e.pow(n) {
                    Ok(power) => Ok(power.simplify()),
                    Err(err) => {
                        debug!(%err, "rejected power");
                        Err(err)
                    }
                },
                collapsed => collapsed.pow_with(n, canon),
            },
        }
    }
}

impl From<Num> for HyperValue {
    fn from(n: Num) -> Self {
        HyperValue::Real(n)
    }
}

impl From<Term> for HyperValue {
    fn from(t: Term) -> Self {
        HyperValue::Infinitesimal(t)
    }
}

impl From<Expression> for HyperValue {
    fn from(e: Expression) -> Self {
        e.simplify()
    }
}

impl Add for &HyperValue {
    type Output = HyperValue;

    fn add(self, rhs: &HyperValue) -> HyperValue {
        match (self, rhs) {
            (HyperValue::Real(a), HyperValue::Real(b)) => HyperValue::Real(a + b),
            (HyperValue::Infinitesimal(t), other) | (other, HyperValue::Infinitesimal(t)) => {
                t.add_value(other)
            }
            (HyperValue::Expression(e), other) | (other, HyperValue::Expression(e)) => {
                e.add(other).simplify()
            }
        }
    }
}

impl Sub for &HyperValue {
    type Output = HyperValue;

    fn sub(self, rhs: &HyperValue) -> HyperValue {
        self + &-rhs
    }
}

impl Mul for &HyperValue {
    type Output = HyperValue;

    fn mul(self, rhs: &HyperValue) -> HyperValue {
        match (self, rhs) {
            (HyperValue::Real(a), HyperValue::Real(b)) => HyperValue::Real(a * b),
            (HyperValue::Infinitesimal(t), HyperValue::Real(s))
            | (HyperValue::Real(s), HyperValue::Infinitesimal(t)) => t.scale(s),
            (HyperValue::Infinitesimal(a), HyperValue::Infinitesimal(b)) => a.mul_term(b),
            (HyperValue::Expression(e), HyperValue::Real(s))
            | (HyperValue::Real(s), HyperValue::Expression(e)) => e.scale(s).simplify(),
            (HyperValue::Expression(e), HyperValue::Infinitesimal(t))
            | (HyperValue::Infinitesimal(t), HyperValue::Expression(e)) => e.mul_term(t).simplify(),
            (HyperValue::Expression(a), HyperValue::Expression(b)) => a.mul(b).simplify(),
        }
    }
}

impl Neg for &HyperValue {
    type Output = HyperValue;

    fn neg(self) -> HyperValue {
        match self {
            HyperValue::Real(x) => HyperValue::Real(-x),
            HyperValue::Infinitesimal(t) => HyperValue::Infinitesimal(-t),
            HyperValue::Expression(e) => HyperValue::Expression(-e),
        }
    }
}

impl Neg for HyperValue {
    type Output = HyperValue;

    fn neg(self) -> HyperValue {
        -&self
    }
}

// owned and mixed operands forward to the by-reference impls
macro_rules! forward_binop {
    ($($trait:ident, $method:ident);*) => {
        $(
            impl $trait for HyperValue {
                type Output = HyperValue;

                fn $method(self, rhs: HyperValue) -> HyperValue {
                    (&self).$method(&rhs)
                }
            }

            impl $trait<&HyperValue> for HyperValue {
                type Output = HyperValue;

                fn $method(self, rhs: &HyperValue) -> HyperValue {
                    (&self).$method(rhs)
                }
            }

            impl $trait<HyperValue> for &HyperValue {
                type Output = HyperValue;

                fn $method(self, rhs: HyperValue) -> HyperValue {
                    self.$method(&rhs)
                }
            }
        )*
    };
}

forward_binop!(Add, add; Sub, sub; Mul, mul);

impl std::iter::Sum for HyperValue {
    fn sum<I: Iterator<Item = HyperValue>>(iter: I) -> Self {
        Expression::from_summands(iter).simplify()
    }
}

impl std::iter::Product for HyperValue {
    fn product<I: Iterator<Item = HyperValue>>(iter: I) -> Self {
        iter.fold(HyperValue::Real(num!(1)), |acc, x| acc * x)
    }
}

impl fmt::Display for HyperValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HyperValue::Real(x) => write!(f, "{x}"),
            HyperValue::Infinitesimal(t) => write!(f, "{t}"),
            HyperValue::Expression(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(test)]
fn eps(value: i64, exp: i64) -> HyperValue {
    Term::new(num!(value), num!(exp))
}

#[cfg(test)]
fn real(value: i64) -> HyperValue {
    HyperValue::Real(num!(value))
}

#[test]
fn add_test() {
    assert_eq!(real(2) + real(3), real(5));
    assert_eq!(eps(2, 1) + eps(3, 1), eps(5, 1));
    assert_eq!(eps(2, 1) + real(0), eps(2, 1));
    assert_eq!(real(0) + eps(2, 1), eps(2, 1));
    let mixed = eps(1, 1) + real(4);
    assert!(matches!(mixed, HyperValue::Expression(_)));
    assert_eq!(mixed.to_string(), "4 + ε");
}

#[test]
fn additive_inverse_test() {
    let t = eps(3, -2);
    assert_eq!(&t + &-&t, real(0));
    let e = real(5) + eps(3, 1) + eps(7, -1);
    let zero = &e - &e;
    assert_eq!(zero, real(0));
    assert!(zero.st().is_zero());
    assert_eq!(&e + &real(0), e);
}

#[test]
fn st_test() {
    let e = real(5) + eps(3, 1) + eps(7, -1);
    assert_eq!(e.st(), &num!(5));
}

#[test]
fn sub_collapses_test() {
    // ε - 5 - ε² then adding back 5 and ε² leaves ε
    let e = eps(1, 1) - real(5) - eps(1, 2);
    assert_eq!(e.to_string(), "-5 + ε + -ε²");
    assert_eq!(e + real(5) + eps(1, 2), eps(1, 1));
}

#[test]
fn mul_test() {
    assert_eq!(eps(1, 1) * eps(1, -1), real(1));
    assert_eq!(real(3) * eps(2, 2), eps(6, 2));
    assert_eq!(eps(2, 2) * real(0), real(0));
    let x = real(1) + eps(1, 1);
    assert_eq!(&x * &x, real(1) + eps(2, 1) + eps(1, 2));
    // (ω + 1)·ε = 1 + ε
    assert_eq!((eps(1, -1) + real(1)) * eps(1, 1), real(1) + eps(1, 1));
}

#[test]
fn div_test() {
    assert_eq!(real(1).checked_div(&eps(1, 1)).unwrap(), eps(1, -1));
    assert_eq!(eps(6, 2).checked_div(&eps(3, 2)).unwrap(), real(2));
    assert_eq!(eps(6, 2).checked_div(&real(3)).unwrap(), eps(2, 2));
    let e = real(2) + eps(4, 1);
    assert_eq!(e.checked_div(&real(2)).unwrap(), real(1) + eps(2, 1));
    assert_eq!(e.checked_div(&eps(2, 1)).unwrap(), eps(1, -1) + real(2));
}

#[test]
fn div_errors_test() {
    let e = real(2) + eps(4, 1);
    assert!(matches!(e.checked_div(&real(0)), Err(HyperError::DivisionByZero)));
    assert!(matches!(eps(1, 1).checked_div(&real(0)), Err(HyperError::DivisionByZero)));
    assert!(matches!(real(1).checked_div(&e), Err(HyperError::Unsupported { .. })));
    // a hand-built single-term expression still divides
    let lone = HyperValue::Expression(Expression::from_summands([eps(2, 1)]));
    assert_eq!(real(4).checked_div(&lone).unwrap(), eps(2, -1));
}

#[test]
fn pow_test() {
    assert_eq!(real(2).pow(&num!(-2)).unwrap(), HyperValue::Real(num!(1, 4)));
    assert!(matches!(real(0).pow(&num!(-1)), Err(HyperError::DivisionByZero)));
    assert_eq!(eps(3, 1).pow(&num!(2)).unwrap(), eps(9, 2));
    let x = real(1) + eps(1, 1);
    assert_eq!(x.pow(&num!(0)).unwrap(), real(1));
    assert_eq!(x.pow(&num!(2)).unwrap(), &x * &x);
    assert!(matches!(x.pow(&num!(-1)), Err(HyperError::Unsupported { .. })));
    assert!(matches!(real(2).pow(&num!(2_000_000_000)), Err(HyperError::Unsupported { .. })));
}

#[test]
fn power_consistency_test() {
    let x = real(2) + eps(1, 1) + eps(-1, -1);
    for m in 0..4 {
        for n in 0..4 {
            let lhs = x.pow(&num!(m + n)).unwrap();
            let rhs = x.pow(&num!(m)).unwrap() * x.pow(&num!(n)).unwrap();
            assert_eq!(lhs, rhs, "m = {m}, n = {n}");
        }
    }
}

#[test]
fn sum_product_test() {
    let total: HyperValue = vec![eps(3, 2), eps(4, 2), real(1)].into_iter().sum();
    assert_eq!(total, real(1) + eps(7, 2));
    let product: HyperValue = vec![eps(2, 1), eps(3, 1), real(2)].into_iter().product();
    assert_eq!(product, eps(12, 2));
}

#[test]
fn equality_across_shapes_test() {
    assert_ne!(real(1), eps(1, 1));
    assert_ne!(eps(1, 1), eps(1, 2));
    assert_ne!(eps(1, 1), real(1) + eps(1, 1));
}
