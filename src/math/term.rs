use std::fmt;
use std::ops::Neg;

use num_traits::{One, Signed, ToPrimitive, Zero};

use super::canonical::Canonicalizer;
use super::expression::Expression;
use super::superscript::to_superscript;
use super::value::HyperValue;
use super::{Num, NumComponent};
use crate::error::{HyperError, Result};

/// A single monomial `value · ε^exp`.
///
/// A negative exponent reads as an infinite quantity, `value · ω^(-exp)`.
/// Terms only exist with a nonzero value and a nonzero exponent: the
/// constructor collapses anything else into a plain real.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Term {
    value: Num,
    exp: Num,
}

impl Term {
    /// `value · ε^exp`, or the plain real it degenerates to.
    pub fn new(value: Num, exp: Num) -> HyperValue {
        if value.is_zero() {
            HyperValue::Real(Num::zero())
        } else if exp.is_zero() {
            HyperValue::Real(value)
        } else {
            HyperValue::Infinitesimal(Term { value, exp })
        }
    }

    pub fn epsilon(value: Num) -> HyperValue {
        Self::new(value, Num::one())
    }

    pub fn omega(value: Num) -> HyperValue {
        Self::new(value, -Num::one())
    }

    pub fn value(&self) -> &Num {
        &self.value
    }

    pub fn exp(&self) -> &Num {
        &self.exp
    }

    pub fn into_parts(self) -> (Num, Num) {
        (self.value, self.exp)
    }

    pub fn is_infinite(&self) -> bool {
        self.exp.is_negative()
    }

    pub fn is_infinitesimal(&self) -> bool {
        self.exp.is_positive()
    }

    // terms built by struct literal skip the constructor checks
    pub fn simplify(self) -> HyperValue {
        Self::new(self.value, self.exp)
    }

    /// The lead coefficient. This is a raw accessor: the standard part of an
    /// infinitesimal term is 0, which callers check through [`Term::exp`].
    pub fn st(&self) -> &Num {
        &self.value
    }

    // ε^a · ε^b = ε^(a+b), and the ω encoding adds the same way
    pub fn mul_term(&self, other: &Term) -> HyperValue {
        Self::new(&self.value * &other.value, &self.exp + &other.exp)
    }

    pub fn scale(&self, factor: &Num) -> HyperValue {
        Self::new(&self.value * factor, self.exp.clone())
    }

    pub fn div_term(&self, other: &Term) -> HyperValue {
        Self::new(&self.value / &other.value, &self.exp - &other.exp)
    }

    pub fn div_scalar(&self, divisor: &Num) -> Result<HyperValue> {
        if divisor.is_zero() {
            return Err(HyperError::DivisionByZero);
        }
        Ok(Self::new(&self.value / divisor, self.exp.clone()))
    }

    /// `dividend / self`: the reciprocal of an order-n infinitesimal is an
    /// order-n infinity.
    pub fn divide_into(&self, dividend: &Num) -> HyperValue {
        Self::new(dividend / &self.value, -&self.exp)
    }

    pub fn pow(&self, n: &Num) -> Result<HyperValue> {
        self.pow_with(n, &Canonicalizer::default())
    }

    /// `value^n · ε^(exp·n)`. Rational powers of a coefficient that is not a
    /// perfect power go through floating point and `canon`.
    pub fn pow_with(&self, n: &Num, canon: &Canonicalizer) -> Result<HyperValue> {
        let value = pow_num(&self.value, n, canon)?;
        Ok(Self::new(value, &self.exp * n))
    }

    /// Adds any value to this term. Only a same-order term or zero keeps the
    /// result a term; everything else escalates to an expression.
    pub fn add_value(&self, other: &HyperValue) -> HyperValue {
        match other {
            HyperValue::Infinitesimal(t) if t.exp == self.exp => {
                Self::new(&self.value + &t.value, self.exp.clone())
            }
            HyperValue::Real(x) if x.is_zero() => HyperValue::Infinitesimal(self.clone()),
            _ => Expression::from_summands([HyperValue::Infinitesimal(self.clone()), other.clone()])
                .simplify(),
        }
    }

    pub fn sub_value(&self, other: &HyperValue) -> HyperValue {
        self.add_value(&-other)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term {
            value: -self.value,
            exp: self.exp,
        }
    }
}

impl Neg for &Term {
    type Output = Term;

    fn neg(self) -> Term {
        -self.clone()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coefficient = if self.value.is_one() {
            String::new()
        } else if (-&self.value).is_one() {
            "-".to_owned()
        } else {
            self.value.to_string()
        };
        let (symbol, order) = if self.exp.is_negative() {
            ('ω', -&self.exp)
        } else {
            ('ε', self.exp.clone())
        };
        let order = if order.is_one() { String::new() } else { to_superscript(&order) };
        write!(f, "{coefficient}{symbol}{order}")
    }
}

/// Largest power magnitude computed exactly. Bigger powers of anything but
/// 0 and ±1 grow the coefficient past any useful size.
pub const MAX_POWER: u32 = 10_000;

/// `base^n` for a rational `n`. Integer powers are exact; other powers are
/// exact only when `base` is a perfect power of the denominator of `n`.
pub(crate) fn pow_num(base: &Num, n: &Num, canon: &Canonicalizer) -> Result<Num> {
    if n.is_integer() {
        let e = n
            .to_integer()
            .to_i32()
            .ok_or_else(|| HyperError::unsupported("raising to this power", n))?;
        if base.is_zero() && e < 0 {
            return Err(HyperError::DivisionByZero);
        }
        if e.unsigned_abs() > MAX_POWER && !base.is_zero() && !base.abs().is_one() {
            return Err(HyperError::unsupported("raising to a power this large", n));
        }
        return Ok(base.pow(e));
    }
    let root = n
        .denom()
        .to_u32()
        .ok_or_else(|| HyperError::unsupported("taking this root", n))?;
    if base.is_negative() && root % 2 == 0 {
        return Err(HyperError::unsupported("taking an even root", base));
    }
    let roots = (exact_root(base.numer(), root), exact_root(base.denom(), root));
    if let (Some(numer), Some(denom)) = roots {
        return pow_num(&Num::new(numer, denom), &Num::from_integer(n.numer().clone()), canon);
    }
    // no exact root: approximate the magnitude, then restore the sign of an
    // odd root of a negative base
    let magnitude = base.abs().to_f64().zip(n.to_f64()).map(|(b, e)| b.powf(e));
    let magnitude = magnitude.ok_or_else(|| HyperError::unsupported("raising to this power", n))?;
    let negative = base.is_negative() && !(n.numer() % 2u32).is_zero();
    canon.canonicalize(if negative { -magnitude } else { magnitude })
}

fn exact_root(n: &NumComponent, root: u32) -> Option<NumComponent> {
    let r = n.abs().nth_root(root);
    if r.pow(root) == n.abs() {
        Some(if n.is_negative() { -r } else { r })
    } else {
        None
    }
}

#[cfg(test)]
fn term(value: i64, exp: i64) -> Term {
    match Term::new(num!(value), num!(exp)) {
        HyperValue::Infinitesimal(t) => t,
        other => panic!("expected a term, got {other}"),
    }
}

#[test]
fn collapse_test() {
    assert_eq!(Term::new(num!(0), num!(3)), HyperValue::Real(num!(0)));
    assert_eq!(Term::new(num!(0), num!(-2)), HyperValue::Real(num!(0)));
    assert_eq!(Term::new(num!(5), num!(0)), HyperValue::Real(num!(5)));
    assert_eq!(Term::new(num!(-1, 2), num!(0)), HyperValue::Real(num!(-1, 2)));
    assert!(matches!(Term::epsilon(num!(2)), HyperValue::Infinitesimal(_)));
}

#[test]
fn mul_test() {
    let product = term(3, 2).mul_term(&term(-2, -5));
    assert_eq!(product, Term::new(num!(-6), num!(-3)));
    // opposite orders cancel back to a real
    assert_eq!(term(3, 2).mul_term(&term(4, -2)), HyperValue::Real(num!(12)));
    assert_eq!(term(3, 2).scale(&num!(1, 3)), Term::new(num!(1), num!(2)));
    assert_eq!(term(3, 2).scale(&num!(0)), HyperValue::Real(num!(0)));
}

#[test]
fn div_test() {
    assert_eq!(term(6, 3).div_term(&term(4, 1)), Term::new(num!(3, 2), num!(2)));
    assert_eq!(term(6, 3).div_term(&term(2, 3)), HyperValue::Real(num!(3)));
    assert_eq!(term(2, 1).divide_into(&num!(1)), Term::new(num!(1, 2), num!(-1)));
    assert_eq!(term(2, 1).div_scalar(&num!(4)).unwrap(), Term::new(num!(1, 2), num!(1)));
    assert!(matches!(term(2, 1).div_scalar(&num!(0)), Err(HyperError::DivisionByZero)));
}

#[test]
fn pow_test() {
    assert_eq!(term(2, 1).pow(&num!(3)).unwrap(), Term::new(num!(8), num!(3)));
    assert_eq!(term(2, 1).pow(&num!(-1)).unwrap(), Term::new(num!(1, 2), num!(-1)));
    assert_eq!(term(2, 1).pow(&num!(0)).unwrap(), HyperValue::Real(num!(1)));
    assert_eq!(term(4, 2).pow(&num!(1, 2)).unwrap(), Term::new(num!(2), num!(1)));
    assert_eq!(term(-8, 3).pow(&num!(2, 3)).unwrap(), Term::new(num!(4), num!(2)));
    assert_eq!(term(-8, 3).pow(&num!(1, 3)).unwrap(), Term::new(num!(-2), num!(1)));
}

#[test]
fn inexact_pow_test() {
    let canon = Canonicalizer::new(1000).unwrap();
    let root = term(2, 2).pow_with(&num!(1, 2), &canon).unwrap();
    // √2 bounded to denominators below 1000
    assert_eq!(root, Term::new(num!(1393, 985), num!(1)));
    assert!(matches!(
        term(-4, 2).pow(&num!(1, 2)),
        Err(HyperError::Unsupported { .. })
    ));
}

#[test]
fn inexact_negative_root_test() {
    let canon = Canonicalizer::new(1000).unwrap();
    // odd roots of a negative coefficient keep the sign only for odd numerators
    let cube_root = term(-2, 3).pow_with(&num!(1, 3), &canon).unwrap();
    assert_eq!(cube_root, Term::new(num!(-635, 504), num!(1)));
    let squared = term(-2, 3).pow_with(&num!(2, 3), &canon).unwrap();
    assert_eq!(squared, Term::new(num!(1008, 635), num!(2)));
    let reciprocal = term(-2, 3).pow_with(&num!(-1, 3), &canon).unwrap();
    assert_eq!(reciprocal, Term::new(num!(-504, 635), num!(-1)));
}

#[test]
fn pow_too_large_test() {
    let huge = num!(2_000_000_000);
    assert!(matches!(term(2, 1).pow(&huge), Err(HyperError::Unsupported { .. })));
    assert!(matches!(
        pow_num(&num!(2), &num!(-20_000), &Canonicalizer::default()),
        Err(HyperError::Unsupported { .. })
    ));
    // powers of ±1 stay cheap at any size
    assert_eq!(term(-1, 1).pow(&huge).unwrap(), Term::new(num!(1), num!(2_000_000_000)));
    let limit = num!(MAX_POWER);
    assert!(term(2, 1).pow(&limit).is_ok());
}

#[test]
fn add_test() {
    let sum = term(3, 2).add_value(&HyperValue::Infinitesimal(term(4, 2)));
    assert_eq!(sum, Term::new(num!(7), num!(2)));
    let cancelled = term(3, 2).add_value(&HyperValue::Infinitesimal(term(-3, 2)));
    assert_eq!(cancelled, HyperValue::Real(num!(0)));
    assert_eq!(
        term(3, 2).add_value(&HyperValue::Real(num!(0))),
        HyperValue::Infinitesimal(term(3, 2))
    );
}

#[test]
fn add_escalates_test() {
    let mixed = term(1, 1).add_value(&HyperValue::Infinitesimal(term(1, 2)));
    match &mixed {
        HyperValue::Expression(e) => {
            assert!(e.real_part().is_zero());
            assert_eq!(e.terms(), &[term(1, 1), term(1, 2)]);
        }
        other => panic!("expected an expression, got {other}"),
    }
    let with_real = term(1, 1).sub_value(&HyperValue::Real(num!(5)));
    assert_eq!(with_real.st(), &num!(-5));
}

#[test]
fn neg_and_st_test() {
    assert_eq!(-term(3, -1), term(-3, -1));
    assert_eq!(term(7, 1).st(), &num!(7));
    assert!(term(7, -1).is_infinite());
    assert!(term(7, 1).is_infinitesimal());
}

#[test]
fn display_test() {
    assert_eq!(term(1, 2).to_string(), "ε²");
    assert_eq!(term(2, -1).to_string(), "2ω");
    assert_eq!(term(1, 1).to_string(), "ε");
    assert_eq!(term(-1, -3).to_string(), "-ω³");
    assert_eq!(term(5, 12).to_string(), "5ε¹²");
    let half = Term::new(num!(1, 2), num!(1, 2));
    assert_eq!(half.to_string(), "1/2ε¹⁄²");
}
