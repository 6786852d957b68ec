use std::collections::BTreeMap;
use std::fmt;
use std::iter;
use std::ops::Neg;

use num_traits::{One, Signed, ToPrimitive, Zero};
use tracing::trace;

use super::term::Term;
use super::value::HyperValue;
use super::Num;
use crate::error::{HyperError, Result};

// each step of the repeated product is a full distributive multiply
pub const MAX_EXPRESSION_POWER: usize = 1_000;

/// `real_part + Σ terms`, kept reduced: at most one term per exponent, no
/// zero terms, terms ordered by ascending exponent (ω orders first).
///
/// Every arithmetic operation rebuilds the expression through
/// [`Expression::from_summands`], which is the only place normalization
/// happens.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expression {
    real_part: Num,
    hyper_real_part: Vec<Term>,
}

impl Expression {
    pub fn from_summands<I>(summands: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<HyperValue>,
    {
        let mut real_part = Num::zero();
        // exponent -> summed coefficient
        let mut orders: BTreeMap<Num, Num> = BTreeMap::new();
        let mut add_term = |t: Term| {
            let (value, exp) = t.into_parts();
            *orders.entry(exp).or_insert_with(Num::zero) += value;
        };
        for summand in summands {
            match summand.into() {
                HyperValue::Real(x) => real_part += x,
                HyperValue::Infinitesimal(t) => add_term(t),
                HyperValue::Expression(e) => {
                    real_part += e.real_part;
                    e.hyper_real_part.into_iter().for_each(&mut add_term);
                }
            }
        }

        let mut hyper_real_part = Vec::with_capacity(orders.len());
        for (exp, value) in orders {
            match Term::new(value, exp) {
                HyperValue::Infinitesimal(t) => hyper_real_part.push(t),
                // cancelled groups come back as 0, order-0 groups as their value
                HyperValue::Real(x) => real_part += x,
                HyperValue::Expression(e) => real_part += e.real_part,
            }
        }
        trace!(real = %real_part, terms = hyper_real_part.len(), "normalized expression");
        Self {
            real_part,
            hyper_real_part,
        }
    }

    pub fn real_part(&self) -> &Num {
        &self.real_part
    }

    pub fn terms(&self) -> &[Term] {
        &self.hyper_real_part
    }

    /// The standard part: infinitesimal and infinite terms never reach the
    /// real part, so it is exact.
    pub fn st(&self) -> &Num {
        &self.real_part
    }

    pub fn is_real(&self) -> bool {
        self.hyper_real_part.is_empty()
    }

    /// The real part followed by every term, ready to feed back into
    /// [`Expression::from_summands`].
    pub fn summands(&self) -> impl Iterator<Item = HyperValue> + '_ {
        iter::once(HyperValue::Real(self.real_part.clone()))
            .chain(self.hyper_real_part.iter().cloned().map(HyperValue::Infinitesimal))
    }

    /// Collapses to the narrowest shape: a real when no terms are left, a
    /// lone term when the real part is zero.
    pub fn simplify(mut self) -> HyperValue {
        match self.hyper_real_part.len() {
            0 => HyperValue::Real(self.real_part),
            1 if self.real_part.is_zero() => {
                HyperValue::Infinitesimal(self.hyper_real_part.remove(0))
            }
            _ => HyperValue::Expression(self),
        }
    }

    pub fn add(&self, other: &HyperValue) -> Expression {
        Self::from_summands(self.summands().chain(iter::once(other.clone())))
    }

    pub fn sub(&self, other: &HyperValue) -> Expression {
        Self::from_summands(self.summands().chain(iter::once(-other)))
    }

    pub fn scale(&self, factor: &Num) -> Expression {
        Self::from_summands(
            iter::once(HyperValue::Real(&self.real_part * factor))
                .chain(self.hyper_real_part.iter().map(|t| t.scale(factor))),
        )
    }

    /// Full distributive expansion. Unrelated pairs of terms can land on the
    /// same order (ε·ω and ε²·ω² are both real), so everything is merged by
    /// one pass through [`Expression::from_summands`].
    pub fn mul(&self, other: &Expression) -> Expression {
        let cross = self
            .hyper_real_part
            .iter()
            .flat_map(|a| other.hyper_real_part.iter().map(move |b| a.mul_term(b)));
        let own_scaled = self.hyper_real_part.iter().map(|t| t.scale(&other.real_part));
        let other_scaled = other.hyper_real_part.iter().map(|t| t.scale(&self.real_part));
        Self::from_summands(
            iter::once(HyperValue::Real(&self.real_part * &other.real_part))
                .chain(cross)
                .chain(own_scaled)
                .chain(other_scaled),
        )
    }

    pub fn mul_term(&self, term: &Term) -> Expression {
        self.mul(&Expression::from(term.clone()))
    }

    pub fn div_term(&self, term: &Term) -> Expression {
        Self::from_summands(
            iter::once(term.divide_into(&self.real_part))
                .chain(self.hyper_real_part.iter().map(|t| t.div_term(term))),
        )
    }

    pub fn div_scalar(&self, divisor: &Num) -> Result<Expression> {
        if divisor.is_zero() {
            return Err(HyperError::DivisionByZero);
        }
        Ok(self.scale(&divisor.recip()))
    }

    /// Repeated product, `n` copies of `self`. Only nonnegative integer
    /// powers are defined for a general expression.
    pub fn pow(&self, n: &Num) -> Result<Expression> {
        if !n.is_integer() || n.is_negative() {
            return Err(HyperError::unsupported(
                "raising an expression to a negative or fractional power",
                format!("{self} to the power {n}"),
            ));
        }
        let times = n
            .to_integer()
            .to_usize()
            .filter(|&times| times <= MAX_EXPRESSION_POWER)
            .ok_or_else(|| {
                HyperError::unsupported("raising an expression to a power this large", n)
            })?;
        Ok(iter::repeat(self)
            .take(times)
            .fold(Expression::from(Num::one()), |acc, x| acc.mul(x)))
    }
}

impl From<Num> for Expression {
    fn from(real_part: Num) -> Self {
        Self {
            real_part,
            hyper_real_part: Vec::new(),
        }
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self {
            real_part: Num::zero(),
            hyper_real_part: vec![term],
        }
    }
}

impl Neg for &Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression {
            real_part: -&self.real_part,
            hyper_real_part: self.hyper_real_part.iter().map(Neg::neg).collect(),
        }
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        -&self
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hyper_real_part.is_empty() {
            return write!(f, "{}", self.real_part);
        }
        let terms = self
            .hyper_real_part
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<String>>()
            .join(" + ");
        if self.real_part.is_zero() {
            write!(f, "{terms}")
        } else {
            write!(f, "{} + {terms}", self.real_part)
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
fn merge_test() {
    let e = Expression::from_summands([eps(3, 2), eps(4, 2)]);
    assert!(e.real_part().is_zero());
    assert_eq!(e.terms().len(), 1);
    assert_eq!(e.terms()[0].exp(), &num!(2));
    assert_eq!(e.terms()[0].value(), &num!(7));

    let many = Expression::from_summands((1..=10).map(|i| eps(i, -1)));
    assert_eq!(many.terms().len(), 1);
    assert_eq!(many.terms()[0].value(), &num!(55));
}

#[test]
fn cancellation_drops_terms_test() {
    let e = Expression::from_summands([real(2), eps(3, 1), eps(-3, 1), eps(1, 2)]);
    assert_eq!(e.real_part(), &num!(2));
    assert_eq!(e.terms().len(), 1);
    assert_eq!(e.terms()[0].exp(), &num!(2));
}

#[test]
fn real_summands_test() {
    let e = Expression::from_summands([real(5), eps(3, 1), real(-2), eps(7, -1)]);
    assert_eq!(e.real_part(), &num!(3));
    assert_eq!(e.st(), &num!(3));
    let exps: Vec<&Num> = e.terms().iter().map(Term::exp).collect();
    assert_eq!(exps, vec![&num!(-1), &num!(1)]);
}

#[test]
fn nested_expressions_flatten_test() {
    let inner = Expression::from_summands([real(1), eps(1, 1)]);
    let outer =
        Expression::from_summands([HyperValue::Expression(inner.clone()), eps(2, 1), real(1)]);
    assert_eq!(outer, Expression::from_summands([real(2), eps(3, 1)]));
    assert_eq!(Expression::from_summands(inner.summands()), inner);
}

#[test]
fn order_does_not_matter_test() {
    let a = Expression::from_summands([eps(1, 2), real(4), eps(1, -1), eps(2, 1)]);
    let b = Expression::from_summands([eps(2, 1), eps(1, -1), real(4), eps(1, 2)]);
    assert_eq!(a, b);
}

#[test]
fn distributive_test() {
    // (1 + ε)(1 + ε) = 1 + 2ε + ε²
    let x = Expression::from_summands([real(1), eps(1, 1)]);
    let square = x.mul(&x);
    assert_eq!(square, Expression::from_summands([real(1), eps(2, 1), eps(1, 2)]));
    assert_eq!(square.to_string(), "1 + 2ε + ε²");
}

#[test]
fn distributive_cross_orders_test() {
    // (ε + ε²)(ω + ω²) = 1 + ω + ε + 1
    let a = Expression::from_summands([eps(1, 1), eps(1, 2)]);
    let b = Expression::from_summands([eps(1, -1), eps(1, -2)]);
    let product = a.mul(&b);
    assert_eq!(product.real_part(), &num!(2));
    assert_eq!(
        product,
        Expression::from_summands([real(2), eps(1, -1), eps(1, 1)])
    );
}

#[test]
fn scale_test() {
    let e = Expression::from_summands([real(2), eps(4, 1)]);
    assert_eq!(e.scale(&num!(1, 2)), Expression::from_summands([real(1), eps(2, 1)]));
    assert!(e.scale(&num!(0)).is_real());
    assert_eq!(
        e.div_scalar(&num!(2)).unwrap(),
        Expression::from_summands([real(1), eps(2, 1)])
    );
    assert!(matches!(e.div_scalar(&num!(0)), Err(HyperError::DivisionByZero)));
}

#[test]
fn div_term_test() {
    // (2 + 4ε) / 2ε = ω + 2
    let e = Expression::from_summands([real(2), eps(4, 1)]);
    let HyperValue::Infinitesimal(t) = eps(2, 1) else {
        panic!("expected a term")
    };
    assert_eq!(e.div_term(&t), Expression::from_summands([real(2), eps(1, -1)]));
}

#[test]
fn add_sub_test() {
    let e = Expression::from_summands([real(5), eps(1, 1)]);
    assert_eq!(e.add(&real(0)), e);
    assert_eq!(e.add(&eps(2, 1)), Expression::from_summands([real(5), eps(3, 1)]));
    let gone = e.sub(&HyperValue::Expression(e.clone()));
    assert!(gone.is_real());
    assert!(gone.st().is_zero());
}

#[test]
fn pow_test() {
    let x = Expression::from_summands([real(1), eps(1, 1)]);
    assert_eq!(x.pow(&num!(0)).unwrap(), Expression::from(num!(1)));
    assert_eq!(x.pow(&num!(1)).unwrap(), x);
    assert_eq!(
        x.pow(&num!(3)).unwrap(),
        Expression::from_summands([real(1), eps(3, 1), eps(3, 2), eps(1, 3)])
    );
    let split = x.pow(&num!(2)).unwrap().mul(&x.pow(&num!(3)).unwrap());
    assert_eq!(x.pow(&num!(5)).unwrap(), split);
}

#[test]
fn pow_rejects_test() {
    let x = Expression::from_summands([real(1), eps(1, 1)]);
    assert!(matches!(x.pow(&num!(-1)), Err(HyperError::Unsupported { .. })));
    assert!(matches!(x.pow(&num!(1, 2)), Err(HyperError::Unsupported { .. })));
    assert!(matches!(x.pow(&num!(100_000_000)), Err(HyperError::Unsupported { .. })));
    let limit = num!(MAX_EXPRESSION_POWER as u64 + 1);
    assert!(matches!(x.pow(&limit), Err(HyperError::Unsupported { .. })));
}

#[test]
fn simplify_test() {
    assert_eq!(Expression::from_summands([real(4)]).simplify(), real(4));
    assert_eq!(Expression::from_summands([eps(4, 2)]).simplify(), eps(4, 2));
    assert!(matches!(
        Expression::from_summands([real(1), eps(4, 2)]).simplify(),
        HyperValue::Expression(_)
    ));
}

#[test]
fn display_test() {
    assert_eq!(Expression::from_summands([real(3)]).to_string(), "3");
    assert_eq!(Expression::from_summands([eps(1, 1), eps(2, -1)]).to_string(), "2ω + ε");
    assert_eq!(
        Expression::from_summands([real(-5), eps(1, 1), eps(-1, 2)]).to_string(),
        "-5 + ε + -ε²"
    );
    assert_eq!(
        Expression::from_summands([real(5), eps(3, 1), eps(7, -1)]).to_string(),
        "5 + 7ω + 3ε"
    );
}
