//! Property-based tests for the hyperreal algebra.

use proptest::prelude::*;

use super::{Expression, HyperValue, Num, Term};

fn small_int() -> impl Strategy<Value = i64> {
    -50i64..50i64
}

fn non_zero_int() -> impl Strategy<Value = i64> {
    prop_oneof![(-50i64..=-1i64), (1i64..=50i64)]
}

fn exact() -> impl Strategy<Value = Num> {
    (small_int(), 1i64..8i64).prop_map(|(n, d)| num!(n, d))
}

fn order() -> impl Strategy<Value = Num> {
    non_zero_int().prop_map(|e| num!(e % 4 + if e > 0 { 1 } else { -1 }))
}

fn term() -> impl Strategy<Value = Term> {
    (non_zero_int(), order()).prop_map(|(v, exp)| match Term::new(num!(v), exp) {
        HyperValue::Infinitesimal(t) => t,
        other => unreachable!("nonzero value and order gave {other}"),
    })
}

fn hyper_value() -> impl Strategy<Value = HyperValue> {
    (exact(), prop::collection::vec((exact(), order()), 0..4)).prop_map(|(real, terms)| {
        let summands = std::iter::once(HyperValue::Real(real))
            .chain(terms.into_iter().map(|(v, e)| Term::new(v, e)));
        Expression::from_summands(summands).simplify()
    })
}

fn assert_reduced(value: &HyperValue) -> Result<(), TestCaseError> {
    if let HyperValue::Expression(e) = value {
        for (i, t) in e.terms().iter().enumerate() {
            prop_assert!(*t.value() != num!(0));
            prop_assert!(*t.exp() != num!(0));
            prop_assert!(e.terms()[i + 1..].iter().all(|u| u.exp() != t.exp()));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn zero_value_collapses(exp in order()) {
        prop_assert_eq!(Term::new(num!(0), exp), HyperValue::Real(num!(0)));
    }

    #[test]
    fn zero_order_collapses(v in exact()) {
        prop_assert_eq!(Term::new(v.clone(), num!(0)), HyperValue::Real(v));
    }

    #[test]
    fn exponents_add_under_mul(a in term(), b in term()) {
        match a.mul_term(&b) {
            HyperValue::Infinitesimal(p) => {
                prop_assert_eq!(p.exp(), &(a.exp() + b.exp()));
                prop_assert_eq!(p.value(), &(a.value() * b.value()));
            }
            HyperValue::Real(x) => {
                prop_assert_eq!(a.exp() + b.exp(), num!(0));
                prop_assert_eq!(x, a.value() * b.value());
            }
            HyperValue::Expression(e) => prop_assert!(false, "product escalated to {}", e),
        }
    }

    #[test]
    fn construction_is_reduced(x in hyper_value(), y in hyper_value()) {
        assert_reduced(&x)?;
        assert_reduced(&(&x + &y))?;
        assert_reduced(&(&x * &y))?;
    }

    #[test]
    fn add_commutative(x in hyper_value(), y in hyper_value()) {
        prop_assert_eq!(&x + &y, &y + &x);
    }

    #[test]
    fn add_associative(x in hyper_value(), y in hyper_value(), z in hyper_value()) {
        prop_assert_eq!(&(&x + &y) + &z, &x + &(&y + &z));
    }

    #[test]
    fn mul_commutative(x in hyper_value(), y in hyper_value()) {
        prop_assert_eq!(&x * &y, &y * &x);
    }

    #[test]
    fn mul_distributes(x in hyper_value(), y in hyper_value(), z in hyper_value()) {
        prop_assert_eq!(&x * &(&y + &z), &(&x * &y) + &(&x * &z));
    }

    #[test]
    fn additive_identity_and_inverse(x in hyper_value()) {
        prop_assert_eq!(&x + &HyperValue::zero(), x.clone());
        let cancelled = &x - &x;
        prop_assert_eq!(cancelled.st(), &num!(0));
    }

    #[test]
    fn power_consistency(x in hyper_value(), m in 0i64..4, n in 0i64..4) {
        let lhs = x.pow(&num!(m + n)).unwrap();
        let rhs = x.pow(&num!(m)).unwrap() * x.pow(&num!(n)).unwrap();
        prop_assert_eq!(lhs, rhs);
    }
}
