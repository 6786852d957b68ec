// builds an exact Num from a numerator/denominator pair, usable by every submodule
macro_rules! num {
    ($numer:expr, $denom:expr) => {
        $crate::math::Num::new(
            $crate::math::NumComponent::from($numer),
            $crate::math::NumComponent::from($denom),
        )
    };
    ($int:expr) => {
        $crate::math::Num::from_integer($crate::math::NumComponent::from($int))
    };
}

pub mod canonical;
pub mod expression;
pub mod parse;
pub mod superscript;
pub mod term;
pub mod value;

#[cfg(test)]
mod proptests;

pub type Num = num_rational::BigRational;
pub type NumComponent = num_bigint::BigInt;

pub use canonical::{Canonicalizer, Numeric};
pub use expression::Expression;
pub use term::Term;
pub use value::HyperValue;
