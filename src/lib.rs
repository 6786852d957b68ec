#[macro_use]
pub mod math;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;

pub use error::HyperError;
pub use math::{Canonicalizer, Expression, HyperValue, Num, NumComponent, Numeric, Term};
