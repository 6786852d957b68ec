use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HyperError {
    #[error("{operation} is not supported for {operand}")]
    Unsupported {
        operation: &'static str,
        operand: String,
    },
    #[error("attempt to divide by zero")]
    DivisionByZero,
    #[error("cannot convert non-finite float {0} to an exact number")]
    NonFinite(f64),
    #[error("denominator bound must be at least 1")]
    InvalidPrecision,
    #[error("cannot read number from '{0}'")]
    Parse(String),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config error: {0}")]
    Config(String),
}

impl HyperError {
    pub(crate) fn unsupported(operation: &'static str, operand: impl ToString) -> Self {
        HyperError::Unsupported {
            operation,
            operand: operand.to_string(),
        }
    }
}

pub type Result<T, E = HyperError> = std::result::Result<T, E>;
