use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("'{0}' is not a valid number")]
    Invalid(String),

    #[error("Numeric overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
