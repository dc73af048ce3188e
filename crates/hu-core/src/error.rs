use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Table is not strictly increasing: {what}")]
    UnorderedTable { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
