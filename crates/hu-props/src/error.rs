//! Property library errors.

use hu_core::CoreError;
use thiserror::Error;

/// Result type for property operations.
pub type PropsResult<T> = Result<T, PropsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropsError {
    /// Value outside the correlation envelope.
    #[error("{what} out of range: {value} (valid {min}..={max})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Non-finite input.
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },
}

impl From<PropsError> for CoreError {
    fn from(err: PropsError) -> Self {
        match err {
            PropsError::OutOfRange { what, .. } => CoreError::InvalidArg { what },
            PropsError::NonPhysical { what } => CoreError::Invariant { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_quantity() {
        let err = PropsError::OutOfRange {
            what: "temperature",
            value: 900.0,
            min: 32.02,
            max: 700.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("temperature"));
        assert!(msg.contains("900"));
    }

    #[test]
    fn converts_to_core_error() {
        let core: CoreError = PropsError::NonPhysical { what: "pressure" }.into();
        assert!(matches!(core, CoreError::Invariant { what: "pressure" }));
    }
}
