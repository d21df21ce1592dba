//! Error types for parameter input and configuration.

use crate::state::Field;

/// A rejected parameter value.
///
/// Returned when a user edit (or a configured default) would leave the
/// oscillator in a state where `sqrt(stiffness / mass)` is undefined or
/// meaningless. The widget keeps its last valid value when this happens;
/// the host is expected to write that value back into its input control.
///
/// # Example
///
/// ```rust
/// use oscillator::{Field, InvalidParameterError, Parameters};
///
/// let params = Parameters::default();
/// let err = params.with(Field::Mass, 0.0).unwrap_err();
/// assert!(matches!(err, InvalidParameterError::NonPositive { field: Field::Mass, .. }));
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InvalidParameterError {
    /// The raw input could not be parsed as a number.
    #[error("{field} must be a number, got {input:?}")]
    NonNumeric {
        /// Field the input was meant for.
        field: Field,
        /// The rejected input text.
        input: String,
    },

    /// The value parsed but is NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Field the value was meant for.
        field: Field,
    },

    /// Mass or stiffness was zero or negative.
    #[error("{field} must be greater than zero, got {value}")]
    NonPositive {
        /// Field the value was meant for.
        field: Field,
        /// The rejected value.
        value: f64,
    },

    /// An input control carried a field identifier that maps to no parameter.
    #[error("unknown parameter field {id:?}")]
    UnknownField {
        /// The identifier as found on the control.
        id: String,
    },
}

/// Errors that can occur when loading a [`Config`](crate::Config).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration was not valid JSON, did not match the schema, or
    /// carried default parameters that are not a valid oscillator.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// A canvas dimension was zero, negative or not finite.
    #[error("invalid layout: {field} must be a positive number, got {value}")]
    InvalidLayout {
        /// Name of the offending setting.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// `log_level` is not one of trace, debug, info, warn, error.
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
}
