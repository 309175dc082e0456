use thiserror::Error;

use crate::FloatValue;

/// Error type for invalid operations.
///
/// Configuration errors (unknown or missing parameters, malformed options) and
/// numeric failures (a root that cannot be bracketed or does not converge) are
/// both fatal and carry enough context to locate the offending input.
#[derive(Error, Debug)]
pub enum LMBError {
    #[error("Parameter '{parameter}' has unrecognised temperature function kind '{kind}'. Expected one of 'fix', 'lut' or 'Eact'")]
    UnknownTemperatureFunction { parameter: String, kind: String },
    #[error("Unknown parameter '{parameter}' in region '{region}'")]
    UnknownParameter { region: String, parameter: String },
    #[error("Missing required parameter '{parameter}' in region '{region}'")]
    MissingParameter { region: String, parameter: String },
    #[error("Missing required region '{0}'")]
    MissingRegion(String),
    #[error("Regions {0} cannot be combined in one cell model")]
    ConflictingRegions(String),
    #[error("Parameter '{parameter}' has no lookup-table entry at {temperature} K. Tabulated temperatures: {available}")]
    TemperatureNotTabulated {
        parameter: String,
        temperature: FloatValue,
        available: String,
    },
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },
    #[error("Invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },
    #[error("Position {position} is not valid for transfer function '{variable}': {reason}")]
    InvalidPosition {
        variable: String,
        position: FloatValue,
        reason: String,
    },
    #[error("Expected a row or column vector, got an array of shape {0:?}")]
    ShapeMismatch(Vec<usize>),
    #[error("Could not bracket the open-circuit potential for lithiation {target} (setpoint {index}) within [{lower}, {upper}] V")]
    NoBracket {
        index: usize,
        target: FloatValue,
        lower: FloatValue,
        upper: FloatValue,
    },
    #[error("Root find for setpoint {index} did not converge after {iterations} iterations (last estimate {estimate})")]
    NotConverged {
        index: usize,
        iterations: usize,
        estimate: FloatValue,
    },
    #[error("Failed to parse cell model: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to read cell model: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type for `Result<T, LMBError>`.
pub type LMBResult<T> = Result<T, LMBError>;
