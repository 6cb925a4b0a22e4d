use crate::location::error::LocationError;
use thiserror::Error;

/// Errors raised while loading or indexing a coefficient table
#[derive(Error, Debug)]
pub enum CoefficientError {
    /// Malformed coefficient source
    #[error("Invalid coefficient source at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Required header metadata or data is missing
    #[error("Incomplete coefficient source: {0}")]
    Validity(String),

    /// Degree/order outside the table
    #[error("No coefficient for degree {n}, order {m} in a table of maximum degree {max_degree}")]
    Index { n: usize, m: usize, max_degree: usize },

    /// The built-in model is missing or unreadable
    #[error("Built-in model unavailable: {0}")]
    Embedded(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while evaluating the field at a point
#[derive(Error, Debug)]
pub enum EvaluationError {
    /// Requested time is outside the model's validity window and strict mode is on
    #[error("Time {time} is outside the model validity window [{valid_from}, {valid_until}]")]
    OutsideValidity {
        time: f64,
        valid_from: f64,
        valid_until: f64,
    },

    #[error("{0}")]
    Location(#[from] LocationError),
}
