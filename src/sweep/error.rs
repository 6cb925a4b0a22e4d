use crate::location::error::GeoidError;
use crate::model::error::{CoefficientError, EvaluationError};
use thiserror::Error;

/// Errors that stop a sweep as a whole
#[derive(Error, Debug)]
pub enum SweepError {
    /// The sweep configuration cannot describe a grid of points
    #[error("Invalid sweep configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Coefficients(#[from] CoefficientError),

    #[error("{0}")]
    Geoid(#[from] GeoidError),

    /// Unable to write the dataset
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// A point that could not be evaluated. Recorded and skipped; the sweep carries on.
#[derive(Error, Debug)]
#[error("Point {index} (latitude {latitude}, longitude {longitude}): {source}")]
pub struct PointFailure {
    pub index: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub source: EvaluationError,
}
