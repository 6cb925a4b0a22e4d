use crate::location::error::{GeoidError, LocationError};
use crate::model::error::{CoefficientError, EvaluationError};
use crate::sweep::error::SweepError;
use crate::utils::parsing::InputError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeomagError {
    /// Unable to load or index a coefficient table
    #[error("{0}")]
    Coefficients(#[from] CoefficientError),

    /// Unable to load the geoid undulation grid
    #[error("{0}")]
    Geoid(#[from] GeoidError),

    /// Bad query point
    #[error("{0}")]
    Location(#[from] LocationError),

    #[error("{0}")]
    Evaluation(#[from] EvaluationError),

    #[error("{0}")]
    Sweep(#[from] SweepError),

    /// Unparseable user input
    #[error("{0}")]
    Input(#[from] InputError),
}
