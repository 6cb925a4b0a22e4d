//! Evaluation of the World Magnetic Model.
//!
//! A [`CoefficientSet`] holds the spherical-harmonic model, a [`Location`] a query point, and
//! [`evaluate`] combines them at a [`DecimalYear`] into a [`MagneticField`] exposing the field
//! components, declination, inclination, intensities and grid variation with their secular
//! rates and uncertainties.
use crate::error::GeomagError;

pub mod error;
pub mod location;
pub mod model;
pub mod sweep;
pub mod time;
pub mod utils;

pub use crate::location::{HeightReference, Location};
pub use crate::model::coefficients::{CoefficientSet, ModelSource};
pub use crate::model::field::{FieldWarning, LowFieldZone, MagneticField};
pub use crate::model::EvaluationOptions;
pub use crate::time::DecimalYear;

type Result<T> = std::result::Result<T, GeomagError>;

/// Evaluates the built-in model at a location and time.
///
/// # Errors
/// Will return `Err` only if the built-in model cannot be loaded.
pub fn evaluate(location: &Location, time: DecimalYear) -> Result<MagneticField> {
    Ok(model::evaluate(CoefficientSet::built_in()?, location, time)?)
}

/// Evaluates the built-in model at a geodetic latitude and longitude (degrees) and a height
/// above mean sea level (m). A gap in geoid coverage is reported in the result's warnings.
///
/// # Errors
/// Will return `Err` if the coordinates are out of range or a built-in data file cannot be
/// loaded.
pub fn evaluate_mean_sea_level(
    latitude: f64,
    longitude: f64,
    height: f64,
    time: DecimalYear,
) -> Result<MagneticField> {
    let (location, gap) = Location::from_mean_sea_level(latitude, longitude, height)?;
    Ok(evaluate(&location, time)?.with_coverage_gap(gap))
}
