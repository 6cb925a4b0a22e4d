//! The spherical-harmonic field model: coefficient tables, Legendre functions, synthesis and
//! the quantities derived from the synthesized vector.
use crate::location::Location;
use crate::model::coefficients::CoefficientSet;
use crate::model::error::EvaluationError;
use crate::model::field::{FieldWarning, MagneticField};
use crate::model::legendre::LegendreTable;
use crate::model::synthesis::synthesize;
use crate::time::DecimalYear;

pub mod coefficients;
pub mod error;
pub mod field;
pub mod legendre;
pub mod synthesis;
pub mod uncertainty;

/// Options controlling a single evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Fail instead of extrapolating when the time is outside the validity window
    pub strict_validity: bool,
}

/// Evaluates the field of `model` at a location and time, extrapolating with a warning if the
/// time is outside the model's validity window.
pub fn evaluate(
    model: &CoefficientSet,
    location: &Location,
    time: DecimalYear,
) -> Result<MagneticField, EvaluationError> {
    evaluate_with(model, location, time, &EvaluationOptions::default())
}

/// Evaluates the field of `model` at a location and time.
///
/// # Errors
/// Will return `Err` if the time is outside the model's validity window and
/// `options.strict_validity` is set.
pub fn evaluate_with(
    model: &CoefficientSet,
    location: &Location,
    time: DecimalYear,
    options: &EvaluationOptions,
) -> Result<MagneticField, EvaluationError> {
    let mut warnings = vec![];
    if !model.is_valid_at(time) {
        if options.strict_validity {
            Err(EvaluationError::OutsideValidity {
                time: time.value(),
                valid_from: model.valid_from(),
                valid_until: model.valid_until(),
            })?
        }
        warnings.push(FieldWarning::OutsideValidity {
            time: time.value(),
            valid_from: model.valid_from(),
            valid_until: model.valid_until(),
        });
    }

    let legendre = LegendreTable::evaluate(model.max_degree(), location.colatitude().to_radians());
    let geocentric = synthesize(
        model,
        &legendre,
        time,
        location.radius(),
        location.longitude().to_radians(),
    );

    Ok(MagneticField::new(
        *location,
        time,
        geocentric,
        *model.error_model(),
        warnings,
    ))
}
